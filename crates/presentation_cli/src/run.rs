//! `run` command: stdin events in, stdout actions out

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use application::{ExplorePolicy, POLICY_NAME, ParamSource, create_policy, keys};
use domain::Event;
use infrastructure::{BasicTimeBoundedQueue, ConfigParamSource};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

/// Choose the policy: explicit flag, then `explorePolicy`, then the default
fn policy_name(source: &ConfigParamSource, flag: Option<&str>) -> anyhow::Result<String> {
    if let Some(name) = flag {
        return Ok(name.to_string());
    }
    if source.is_set(keys::EXPLORE_POLICY) {
        return Ok(source.get_string(keys::EXPLORE_POLICY)?);
    }
    Ok(POLICY_NAME.to_string())
}

/// Parse event lines and queue them until EOF or a fatal queue error
///
/// Returns the number of events queued.
async fn feed_events<R>(policy: &dyn ExplorePolicy, input: R) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut queued = 0;
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: Event = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed event");
                continue;
            },
        };
        debug!(line = line_no, event = %event, "Read event");
        policy
            .queue_event(event)
            .with_context(|| format!("queueing event from line {line_no}"))?;
        queued += 1;
    }

    Ok(queued)
}

pub async fn run(
    source: &ConfigParamSource,
    policy_flag: Option<&str>,
    linger: Duration,
) -> anyhow::Result<()> {
    let name = policy_name(source, policy_flag)?;
    let policy = create_policy(&name, Arc::new(BasicTimeBoundedQueue::new()))?;
    policy.load_config(source)?;
    let mut actions = policy
        .take_action_receiver()
        .context("action stream already taken")?;
    info!(policy = policy.name(), "Explorer started, reading events from stdin");

    let feeder = {
        let policy = Arc::clone(&policy);
        tokio::spawn(async move {
            let result = feed_events(policy.as_ref(), BufReader::new(tokio::io::stdin())).await;
            match &result {
                Ok(queued) => {
                    info!(queued, ?linger, "Input closed, lingering before shutdown");
                    tokio::time::sleep(linger).await;
                },
                Err(e) => error!(error = %e, "Stopping explorer"),
            }
            policy.shutdown();
            result
        })
    };

    loop {
        tokio::select! {
            action = actions.recv() => {
                let Some(action) = action else { break };
                println!("{}", serde_json::to_string(&action)?);
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                policy.shutdown();
            },
        }
    }

    if let Some(reason) = policy.failure() {
        feeder.abort();
        anyhow::bail!("explore policy failed: {reason}");
    }
    if feeder.is_finished() {
        feeder.await??;
    } else {
        feeder.abort();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use application::RandomPolicy;
    use domain::EntityId;

    use super::*;

    #[test]
    fn flag_overrides_configured_policy() {
        let source = ConfigParamSource::from_toml_str("explorePolicy = \"other\"").unwrap();
        assert_eq!(policy_name(&source, Some("random")).unwrap(), "random");
        assert_eq!(policy_name(&source, None).unwrap(), "other");

        let bare = ConfigParamSource::from_toml_str("").unwrap();
        assert_eq!(policy_name(&bare, None).unwrap(), POLICY_NAME);
    }

    #[tokio::test(start_paused = true)]
    async fn feeds_valid_lines_and_skips_garbage() {
        let policy = RandomPolicy::new(Arc::new(BasicTimeBoundedQueue::new())).unwrap();
        let mut actions = policy.take_action_receiver().unwrap();

        let input = format!(
            "{}\n\nnot json\n{}\n",
            serde_json::json!({
                "entity": "a",
                "kind": {"type": "Generic", "params": {"class": "FuncCall", "option": {}}}
            }),
            serde_json::json!({
                "entity": "b",
                "kind": {"type": "Filesystem", "params": {"op": "write", "path": "/x"}}
            }),
        );
        let queued = feed_events(&policy, BufReader::new(input.as_bytes())).await.unwrap();
        assert_eq!(queued, 2);

        let mut entities = vec![
            actions.recv().await.unwrap().entity,
            actions.recv().await.unwrap().entity,
        ];
        entities.sort();
        assert_eq!(entities, vec![EntityId::new("a").unwrap(), EntityId::new("b").unwrap()]);
    }

    #[tokio::test]
    async fn queue_failure_stops_feeding() {
        let policy = RandomPolicy::new(Arc::new(BasicTimeBoundedQueue::new())).unwrap();
        policy.shutdown();
        let input = "{\"entity\":\"a\",\"kind\":{\"type\":\"Log\",\"params\":{\"message\":\"m\"}}}\n";
        assert!(feed_events(&policy, BufReader::new(input.as_bytes())).await.is_err());
    }
}
