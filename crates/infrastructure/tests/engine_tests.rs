//! End-to-end tests of the random policy over the real time-bounded queue
//!
//! Time is paused, so delays are exact and the tests run instantly.

use std::sync::Arc;
use std::time::Duration;

use application::{ApplicationError, ExplorePolicy, ParamMap, RandomPolicy, create_policy, keys};
use domain::{Action, ActionKind, EntityId, Event, EventKind, FilesystemOp};
use infrastructure::{BasicTimeBoundedQueue, ConfigParamSource};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

fn entity(id: &str) -> EntityId {
    EntityId::new(id).unwrap()
}

fn packet(from: &str, to: &str) -> Event {
    Event::new(
        entity(from),
        EventKind::Packet {
            src_entity: entity(from),
            dst_entity: entity(to),
            message: serde_json::json!({"op": "append"}),
        },
    )
}

fn random_policy() -> (RandomPolicy, mpsc::Receiver<Action>) {
    let policy = RandomPolicy::new(Arc::new(BasicTimeBoundedQueue::new())).unwrap();
    let rx = policy.take_action_receiver().unwrap();
    (policy, rx)
}

#[tokio::test(start_paused = true)]
async fn default_action_after_fixed_interval() {
    let (policy, mut rx) = random_policy();
    policy
        .load_config(
            &ParamMap::new()
                .with(keys::EXPLORE_POLICY, "random")
                .with(keys::MIN_INTERVAL, "100ms")
                .with(keys::MAX_INTERVAL, "100ms")
                .with(keys::FAULT_ACTION_PROBABILITY, 0.0),
        )
        .unwrap();

    let event = packet("a", "b");
    let id = event.id;
    let start = Instant::now();
    policy.queue_event(event).unwrap();

    let action = rx.recv().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(100));
    assert_eq!(action.kind, ActionKind::Accept);
    assert_eq!(action.event_id, Some(id));
}

#[tokio::test(start_paused = true)]
async fn every_event_answered_once_within_its_window() {
    let (policy, mut rx) = random_policy();
    policy
        .load_config(
            &ParamMap::new()
                .with(keys::MIN_INTERVAL, "50ms")
                .with(keys::MAX_INTERVAL, "400ms")
                .with(keys::FAULT_ACTION_PROBABILITY, 0.5),
        )
        .unwrap();

    let start = Instant::now();
    let mut pending = std::collections::HashSet::new();
    for n in 0..40 {
        let event = packet(if n % 2 == 0 { "a" } else { "b" }, "c");
        pending.insert(event.id);
        policy.queue_event(event).unwrap();
    }

    while !pending.is_empty() {
        let action = rx.recv().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(50), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(401), "{elapsed:?}");
        assert!(matches!(action.kind, ActionKind::Accept | ActionKind::PacketFault));
        assert!(pending.remove(&action.event_id.unwrap()));
    }

    assert!(timeout(Duration::from_secs(1), rx.recv()).await.is_err());
    let stats = policy.stats();
    assert_eq!(stats.events_queued, 40);
    assert_eq!(stats.decisions, 40);
}

#[tokio::test(start_paused = true)]
async fn prioritized_entity_is_answered_first() {
    let (policy, mut rx) = random_policy();
    policy
        .load_config(
            &ParamMap::new()
                .with(keys::MIN_INTERVAL, "100ms")
                .with(keys::PRIORITIZED_ENTITIES, vec!["fast"]),
        )
        .unwrap();

    let start = Instant::now();
    policy.queue_event(packet("slow", "x")).unwrap();
    policy.queue_event(packet("fast", "x")).unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.entity, entity("fast"));
    assert_eq!(start.elapsed(), Duration::from_millis(80));

    let second = rx.recv().await.unwrap();
    assert_eq!(second.entity, entity("slow"));
    assert_eq!(start.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn shell_and_event_actions_share_the_stream() {
    let (policy, mut rx) = random_policy();
    policy
        .load_config(
            &ParamMap::new()
                .with(keys::MIN_INTERVAL, "1500ms")
                .with(keys::SHELL_ACTION_INTERVAL, "1s")
                .with(keys::SHELL_ACTION_COMMAND, "iptables -A INPUT -j DROP"),
        )
        .unwrap();
    policy
        .queue_event(Event::new(
            entity("a"),
            EventKind::Filesystem {
                op: FilesystemOp::Open,
                path: "/etc/hosts".to_string(),
            },
        ))
        .unwrap();

    let kinds: Vec<_> = [
        rx.recv().await.unwrap(),
        rx.recv().await.unwrap(),
        rx.recv().await.unwrap(),
    ]
    .into_iter()
    .map(|a| a.class())
    .collect();
    assert_eq!(kinds, vec!["ShellAction", "AcceptEventAction", "ShellAction"]);
}

#[tokio::test(start_paused = true)]
async fn fatal_event_ends_the_stream() {
    let policy = create_policy("random", Arc::new(BasicTimeBoundedQueue::new())).unwrap();
    let mut rx = policy.take_action_receiver().unwrap();

    policy
        .queue_event(Event::new(
            entity("a"),
            EventKind::Log {
                message: "unexpected".to_string(),
            },
        ))
        .unwrap();

    assert!(rx.recv().await.is_none());
    assert!(matches!(
        policy.queue_event(packet("a", "b")),
        Err(ApplicationError::EngineFailed(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn configured_from_toml() {
    let source = ConfigParamSource::from_toml_str(
        r#"
explorePolicy = "random"

[explorepolicyparam]
minInterval = 20
faultActionProbability = 1.0
"#,
    )
    .unwrap();

    let (policy, mut rx) = random_policy();
    policy.load_config(&source).unwrap();
    policy.queue_event(packet("a", "b")).unwrap();

    let action = rx.recv().await.unwrap();
    assert_eq!(action.kind, ActionKind::PacketFault);
    assert_eq!(policy.params().max_interval, Duration::from_millis(20));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_everything() {
    let (policy, mut rx) = random_policy();
    policy
        .load_config(
            &ParamMap::new()
                .with(keys::MIN_INTERVAL, "10s")
                .with(keys::SHELL_ACTION_INTERVAL, "1s")
                .with(keys::SHELL_ACTION_COMMAND, "true"),
        )
        .unwrap();
    policy.queue_event(packet("a", "b")).unwrap();

    ExplorePolicy::shutdown(&policy);
    assert!(rx.recv().await.is_none());
    assert!(!policy.shell_loop_running());
}
