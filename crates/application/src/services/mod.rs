//! Application services - policy engine and its building blocks

pub mod decision;
mod engine_stats;
pub mod policy_params;
mod random_policy;
mod registry;

pub use decision::{ProcSchedStrategy, ResetOrApply, decide, weighted_trial};
pub use engine_stats::EngineStats;
pub use policy_params::{DEFAULT_PROC_RESET_SCHED_PROBABILITY, PolicyParams, keys, scale_for_priority};
pub use random_policy::{POLICY_NAME, RandomPolicy, SHELL_COMMENT};
pub use registry::{AVAILABLE_POLICIES, create_policy};
