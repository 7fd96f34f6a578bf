//! Configuration adapters
//!
//! Policy parameters are read from a TOML file (or string) layered with
//! `AFTERSHOCK_`-prefixed environment variables, for example
//! `AFTERSHOCK_EXPLOREPOLICYPARAM__FAULTACTIONPROBABILITY=0.2`.

mod param_source;

pub use param_source::{ConfigParamSource, ENV_PREFIX, ENV_SEPARATOR};
