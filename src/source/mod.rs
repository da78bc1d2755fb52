//! Configuration source resolution.
//!
//! Four channels compete to supply the configuration:
//! 1. An explicit object handed to the coordinator
//! 2. A `config` key in the host page's query string
//! 3. The host's default config URL
//! 4. The host's default config object
//!
//! The first channel that has something wins.

mod host;
mod resolver;

pub use host::{
    HostEnvironment, ENV_BASE_URL, ENV_DEFAULT_CONFIG, ENV_DEFAULT_CONFIG_URL, ENV_EMBEDDED,
    ENV_QUERY,
};
pub use resolver::{query_config_value, resolve, resolve_from_host, ConfigSource, Resolution};
