#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use serde::{Deserialize, Serialize};

pub use toml_config::AppConfig;

/// How a resolver obtains its data. Resolved once per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStrategy {
    /// Query the remote service, demoting once to local computation or the mock on failure.
    #[default]
    Remote,
    /// Deterministic local computation only.
    Local,
    /// Deterministic mock data only.
    Mock,
}
