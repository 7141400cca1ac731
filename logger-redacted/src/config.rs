// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// `EnvFilter` directive, e.g. `info` or `term_mapping_engine=debug`
    pub log_level: String,
    /// Bunyan-style JSON lines instead of human-readable output
    pub json_output: bool,
    pub service_name: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_output: false,
            service_name: "term-mapping-engine".to_string(),
        }
    }
}

impl LoggerConfig {
    /// `RUST_LOG` overrides the level, `LOG_FORMAT=json` switches output
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            json_output: std::env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.json_output),
            service_name: defaults.service_name,
        }
    }
}
