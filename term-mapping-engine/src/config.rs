use crate::error::{TermError, TermResult};
use crate::mapper::MatchOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Term mapping engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Tabular term source (`.csv`, `.tsv` or `.json`)
    pub terms_path: Option<PathBuf>,
    pub fuzzy_cutoff: f64,
    pub max_candidates: usize,
    /// Resolve known phrasing variations (e.g. "htn") before fuzzy matching
    pub resolve_variations: bool,
    /// Fingerprint clinical text instead of logging it verbatim
    pub redact_logs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let options = MatchOptions::default();
        Self {
            terms_path: None,
            fuzzy_cutoff: options.fuzzy_cutoff,
            max_candidates: options.max_candidates,
            resolve_variations: false,
            redact_logs: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> TermResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable lookup, e.g. the environment with
    /// command line overrides layered on top. Values are validated once.
    pub fn from_vars<F>(lookup: F) -> TermResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let terms_path = lookup("MEDICAL_TERMS_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let fuzzy_cutoff = match lookup("TERM_FUZZY_CUTOFF") {
            Some(value) => value.trim().parse().map_err(|_| {
                TermError::Config(format!("TERM_FUZZY_CUTOFF is not a number: {}", value))
            })?,
            None => defaults.fuzzy_cutoff,
        };

        let max_candidates = match lookup("TERM_FUZZY_CANDIDATES") {
            Some(value) => value.trim().parse().map_err(|_| {
                TermError::Config(format!("TERM_FUZZY_CANDIDATES is not a count: {}", value))
            })?,
            None => defaults.max_candidates,
        };

        let resolve_variations = match lookup("TERM_RESOLVE_VARIATIONS") {
            Some(value) => parse_flag("TERM_RESOLVE_VARIATIONS", &value)?,
            None => defaults.resolve_variations,
        };

        let redact_logs = match lookup("TERM_REDACT_LOGS") {
            Some(value) => parse_flag("TERM_REDACT_LOGS", &value)?,
            None => defaults.redact_logs,
        };

        let config = Self {
            terms_path,
            fuzzy_cutoff,
            max_candidates,
            resolve_variations,
            redact_logs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TermResult<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(TermError::Config(format!(
                "fuzzy cutoff must be within [0, 1], got {}",
                self.fuzzy_cutoff
            )));
        }
        if self.max_candidates == 0 {
            return Err(TermError::Config(
                "max candidates must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            fuzzy_cutoff: self.fuzzy_cutoff,
            max_candidates: self.max_candidates,
        }
    }
}

/// `true/false`, `1/0`, `yes/no` or `on/off`, case-insensitive.
fn parse_flag(name: &str, value: &str) -> TermResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(TermError::Config(format!("{} is not a boolean: {}", name, value))),
    }
}
