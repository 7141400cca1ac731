//! PHI-safe logging for the RustCare term mapping engine
//!
//! Clinical dictation is protected health information. This crate keeps it
//! out of log output while leaving logs useful for correlation:
//!
//! - **Free-text fingerprints**: entity mentions are logged as `TEXT[<hash>]`
//!   (truncated SHA-256), stable across lines and requests
//! - **Identifier masking**: MRNs, SSNs, phone numbers and e-mail addresses
//!   embedded in messages are masked by pattern
//! - **Subscriber setup**: `tracing-subscriber` with an `EnvFilter`, either
//!   human-readable or Bunyan JSON lines, always written to stderr
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init_logging, ClinicalRedactor, LoggerConfig};
//! use tracing::info;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! init_logging(&LoggerConfig::from_env())?;
//!
//! let redactor = ClinicalRedactor::default();
//! info!(text = %redactor.fingerprint("type 2 diabetes"), "Mapped entity");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod redactor;
pub mod subscriber;

pub use config::*;
pub use error::{LoggerError, Result as LoggerResult};
pub use redactor::*;
pub use subscriber::*;
