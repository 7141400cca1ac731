//! Medical Term Mapping Engine for Healthcare EMR
//!
//! Resolves mentions in clinical dictation to canonical medical concepts
//! (code, standardized name, category) with a confidence score.
//!
//! # Matching Paths
//!
//! - **Entity mapping**: entities recognized by the transcription provider are
//!   translated to an internal category and resolved by exact lookup, then
//!   fuzzy lookup, then a synthesized `UNK-*` fallback
//! - **Keyword extraction**: when the provider returns no entities, the raw
//!   text is scanned for whole-word dictionary terms
//!
//! Every input entity yields exactly one mapped term; nothing in the mapping
//! path returns an error. An unreadable term source degrades to an empty
//! dictionary.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use term_mapping_engine::{
//!     EngineConfig, ProviderEntity, TermDictionary, TermNormalizer, TranscriptionOutput,
//! };
//!
//! let config = EngineConfig::default();
//! let normalizer = TermNormalizer::new(Arc::new(TermDictionary::builtin()), &config);
//!
//! let response = normalizer.normalize(&TranscriptionOutput::with_entities(
//!     "Patient has diabetis",
//!     vec![ProviderEntity::new("MedicalCondition", "diabetis", 0.8)],
//! ));
//!
//! for term in &response.structured_data {
//!     println!("{} -> {:?} ({:.2})", term.text, term.code, term.confidence);
//! }
//! ```

pub mod category;
pub mod config;
pub mod confidence;
pub mod dictionary;
pub mod entity;
pub mod error;
pub mod extractor;
pub mod mapper;
pub mod normalizer;
pub mod similarity;
pub mod source;
pub mod transcription;
pub mod variations;

pub use category::*;
pub use config::*;
pub use confidence::*;
pub use dictionary::*;
pub use entity::*;
pub use error::*;
pub use extractor::*;
pub use mapper::*;
pub use normalizer::*;
pub use similarity::*;
pub use source::*;
pub use transcription::*;
pub use variations::*;
