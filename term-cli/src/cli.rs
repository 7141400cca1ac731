use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use term_mapping_engine::{EngineConfig, TermDictionary, TermNormalizer, TranscriptionOutput};
use tracing::info;

/// Medical term mapping for clinical dictation
#[derive(Parser, Debug)]
#[command(name = "termmap")]
#[command(about = "Map clinical text and recognized entities to standard medical terms")]
pub struct Cli {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Log filter directive
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Term dictionary file (.xlsx, .csv, .tsv or .json)
    #[arg(long, env = "MEDICAL_TERMS_PATH", global = true)]
    pub terms: Option<PathBuf>,

    /// Use the built-in seed dictionary instead of a terms file
    #[arg(long, global = true)]
    pub builtin: bool,

    /// Minimum similarity for fuzzy matches
    #[arg(long, global = true)]
    pub fuzzy_cutoff: Option<f64>,

    /// Resolve known phrasing variations before fuzzy matching
    #[arg(long, global = true)]
    pub resolve_variations: bool,

    /// Log clinical text verbatim instead of fingerprints
    #[arg(long, global = true)]
    pub no_redact: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find dictionary terms in free text
    Extract(TextInput),
    /// Map provider-recognized entities (JSON array file)
    Map {
        /// File holding a JSON array of entities
        entities: PathBuf,
    },
    /// Normalize a transcription, choosing entity mapping or keyword extraction
    Normalize {
        /// File holding `{"text": ..., "entities": [...]}`
        #[arg(long, conflicts_with = "text")]
        input: Option<PathBuf>,
        /// Transcribed text without provider entities
        #[arg(long)]
        text: Option<String>,
    },
    /// Show term counts per category
    Dictionary,
}

#[derive(Args, Debug)]
pub struct TextInput {
    /// Text to scan
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub text: Option<String>,
    /// Read the text from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl EngineArgs {
    pub fn engine_config(&self) -> Result<EngineConfig> {
        self.engine_config_with(|key| std::env::var(key).ok())
    }

    /// Flags take precedence over `env`; the merged values are parsed and
    /// validated once, so a bad variable overridden by a flag is never read.
    fn engine_config_with<F>(&self, env: F) -> Result<EngineConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut overrides: HashMap<&str, String> = HashMap::new();
        if let Some(cutoff) = self.fuzzy_cutoff {
            overrides.insert("TERM_FUZZY_CUTOFF", cutoff.to_string());
        }
        if self.resolve_variations {
            overrides.insert("TERM_RESOLVE_VARIATIONS", "true".to_string());
        }
        if self.no_redact {
            overrides.insert("TERM_REDACT_LOGS", "false".to_string());
        }

        let mut config =
            EngineConfig::from_vars(|key| overrides.get(key).cloned().or_else(|| env(key)))
                .context("invalid engine configuration")?;
        if self.terms.is_some() {
            config.terms_path = self.terms.clone();
        }
        Ok(config)
    }

    pub fn normalizer(&self) -> Result<TermNormalizer> {
        let config = self.engine_config()?;
        if self.builtin {
            return Ok(TermNormalizer::new(Arc::new(TermDictionary::builtin()), &config));
        }
        Ok(TermNormalizer::from_config(&config))
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Run a subcommand and return its JSON output.
pub fn execute(command: &Command, normalizer: &TermNormalizer) -> Result<Value> {
    let output = match command {
        Command::Extract(input) => {
            let text = match (&input.text, &input.file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => bail!("no text given"),
            };
            serde_json::to_value(normalizer.extract(&text))?
        }
        Command::Map { entities } => {
            let Value::Array(values) = read_json(entities)? else {
                bail!("{} must hold a JSON array of entities", entities.display());
            };
            let mapped = normalizer.map_values(&values);
            info!(input = values.len(), mapped = mapped.len(), "Mapped entities");
            serde_json::to_value(mapped)?
        }
        Command::Normalize { input, text } => {
            let transcription = match (input, text) {
                (Some(path), _) => serde_json::from_value::<TranscriptionOutput>(read_json(path)?)
                    .with_context(|| format!("{} is not a transcription", path.display()))?,
                (None, Some(text)) => TranscriptionOutput::text(text.clone()),
                (None, None) => bail!("either --input or --text is required"),
            };
            serde_json::to_value(normalizer.normalize(&transcription))?
        }
        Command::Dictionary => {
            let dictionary = normalizer.dictionary();
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for (category, _, _) in dictionary.iter() {
                *counts.entry(category.to_string()).or_default() += 1;
            }
            json!({ "terms": dictionary.len(), "categories": counts })
        }
    };
    Ok(output)
}
