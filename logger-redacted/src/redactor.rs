use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref MRN_REGEX: Regex = Regex::new(r"(?i)\bMRN[:#\s-]*\d{4,}\b").unwrap();
    static ref SSN_REGEX: Regex = Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap();
    static ref PHONE_REGEX: Regex =
        Regex::new(r"\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]\d{4}\b").unwrap();
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
}

/// What the redactor masks before text reaches a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionConfig {
    /// Master switch; when off, text is logged verbatim
    pub enabled: bool,
    pub redact_mrn: bool,
    pub redact_ssn: bool,
    pub redact_phones: bool,
    pub redact_emails: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_mrn: true,
            redact_ssn: true,
            redact_phones: true,
            redact_emails: true,
        }
    }
}

/// Keeps protected health information out of logs.
///
/// Free clinical text (dictated phrases, entity mentions) is replaced with a
/// short stable hash so the same mention can be correlated across log lines.
/// Structured identifiers inside longer messages are masked by pattern.
#[derive(Debug, Clone, Default)]
pub struct ClinicalRedactor {
    config: RedactionConfig,
}

impl ClinicalRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn disabled() -> Self {
        Self::new(RedactionConfig {
            enabled: false,
            ..RedactionConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// `TEXT[<hash>]` for clinical free text.
    pub fn fingerprint(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }
        format!("TEXT[{}]", hash_value(text))
    }

    /// Mask identifiers embedded in a message, leaving the rest readable.
    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }

        let mut result = text.to_string();
        if self.config.redact_mrn {
            result = MRN_REGEX.replace_all(&result, "MRN[REDACTED]").into_owned();
        }
        if self.config.redact_ssn {
            result = SSN_REGEX.replace_all(&result, "***-**-****").into_owned();
        }
        if self.config.redact_phones {
            result = PHONE_REGEX.replace_all(&result, "(***) ***-****").into_owned();
        }
        if self.config.redact_emails {
            result = EMAIL_REGEX
                .replace_all(&result, |caps: &regex::Captures| {
                    format!("EMAIL[{}]", hash_value(&caps[0]))
                })
                .into_owned();
        }
        result
    }
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(&digest[..8])
}
