//! Archive passphrase handling
//!
//! A passphrase is always explicit configuration. Callers either pin one
//! (`Passphrase::Fixed`) or ask for a fresh random one per run
//! (`Passphrase::Generated`), which is handed back in the archive report.

use crate::error::{VidsealError, VidsealResult};
use base64::{engine::general_purpose, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random bytes behind a generated passphrase (24 base64 characters)
const GENERATED_BYTES: usize = 18;

/// Minimum length accepted for a fixed passphrase
pub const MIN_PASSPHRASE_LEN: usize = 4;

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Passphrase {
    Fixed(String),
    #[default]
    Generated,
}

impl Passphrase {
    pub fn fixed(value: impl Into<String>) -> Self {
        Passphrase::Fixed(value.into())
    }

    /// Produce the secret used for this run
    pub fn resolve(&self) -> VidsealResult<String> {
        match self {
            Passphrase::Fixed(value) => {
                validate_passphrase(value)?;
                Ok(value.clone())
            }
            Passphrase::Generated => Ok(generate_passphrase()),
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Passphrase::Generated)
    }
}

// Never print the secret itself
impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Passphrase::Fixed(_) => f.write_str("Fixed(<redacted>)"),
            Passphrase::Generated => f.write_str("Generated"),
        }
    }
}

/// Generate a URL-safe random passphrase from the OS RNG
pub fn generate_passphrase() -> String {
    let mut bytes = [0u8; GENERATED_BYTES];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Reject blank or trivially short passphrases
pub fn validate_passphrase(passphrase: &str) -> VidsealResult<()> {
    if passphrase.trim().is_empty() {
        return Err(VidsealError::InvalidPassphrase(
            "Passphrase cannot be empty".to_string(),
        ));
    }
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return Err(VidsealError::InvalidPassphrase(format!(
            "Passphrase must be at least {} characters long",
            MIN_PASSPHRASE_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_passphrase_shape() {
        let passphrase = generate_passphrase();
        assert_eq!(passphrase.len(), 24);
        assert!(passphrase
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generated_passphrases_differ() {
        assert_ne!(generate_passphrase(), generate_passphrase());
    }

    #[test]
    fn test_fixed_passphrase_resolves_to_itself() {
        let passphrase = Passphrase::fixed("correct horse");
        assert_eq!(passphrase.resolve().unwrap(), "correct horse");
        assert!(!passphrase.is_generated());
    }

    #[test]
    fn test_blank_passphrase_rejected() {
        assert!(Passphrase::fixed("   ").resolve().is_err());
        assert!(validate_passphrase("abc").is_err());
        assert!(validate_passphrase("1234").is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", Passphrase::fixed("hunter22"));
        assert!(!rendered.contains("hunter22"));
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&Passphrase::fixed("s3cret!")).unwrap();
        assert_eq!(json, r#"{"fixed":"s3cret!"}"#);

        let generated: Passphrase = serde_json::from_str(r#""generated""#).unwrap();
        assert_eq!(generated, Passphrase::Generated);
    }
}
