use std::fmt;

use crate::error::SessionError;

/// Number of words in a valid pairing phrase.
pub const PAIRING_PHRASE_WORDS: usize = 10;

/// A shareable pairing credential: a fixed-length word phrase from which
/// the session keys are derived.
///
/// The phrase itself is a secret; `Debug`/`Display` redact it.
#[derive(Clone, PartialEq, Eq)]
pub struct PairingPhrase {
    words: Vec<String>,
}

impl PairingPhrase {
    /// Parse a whitespace-separated phrase, validating the word count.
    pub fn parse(phrase: &str) -> Result<Self, SessionError> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_ascii_lowercase())
            .collect();

        if words.len() != PAIRING_PHRASE_WORDS {
            return Err(SessionError::InvalidPairingPhrase(format!(
                "expected {} words, got {}",
                PAIRING_PHRASE_WORDS,
                words.len()
            )));
        }
        if words.iter().any(|w| !w.chars().all(|c| c.is_ascii_alphabetic())) {
            return Err(SessionError::InvalidPairingPhrase(
                "phrase words must be ASCII letters only".into(),
            ));
        }

        Ok(Self { words })
    }

    /// The canonical byte form fed into session key derivation.
    pub fn entropy(&self) -> Vec<u8> {
        self.words.join(" ").into_bytes()
    }
}

impl fmt::Debug for PairingPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PairingPhrase(<redacted>)")
    }
}

impl fmt::Display for PairingPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted pairing phrase>")
    }
}
