//! Core types for the Lexis pre-annotation pipeline.
//!
//! This crate holds everything that is shared between the pipeline and the
//! tools that consume its output:
//!
//! - **Identifiers**: [`SentId`], [`TokenId`] and the [`TokKey`] matching key
//! - **Spans**: byte ranges over normalized text ([`Span`])
//! - **Configuration**: the frozen, versioned rule records in [`config`]
//! - **Errors**: the failure taxonomy in [`error`]
//!
//! Nothing here performs text processing. Keeping the types apart lets a
//! downstream annotator depend on the output model without pulling in the
//! analyzer.

#![warn(missing_docs)]

use core::fmt;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;

pub use config::{
    BoundaryRule, ContextRule, EmitterConfig, KeyConfig, LineBreakRule, NormalizationConfig,
    NormalizationForm, PipelineConfig, SegmentationConfig, TokenRule, TokenizationConfig,
    WhitespaceConfig,
};
pub use error::{ConfigError, InputError, PipelineError, SegmentationError, TokenizationError};

/// Version of the normalization, segmentation, tokenization and key rules.
///
/// Any change to the observable output of those rules must bump this value
/// and regenerate reference fixtures.
pub const RULESET_VERSION: u32 = 1;

/// Marker written in every output field that no stage has resolved.
pub const PLACEHOLDER: &str = "_";

/// 1-based position of a token inside its sentence.
pub type TokenId = u32;

/// Stable sentence identifier, rendered as `sent-0001`, `sent-0002`, ...
///
/// Identifiers are assigned in document order starting at 1, so the same
/// input under the same configuration always yields the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentId(u32);

impl SentId {
    /// Prefix used in the rendered form.
    pub const PREFIX: &'static str = "sent-";

    /// Creates the id for the `n`-th sentence (1-based).
    #[inline(always)]
    pub const fn new(n: u32) -> Self {
        debug_assert!(n > 0, "sentence ids are 1-based");
        Self(n)
    }

    /// Returns the 1-based ordinal.
    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Parses the rendered form back into an id.
    ///
    /// Returns `None` for anything that is not `sent-` followed by a
    /// positive decimal number.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(Self::PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(Self(n)),
        }
    }
}

impl fmt::Display for SentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", Self::PREFIX, self.0)
    }
}

/// Half-open byte range `[start, end)` over a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First byte of the span.
    pub start: usize,
    /// One past the last byte of the span.
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[inline(always)]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Length in bytes.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the span covers no bytes.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Borrows the covered text.
    ///
    /// Panics if the span is out of bounds or not on char boundaries.
    #[inline]
    pub fn slice(self, text: &str) -> &str {
        &text[self.start..self.end]
    }
}

/// Per-token matching key derived from the surface form.
///
/// Two tokens with equal keys are the same lexical unit under the active
/// [`KeyConfig`]. The key is a lookup handle only; it says nothing about
/// the token's analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokKey(String);

impl TokKey {
    /// Wraps an already derived key.
    #[inline]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrows the key text.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns its text.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TokKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TokKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sent_id_renders_zero_padded() {
        assert_eq!(SentId::new(1).to_string(), "sent-0001");
        assert_eq!(SentId::new(42).to_string(), "sent-0042");
        assert_eq!(SentId::new(12345).to_string(), "sent-12345");
    }

    #[test]
    fn sent_id_parse_accepts_rendered_form() {
        for n in [1, 9, 10, 9999, 10000] {
            let id = SentId::new(n);
            assert_eq!(SentId::parse(&id.to_string()), Some(id));
        }
    }

    #[test]
    fn sent_id_parse_rejects_garbage() {
        assert_eq!(SentId::parse("sent-"), None);
        assert_eq!(SentId::parse("sent-0000"), None);
        assert_eq!(SentId::parse("sent--1"), None);
        assert_eq!(SentId::parse("s-0001"), None);
        assert_eq!(SentId::parse("sent-00a1"), None);
    }

    #[test]
    fn sent_ids_order_by_ordinal() {
        assert!(SentId::new(2) > SentId::new(1));
    }

    #[test]
    fn span_slices_text() {
        let text = "ὁ ἄνθρωπος";
        let span = Span::new(0, "ὁ".len());
        assert_eq!(span.slice(text), "ὁ");
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());
        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn tok_key_serializes_as_plain_string() {
        let key = TokKey::new("ανθρωπος");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"ανθρωπος\"");
        let back: TokKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
