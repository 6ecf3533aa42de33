//! Failure taxonomy.
//!
//! Every stage either returns a complete result or one of these errors.
//! Nothing here is transient: the pipeline has no I/O or external service
//! inside its stages, so no error is retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{BoundaryRule, TokenRule};

/// The raw input cannot enter the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Bytes are not valid UTF-8.
    #[error("invalid UTF-8 at byte {offset}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        offset: usize,
    },
    /// A Unicode noncharacter, reserved for internal use and never valid in
    /// interchanged text.
    #[error("noncharacter U+{codepoint:04X} at byte {offset}")]
    Noncharacter {
        /// Byte offset of the character in the raw input.
        offset: usize,
        /// The offending code point.
        codepoint: u32,
    },
}

impl InputError {
    /// Byte offset of the offending input.
    pub fn offset(&self) -> usize {
        match *self {
            InputError::InvalidUtf8 { offset } | InputError::Noncharacter { offset, .. } => offset,
        }
    }
}

/// Two segmentation rules claim the same character differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// A character appears twice in the boundary table with different rules.
    #[error("segmentation rule conflict for {ch:?}: {first:?} vs {second:?}")]
    ConflictingRule {
        /// The contested character.
        ch: char,
        /// Rule seen first.
        first: BoundaryRule,
        /// Rule seen later.
        second: BoundaryRule,
    },
}

/// Two tokenization rules claim the same character differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizationError {
    /// A character appears twice in the token table with different rules.
    #[error("tokenization rule conflict for {ch:?}: {first:?} vs {second:?}")]
    ConflictingRule {
        /// The contested character.
        ch: char,
        /// Rule seen first.
        first: TokenRule,
        /// Rule seen later.
        second: TokenRule,
    },
}

/// The configuration is malformed, incomplete or contradictory.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(String),
    /// Configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Configuration targets another ruleset.
    #[error("configuration is for ruleset {found}, this build implements ruleset {expected}")]
    VersionMismatch {
        /// Version in the configuration.
        found: u32,
        /// Version this build implements.
        expected: u32,
    },
    /// The segmentation table has no terminal marks.
    #[error("segmentation rules declare no terminal marks")]
    NoTerminals,
    /// A rule table names a whitespace character.
    #[error("{stage} rule names whitespace character {ch:?}")]
    WhitespaceRule {
        /// Stage whose table is wrong.
        stage: &'static str,
        /// The whitespace character.
        ch: char,
    },
    /// An abbreviation is empty, lacks its final dot or contains whitespace.
    #[error("invalid abbreviation {abbreviation:?}")]
    InvalidAbbreviation {
        /// The offending entry.
        abbreviation: String,
    },
    /// Line breaks are kept by the normalizer but not treated as boundaries.
    #[error("line breaks are preserved by the normalizer but not treated as sentence boundaries")]
    LineBreakConflict,
    /// Segmentation rule table is inconsistent.
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    /// Tokenization rule table is inconsistent.
    #[error(transparent)]
    Tokenization(#[from] TokenizationError),
}

/// A document could not be processed. No partial output accompanies it.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Raw input rejected.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
