//! Frozen configuration records for every pipeline stage.
//!
//! A configuration is a plain value: it is built (or deserialized) once,
//! validated once, and then passed by reference into each stage. There is no
//! process-wide configuration state, so several corpora with different rules
//! can be processed side by side in one process.
//!
//! Every field has a default, and the defaults are part of the versioned
//! interface guarded by [`RULESET_VERSION`](crate::RULESET_VERSION).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::RULESET_VERSION;

/// Unicode normalization form applied to the whole input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationForm {
    /// Canonical composition.
    #[default]
    Nfc,
    /// Canonical decomposition.
    Nfd,
    /// Compatibility composition.
    Nfkc,
    /// Compatibility decomposition.
    Nfkd,
}

/// What the normalizer does with line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakRule {
    /// Any whitespace run containing a line break becomes a single `\n`.
    #[default]
    Boundary,
    /// Line breaks are folded into ordinary spaces.
    Space,
}

/// Whitespace handling for the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitespaceConfig {
    /// Line break rule.
    pub line_breaks: LineBreakRule,
}

/// Rules for deriving a [`TokKey`](crate::TokKey) from a surface form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Remove accents, breathings, iota subscripts and other combining marks.
    pub strip_diacritics: bool,
    /// Lowercase the form.
    pub fold_case: bool,
    /// Treat final sigma `ς` as medial `σ`.
    pub fold_final_sigma: bool,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            strip_diacritics: true,
            fold_case: false,
            fold_final_sigma: true,
        }
    }
}

/// Normalizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Unicode normalization form.
    pub form: NormalizationForm,
    /// Whitespace collapsing rules.
    pub whitespace: WhitespaceConfig,
    /// Map Greek punctuation variants and typographic apostrophes onto one
    /// canonical character each. Off by default.
    pub punctuation: bool,
    /// Lowercase the whole text. Off by default so that original
    /// orthography is preserved in `FORM`.
    pub lowercase: bool,
    /// Key derivation rules.
    pub key: KeyConfig,
}

/// Boundary decision attached to a character by the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryRule {
    /// Ends a sentence.
    Terminal,
    /// Closing quote or bracket kept with the sentence it follows.
    Closer,
}

/// Context rule that can veto a boundary on `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextRule {
    /// The word before the dot is a listed abbreviation.
    Abbreviation,
    /// The dot sits between two decimal digits.
    Numeric,
}

/// Sentence segmenter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Ordered character-to-decision table.
    pub rules: Vec<(char, BoundaryRule)>,
    /// Ordered context rules; the first match suppresses the boundary.
    pub context: Vec<ContextRule>,
    /// Abbreviations including their final dot, e.g. `κτλ.`.
    pub abbreviations: Vec<String>,
    /// Treat `\n` in normalized text as a sentence boundary.
    pub line_breaks_are_boundaries: bool,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        use BoundaryRule::{Closer, Terminal};

        Self {
            rules: vec![
                ('.', Terminal),
                (';', Terminal),
                ('\u{00B7}', Terminal),
                ('!', Terminal),
                ('?', Terminal),
                ('\u{037E}', Terminal),
                ('\u{0387}', Terminal),
                ('\u{00BB}', Closer),
                ('\u{201D}', Closer),
                ('\u{2019}', Closer),
                (')', Closer),
                (']', Closer),
                ('"', Closer),
            ],
            context: vec![ContextRule::Abbreviation, ContextRule::Numeric],
            abbreviations: ["κτλ.", "κ.τ.λ.", "π.χ.", "δηλ.", "βλ.", "σ.", "στ.", "fr.", "cf."]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            line_breaks_are_boundaries: true,
        }
    }
}

/// Tokenizer decision attached to a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenRule {
    /// Always a token of its own.
    Split,
    /// Elision mark: joins an immediately preceding word.
    Attach,
    /// Part of a word, like a letter.
    Word,
}

/// Tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizationConfig {
    /// Ordered character-to-decision table.
    pub rules: Vec<(char, TokenRule)>,
}

impl Default for TokenizationConfig {
    fn default() -> Self {
        use TokenRule::{Attach, Split};

        let split = [
            '.', ',', ';', '\u{00B7}', ':', '!', '?', '\u{037E}', '\u{0387}', '(', ')', '[', ']',
            '{', '}', '\u{00AB}', '\u{00BB}', '"', '\u{2014}', '\u{2013}', '\u{2026}',
        ];
        let attach = ['\u{2019}', '\u{02BC}', '\u{1FBD}', '\''];

        Self {
            rules: split
                .iter()
                .map(|&c| (c, Split))
                .chain(attach.iter().map(|&c| (c, Attach)))
                .collect(),
        }
    }
}

/// Structured emitter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Write `# lexis_ruleset = <version>` as the first line of a document.
    pub version_header: bool,
}

/// Complete, versioned configuration of one pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ruleset version the configuration was written for.
    pub version: u32,
    /// Normalizer and key rules.
    pub normalization: NormalizationConfig,
    /// Sentence segmenter rules.
    pub segmentation: SegmentationConfig,
    /// Tokenizer rules.
    pub tokenization: TokenizationConfig,
    /// Output options.
    pub emitter: EmitterConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: RULESET_VERSION,
            normalization: NormalizationConfig::default(),
            segmentation: SegmentationConfig::default(),
            tokenization: TokenizationConfig::default(),
            emitter: EmitterConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON. The result is not
    /// validated; call [`PipelineConfig::validate`] or build a pipeline.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks cross-field consistency and required rules.
    ///
    /// Rule tables are checked for per-character conflicts when the stages
    /// are compiled; this covers everything else.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != RULESET_VERSION {
            return Err(ConfigError::VersionMismatch {
                found: self.version,
                expected: RULESET_VERSION,
            });
        }

        let seg = &self.segmentation;

        if !seg
            .rules
            .iter()
            .any(|&(_, rule)| rule == BoundaryRule::Terminal)
        {
            return Err(ConfigError::NoTerminals);
        }

        if let Some(&(ch, _)) = seg.rules.iter().find(|(c, _)| c.is_whitespace()) {
            return Err(ConfigError::WhitespaceRule {
                stage: "segmentation",
                ch,
            });
        }

        if let Some(&(ch, _)) = self
            .tokenization
            .rules
            .iter()
            .find(|(c, _)| c.is_whitespace())
        {
            return Err(ConfigError::WhitespaceRule {
                stage: "tokenization",
                ch,
            });
        }

        for abbr in &seg.abbreviations {
            let body = abbr.strip_suffix('.').unwrap_or("");
            if body.is_empty() || abbr.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidAbbreviation {
                    abbreviation: abbr.clone(),
                });
            }
        }

        if self.normalization.whitespace.line_breaks == LineBreakRule::Boundary
            && !seg.line_breaks_are_boundaries
        {
            return Err(ConfigError::LineBreakConflict);
        }

        Ok(())
    }
}
