use std::str;

use lexis_types::{InputError, LineBreakRule, NormalizationConfig, NormalizationForm};
use unicode_normalization::UnicodeNormalization;

#[inline(always)]
const fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// U+FDD0..=U+FDEF and the last two code points of every plane.
#[inline(always)]
const fn is_noncharacter(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0xFDD0..=0xFDEF) || cp & 0xFFFE == 0xFFFE
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Moves an error offset from the BOM-less body back onto the raw bytes.
fn shift_offset(err: InputError, by: usize) -> InputError {
    match err {
        InputError::InvalidUtf8 { offset } => InputError::InvalidUtf8 {
            offset: offset + by,
        },
        InputError::Noncharacter { offset, codepoint } => InputError::Noncharacter {
            offset: offset + by,
            codepoint,
        },
    }
}

/// Canonical replacement for Greek punctuation variants and apostrophes.
#[inline(always)]
fn canonical_punctuation(c: char) -> Option<&'static str> {
    match c {
        '\u{037E}' => Some(";"),
        '\u{0387}' => Some("\u{00B7}"),
        '\u{02BC}' | '\u{1FBD}' | '\'' => Some("\u{2019}"),
        '\u{2026}' => Some("..."),
        _ => None,
    }
}

/// Unicode text normalizer for raw corpus input.
///
/// Performs the following operations, in order:
/// - Rejects Unicode noncharacters; control characters pass through
/// - Optionally lowercases the text
/// - Applies the configured Unicode normalization form (NFC by default)
/// - Optionally maps punctuation variants onto canonical characters
/// - Collapses horizontal whitespace runs into single spaces and line break
///   runs into a single `\n` (or a space, per configuration)
/// - Removes leading/trailing whitespace
///
/// The output is a pure function of the input and the configuration.
///
/// # Examples
///
/// ```
/// use lexis_core::analyzer::normalizer::TextNormalizer;
///
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("  ὁ \t λόγος  ").unwrap(), "ὁ λόγος");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer {
    config: NormalizationConfig,
}

impl TextNormalizer {
    /// Creates a new normalizer with the specified configuration.
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Clears the buffer before writing and reuses its capacity. On error the
    /// buffer is left empty.
    pub fn normalize_into(&self, input: &str, out: &mut String) -> Result<(), InputError> {
        out.clear();

        if let Some((offset, c)) = input.char_indices().find(|&(_, c)| is_noncharacter(c)) {
            return Err(InputError::Noncharacter {
                offset,
                codepoint: c as u32,
            });
        }

        out.reserve(input.len());

        // ASCII is invariant under every normalization form and has nothing
        // for the punctuation map except the apostrophe.
        if input.is_ascii() && !self.config.punctuation {
            if self.config.lowercase {
                self.collapse_whitespace(input.to_ascii_lowercase().chars(), out);
            } else {
                self.collapse_whitespace(input.chars(), out);
            }
            return Ok(());
        }

        // Lowercase before composing: a capital may not compose with the mark
        // after it while its lowercase letter does (Α + U+0342 vs ᾶ).
        // str-level lowercasing picks final sigma in word-final position.
        let lowered;
        let source = if self.config.lowercase {
            lowered = input.to_lowercase();
            lowered.as_str()
        } else {
            input
        };

        let mut staged = String::with_capacity(input.len() + input.len() / 8);
        match self.config.form {
            NormalizationForm::Nfc => self.stage(source.nfc(), &mut staged),
            NormalizationForm::Nfd => self.stage(source.nfd(), &mut staged),
            NormalizationForm::Nfkc => self.stage(source.nfkc(), &mut staged),
            NormalizationForm::Nfkd => self.stage(source.nfkd(), &mut staged),
        }

        self.collapse_whitespace(staged.chars(), out);
        Ok(())
    }

    /// Normalizes text and returns a new String.
    #[inline]
    pub fn normalize(&self, input: &str) -> Result<String, InputError> {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out)?;
        Ok(out)
    }

    /// Validates raw bytes as UTF-8 and normalizes them.
    ///
    /// One leading byte-order mark is dropped. Error offsets still count
    /// from the first raw byte.
    pub fn normalize_bytes(&self, input: &[u8]) -> Result<String, InputError> {
        let (skipped, body) = match input.strip_prefix(UTF8_BOM) {
            Some(rest) => (UTF8_BOM.len(), rest),
            None => (0, input),
        };

        let text = str::from_utf8(body).map_err(|e| InputError::InvalidUtf8 {
            offset: skipped + e.valid_up_to(),
        })?;
        self.normalize(text).map_err(|e| shift_offset(e, skipped))
    }

    fn stage(&self, chars: impl Iterator<Item = char>, staged: &mut String) {
        if !self.config.punctuation {
            staged.extend(chars);
            return;
        }

        for c in chars {
            match canonical_punctuation(c) {
                Some(rep) => staged.push_str(rep),
                None => staged.push(c),
            }
        }
    }

    fn collapse_whitespace(&self, chars: impl Iterator<Item = char>, out: &mut String) {
        let breaks_kept = self.config.whitespace.line_breaks == LineBreakRule::Boundary;

        // Pending separator between the last written char and the next one.
        let mut pending: Option<char> = None;

        for c in chars {
            if c.is_whitespace() {
                if breaks_kept && is_line_break(c) {
                    pending = Some('\n');
                } else if pending.is_none() {
                    pending = Some(' ');
                }
                continue;
            }

            if let Some(sep) = pending.take() {
                if !out.is_empty() {
                    out.push(sep);
                }
            }
            out.push(c);
        }
    }
}
