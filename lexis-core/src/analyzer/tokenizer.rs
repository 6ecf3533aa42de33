//! Streaming Tokenizer Module
//!
//! Splits one normalized sentence into tokens. It is the third stage of the
//! pipeline, after the normalizer and the sentence segmenter.
//!
//! ## What It Does
//!
//! Given a sentence like `"ὁ ἄνθρωπος καὶ ἡ γυνή."`, it emits each token
//! with its 1-based id and its byte span inside the sentence:
//!
//! ```ignore
//! (1, "ὁ",         0..3)
//! (2, "ἄνθρωπος",  4..21)
//! ...
//! (6, ".",        42..43)
//! ```
//!
//! ## Key Features
//!
//! - **Zero Allocation**: tokens are slices of the sentence, not copies
//! - **Streaming**: tokens are handed to a callback as they are found
//! - **Lossless**: tokens plus the whitespace between them rebuild the
//!   sentence byte for byte; nothing is dropped or rewritten
//! - **Rule Table**: punctuation handling comes from [`TokenizationConfig`]
//!
//! ## Character Classes
//!
//! - whitespace separates tokens and is never part of one
//! - letters, digits and combining marks form words
//! - `split` characters are always tokens of their own
//! - `attach` characters (elision marks) close a word they directly follow,
//!   and are tokens of their own otherwise
//! - `word` characters behave like letters
//! - anything else becomes a one-character catch-all token
//!
//! Valid text never makes the tokenizer fail; the only errors are rule
//! conflicts found when the table is compiled.

use lexis_types::{Span, TokenId, TokenRule, TokenizationConfig, TokenizationError};
use rustc_hash::FxHashMap;
use unicode_normalization::char::is_combining_mark;

/// Coarse class of an emitted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenKind {
    /// Letters, digits, marks and `word` characters, possibly ending in an
    /// elision mark.
    Word = 0,
    /// A single character from the rule table.
    Punct = 1,
    /// A single character no rule covers.
    Other = 2,
}

/// One token found in a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan<'s> {
    /// 1-based position in the sentence.
    pub id: TokenId,
    /// Exact surface text.
    pub text: &'s str,
    /// Byte range inside the sentence.
    pub span: Span,
    /// Coarse class.
    pub kind: TokenKind,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Space,
    Word,
    Split,
    Attach,
    Other,
}

/// Rule-table tokenizer.
///
/// ## Example
///
/// ```
/// use lexis_core::analyzer::tokenizer::Tokenizer;
/// use lexis_types::TokenizationConfig;
///
/// let tokenizer = Tokenizer::new(&TokenizationConfig::default()).unwrap();
/// let mut forms = Vec::new();
///
/// tokenizer.tokenize("ἀλλ’ ἔφη.", |tok| forms.push(tok.text));
///
/// assert_eq!(forms, ["ἀλλ’", "ἔφη", "."]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    rules: FxHashMap<char, TokenRule>,
}

impl Tokenizer {
    /// Compiles the rule table.
    ///
    /// # Errors
    ///
    /// Returns [`TokenizationError::ConflictingRule`] if a character is
    /// listed twice with different rules.
    pub fn new(cfg: &TokenizationConfig) -> Result<Self, TokenizationError> {
        let mut rules = FxHashMap::default();

        for &(ch, rule) in &cfg.rules {
            if let Some(&first) = rules.get(&ch) {
                if first != rule {
                    return Err(TokenizationError::ConflictingRule {
                        ch,
                        first,
                        second: rule,
                    });
                }
                continue;
            }
            rules.insert(ch, rule);
        }

        Ok(Self { rules })
    }

    #[inline(always)]
    fn class(&self, c: char) -> Class {
        if c.is_whitespace() {
            return Class::Space;
        }
        match self.rules.get(&c) {
            Some(TokenRule::Split) => Class::Split,
            Some(TokenRule::Attach) => Class::Attach,
            Some(TokenRule::Word) => Class::Word,
            None if c.is_alphanumeric() || is_combining_mark(c) => Class::Word,
            None => Class::Other,
        }
    }

    /// Tokenizes one sentence and emits tokens left to right.
    ///
    /// Ids run from 1 to N without gaps.
    #[allow(clippy::needless_lifetimes)]
    pub fn tokenize<'s, F>(&self, sentence: &'s str, mut emit: F)
    where
        F: FnMut(TokenSpan<'s>),
    {
        let mut next_id: TokenId = 1;
        let mut word_start: Option<usize> = None;

        let mut push = move |start: usize, end: usize, kind: TokenKind| {
            emit(TokenSpan {
                id: next_id,
                text: &sentence[start..end],
                span: Span::new(start, end),
                kind,
            });
            next_id += 1;
        };

        for (pos, c) in sentence.char_indices() {
            let end = pos + c.len_utf8();

            match self.class(c) {
                Class::Word => {
                    if word_start.is_none() {
                        word_start = Some(pos);
                    }
                }
                Class::Space => {
                    if let Some(s) = word_start.take() {
                        push(s, pos, TokenKind::Word);
                    }
                }
                Class::Attach => match word_start.take() {
                    Some(s) => push(s, end, TokenKind::Word),
                    None => push(pos, end, TokenKind::Punct),
                },
                Class::Split => {
                    if let Some(s) = word_start.take() {
                        push(s, pos, TokenKind::Word);
                    }
                    push(pos, end, TokenKind::Punct);
                }
                Class::Other => {
                    if let Some(s) = word_start.take() {
                        push(s, pos, TokenKind::Word);
                    }
                    push(pos, end, TokenKind::Other);
                }
            }
        }

        if let Some(s) = word_start {
            push(s, sentence.len(), TokenKind::Word);
        }
    }

    /// Collects all tokens of a sentence.
    pub fn spans<'s>(&self, sentence: &'s str) -> Vec<TokenSpan<'s>> {
        let mut out = Vec::new();
        self.tokenize(sentence, |tok| out.push(tok));
        out
    }
}
