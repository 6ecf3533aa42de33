//! Text analysis stages.
//!
//! This module provides the deterministic text processing components:
//! - **Normalizer**: Canonicalizes raw text into one Unicode form
//! - **Segmenter**: Splits normalized text into sentence spans
//! - **Tokenizer**: Splits each sentence into token spans
//! - **Key**: Derives the stable matching key of a token form

pub mod key;
pub mod normalizer;
pub mod segmenter;
pub mod tokenizer;

pub use key::{derive_key, KeyGenerator};
pub use normalizer::TextNormalizer;
pub use segmenter::SentenceSegmenter;
pub use tokenizer::{TokenKind, TokenSpan, Tokenizer};
