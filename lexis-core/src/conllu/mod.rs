//! CoNLL-U shaped output.
//!
//! Per sentence the emitter writes:
//!
//! ```text
//! # sent_id = sent-0001
//! # text = ὁ ἄνθρωπος καὶ ἡ γυνή.
//! 1	ὁ	_	_	_	_	_	_	_	TokKey=ο
//! ...
//!
//! ```
//!
//! Ten tab-separated columns per token: `ID FORM LEMMA UPOS XPOS FEATS HEAD
//! DEPREL DEPS MISC`. Unresolved columns hold `_`; MISC always starts with
//! `TokKey=<key>` and may be extended with `|key=value` pairs downstream.

mod contract;
mod model;
mod parse;
mod write;

pub use contract::{verify_augmentation, ContractViolation};
pub use model::{
    AnnotationError, Column, Document, Misc, MiscError, Sentence, Token, TOK_KEY_ATTR,
};
pub use parse::{ParseError, ParseErrorKind};
pub use write::{emit, RULESET_COMMENT};
