//! Sentence and token records handed to the emitter and to consumers.
//!
//! `id`, `form`, token order and `TokKey` are fixed when a record is created
//! and have no setters. Consumers can only fill placeholder columns and
//! append MISC pairs.

use lexis_types::{SentId, TokKey, TokenId, RULESET_VERSION};
use smallvec::SmallVec;
use thiserror::Error;

/// MISC attribute name of the token key.
pub const TOK_KEY_ATTR: &str = "TokKey";

/// Annotatable CoNLL-U columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Column {
    /// LEMMA
    Lemma = 0,
    /// UPOS
    Upos = 1,
    /// XPOS
    Xpos = 2,
    /// FEATS
    Feats = 3,
    /// HEAD
    Head = 4,
    /// DEPREL
    Deprel = 5,
    /// DEPS
    Deps = 6,
}

impl Column {
    /// All annotatable columns in output order.
    pub const ALL: [Column; 7] = [
        Column::Lemma,
        Column::Upos,
        Column::Xpos,
        Column::Feats,
        Column::Head,
        Column::Deprel,
        Column::Deps,
    ];

    /// Upper-case CoNLL-U column name.
    pub const fn name(self) -> &'static str {
        match self {
            Column::Lemma => "LEMMA",
            Column::Upos => "UPOS",
            Column::Xpos => "XPOS",
            Column::Feats => "FEATS",
            Column::Head => "HEAD",
            Column::Deprel => "DEPREL",
            Column::Deps => "DEPS",
        }
    }

    #[inline(always)]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Rejected annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// The column already holds a value.
    #[error("{} is already set", .column.name())]
    AlreadySet {
        /// Column that was targeted.
        column: Column,
    },
    /// The value is empty, the placeholder, or contains tabs/line breaks.
    #[error("invalid value {value:?} for {}", .column.name())]
    InvalidValue {
        /// Column that was targeted.
        column: Column,
        /// Rejected value.
        value: String,
    },
}

/// Rejected MISC attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiscError {
    /// `TokKey` is owned by the pipeline.
    #[error("MISC attribute TokKey is reserved")]
    ReservedKey,
    /// Attribute name is empty or contains `=`, `|` or whitespace.
    #[error("invalid MISC attribute name {0:?}")]
    InvalidKey(String),
    /// Attribute is already present.
    #[error("MISC attribute {0} is already present")]
    Duplicate(String),
}

/// MISC column: the token key followed by appended `key=value` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misc {
    key: TokKey,
    extra: SmallVec<[(String, String); 2]>,
}

impl Misc {
    /// MISC holding only the token key.
    pub fn new(key: TokKey) -> Self {
        Self {
            key,
            extra: SmallVec::new(),
        }
    }

    /// The token key.
    #[inline(always)]
    pub fn tok_key(&self) -> &TokKey {
        &self.key
    }

    /// Appends an attribute after the existing ones.
    pub fn push(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), MiscError> {
        let key = key.into();
        if key == TOK_KEY_ATTR {
            return Err(MiscError::ReservedKey);
        }
        if key.is_empty()
            || key
                .chars()
                .any(|c| c == '=' || c == '|' || c.is_whitespace())
        {
            return Err(MiscError::InvalidKey(key));
        }
        if self.get(&key).is_some() {
            return Err(MiscError::Duplicate(key));
        }
        self.extra.push((key, value.into()));
        Ok(())
    }

    /// Looks up an attribute, including `TokKey`.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == TOK_KEY_ATTR {
            return Some(self.key.as_str());
        }
        self.extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Appended attributes in order, without `TokKey`.
    pub fn extra(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    id: TokenId,
    form: String,
    fields: [Option<String>; 7],
    misc: Misc,
}

impl Token {
    pub(crate) fn new(id: TokenId, form: impl Into<String>, key: TokKey) -> Self {
        Self {
            id,
            form: form.into(),
            fields: Default::default(),
            misc: Misc::new(key),
        }
    }

    /// 1-based position in the sentence.
    #[inline(always)]
    pub fn id(&self) -> TokenId {
        self.id
    }

    /// Exact surface form.
    #[inline(always)]
    pub fn form(&self) -> &str {
        &self.form
    }

    /// Matching key.
    #[inline(always)]
    pub fn tok_key(&self) -> &TokKey {
        self.misc.tok_key()
    }

    /// Value of an annotatable column; `None` means placeholder.
    #[inline]
    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields[column.index()].as_deref()
    }

    /// Fills a placeholder column.
    ///
    /// # Errors
    ///
    /// Fails if the column is already set or the value cannot be written
    /// into a CoNLL-U cell.
    pub fn annotate(
        &mut self,
        column: Column,
        value: impl Into<String>,
    ) -> Result<(), AnnotationError> {
        let value = value.into();
        if value.is_empty()
            || value == lexis_types::PLACEHOLDER
            || value.contains(['\t', '\n', '\r'])
        {
            return Err(AnnotationError::InvalidValue { column, value });
        }

        let slot = &mut self.fields[column.index()];
        if slot.is_some() {
            return Err(AnnotationError::AlreadySet { column });
        }
        *slot = Some(value);
        Ok(())
    }

    /// MISC column.
    #[inline(always)]
    pub fn misc(&self) -> &Misc {
        &self.misc
    }

    /// MISC column, for appending attributes.
    #[inline(always)]
    pub fn misc_mut(&mut self) -> &mut Misc {
        &mut self.misc
    }
}

/// One sentence block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    id: SentId,
    text: String,
    tokens: Vec<Token>,
}

impl Sentence {
    pub(crate) fn new(id: SentId, text: impl Into<String>, tokens: Vec<Token>) -> Self {
        debug_assert!(tokens
            .iter()
            .enumerate()
            .all(|(i, t)| t.id() as usize == i + 1));
        Self {
            id,
            text: text.into(),
            tokens,
        }
    }

    /// Stable sentence id.
    #[inline(always)]
    pub fn id(&self) -> SentId {
        self.id
    }

    /// Literal sentence text.
    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Tokens in order.
    #[inline(always)]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Token by 1-based id.
    pub fn token(&self, id: TokenId) -> Option<&Token> {
        (id as usize).checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Mutable token by 1-based id.
    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        (id as usize)
            .checked_sub(1)
            .and_then(move |i| self.tokens.get_mut(i))
    }

    /// Mutable access to every token, in order. Tokens cannot be added,
    /// removed or moved through it.
    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.tokens.iter_mut()
    }

    /// Number of tokens.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the sentence has no tokens.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A complete output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    ruleset: Option<u32>,
    sentences: Vec<Sentence>,
}

impl Document {
    pub(crate) fn new(ruleset: Option<u32>, sentences: Vec<Sentence>) -> Self {
        Self { ruleset, sentences }
    }

    /// Ruleset version written in the document header, if any.
    #[inline(always)]
    pub fn ruleset(&self) -> Option<u32> {
        self.ruleset
    }

    /// Returns `true` if the header matches this build's ruleset.
    pub fn is_current_ruleset(&self) -> bool {
        self.ruleset.map_or(true, |v| v == RULESET_VERSION)
    }

    /// Sentences in order.
    #[inline(always)]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Mutable access to every sentence, in order.
    pub fn sentences_mut(&mut self) -> impl Iterator<Item = &mut Sentence> {
        self.sentences.iter_mut()
    }

    /// Sentence by id.
    pub fn sentence(&self, id: SentId) -> Option<&Sentence> {
        (id.get() as usize)
            .checked_sub(1)
            .and_then(|i| self.sentences.get(i))
            .filter(|s| s.id == id)
            .or_else(|| self.sentences.iter().find(|s| s.id == id))
    }

    /// Total number of tokens.
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Sentence::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token::new(1, "ὁ", TokKey::new("ο"))
    }

    #[test]
    fn new_token_has_only_placeholders() {
        let t = token();
        for column in Column::ALL {
            assert_eq!(t.get(column), None);
        }
        assert_eq!(t.tok_key().as_str(), "ο");
        assert_eq!(t.misc().get(TOK_KEY_ATTR), Some("ο"));
    }

    #[test]
    fn annotate_fills_placeholder_once() {
        let mut t = token();
        t.annotate(Column::Upos, "DET").unwrap();
        assert_eq!(t.get(Column::Upos), Some("DET"));
        assert_eq!(
            t.annotate(Column::Upos, "PRON"),
            Err(AnnotationError::AlreadySet {
                column: Column::Upos
            })
        );
        assert_eq!(t.get(Column::Upos), Some("DET"));
    }

    #[test]
    fn annotate_rejects_unwritable_values() {
        let mut t = token();
        for bad in ["", "_", "a\tb", "a\nb"] {
            assert!(matches!(
                t.annotate(Column::Lemma, bad),
                Err(AnnotationError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn misc_append_keeps_tok_key() {
        let mut t = token();
        t.misc_mut().push("SpaceAfter", "No").unwrap();
        assert_eq!(t.misc_mut().push(TOK_KEY_ATTR, "x"), Err(MiscError::ReservedKey));
        assert_eq!(
            t.misc_mut().push("SpaceAfter", "Yes"),
            Err(MiscError::Duplicate("SpaceAfter".into()))
        );
        assert!(matches!(t.misc_mut().push("a|b", "x"), Err(MiscError::InvalidKey(_))));
        assert!(matches!(t.misc_mut().push("", "x"), Err(MiscError::InvalidKey(_))));
        assert_eq!(t.tok_key().as_str(), "ο");
        assert_eq!(t.misc().extra().collect::<Vec<_>>(), [("SpaceAfter", "No")]);
    }

    #[test]
    fn sentence_token_lookup_is_one_based() {
        let s = Sentence::new(
            SentId::new(1),
            "ὁ λόγος",
            vec![
                Token::new(1, "ὁ", TokKey::new("ο")),
                Token::new(2, "λόγος", TokKey::new("λογοσ")),
            ],
        );
        assert!(s.token(0).is_none());
        assert_eq!(s.token(2).map(Token::form), Some("λόγος"));
        assert!(s.token(3).is_none());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn document_sentence_lookup() {
        let doc = Document::new(
            None,
            vec![
                Sentence::new(SentId::new(1), "α", vec![Token::new(1, "α", TokKey::new("α"))]),
                Sentence::new(SentId::new(2), "β", vec![Token::new(1, "β", TokKey::new("β"))]),
            ],
        );
        assert_eq!(doc.sentence(SentId::new(2)).map(Sentence::text), Some("β"));
        assert!(doc.sentence(SentId::new(3)).is_none());
        assert_eq!(doc.token_count(), 2);
        assert!(doc.is_current_ruleset());
    }
}
