//! Reads serialized documents back, e.g. after a downstream annotator has
//! filled columns.
//!
//! Only the shape this crate writes is accepted: plain integer ids starting
//! at 1 in every sentence, a `TokKey` in every MISC cell, and the two
//! sentence comments. Multiword ranges (`1-2`) and empty nodes (`1.1`) are
//! rejected because they would change the token stream.

use lexis_types::{SentId, TokKey, TokenId, PLACEHOLDER};
use memchr::memchr_iter;
use thiserror::Error;

use super::model::{Column, Document, Sentence, Token, TOK_KEY_ATTR};
use super::write::RULESET_COMMENT;

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A token row does not have exactly ten columns.
    #[error("expected 10 columns, found {0}")]
    ColumnCount(usize),
    /// The ID column is not the next integer.
    #[error("expected token id {expected}, found {found:?}")]
    TokenId {
        /// Id the row should have.
        expected: TokenId,
        /// What the row has.
        found: String,
    },
    /// FORM is empty or the placeholder-free form is missing.
    #[error("empty FORM")]
    EmptyForm,
    /// MISC has no `TokKey` attribute.
    #[error("MISC has no TokKey")]
    MissingTokKey,
    /// A MISC item is not `key=value` or repeats a key.
    #[error("malformed MISC item {0:?}")]
    MalformedMisc(String),
    /// An annotation cell cannot hold its value.
    #[error("invalid {column} value {value:?}")]
    InvalidCell {
        /// Column name.
        column: &'static str,
        /// Cell text.
        value: String,
    },
    /// A comment header is malformed.
    #[error("malformed comment {0:?}")]
    MalformedComment(String),
    /// A sentence block lacks `# sent_id` or `# text`.
    #[error("sentence is missing its {0} comment")]
    MissingComment(&'static str),
    /// A sentence block has comments but no rows.
    #[error("sentence has no token rows")]
    EmptySentence,
}

/// Parse failure with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

#[derive(Default)]
struct Pending {
    id: Option<SentId>,
    text: Option<String>,
    tokens: Vec<Token>,
    first_line: usize,
}

impl Pending {
    fn is_blank(&self) -> bool {
        self.id.is_none() && self.text.is_none() && self.tokens.is_empty()
    }

    fn finish(self) -> Result<Sentence, ParseError> {
        let line = self.first_line;
        let err = |kind| ParseError { line, kind };
        let id = self.id.ok_or_else(|| err(ParseErrorKind::MissingComment("sent_id")))?;
        let text = self
            .text
            .ok_or_else(|| err(ParseErrorKind::MissingComment("text")))?;
        if self.tokens.is_empty() {
            return Err(err(ParseErrorKind::EmptySentence));
        }
        Ok(Sentence::new(id, text, self.tokens))
    }
}

fn unescape_misc_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(p) = rest.find('%') {
        out.push_str(&rest[..p]);
        let decoded = match rest.get(p..p + 3) {
            Some("%25") => Some('%'),
            Some("%7C") => Some('|'),
            Some("%09") => Some('\t'),
            Some("%0A") => Some('\n'),
            Some("%0D") => Some('\r'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[p + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[p + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_row(line: &str, expected: TokenId) -> Result<Token, ParseErrorKind> {
    let bytes = line.as_bytes();
    let mut cells: [&str; 10] = [""; 10];
    let mut count = 0usize;
    let mut start = 0usize;

    for i in memchr_iter(b'\t', bytes).chain(std::iter::once(bytes.len())) {
        if count < cells.len() {
            // Tab is ASCII, so every cut is on a char boundary.
            cells[count] = &line[start..i];
        }
        count += 1;
        start = i + 1;
    }
    if count != 10 {
        return Err(ParseErrorKind::ColumnCount(count));
    }

    if cells[0].parse::<TokenId>().ok() != Some(expected) || cells[0].starts_with(['+', '0']) {
        return Err(ParseErrorKind::TokenId {
            expected,
            found: cells[0].to_string(),
        });
    }

    let form = cells[1];
    if form.is_empty() {
        return Err(ParseErrorKind::EmptyForm);
    }

    let mut key: Option<TokKey> = None;
    let mut extra: Vec<(&str, String)> = Vec::new();
    for item in cells[9].split('|') {
        let (k, v) = item
            .split_once('=')
            .ok_or_else(|| ParseErrorKind::MalformedMisc(item.to_string()))?;
        if k == TOK_KEY_ATTR {
            if key.is_some() {
                return Err(ParseErrorKind::MalformedMisc(item.to_string()));
            }
            key = Some(TokKey::new(unescape_misc_value(v)));
        } else {
            extra.push((k, unescape_misc_value(v)));
        }
    }

    let key = key.ok_or(ParseErrorKind::MissingTokKey)?;
    let mut token = Token::new(expected, form, key);

    for (column, cell) in Column::ALL.into_iter().zip(&cells[2..9]) {
        if *cell != PLACEHOLDER {
            token
                .annotate(column, *cell)
                .map_err(|_| ParseErrorKind::InvalidCell {
                    column: column.name(),
                    value: cell.to_string(),
                })?;
        }
    }
    for (k, v) in extra {
        token
            .misc_mut()
            .push(k, v)
            .map_err(|_| ParseErrorKind::MalformedMisc(k.to_string()))?;
    }

    Ok(token)
}

impl Document {
    /// Parses a serialized document.
    ///
    /// Comments other than `sent_id`, `text` and the ruleset header are
    /// ignored.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut ruleset = None;
        let mut sentences = Vec::new();
        let mut pending = Pending::default();

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let err = |kind| ParseError {
                line: line_no,
                kind,
            };

            if raw.is_empty() {
                if !pending.is_blank() {
                    sentences.push(std::mem::take(&mut pending).finish()?);
                }
                continue;
            }

            if pending.is_blank() {
                pending.first_line = line_no;
            }

            if let Some(comment) = raw.strip_prefix('#') {
                let comment = comment.trim_start();
                if let Some(v) = comment.strip_prefix("sent_id = ") {
                    let id = SentId::parse(v)
                        .ok_or_else(|| err(ParseErrorKind::MalformedComment(raw.to_string())))?;
                    pending.id = Some(id);
                } else if let Some(v) = comment.strip_prefix("text = ") {
                    pending.text = Some(v.to_string());
                } else if let Some(v) = comment
                    .strip_prefix(RULESET_COMMENT)
                    .and_then(|r| r.strip_prefix(" = "))
                {
                    if !sentences.is_empty() || !pending.is_blank() {
                        return Err(err(ParseErrorKind::MalformedComment(raw.to_string())));
                    }
                    let v = v
                        .parse::<u32>()
                        .map_err(|_| err(ParseErrorKind::MalformedComment(raw.to_string())))?;
                    ruleset = Some(v);
                }
                continue;
            }

            let expected = pending.tokens.len() as TokenId + 1;
            let token = parse_row(raw, expected).map_err(err)?;
            pending.tokens.push(token);
        }

        if !pending.is_blank() {
            sentences.push(pending.finish()?);
        }

        Ok(Document::new(ruleset, sentences))
    }
}
