//! Two-tier lexicon: a downstream consumer that fills placeholder columns.
//!
//! Both tiers are indexed by [`TokKey`], so one record covers every spelling
//! that folds to the same key:
//!
//! - the **forms** tier maps inflected surface forms to a full analysis and
//!   is consulted first;
//! - the **lexicon** tier maps lemmas to analyses and is consulted only when
//!   the forms tier has nothing for the key. Several records may share a
//!   key; the primary one is the first `SMALL_WORDS*` record with a UPOS,
//!   or else the first record.
//!
//! The lexicon never touches ids, forms or keys and only writes into
//! columns that still hold `_`, so an annotated document always passes
//! [`verify_augmentation`](crate::conllu::verify_augmentation). Every token
//! it fills is marked with `LexSource=forms` or `LexSource=lexicon`.
//!
//! Records are JSON Lines. Forms tier:
//!
//! ```text
//! {"form": "ὁ", "lemma": "ὁ", "upos": "DET", "feats": "Case=Nom|Gender=Masc|Number=Sing"}
//! ```
//!
//! Lexicon tier (`lemma_norm` and `lex_subclass` are accepted as aliases):
//!
//! ```text
//! {"lemma": "ἐν", "upos": "ADP", "subclass": "SMALL_WORDS:en"}
//! ```

use std::fmt;
use std::io::{self, BufRead};

use lexis_types::{KeyConfig, TokKey, PLACEHOLDER};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analyzer::KeyGenerator;
use crate::conllu::{AnnotationError, Column, Document, MiscError};

/// MISC attribute naming the tier a token was annotated from.
pub const LEX_SOURCE_ATTR: &str = "LexSource";

/// Subclass prefix of closed-class entries preferred as primary analysis.
const SMALL_WORDS: &str = "SMALL_WORDS";

/// Tier that produced an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexSource {
    /// Inflected form record.
    Forms,
    /// Lemma record.
    Lexicon,
}

impl LexSource {
    /// Value written after `LexSource=`.
    pub const fn as_str(self) -> &'static str {
        match self {
            LexSource::Forms => "forms",
            LexSource::Lexicon => "lexicon",
        }
    }
}

impl fmt::Display for LexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while loading a lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Reading the source failed.
    #[error("failed to read lexicon: {0}")]
    Io(#[from] io::Error),
    /// A line is not a valid record.
    #[error("line {line}: {source}")]
    Record {
        /// 1-based line number.
        line: usize,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A record value cannot be written into a CoNLL-U cell.
    #[error("line {line}: {field} value {value:?} contains a tab or line break")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// Record field.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

#[derive(Debug, Deserialize)]
struct FormRecord {
    form: String,
    #[serde(default)]
    lemma: Option<String>,
    #[serde(default)]
    upos: Option<String>,
    #[serde(default)]
    feats: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LemmaRecord {
    #[serde(alias = "lemma_norm")]
    lemma: String,
    #[serde(default)]
    upos: Option<String>,
    #[serde(default)]
    feats: Option<String>,
    #[serde(default, alias = "lex_subclass")]
    subclass: Option<String>,
}

/// Analysis attached to one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexEntry {
    /// Lemma.
    pub lemma: Option<String>,
    /// Universal part of speech.
    pub upos: Option<String>,
    /// Morphological features.
    pub feats: Option<String>,
}

impl LexEntry {
    fn columns(&self) -> [(Column, Option<&str>); 3] {
        [
            (Column::Lemma, self.lemma.as_deref()),
            (Column::Upos, self.upos.as_deref()),
            (Column::Feats, self.feats.as_deref()),
        ]
    }
}

#[derive(Debug, Clone)]
struct LemmaHit {
    entry: LexEntry,
    subclass: Option<String>,
}

impl LemmaHit {
    #[inline]
    fn is_preferred(&self) -> bool {
        self.entry.upos.is_some()
            && self
                .subclass
                .as_deref()
                .is_some_and(|s| s.starts_with(SMALL_WORDS))
    }
}

/// Key-indexed forms and lemma tiers.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    keys: KeyGenerator,
    forms: FxHashMap<TokKey, LexEntry>,
    lemmas: FxHashMap<TokKey, SmallVec<[LemmaHit; 1]>>,
}

impl Lexicon {
    /// Empty lexicon keyed with `key`, which must match the pipeline's
    /// key rules.
    pub fn new(key: KeyConfig) -> Self {
        Self {
            keys: KeyGenerator::new(key),
            forms: FxHashMap::default(),
            lemmas: FxHashMap::default(),
        }
    }

    /// Loads forms-tier records. Blank lines are skipped. Returns the
    /// number of records read.
    pub fn load_forms<R: BufRead>(&mut self, reader: R) -> Result<usize, LexiconError> {
        let read = read_records(reader, |line, record: FormRecord| {
            let entry = LexEntry {
                lemma: cell(record.lemma, "lemma", line)?,
                upos: cell(record.upos, "upos", line)?,
                feats: cell(record.feats, "feats", line)?,
            };
            self.insert_form(&record.form, entry);
            Ok(())
        })?;

        debug!(records = read, keys = self.forms.len(), "loaded forms tier");
        Ok(read)
    }

    /// Loads lexicon-tier records. Blank lines are skipped. Returns the
    /// number of records read.
    pub fn load_lemmas<R: BufRead>(&mut self, reader: R) -> Result<usize, LexiconError> {
        let read = read_records(reader, |line, record: LemmaRecord| {
            let entry = LexEntry {
                lemma: cell(Some(record.lemma.clone()), "lemma", line)?,
                upos: cell(record.upos, "upos", line)?,
                feats: cell(record.feats, "feats", line)?,
            };
            self.insert_lemma(&record.lemma, entry, record.subclass);
            Ok(())
        })?;

        debug!(records = read, keys = self.lemmas.len(), "loaded lexicon tier");
        Ok(read)
    }

    /// Adds a forms-tier entry unless its key is already present. Returns
    /// `true` if the entry was stored.
    pub fn insert_form(&mut self, form: &str, entry: LexEntry) -> bool {
        let key = self.keys.derive(form);
        if self.forms.contains_key(&key) {
            return false;
        }
        self.forms.insert(key, entry);
        true
    }

    /// Appends a lexicon-tier entry under the key of `lemma`.
    pub fn insert_lemma(&mut self, lemma: &str, entry: LexEntry, subclass: Option<String>) {
        let key = self.keys.derive(lemma);
        self.lemmas
            .entry(key)
            .or_default()
            .push(LemmaHit { entry, subclass });
    }

    /// Analysis for a surface form.
    pub fn lookup(&self, form: &str) -> Option<(LexSource, &LexEntry)> {
        self.get(&self.keys.derive(form))
    }

    /// Analysis for an already derived key: the forms tier if it has the
    /// key, else the primary lexicon-tier entry.
    pub fn get(&self, key: &TokKey) -> Option<(LexSource, &LexEntry)> {
        if let Some(entry) = self.forms.get(key) {
            return Some((LexSource::Forms, entry));
        }

        let hits = self.lemmas.get(key)?;
        hits.iter()
            .find(|h| h.is_preferred())
            .or_else(|| hits.first())
            .map(|h| (LexSource::Lexicon, &h.entry))
    }

    /// Number of lexicon-tier records stored under `key`.
    pub fn lemma_hits(&self, key: &TokKey) -> usize {
        self.lemmas.get(key).map_or(0, |hits| hits.len())
    }

    /// Distinct keys in the forms tier.
    #[inline]
    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    /// Distinct keys in the lexicon tier.
    #[inline]
    pub fn lemma_count(&self) -> usize {
        self.lemmas.len()
    }

    /// Returns `true` if neither tier has entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty() && self.lemmas.is_empty()
    }

    /// Fills placeholder LEMMA, UPOS and FEATS cells of matching tokens and
    /// marks them with the tier they came from. Returns the number of
    /// tokens changed.
    pub fn annotate(&self, doc: &mut Document) -> usize {
        let mut changed = 0usize;
        let mut by_tier = [0usize; 2];

        for sentence in doc.sentences_mut() {
            let sent_id = sentence.id();
            for token in sentence.tokens_mut() {
                let Some((source, entry)) = self.get(token.tok_key()) else {
                    continue;
                };

                let mut filled = false;
                for (column, value) in entry.columns() {
                    let Some(value) = value else { continue };
                    match token.annotate(column, value) {
                        Ok(()) => filled = true,
                        Err(AnnotationError::AlreadySet { .. }) => {}
                        Err(e) => {
                            warn!(%sent_id, id = token.id(), error = %e, "lexicon value skipped")
                        }
                    }
                }
                if !filled {
                    continue;
                }

                match token.misc_mut().push(LEX_SOURCE_ATTR, source.as_str()) {
                    Ok(()) | Err(MiscError::Duplicate(_)) => {}
                    Err(e) => {
                        warn!(%sent_id, id = token.id(), error = %e, "source not recorded")
                    }
                }
                by_tier[source as usize] += 1;
                changed += 1;
            }
        }

        debug!(
            tokens = changed,
            forms = by_tier[LexSource::Forms as usize],
            lexicon = by_tier[LexSource::Lexicon as usize],
            "lexicon annotation"
        );
        changed
    }
}

/// Decodes one record per non-blank line and hands it to `apply`.
fn read_records<R, T, F>(reader: R, mut apply: F) -> Result<usize, LexiconError>
where
    R: BufRead,
    T: DeserializeOwned,
    F: FnMut(usize, T) -> Result<(), LexiconError>,
{
    let mut read = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str(&line).map_err(|source| LexiconError::Record {
            line: line_no,
            source,
        })?;
        apply(line_no, record)?;
        read += 1;
    }

    Ok(read)
}

/// Drops empty and placeholder values and rejects unwritable ones.
fn cell(
    value: Option<String>,
    field: &'static str,
    line: usize,
) -> Result<Option<String>, LexiconError> {
    match value {
        Some(v) if v.is_empty() || v == PLACEHOLDER => Ok(None),
        Some(v) if v.contains(['\t', '\n', '\r']) => Err(LexiconError::InvalidValue {
            line,
            field,
            value: v,
        }),
        other => Ok(other),
    }
}
