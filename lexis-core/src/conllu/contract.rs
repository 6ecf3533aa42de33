//! Checks that an annotated document only augments the pipeline output.
//!
//! A downstream annotator may fill placeholder columns and append MISC
//! attributes. Anything else (touching ids, forms, keys, sentence text,
//! or adding, dropping, merging and reordering rows) is a violation.

use lexis_types::{SentId, TokKey, TokenId};
use thiserror::Error;

use super::model::{Column, Document};

/// First difference found between the original and the annotated document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// Sentences were added or removed.
    #[error("sentence count changed from {expected} to {found}")]
    SentenceCount {
        /// Count in the original.
        expected: usize,
        /// Count in the annotated document.
        found: usize,
    },
    /// A sentence id changed or sentences were reordered.
    #[error("sentence {index}: id changed from {expected} to {found}")]
    SentenceId {
        /// 0-based sentence index.
        index: usize,
        /// Original id.
        expected: SentId,
        /// Annotated id.
        found: SentId,
    },
    /// The `# text` comment changed.
    #[error("{sent_id}: sentence text changed")]
    SentenceText {
        /// Affected sentence.
        sent_id: SentId,
    },
    /// Rows were added, removed or merged.
    #[error("{sent_id}: row count changed from {expected} to {found}")]
    RowCount {
        /// Affected sentence.
        sent_id: SentId,
        /// Rows in the original.
        expected: usize,
        /// Rows in the annotated sentence.
        found: usize,
    },
    /// A FORM changed.
    #[error("{sent_id} token {id}: FORM changed from {expected:?} to {found:?}")]
    Form {
        /// Affected sentence.
        sent_id: SentId,
        /// Token id.
        id: TokenId,
        /// Original form.
        expected: String,
        /// Annotated form.
        found: String,
    },
    /// A TokKey changed.
    #[error("{sent_id} token {id}: TokKey changed from {expected} to {found}")]
    TokKey {
        /// Affected sentence.
        sent_id: SentId,
        /// Token id.
        id: TokenId,
        /// Original key.
        expected: TokKey,
        /// Annotated key.
        found: TokKey,
    },
    /// A column that already had a value was overwritten or cleared.
    #[error("{sent_id} token {id}: {} was already set", .column.name())]
    FieldChanged {
        /// Affected sentence.
        sent_id: SentId,
        /// Token id.
        id: TokenId,
        /// The column.
        column: Column,
    },
    /// An existing MISC attribute was removed or changed.
    #[error("{sent_id} token {id}: MISC attribute {key} removed or changed")]
    MiscChanged {
        /// Affected sentence.
        sent_id: SentId,
        /// Token id.
        id: TokenId,
        /// Attribute name.
        key: String,
    },
}

/// Verifies that `annotated` is `original` plus filled placeholders and
/// appended MISC attributes.
pub fn verify_augmentation(
    original: &Document,
    annotated: &Document,
) -> Result<(), ContractViolation> {
    let (before, after) = (original.sentences(), annotated.sentences());
    if before.len() != after.len() {
        return Err(ContractViolation::SentenceCount {
            expected: before.len(),
            found: after.len(),
        });
    }

    for (index, (a, b)) in before.iter().zip(after).enumerate() {
        let sent_id = a.id();
        if b.id() != sent_id {
            return Err(ContractViolation::SentenceId {
                index,
                expected: sent_id,
                found: b.id(),
            });
        }
        if a.text() != b.text() {
            return Err(ContractViolation::SentenceText { sent_id });
        }
        if a.len() != b.len() {
            return Err(ContractViolation::RowCount {
                sent_id,
                expected: a.len(),
                found: b.len(),
            });
        }

        for (x, y) in a.tokens().iter().zip(b.tokens()) {
            let id = x.id();
            if x.form() != y.form() {
                return Err(ContractViolation::Form {
                    sent_id,
                    id,
                    expected: x.form().to_string(),
                    found: y.form().to_string(),
                });
            }
            if x.tok_key() != y.tok_key() {
                return Err(ContractViolation::TokKey {
                    sent_id,
                    id,
                    expected: x.tok_key().clone(),
                    found: y.tok_key().clone(),
                });
            }
            for column in Column::ALL {
                if let Some(v) = x.get(column) {
                    if y.get(column) != Some(v) {
                        return Err(ContractViolation::FieldChanged { sent_id, id, column });
                    }
                }
            }
            for (k, v) in x.misc().extra() {
                if y.misc().get(k) != Some(v) {
                    return Err(ContractViolation::MiscChanged {
                        sent_id,
                        id,
                        key: k.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}
