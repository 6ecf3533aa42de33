//! Deterministic pre-annotation of Ancient Greek text.
//!
//! Raw text goes through four pure stages and comes out as a CoNLL-U shaped
//! [`conllu::Document`]:
//!
//! ```text
//! raw text ─▶ normalize ─▶ segment ─▶ tokenize ─▶ key ─▶ emit
//! ```
//!
//! Same input and same configuration always give byte-identical output.
//! Downstream tools may fill placeholder columns and append MISC attributes
//! but never change ids, forms, token order or keys; see
//! [`conllu::verify_augmentation`].
//!
//! ```
//! use lexis_core::Pipeline;
//! use lexis_types::PipelineConfig;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let doc = pipeline.run("ὁ ἄνθρωπος καὶ ἡ γυνή.").unwrap();
//!
//! assert_eq!(doc.sentences().len(), 1);
//! assert_eq!(doc.token_count(), 6);
//! ```

pub mod analyzer;
pub mod config;
pub mod conllu;
pub mod lexicon;
pub mod pipeline;

pub use pipeline::Pipeline;

#[cfg(test)]
mod test_support;
