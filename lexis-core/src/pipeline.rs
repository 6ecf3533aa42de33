//! The end-to-end pipeline.
//!
//! A [`Pipeline`] is compiled once from a [`PipelineConfig`] and then only
//! read, so one instance can serve any number of threads.

use std::fs;
use std::path::Path;

use lexis_types::{
    ConfigError, InputError, PipelineConfig, PipelineError, SentId, RULESET_VERSION,
};
use rayon::prelude::*;
use tracing::{debug, info_span, warn};

use crate::analyzer::{KeyGenerator, SentenceSegmenter, TextNormalizer, TokenKind, Tokenizer};
use crate::conllu::{emit, Document, Sentence, Token};

/// Compiled normalizer, segmenter, tokenizer and key rules.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: TextNormalizer,
    segmenter: SentenceSegmenter,
    tokenizer: Tokenizer,
    keys: KeyGenerator,
}

impl Pipeline {
    /// Validates the configuration and compiles every stage.
    ///
    /// # Errors
    ///
    /// Any inconsistency in the configuration, including conflicting rule
    /// table entries, is reported here and never during a run.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let normalizer = TextNormalizer::new(config.normalization);
        let segmenter = SentenceSegmenter::new(&config.segmentation)?;
        let tokenizer = Tokenizer::new(&config.tokenization)?;
        let keys = KeyGenerator::new(config.normalization.key);

        Ok(Self {
            config,
            normalizer,
            segmenter,
            tokenizer,
            keys,
        })
    }

    /// The configuration this pipeline was built from.
    #[inline(always)]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ruleset version implemented by this pipeline.
    #[inline(always)]
    pub fn version(&self) -> u32 {
        RULESET_VERSION
    }

    /// Processes one document held in memory.
    ///
    /// # Errors
    ///
    /// Fails with [`InputError`] on Unicode noncharacters. No partial
    /// document is returned.
    pub fn run(&self, input: &str) -> Result<Document, InputError> {
        let span = info_span!("pipeline.run", bytes = input.len());
        let _enter = span.enter();

        let normalized = self.normalizer.normalize(input)?;
        debug!(bytes = normalized.len(), "normalized");

        Ok(self.emit_normalized(&normalized))
    }

    /// Processes raw bytes, rejecting malformed UTF-8.
    pub fn run_bytes(&self, input: &[u8]) -> Result<Document, InputError> {
        let span = info_span!("pipeline.run", bytes = input.len());
        let _enter = span.enter();

        let normalized = self.normalizer.normalize_bytes(input)?;
        debug!(bytes = normalized.len(), "normalized");

        Ok(self.emit_normalized(&normalized))
    }

    /// Reads a file and processes it.
    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<Document, PipelineError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.run_bytes(&bytes)?)
    }

    /// Processes independent documents on the rayon thread pool.
    ///
    /// Results are in input order. A failing document does not affect the
    /// others.
    pub fn run_batch(&self, inputs: &[&str]) -> Vec<Result<Document, InputError>> {
        inputs.par_iter().map(|&input| self.run(input)).collect()
    }

    fn emit_normalized(&self, text: &str) -> Document {
        let sentences = self.sentences(text);
        emit(sentences, &self.config.emitter)
    }

    /// Segments and tokenizes already normalized text.
    fn sentences(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        let mut token_total = 0usize;

        self.segmenter.segment(text, |span| {
            let surface = span.slice(text);
            let id = SentId::new(sentences.len() as u32 + 1);

            let mut tokens = Vec::new();
            let mut fallback = 0usize;
            self.tokenizer.tokenize(surface, |tok| {
                if tok.kind == TokenKind::Other {
                    fallback += 1;
                }
                tokens.push(Token::new(tok.id, tok.text, self.keys.derive(tok.text)));
            });

            if fallback > 0 {
                warn!(sent_id = %id, count = fallback, "characters outside the token rules");
            }

            token_total += tokens.len();
            sentences.push(Sentence::new(id, surface, tokens));
        });

        debug!(sentences = sentences.len(), tokens = token_total, "segmented and tokenized");
        sentences
    }
}
