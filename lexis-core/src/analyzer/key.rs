//! Token key derivation.
//!
//! A [`TokKey`] is the matching handle downstream tools use to look a token
//! up in lexica or to align annotations. It is computed from the token's
//! form alone; sentence context, position and neighbouring tokens never
//! influence it.
//!
//! The derivation is frozen per [`KeyConfig`]:
//!
//! 1. canonical decomposition (NFD)
//! 2. drop combining marks (accents, breathings, iota subscript, diaeresis)
//!    when `strip_diacritics` is set
//! 3. lowercase the whole form when `fold_case` is set, with the same
//!    final-sigma rule the normalizer's lowercasing uses
//! 4. `ς` → `σ` when `fold_final_sigma` is set
//! 5. canonical recomposition (NFC)
//!
//! A form made only of combining marks would strip to nothing; its key is
//! the NFC form instead, so keys are never empty.

use lexis_types::{KeyConfig, TokKey};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Derives the matching key for a single surface form.
///
/// ```
/// use lexis_core::analyzer::key::derive_key;
/// use lexis_types::KeyConfig;
///
/// let cfg = KeyConfig::default();
/// assert_eq!(derive_key("ἄνθρωπος", &cfg).as_str(), "ανθρωποσ");
/// assert_eq!(derive_key("ἄνθρωπος", &cfg), derive_key("ανθρώπος", &cfg));
/// ```
pub fn derive_key(form: &str, cfg: &KeyConfig) -> TokKey {
    let mut folded: String = form
        .nfd()
        .filter(|&c| !(cfg.strip_diacritics && is_combining_mark(c)))
        .collect();

    if cfg.fold_case {
        // Whole-string lowercasing, so a word-final Σ becomes ς.
        folded = folded.to_lowercase();
    }
    if cfg.fold_final_sigma {
        folded = folded.replace('ς', "σ");
    }

    let key: String = folded.nfc().collect();
    if key.is_empty() {
        return TokKey::new(form.nfc().collect::<String>());
    }
    TokKey::new(key)
}

/// Key derivation bound to one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGenerator {
    config: KeyConfig,
}

impl KeyGenerator {
    /// Creates a generator for the given rules.
    pub const fn new(config: KeyConfig) -> Self {
        Self { config }
    }

    /// Derives the key for `form`.
    #[inline]
    pub fn derive(&self, form: &str) -> TokKey {
        derive_key(form, &self.config)
    }

    /// The active rules.
    pub fn config(&self) -> &KeyConfig {
        &self.config
    }
}
