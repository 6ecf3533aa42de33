//! Input generators for property tests.

use proptest::prelude::*;

/// Greek letters (plain, precomposed, capital and final sigma), combining
/// marks, both punctuation tables, every whitespace class the normalizer
/// handles, digits, Latin letters and characters no rule covers.
const ALPHABET: &[char] = &[
    'α', 'β', 'γ', 'ε', 'η', 'ι', 'λ', 'ο', 'σ', 'ς', 'υ', 'ω', 'Α', 'Σ', 'Ω', 'ἀ', 'ὁ', 'ῷ',
    'ά', 'ὶ', 'ῆ', '\u{0300}', '\u{0301}', '\u{0308}', '\u{0313}', '\u{0314}', '\u{0342}',
    '\u{0345}', '.', ',', ';', ':', '!', '?', '·', '\u{037E}', '\u{0387}', '«', '»', '(', ')',
    '"', '\u{201D}', '\u{2014}', '\u{2026}', '\u{2019}', '\u{02BC}', '\u{1FBD}', '\'', ' ', ' ',
    ' ', '\t', '\n', '\r', '\u{00A0}', '\u{2029}', '0', '3', '5', 'a', 'k', 'Z', '\u{1A}', '☉',
];

/// Strings of up to `max` characters drawn from [`ALPHABET`].
pub(crate) fn greek_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET), 0..=max)
        .prop_map(|chars| chars.into_iter().collect())
}
