//! Rule-table sentence segmenter.
//!
//! Splits normalized text into sentence spans. Decisions come from an
//! ordered character table ([`BoundaryRule`]) plus ordered context rules
//! ([`ContextRule`]) that can veto a boundary on `.`; there is no
//! statistical component.
//!
//! ## Partition
//!
//! The returned spans are ordered, non-empty, non-overlapping and trimmed.
//! Every byte of the text that is not inside a span is whitespace, so the
//! spans plus the separators between them rebuild the text exactly.
//!
//! ## Boundary rules
//!
//! - a terminal mark ends the sentence, unless a context rule vetoes it
//! - closers and further terminals directly after it stay in the sentence
//! - terminals separated from the run only by spaces also stay (`. . .`)
//! - `\n` is a hard boundary when configured
//! - trailing text without a terminal is still a sentence

use lexis_types::{BoundaryRule, ContextRule, SegmentationConfig, SegmentationError, Span};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Compiled sentence segmenter.
#[derive(Debug, Clone)]
pub struct SentenceSegmenter {
    rules: FxHashMap<char, BoundaryRule>,
    context: SmallVec<[ContextRule; 2]>,
    abbreviations: Vec<String>,
    line_breaks: bool,
}

impl SentenceSegmenter {
    /// Compiles the rule table.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentationError::ConflictingRule`] if a character is
    /// listed twice with different rules. Exact duplicates are accepted.
    pub fn new(cfg: &SegmentationConfig) -> Result<Self, SegmentationError> {
        let mut rules = FxHashMap::default();

        for &(ch, rule) in &cfg.rules {
            if let Some(&first) = rules.get(&ch) {
                if first != rule {
                    return Err(SegmentationError::ConflictingRule {
                        ch,
                        first,
                        second: rule,
                    });
                }
                continue;
            }
            rules.insert(ch, rule);
        }

        let mut context = SmallVec::new();
        for &rule in &cfg.context {
            if !context.contains(&rule) {
                context.push(rule);
            }
        }

        Ok(Self {
            rules,
            context,
            abbreviations: cfg.abbreviations.clone(),
            line_breaks: cfg.line_breaks_are_boundaries,
        })
    }

    /// Boundary rule for a character, if any.
    #[inline(always)]
    pub fn rule(&self, c: char) -> Option<BoundaryRule> {
        self.rules.get(&c).copied()
    }

    #[inline(always)]
    fn is_terminal(&self, c: char) -> bool {
        self.rule(c) == Some(BoundaryRule::Terminal)
    }

    #[inline(always)]
    fn is_hard_break(&self, c: char) -> bool {
        self.line_breaks && c == '\n'
    }

    /// Segments `text` and emits each sentence span in order.
    pub fn segment<F>(&self, text: &str, mut emit: F)
    where
        F: FnMut(Span),
    {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let n = chars.len();

        let mut start: Option<usize> = None;
        let mut last_end = 0usize;
        let mut i = 0usize;

        while i < n {
            let (pos, c) = chars[i];

            if self.is_hard_break(c) {
                if let Some(s) = start.take() {
                    emit(Span::new(s, last_end));
                }
                i += 1;
                continue;
            }

            if c.is_whitespace() {
                i += 1;
                continue;
            }

            if start.is_none() {
                start = Some(pos);
            }
            last_end = pos + c.len_utf8();

            if !self.is_terminal(c) || self.suppressed(text, &chars, i) {
                i += 1;
                continue;
            }

            let mut j = i + 1;
            loop {
                while j < n && self.rule(chars[j].1).is_some() {
                    last_end = chars[j].0 + chars[j].1.len_utf8();
                    j += 1;
                }

                let mut k = j;
                while k < n && chars[k].1.is_whitespace() && !self.is_hard_break(chars[k].1) {
                    k += 1;
                }

                if k > j && k < n && self.is_terminal(chars[k].1) {
                    j = k;
                    continue;
                }
                break;
            }

            if let Some(s) = start.take() {
                emit(Span::new(s, last_end));
            }
            i = j;
        }

        if let Some(s) = start {
            emit(Span::new(s, last_end));
        }
    }

    /// Collects all sentence spans of `text`.
    pub fn spans(&self, text: &str) -> Vec<Span> {
        let mut out = Vec::new();
        self.segment(text, |span| out.push(span));
        out
    }

    /// Returns `true` if a context rule vetoes the boundary at `chars[i]`.
    fn suppressed(&self, text: &str, chars: &[(usize, char)], i: usize) -> bool {
        if chars[i].1 != '.' {
            return false;
        }

        self.context.iter().any(|rule| match rule {
            ContextRule::Abbreviation => self.is_abbreviation(text, chars, i),
            ContextRule::Numeric => {
                let prev = i.checked_sub(1).map(|p| chars[p].1);
                let next = chars.get(i + 1).map(|&(_, c)| c);
                matches!(
                    (prev, next),
                    (Some(p), Some(n)) if p.is_ascii_digit() && n.is_ascii_digit()
                )
            }
        })
    }

    /// The whitespace-delimited chunk around the dot, stripped of leading
    /// punctuation, starts with an abbreviation that reaches this dot.
    fn is_abbreviation(&self, text: &str, chars: &[(usize, char)], i: usize) -> bool {
        if self.abbreviations.is_empty() {
            return false;
        }

        let mut w = i;
        while w > 0 && !chars[w - 1].1.is_whitespace() {
            w -= 1;
        }
        while w < i && !chars[w].1.is_alphanumeric() {
            w += 1;
        }

        let mut e = i + 1;
        while e < chars.len() && !chars[e].1.is_whitespace() {
            e += 1;
        }

        let word_start = chars[w].0;
        let through_dot = chars[i].0 + 1 - word_start;
        let chunk_end = chars.get(e).map_or(text.len(), |&(p, _)| p);
        let chunk = &text[word_start..chunk_end];

        self.abbreviations
            .iter()
            .any(|a| a.len() >= through_dot && chunk.starts_with(a.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::greek_text;
    use proptest::prelude::*;
    use crate::analyzer::TextNormalizer;

    fn split(text: &str) -> Vec<&str> {
        split_with(&SegmentationConfig::default(), text)
    }

    fn split_with<'t>(cfg: &SegmentationConfig, text: &'t str) -> Vec<&'t str> {
        SentenceSegmenter::new(cfg)
            .unwrap()
            .spans(text)
            .into_iter()
            .map(|s| s.slice(text))
            .collect()
    }

    fn assert_partition(text: &str, spans: &[Span]) {
        let mut cursor = 0usize;
        for span in spans {
            assert!(!span.is_empty());
            assert!(span.start >= cursor);
            assert!(text[cursor..span.start].chars().all(char::is_whitespace));
            cursor = span.end;
        }
        assert!(text[cursor..].chars().all(char::is_whitespace));
    }

    #[test]
    fn single_sentence() {
        assert_eq!(
            split("ὁ ἄνθρωπος καὶ ἡ γυνή."),
            vec!["ὁ ἄνθρωπος καὶ ἡ γυνή."]
        );
    }

    #[test]
    fn splits_on_greek_terminals() {
        assert_eq!(
            split("τί λέγεις; οὐδέν. ἔφη· καλῶς!"),
            vec!["τί λέγεις;", "οὐδέν.", "ἔφη·", "καλῶς!"]
        );
    }

    #[test]
    fn final_partial_sentence_is_kept() {
        assert_eq!(split("σύ, ἐγώ. ἐν τῇ οἰκίᾳ"), vec!["σύ, ἐγώ.", "ἐν τῇ οἰκίᾳ"]);
    }

    #[test]
    fn consecutive_terminals_are_one_boundary() {
        assert_eq!(split("ἦλθεν...; ἀπῆλθεν."), vec!["ἦλθεν...;", "ἀπῆλθεν."]);
        assert_eq!(split("ἦλθεν. . ὁ δέ."), vec!["ἦλθεν. .", "ὁ δέ."]);
        assert_eq!(split("...; ..."), vec!["...; ..."]);
    }

    #[test]
    fn closers_stay_with_their_sentence() {
        assert_eq!(
            split("«ἄγε δή.» ὁ δὲ ἀπῆλθεν."),
            vec!["«ἄγε δή.»", "ὁ δὲ ἀπῆλθεν."]
        );
        assert_eq!(split("(οὐδέν.) καλῶς."), vec!["(οὐδέν.)", "καλῶς."]);
    }

    #[test]
    fn newline_is_hard_boundary() {
        assert_eq!(
            split("ὁ ἄνθρωπος\nἡ γυνή."),
            vec!["ὁ ἄνθρωπος", "ἡ γυνή."]
        );
        assert_eq!(split("ἦλθεν.\n.\nὁ δέ."), vec!["ἦλθεν.", ".", "ὁ δέ."]);
    }

    #[test]
    fn newline_ignored_when_not_a_boundary() {
        let cfg = SegmentationConfig {
            line_breaks_are_boundaries: false,
            ..SegmentationConfig::default()
        };
        assert_eq!(split_with(&cfg, "ὁ ἄνθρωπος\nἡ γυνή."), vec!["ὁ ἄνθρωπος\nἡ γυνή."]);
    }

    #[test]
    fn abbreviation_does_not_split() {
        assert_eq!(
            split("ἵπποι, βόες κτλ. πάντα ἦν. τέλος."),
            vec!["ἵπποι, βόες κτλ. πάντα ἦν.", "τέλος."]
        );
    }

    #[test]
    fn dotted_abbreviation_does_not_split_inside() {
        assert_eq!(
            split("ἵπποι κ.τ.λ. πάντα ἦν."),
            vec!["ἵπποι κ.τ.λ. πάντα ἦν."]
        );
    }

    #[test]
    fn abbreviation_inside_brackets() {
        assert_eq!(split("ἵπποι (κτλ.) ἦν."), vec!["ἵπποι (κτλ.) ἦν."]);
    }

    #[test]
    fn abbreviation_rule_can_be_disabled() {
        let cfg = SegmentationConfig {
            context: vec![ContextRule::Numeric],
            ..SegmentationConfig::default()
        };
        assert_eq!(
            split_with(&cfg, "βόες κτλ. πάντα."),
            vec!["βόες κτλ.", "πάντα."]
        );
    }

    #[test]
    fn decimal_point_does_not_split() {
        assert_eq!(split("ἔτη 3.5 ἦν. τέλος."), vec!["ἔτη 3.5 ἦν.", "τέλος."]);
    }

    #[test]
    fn text_without_content() {
        assert!(split("").is_empty());
        assert!(split(" \n ").is_empty());
    }

    #[test]
    fn only_punctuation_is_one_sentence() {
        assert_eq!(split("."), vec!["."]);
        assert_eq!(split(";;;"), vec![";;;"]);
    }

    #[test]
    fn partition_holds() {
        let samples = [
            "ὁ ἄνθρωπος καὶ ἡ γυνή.\nσύ, ἐγώ.\nἐν τῇ οἰκίᾳ.\nεἰς τὸν λόγον.",
            "ἦλθεν...; ἀπῆλθεν. «ἄγε.» τέλος",
            "  leading. trailing.  ",
            "κτλ. κ.τ.λ. 3.5. . .",
        ];
        let seg = SentenceSegmenter::new(&SegmentationConfig::default()).unwrap();
        for text in samples {
            let spans = seg.spans(text);
            assert!(!spans.is_empty());
            assert_partition(text, &spans);
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let seg = SentenceSegmenter::new(&SegmentationConfig::default()).unwrap();
        let text = "τί λέγεις; οὐδέν. ἔφη· καλῶς!";
        let first = seg.spans(text);
        for _ in 0..5 {
            assert_eq!(seg.spans(text), first);
        }
    }

    #[test]
    fn conflicting_rules_rejected() {
        let mut cfg = SegmentationConfig::default();
        cfg.rules.push(('.', BoundaryRule::Closer));
        let err = SentenceSegmenter::new(&cfg).unwrap_err();
        assert_eq!(
            err,
            SegmentationError::ConflictingRule {
                ch: '.',
                first: BoundaryRule::Terminal,
                second: BoundaryRule::Closer,
            }
        );
    }

    #[test]
    fn duplicate_identical_rules_accepted() {
        let mut cfg = SegmentationConfig::default();
        cfg.rules.push(('.', BoundaryRule::Terminal));
        assert!(SentenceSegmenter::new(&cfg).is_ok());
    }

    #[test]
    fn custom_terminal_table() {
        let cfg = SegmentationConfig {
            rules: vec![('|', BoundaryRule::Terminal)],
            ..SegmentationConfig::default()
        };
        assert_eq!(split_with(&cfg, "α. β| γ"), vec!["α. β|", "γ"]);
    }

    proptest! {
        #[test]
        fn sentences_partition_any_normalized_text(raw in greek_text(96)) {
            let text = TextNormalizer::default().normalize(&raw).unwrap();
            let spans = SentenceSegmenter::new(&SegmentationConfig::default())
                .unwrap()
                .spans(&text);

            assert_partition(&text, &spans);
            prop_assert_eq!(spans.is_empty(), text.is_empty());
            for span in &spans {
                let sentence = span.slice(&text);
                prop_assert_eq!(sentence.trim(), sentence);
                prop_assert!(!sentence.contains('\n'));
            }
        }
    }
}
