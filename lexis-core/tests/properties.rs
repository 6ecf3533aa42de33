use lexis_core::conllu::{Document, Token};
use lexis_core::Pipeline;
use lexis_types::PipelineConfig;
use proptest::prelude::*;

const ALPHABET: &[char] = &[
    'α', 'γ', 'ε', 'η', 'ι', 'λ', 'ο', 'σ', 'ς', 'ω', 'Α', 'Σ', 'ἀ', 'ὁ', 'ῷ', 'ά', 'ὶ',
    '\u{0301}', '\u{0313}', '\u{0342}', '\u{0345}', '.', ',', ';', '·', '!', '«', '»', '(', ')',
    '\u{2019}', '\'', '\u{1FBD}', '\u{2026}', ' ', ' ', ' ', '\t', '\n', '\r', '\u{00A0}', '3',
    'k', '\u{1A}', '☉',
];

fn greek_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET), 0..=96)
        .prop_map(|chars| chars.into_iter().collect())
}

fn pipelines() -> [Pipeline; 2] {
    let mut folded = PipelineConfig::default();
    folded.normalization.key.fold_case = true;
    folded.normalization.punctuation = true;
    folded.emitter.version_header = true;

    [
        Pipeline::new(PipelineConfig::default()).unwrap(),
        Pipeline::new(folded).unwrap(),
    ]
}

proptest! {
    #[test]
    fn output_is_deterministic(text in greek_text()) {
        for p in pipelines() {
            let first = p.run(&text).unwrap().to_string();
            prop_assert_eq!(&p.run(&text).unwrap().to_string(), &first);
            prop_assert_eq!(&p.clone().run(&text).unwrap().to_string(), &first);
        }
    }

    #[test]
    fn rows_ids_and_forms_follow_the_sentence(text in greek_text()) {
        for p in pipelines() {
            let doc = p.run(&text).unwrap();
            let rendered = doc.to_string();
            let rows = rendered
                .lines()
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .count();
            prop_assert_eq!(rows, doc.token_count());

            for (n, s) in doc.sentences().iter().enumerate() {
                prop_assert_eq!(s.id().get() as usize, n + 1);
                prop_assert!(!s.is_empty());

                let joined: String = s.tokens().iter().map(Token::form).collect();
                let squeezed: String = s.text().chars().filter(|c| !c.is_whitespace()).collect();
                prop_assert_eq!(joined, squeezed);

                for (i, t) in s.tokens().iter().enumerate() {
                    prop_assert_eq!(t.id() as usize, i + 1);
                    prop_assert!(!t.tok_key().as_str().is_empty());
                }
            }
        }
    }

    #[test]
    fn serialized_output_parses_back(text in greek_text()) {
        for p in pipelines() {
            let doc = p.run(&text).unwrap();
            let rendered = doc.to_string();
            let parsed = Document::parse(&rendered).unwrap();
            prop_assert_eq!(&parsed, &doc);
            prop_assert_eq!(parsed.to_string(), rendered);
        }
    }
}
