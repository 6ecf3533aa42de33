use std::io::Write;

use lexis_core::conllu::{verify_augmentation, Column, ContractViolation, Document};
use lexis_core::lexicon::{LexSource, Lexicon, LEX_SOURCE_ATTR};
use lexis_core::{config, Pipeline};
use lexis_types::{InputError, KeyConfig, PipelineConfig, PipelineError};

const ILIAD: &str = "μῆνιν ἄειδε θεὰ Πηληϊάδεω Ἀχιλῆος οὐλομένην, ἣ μυρί’ Ἀχαιοῖς ἄλγε’ ἔθηκε.\n\
                     πολλὰς δ’ ἰφθίμους ψυχὰς Ἄϊδι προΐαψεν ἡρώων;";

fn default_pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn path_input_matches_memory_input() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ILIAD.as_bytes()).unwrap();

    let p = default_pipeline();
    let from_path = p.run_path(file.path()).unwrap();
    let from_memory = p.run(ILIAD).unwrap();

    assert_eq!(from_path.to_string(), from_memory.to_string());
    assert_eq!(from_path.sentences().len(), 2);
}

#[test]
fn byte_order_mark_is_not_a_token() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all("\u{FEFF}ὁ λόγος.".as_bytes()).unwrap();

    let doc = default_pipeline().run_path(file.path()).unwrap();
    let sentence = &doc.sentences()[0];
    let forms: Vec<_> = sentence.tokens().iter().map(|t| t.form()).collect();

    assert_eq!(forms, ["ὁ", "λόγος", "."]);
    assert_eq!(sentence.text(), "ὁ λόγος.");
    assert!(!doc.to_string().contains('\u{FEFF}'));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = default_pipeline().run_path(dir.path().join("missing.txt"));
    assert!(matches!(result, Err(PipelineError::Io { .. })));
}

#[test]
fn malformed_file_is_an_input_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\xCE\xBF \xC3\x28").unwrap();

    match default_pipeline().run_path(file.path()) {
        Err(PipelineError::Input(InputError::InvalidUtf8 { offset })) => assert_eq!(offset, 3),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn elided_forms_stay_whole() {
    let doc = default_pipeline().run(ILIAD).unwrap();
    let forms: Vec<_> = doc.sentences()[0]
        .tokens()
        .iter()
        .map(|t| t.form())
        .collect();
    assert!(forms.contains(&"μυρί’"));
    assert!(forms.contains(&"ἄλγε’"));
    assert_eq!(forms.last(), Some(&"."));
}

#[test]
fn serialized_output_parses_back_unchanged() {
    let mut cfg = PipelineConfig::default();
    cfg.emitter.version_header = true;
    let doc = Pipeline::new(cfg).unwrap().run(ILIAD).unwrap();

    let text = doc.to_string();
    let parsed = Document::parse(&text).unwrap();
    assert_eq!(parsed, doc);
    assert_eq!(parsed.to_string(), text);
    assert!(parsed.is_current_ruleset());
}

#[test]
fn lexicon_annotation_respects_the_contract() {
    let doc = default_pipeline().run(ILIAD).unwrap();
    let original = Document::parse(&doc.to_string()).unwrap();

    let forms = r#"{"form": "θεά", "lemma": "θεά", "upos": "NOUN", "feats": "Case=Voc|Gender=Fem|Number=Sing"}
{"form": "ἔθηκε", "lemma": "τίθημι", "upos": "VERB"}
"#;
    let lemmas = r#"{"lemma_norm": "θεά", "upos": "PROPN"}
{"lemma_norm": "ἤ", "upos": "CCONJ", "lex_subclass": "SMALL_WORDS:e"}
"#;
    let mut lexicon = Lexicon::new(KeyConfig::default());
    assert_eq!(lexicon.load_forms(forms.as_bytes()).unwrap(), 2);
    assert_eq!(lexicon.load_lemmas(lemmas.as_bytes()).unwrap(), 2);

    let mut annotated = Document::parse(&doc.to_string()).unwrap();
    assert_eq!(lexicon.annotate(&mut annotated), 3);
    verify_augmentation(&original, &annotated).unwrap();

    let reparsed = Document::parse(&annotated.to_string()).unwrap();
    verify_augmentation(&original, &reparsed).unwrap();
    let verb = reparsed.sentences()[0]
        .tokens()
        .iter()
        .find(|t| t.form() == "ἔθηκε")
        .unwrap();
    assert_eq!(verb.get(Column::Lemma), Some("τίθημι"));
    assert_eq!(verb.misc().get(LEX_SOURCE_ATTR), Some(LexSource::Forms.as_str()));

    let tokens = reparsed.sentences()[0].tokens();
    let goddess = tokens.iter().find(|t| t.form() == "θεὰ").unwrap();
    assert_eq!(goddess.get(Column::Upos), Some("NOUN"));

    let relative = tokens.iter().find(|t| t.form() == "ἣ").unwrap();
    assert_eq!(relative.get(Column::Upos), Some("CCONJ"));
    assert_eq!(
        relative.misc().get(LEX_SOURCE_ATTR),
        Some(LexSource::Lexicon.as_str())
    );
}

#[test]
fn tampered_rows_are_detected() {
    let doc = default_pipeline().run(ILIAD).unwrap();
    let text = doc.to_string();
    let tampered = text.replacen("\tθεὰ\t", "\tθεά\t", 1);

    let original = Document::parse(&text).unwrap();
    let changed = Document::parse(&tampered).unwrap();
    assert!(matches!(
        verify_augmentation(&original, &changed),
        Err(ContractViolation::Form { id: 3, .. })
    ));
}

#[test]
fn configuration_file_drives_the_pipeline() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"normalization": {"key": {"fold_case": true}}}"#)
        .unwrap();

    let cfg = config::load(file.path()).unwrap();
    let doc = Pipeline::new(cfg).unwrap().run("Ἀχιλῆος").unwrap();
    let token = &doc.sentences()[0].tokens()[0];

    assert_eq!(token.form(), "Ἀχιλῆος");
    assert_eq!(token.tok_key().as_str(), "αχιληοσ");
}

#[test]
fn batch_output_equals_sequential_output() {
    let p = default_pipeline();
    let inputs: Vec<&str> = ILIAD.lines().collect();

    let batch = p.run_batch(&inputs);
    for (input, result) in inputs.iter().zip(batch) {
        assert_eq!(result.unwrap().to_string(), p.run(input).unwrap().to_string());
    }
}
