//! End-to-end ranking behaviour.

use std::fs;
use std::sync::Arc;
use std::thread;

use icd_ingest::build_frequency_model;
use icd_model::{Code, FrequencyModel, RankOutcome};
use icd_rank::{CategoryBonuses, OptionsError, PatternMode, Ranker, RankerOptions};

fn constrained() -> Ranker {
    Ranker::new(RankerOptions::constrained(), Arc::new(FrequencyModel::empty())).unwrap()
}

fn open() -> Ranker {
    Ranker::new(RankerOptions::open_vocabulary(), Arc::new(FrequencyModel::empty())).unwrap()
}

#[test]
fn test_labelled_duplicates_are_collapsed() {
    let result = constrained().rank(Some("CODES: I21.4, I21.4, R07.9"));
    assert_eq!(result.to_output(), "I214, R079");
    assert_eq!(result.outcome(), RankOutcome::Ranked);
}

#[test]
fn test_nausea_without_codes_uses_keyword_table() {
    let result = constrained().rank(Some("Patient had mild nausea, no specific diagnosis."));
    assert_eq!(result.to_output(), "R11");
    assert_eq!(result.outcome(), RankOutcome::KeywordFallback);
}

#[test]
fn test_rejected_tokens_fall_through_to_keywords() {
    let result = constrained().rank(Some("ICD10 unclear; chest pain on exertion"));
    assert_eq!(result.to_output(), "R079");
}

#[test]
fn test_unusable_inputs_return_default_code() {
    let ranker = constrained();
    for result in [
        ranker.rank(None),
        ranker.rank(Some("")),
        ranker.rank(Some("   \n\t ")),
        ranker.rank(Some("Well appearing, discharged home.")),
        ranker.rank_bytes(&[0xff, 0xfe, 0x49]),
        ranker.rank_value(&serde_json::json!({ "codes": ["I21.4"] })),
        ranker.rank_value(&serde_json::Value::Null),
    ] {
        assert_eq!(result.to_output(), "R6889");
        assert_eq!(result.outcome(), RankOutcome::DefaultFallback);
    }
}

#[test]
fn test_hemorrhage_code_needs_corroboration() {
    let ranker = constrained();
    assert_eq!(ranker.rank_to_string(Some("I62.03, I21.4")), "I214");
    assert_eq!(
        ranker.rank_to_string(Some("Subdural hemorrhage on CT: I62.03")),
        "I6203"
    );
    assert_eq!(ranker.rank_to_string(Some("Possible stroke, I62.03, I21.4")), "I6203, I214");
}

#[test]
fn test_suppressing_the_only_code_falls_back() {
    let trace = constrained().explain("I62.03").unwrap();
    assert_eq!(trace.suppressed, vec![Code::new("I6203").unwrap()]);
    assert_eq!(trace.result.outcome(), RankOutcome::DefaultFallback);
}

#[test]
fn test_training_frequency_dominates_bonus_ties() {
    let report = build_frequency_model([
        Some("N19"),
        Some("N19, R07.9"),
        Some("N19"),
        None,
    ]);
    let ranker = Ranker::new(RankerOptions::constrained(), Arc::new(report.model)).unwrap();

    let result = ranker.rank(Some("R07.9, I21.4, N19"));

    assert_eq!(result.to_output(), "N19, R079, I214");
}

#[test]
fn test_empty_training_table_ranks_by_bonus_only() {
    let report = build_frequency_model(Vec::<Option<&str>>::new());
    assert!(report.model.is_empty());
    let ranker = Ranker::new(RankerOptions::open_vocabulary(), Arc::new(report.model)).unwrap();

    let result = ranker.rank(Some("W18.30XA after fall, S06.6X1A"));

    assert_eq!(result.to_output(), "S066X1A, W1830XA");
}

#[test]
fn test_caps_follow_preset() {
    let text = "I21.4 I48.91 I82.431 K75.81 N19 R53.1";
    assert_eq!(constrained().rank(Some(text)).len(), 3);
    assert_eq!(
        open().rank_to_string(Some("A01 B02 C03 D04 E05 F06")),
        "A01, B02, C03, D04, E05"
    );
}

#[test]
fn test_open_vocabulary_still_rejects_reserved_and_suspicious_codes() {
    assert_eq!(open().rank_to_string(Some("U07.1, J18.9, I21.000")), "J189");
}

#[test]
fn test_pool_mode_adds_loose_matches() {
    let text = "FOO_I21.4 and N19";
    assert_eq!(open().rank_to_string(Some(text)), "N19");

    let pooled = Ranker::new(
        RankerOptions::open_vocabulary().with_pattern_mode(PatternMode::Pool),
        Arc::new(FrequencyModel::empty()),
    )
    .unwrap();
    assert_eq!(pooled.rank_to_string(Some(text)), "N19, I214");
}

#[test]
fn test_injected_filter_replaces_policy() {
    let ranker = open().with_filter(|code: &Code| code.category() == 'R');
    assert_eq!(ranker.rank_to_string(Some("I21.4, R07.9")), "R079");
}

#[test]
fn test_options_loaded_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranker.json");
    fs::write(
        &path,
        r#"{ "max_codes": 1, "vocabulary": { "kind": "open" }, "default_code": "R69" }"#,
    )
    .unwrap();

    let options = RankerOptions::from_json_path(&path).unwrap();
    let ranker = Ranker::new(options, Arc::new(FrequencyModel::empty())).unwrap();

    assert_eq!(ranker.rank_to_string(Some("J18.9, N19")), "J189");
    assert_eq!(ranker.rank_to_string(None), "R69");
}

#[test]
fn test_invalid_options_are_rejected_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"max_codes\": ").unwrap();
    assert!(matches!(
        RankerOptions::from_json_path(&path),
        Err(OptionsError::Parse { .. })
    ));

    let result = Ranker::new(
        RankerOptions::constrained().with_max_codes(0),
        Arc::new(FrequencyModel::empty()),
    );
    assert!(matches!(result, Err(OptionsError::Invalid(_))));
}

#[test]
fn test_ranker_is_shared_across_threads() {
    let ranker = Arc::new(constrained());
    let inputs = ["I21.4", "R07.9, N19", "nausea", ""];
    let outputs: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|&text| {
                let ranker = Arc::clone(&ranker);
                scope.spawn(move || ranker.rank_to_string(Some(text)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(outputs, vec!["I214", "R079, N19", "R11", "R6889"]);
}

#[test]
fn test_blank_suppression_keyword_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranker.json");
    fs::write(
        &path,
        r#"{ "suppression_rules": [ { "code": "I62.03", "keywords": ["BLEED", ""] } ] }"#,
    )
    .unwrap();

    assert!(matches!(
        RankerOptions::from_json_path(&path),
        Err(OptionsError::Invalid(_))
    ));
}

#[test]
fn test_extreme_bonus_keeps_ranking() {
    let model = build_frequency_model([Some("R07.9")]).model;
    let options = RankerOptions::constrained().with_bonuses(CategoryBonuses {
        symptom_bonus: u64::MAX,
        ..CategoryBonuses::default()
    });
    let ranker = Ranker::new(options, Arc::new(model)).unwrap();

    let result = ranker.rank(Some("R07.9, I21.4"));

    assert_eq!(result.to_output(), "R079, I214");
    assert_eq!(result.outcome(), RankOutcome::Ranked);
}
