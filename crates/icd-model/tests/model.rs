use icd_model::{CandidateSet, Code, FrequencyModel, RankedResult};
use proptest::prelude::*;

proptest! {
    #[test]
    fn canonicalization_is_idempotent(raw in "\\PC{0,16}") {
        if let Some(code) = Code::canonicalize(&raw) {
            prop_assert_eq!(Code::canonicalize(code.as_str()), Some(code.clone()));
            prop_assert!(code.as_str().chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit()));
        }
    }

    #[test]
    fn dotted_and_flat_forms_agree(
        letter in "[A-Za-z]",
        digits in "[0-9]{2}",
        tail in "[A-Za-z0-9]{0,4}",
    ) {
        let dotted = format!("{letter}{digits}.{tail}");
        let flat = format!("{letter}{digits}{tail}");
        prop_assert_eq!(Code::canonicalize(&dotted), Code::canonicalize(&flat));
    }

    #[test]
    fn dedup_has_no_duplicates(raw in prop::collection::vec("[A-Z][0-9]{2}[0-9]?", 0..20)) {
        let set: CandidateSet = raw.iter().filter_map(|r| Code::canonicalize(r)).collect();
        let unique = set.dedup();
        let mut sorted = unique.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), unique.len());
    }
}

#[test]
fn ranked_result_round_trips_through_json() {
    let result = RankedResult::ranked(vec![
        Code::new("I21.4").unwrap(),
        Code::new("R07.9").unwrap(),
    ]);
    let json = serde_json::to_string(&result).expect("serialize result");
    assert!(json.contains("\"ranked\""));
    let back: RankedResult = serde_json::from_str(&json).expect("deserialize result");
    assert_eq!(back, result);
}

#[test]
fn frequency_model_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FrequencyModel>();
}
