//! Property tests for the ranking contract.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use icd_model::{FrequencyModel, RankOutcome};
use icd_rank::{Ranker, RankerOptions};

fn ranker(options: RankerOptions) -> Ranker {
    Ranker::new(options, Arc::new(FrequencyModel::empty())).unwrap()
}

proptest! {
    #[test]
    fn results_are_bounded_and_unique(text in "[A-Za-z0-9 .,:;\n-]{0,200}") {
        for options in [RankerOptions::constrained(), RankerOptions::open_vocabulary()] {
            let cap = options.max_codes;
            let result = ranker(options).rank(Some(text.as_str()));
            prop_assert!(!result.is_empty());
            prop_assert!(result.len() <= cap);
            let unique: HashSet<_> = result.codes().iter().collect();
            prop_assert_eq!(unique.len(), result.len());
        }
    }

    #[test]
    fn allow_list_is_respected(text in "[A-Z0-9 .,]{0,120}") {
        let options = RankerOptions::constrained();
        let vocabulary = options.vocabulary.clone();
        let result = ranker(options).rank(Some(text.as_str()));
        if result.outcome() == RankOutcome::Ranked {
            for code in result.codes() {
                prop_assert!(vocabulary.allows(code));
            }
        }
    }

    #[test]
    fn blank_input_is_exactly_the_default(text in "[ \t\r\n]{0,40}") {
        let result = ranker(RankerOptions::constrained()).rank(Some(text.as_str()));
        prop_assert_eq!(result.to_output(), "R6889");
        prop_assert_eq!(result.outcome(), RankOutcome::DefaultFallback);
    }

    #[test]
    fn ranking_is_deterministic(text in "\\PC{0,120}") {
        let ranker = ranker(RankerOptions::open_vocabulary());
        prop_assert_eq!(ranker.rank(Some(text.as_str())), ranker.rank(Some(text.as_str())));
    }
}
