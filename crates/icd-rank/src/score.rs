//! Frequency-weighted scoring with category bonuses.
//!
//! A candidate's score is its training-set count plus a bonus for its
//! category. Symptom codes and specific-disease codes each receive a bonus of
//! comparable size so neither class starves when the frequency model is
//! sparse; once a code has been seen often, its count dominates.

use icd_model::{Code, FrequencyModel};
use serde::Serialize;

use crate::options::CategoryBonuses;

/// Coarse class of a code, taken from its leading letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCategory {
    Symptom,
    Disease,
    Other,
}

impl CategoryBonuses {
    pub fn classify(&self, code: &Code) -> CodeCategory {
        let lead = code.category().to_ascii_uppercase();
        let has = |prefixes: &str| prefixes.chars().any(|ch| ch.to_ascii_uppercase() == lead);
        if has(&self.symptom_prefixes) {
            CodeCategory::Symptom
        } else if has(&self.disease_prefixes) {
            CodeCategory::Disease
        } else {
            CodeCategory::Other
        }
    }

    pub fn bonus(&self, category: CodeCategory) -> u64 {
        match category {
            CodeCategory::Symptom => self.symptom_bonus,
            CodeCategory::Disease => self.disease_bonus,
            CodeCategory::Other => 0,
        }
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreComponent {
    pub name: &'static str,
    pub value: u64,
    pub description: String,
}

/// Score for one candidate, with its breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeScore {
    pub code: Code,
    pub category: CodeCategory,
    pub score: u64,
    pub components: Vec<ScoreComponent>,
}

impl CodeScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("{}: {} ({})", c.name, c.value, c.description))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Scores candidates against a frequency model.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    model: &'a FrequencyModel,
    bonuses: &'a CategoryBonuses,
}

impl<'a> Scorer<'a> {
    pub fn new(model: &'a FrequencyModel, bonuses: &'a CategoryBonuses) -> Self {
        Self { model, bonuses }
    }

    pub fn score(&self, code: &Code) -> CodeScore {
        let frequency = u64::from(self.model.count(code));
        let category = self.bonuses.classify(code);
        let bonus = self.bonuses.bonus(category);
        CodeScore {
            code: code.clone(),
            category,
            score: frequency.saturating_add(bonus),
            components: vec![
                ScoreComponent {
                    name: "Frequency",
                    value: frequency,
                    description: format!("seen {frequency} times in training"),
                },
                ScoreComponent {
                    name: "Category bonus",
                    value: bonus,
                    description: format!("{category:?} code").to_lowercase(),
                },
            ],
        }
    }

    /// Scores `codes` and sorts them by score, highest first.
    ///
    /// The sort is stable, so equal scores keep their first-seen order.
    pub fn rank(&self, codes: &[Code]) -> Vec<CodeScore> {
        let mut scores: Vec<CodeScore> = codes.iter().map(|code| self.score(code)).collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> Code {
        Code::new(raw).unwrap()
    }

    #[test]
    fn classifies_by_leading_letter() {
        let bonuses = CategoryBonuses::default();
        assert_eq!(bonuses.classify(&code("R079")), CodeCategory::Symptom);
        assert_eq!(bonuses.classify(&code("I214")), CodeCategory::Disease);
        assert_eq!(bonuses.classify(&code("S066X1A")), CodeCategory::Disease);
        assert_eq!(bonuses.classify(&code("W1830XA")), CodeCategory::Other);
    }

    #[test]
    fn frequency_breaks_equal_bonuses() {
        let model: FrequencyModel = ["N19", "N19", "I214"].into_iter().map(code).collect();
        let bonuses = CategoryBonuses::default();
        let ranked = Scorer::new(&model, &bonuses).rank(&[code("I214"), code("N19")]);
        assert_eq!(ranked[0].code.as_str(), "N19");
        assert_eq!(ranked[0].score, 102);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let model = FrequencyModel::empty();
        let bonuses = CategoryBonuses::default();
        let ranked = Scorer::new(&model, &bonuses).rank(&[code("I214"), code("R079")]);
        let order: Vec<&str> = ranked.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(order, vec!["I214", "R079"]);
    }

    #[test]
    fn huge_bonus_saturates() {
        let model: FrequencyModel = ["R079"].into_iter().map(code).collect();
        let bonuses = CategoryBonuses {
            symptom_bonus: u64::MAX,
            ..CategoryBonuses::default()
        };
        let ranked = Scorer::new(&model, &bonuses).rank(&[code("I214"), code("R079")]);
        assert_eq!(ranked[0].code.as_str(), "R079");
        assert_eq!(ranked[0].score, u64::MAX);
        assert_eq!(ranked[1].score, 100);
    }

    #[test]
    fn external_cause_codes_get_no_bonus() {
        let model = FrequencyModel::empty();
        let bonuses = CategoryBonuses::default();
        let score = Scorer::new(&model, &bonuses).score(&code("W1830XA"));
        assert_eq!(score.score, 0);
        assert!(score.explain().contains("Category bonus: 0"));
    }
}
