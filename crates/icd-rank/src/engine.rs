//! Ranking pipeline.
//!
//! A response goes through: budget cut and blank guard, label strip, text
//! canonicalization, pattern extraction, validation with first-seen dedup,
//! suppression rules, scoring, truncation, and finally the keyword/default
//! fallback when nothing survived. Any stage may short-circuit to a fallback.
//!
//! [`Ranker::rank`] never fails: internal errors and panics are caught at the
//! boundary and turned into the configured default code.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use icd_model::{CandidateSet, Code, FrequencyModel, RankedResult};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{OptionsError, RankError};
use crate::fallback::keyword_fallback;
use crate::options::RankerOptions;
use crate::patterns::extract_candidates;
use crate::policy::{CodeFilter, Rejection, ValidityPolicy};
use crate::score::{CodeScore, Scorer};
use crate::text::{canonicalize_text, sort_labels, strip_prefix_label, truncate_chars};

/// Everything the pipeline decided for one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTrace {
    /// Whether a leading label such as `CODES:` was removed.
    pub label_stripped: bool,
    /// Raw pattern matches, in discovery order.
    pub matches: Vec<String>,
    /// Matches that failed validation.
    pub rejected: Vec<(String, Rejection)>,
    /// Valid codes removed by a suppression rule.
    pub suppressed: Vec<Code>,
    /// Scores of the surviving candidates, highest first (before truncation).
    pub scores: Vec<CodeScore>,
    pub result: RankedResult,
}

impl RankTrace {
    fn terminal(result: RankedResult) -> Self {
        Self {
            label_stripped: false,
            matches: Vec::new(),
            rejected: Vec::new(),
            suppressed: Vec::new(),
            scores: Vec::new(),
            result,
        }
    }
}

/// Turns model responses into ranked code lists.
///
/// The frequency model is shared read-only; a `Ranker` can be used from many
/// threads at once.
pub struct Ranker {
    options: RankerOptions,
    filter: Box<dyn CodeFilter>,
    model: Arc<FrequencyModel>,
    prefix_labels: Vec<String>,
}

impl fmt::Debug for Ranker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ranker")
            .field("options", &self.options)
            .field("model_codes", &self.model.len())
            .finish_non_exhaustive()
    }
}

impl Ranker {
    /// Creates a ranker using [`ValidityPolicy`] built from `options`.
    pub fn new(options: RankerOptions, model: Arc<FrequencyModel>) -> Result<Self, OptionsError> {
        options.validate()?;
        let filter = Box::new(ValidityPolicy::from_options(&options));
        let prefix_labels = sort_labels(&options.prefix_labels);
        Ok(Self {
            options,
            filter,
            model,
            prefix_labels,
        })
    }

    /// Replaces the validity policy with another predicate.
    #[must_use]
    pub fn with_filter<F: CodeFilter + 'static>(mut self, filter: F) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn options(&self) -> &RankerOptions {
        &self.options
    }

    pub fn model(&self) -> &FrequencyModel {
        &self.model
    }

    fn default_result(&self) -> RankedResult {
        RankedResult::default_fallback(self.options.default_code.clone())
    }

    /// Ranks a response that may be missing.
    pub fn rank(&self, response: Option<&str>) -> RankedResult {
        match response {
            Some(text) => self.rank_text(text),
            None => {
                debug!("missing response; using default code");
                self.default_result()
            }
        }
    }

    pub fn rank_text(&self, response: &str) -> RankedResult {
        match self.guarded(response) {
            Ok(trace) => trace.result,
            Err(error) => {
                warn!(%error, "ranking failed; using default code");
                self.default_result()
            }
        }
    }

    /// Ranks raw bytes; anything that is not UTF-8 is treated as "not text".
    pub fn rank_bytes(&self, response: &[u8]) -> RankedResult {
        match std::str::from_utf8(response) {
            Ok(text) => self.rank_text(text),
            Err(error) => {
                debug!(%error, "response is not UTF-8; using default code");
                self.default_result()
            }
        }
    }

    /// Ranks a JSON value; only strings are text.
    pub fn rank_value(&self, response: &Value) -> RankedResult {
        match response {
            Value::String(text) => self.rank_text(text),
            other => {
                debug!(kind = json_kind(other), "response is not a string; using default code");
                self.default_result()
            }
        }
    }

    /// [`Ranker::rank`] serialized as `"A, B, C"`.
    pub fn rank_to_string(&self, response: Option<&str>) -> String {
        self.rank(response).to_output()
    }

    /// Runs the pipeline and returns every intermediate decision.
    pub fn explain(&self, response: &str) -> Result<RankTrace, RankError> {
        self.guarded(response)
    }

    fn guarded(&self, response: &str) -> Result<RankTrace, RankError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(response))) {
            Ok(result) => result,
            Err(payload) => Err(RankError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    fn run(&self, response: &str) -> Result<RankTrace, RankError> {
        let budgeted = truncate_chars(response, self.options.max_input_chars);
        if budgeted.trim().is_empty() {
            debug!("blank response; using default code");
            return Ok(RankTrace::terminal(self.default_result()));
        }

        let (body, label_stripped) = strip_prefix_label(budgeted, &self.prefix_labels);
        if body.is_empty() {
            debug!("response holds only a label; using default code");
            return Ok(RankTrace::terminal(self.default_result()));
        }

        let canonical = canonicalize_text(body);
        trace!(text = %canonical, "canonicalized response");
        let matches: Vec<String> = extract_candidates(&canonical, self.options.pattern_mode)
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut candidates = CandidateSet::new();
        let mut rejected = Vec::new();
        for raw in &matches {
            let Some(code) = Code::canonicalize(raw) else {
                continue;
            };
            match self.filter.check(&code) {
                Ok(()) => candidates.push(code),
                Err(reason) => rejected.push((raw.clone(), reason)),
            }
        }
        let mut unique = candidates.dedup();
        debug!(
            matches = matches.len(),
            accepted = candidates.len(),
            unique = unique.len(),
            rejected = rejected.len(),
            "extracted candidates"
        );

        let mut suppressed = Vec::new();
        for rule in &self.options.suppression_rules {
            if rule.is_corroborated(&canonical) {
                continue;
            }
            unique.retain(|code| {
                if *code == rule.code {
                    suppressed.push(code.clone());
                    false
                } else {
                    true
                }
            });
        }
        if !suppressed.is_empty() {
            debug!(suppressed = suppressed.len(), "suppressed uncorroborated codes");
        }

        if unique.is_empty() {
            let result = match keyword_fallback(&canonical, &self.options.keyword_fallbacks) {
                Some(code) => {
                    debug!(code = %code, "no valid candidates; keyword fallback matched");
                    RankedResult::keyword_fallback(code.clone())
                }
                None => {
                    debug!("no valid candidates or keywords; using default code");
                    self.default_result()
                }
            };
            return Ok(RankTrace {
                label_stripped,
                matches,
                rejected,
                suppressed,
                scores: Vec::new(),
                result,
            });
        }

        let scores = Scorer::new(&self.model, &self.options.bonuses).rank(&unique);
        let top: Vec<Code> = scores
            .iter()
            .take(self.options.max_codes)
            .map(|score| score.code.clone())
            .collect();
        let result = RankedResult::ranked(top);
        if result.is_empty() || result.len() > self.options.max_codes {
            return Err(RankError::Invariant(format!(
                "{} codes for a cap of {}",
                result.len(),
                self.options.max_codes
            )));
        }
        debug!(codes = %result, "ranked response");

        Ok(RankTrace {
            label_stripped,
            matches,
            rejected,
            suppressed,
            scores,
            result,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
