//! Function strength aggregation.
//!
//! strength(f) = 0.5 × mean(Likert observations of f) + 0.5 × (fc_hits(f) / fc_expected_min) × 5

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use prism_common::CognitiveFunction;

use crate::key::{AnswerRow, KeyByQuestion};
use crate::normalise::normalise_answer;

/// Weight of the Likert mean in a strength; the forced-choice part takes the rest.
pub const LIKERT_WEIGHT: f64 = 0.5;

/// One value per cognitive function, indexed in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FunctionVector([f64; 8]);

impl FunctionVector {
    pub fn new(values: [f64; 8]) -> Self {
        Self(values)
    }

    pub fn get(&self, func: CognitiveFunction) -> f64 {
        self.0[func.index()]
    }

    pub fn set(&mut self, func: CognitiveFunction, value: f64) {
        self.0[func.index()] = value;
    }

    pub fn add(&mut self, func: CognitiveFunction, delta: f64) {
        self.0[func.index()] += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (CognitiveFunction, f64)> + '_ {
        CognitiveFunction::ALL.iter().map(move |&f| (f, self.0[f.index()]))
    }

    pub fn to_map(&self) -> BTreeMap<CognitiveFunction, f64> {
        self.iter().collect()
    }
}

/// Forced-choice counters produced by an external pre-pass, merged before row processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FcInit {
    #[serde(default, alias = "usedRealFCScores")]
    pub used_real_fc_scores: bool,
    #[serde(default, alias = "fcFuncCount")]
    pub fc_func_count: BTreeMap<CognitiveFunction, f64>,
    #[serde(default, alias = "blockFCCount")]
    pub block_fc_count: BTreeMap<String, f64>,
    #[serde(default, alias = "fcAnsweredCount")]
    pub fc_answered_count: Option<u32>,
}

/// How much of the answer set actually contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub rows_seen: u32,
    pub likert_used: u32,
    pub fc_hits: u32,
    pub skipped_no_key: u32,
    pub skipped_unparsed: u32,
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub strengths: FunctionVector,
    pub likert_means: FunctionVector,
    pub fc_counts: FunctionVector,
    pub coverage: Coverage,
    /// Forced-choice blocks answered: the pre-pass count plus in-row hits
    pub fc_answered: u32,
}

/// Fold answer rows into one strength per function.
///
/// Rows without a key record are skipped. A row may feed both paths: the Likert
/// path when its tag is a strength tag, the forced-choice path when it has an
/// option map. Forced-choice letters are read from the raw value, so they count
/// even though they do not parse as numbers.
pub fn aggregate(
    answers: &[AnswerRow],
    key_by_q: &KeyByQuestion,
    fc_init: Option<&FcInit>,
    fc_expected_min: f64,
) -> Aggregation {
    // running (mean, count) per function; a plain sum can overflow on extreme values
    let mut likert = [(0.0f64, 0u32); 8];
    let mut fc_counts = FunctionVector::default();
    let mut coverage = Coverage::default();

    if let Some(init) = fc_init {
        for (func, count) in &init.fc_func_count {
            fc_counts.set(*func, *count);
        }
    }

    for row in answers {
        coverage.rows_seen += 1;

        let Some(rec) = key_by_q.get(&row.question_id) else {
            tracing::trace!(question_id = %row.question_id, "no key record, skipping");
            coverage.skipped_no_key += 1;
            continue;
        };

        if let Some(func) = rec.strength_tag().and_then(|t| t.parse::<CognitiveFunction>().ok()) {
            let value = row
                .answer_value
                .as_ref()
                .and_then(|raw| normalise_answer(raw, &rec.scale_type, rec.reverse_scored));
            match value {
                Some(v) => {
                    let (mean, count) = &mut likert[func.index()];
                    *count += 1;
                    let n = f64::from(*count);
                    *mean += v / n - *mean / n;
                    coverage.likert_used += 1;
                }
                None => {
                    tracing::trace!(question_id = %row.question_id, "unparseable answer, skipping");
                    coverage.skipped_unparsed += 1;
                }
            }
        }

        if let (Some(fc_map), Some(raw)) = (rec.fc_map.as_ref(), row.answer_value.as_ref()) {
            let choice = raw.as_text().trim().to_uppercase();
            if let Some(func) = fc_map.get(&choice).and_then(|f| f.parse::<CognitiveFunction>().ok()) {
                fc_counts.add(func, 1.0);
                coverage.fc_hits += 1;
            }
        }
    }

    let mut likert_means = FunctionVector::default();
    let mut strengths = FunctionVector::default();
    for func in CognitiveFunction::ALL {
        let (mean, _) = likert[func.index()];
        let fc_score = (fc_counts.get(func) / fc_expected_min) * 5.0;
        likert_means.set(func, mean);
        strengths.set(func, LIKERT_WEIGHT * mean + (1.0 - LIKERT_WEIGHT) * fc_score);
    }

    let seeded = fc_init.and_then(|init| init.fc_answered_count).unwrap_or(0);
    let fc_answered = seeded.saturating_add(coverage.fc_hits);

    Aggregation { strengths, likert_means, fc_counts, coverage, fc_answered }
}
