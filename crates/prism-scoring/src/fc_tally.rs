//! Forced-choice block tally.
//!
//! Pre-pass over a session's forced-choice block responses. Each chosen option
//! carries a weight vector (usually over functions); the tally sums them and
//! can be rendered as 0–100 function scores, as type shares, or as the hit
//! counter seed consumed by the aggregator.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use prism_common::CognitiveFunction;

use crate::aggregate::FcInit;

/// An option of a forced-choice block and the weights it contributes when chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcOption {
    pub id: String,
    pub block_id: String,
    #[serde(default)]
    pub option_code: Option<String>,
    #[serde(default, alias = "weights_json")]
    pub weights: BTreeMap<String, f64>,
}

/// One chosen option in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcResponse {
    pub block_id: String,
    pub option_id: String,
}

/// How tally values are normalised for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FcBasis {
    /// Scale each key to 0–100 against the largest tally
    #[default]
    Functions,
    /// L1-normalise the tally into shares summing to 1
    Types,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FcTally {
    pub blocks_answered: u32,
    pub unknown_options: u32,
    pub tally: BTreeMap<String, f64>,
}

/// Sum option weights over a session's responses.
pub fn tally_responses(options: &[FcOption], responses: &[FcResponse]) -> FcTally {
    let by_id: HashMap<&str, &FcOption> = options.iter().map(|o| (o.id.as_str(), o)).collect();
    let mut out = FcTally::default();

    for response in responses {
        let Some(option) = by_id.get(response.option_id.as_str()) else {
            tracing::warn!(option_id = %response.option_id, block_id = %response.block_id, "forced-choice option not found");
            out.unknown_options += 1;
            continue;
        };
        out.blocks_answered += 1;
        for (key, weight) in &option.weights {
            *out.tally.entry(key.clone()).or_insert(0.0) += weight;
        }
    }

    tracing::debug!(
        blocks_answered = out.blocks_answered,
        keys = out.tally.len(),
        "forced-choice tally complete"
    );
    out
}

fn round_to(x: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (x * f).round() / f
}

impl FcTally {
    /// Each key scaled to 0–100 against the largest tally value, 2 decimals.
    pub fn function_scores(&self) -> BTreeMap<String, f64> {
        let max = self.tally.values().copied().fold(1e-9, f64::max);
        self.tally
            .iter()
            .map(|(k, v)| (k.clone(), round_to(v / max * 100.0, 2)))
            .collect()
    }

    /// Tally L1-normalised into shares, 4 decimals.
    pub fn type_shares(&self) -> BTreeMap<String, f64> {
        let sum: f64 = self.tally.values().sum();
        let sum = if sum != 0.0 { sum } else { 1e-9 };
        self.tally
            .iter()
            .map(|(k, v)| (k.clone(), round_to(v / sum, 4)))
            .collect()
    }

    pub fn scores(&self, basis: FcBasis) -> BTreeMap<String, f64> {
        match basis {
            FcBasis::Functions => self.function_scores(),
            FcBasis::Types     => self.type_shares(),
        }
    }

    /// Function-keyed tally entries as aggregator seed counts. Other keys are dropped.
    pub fn to_fc_init(&self) -> FcInit {
        let fc_func_count = self
            .tally
            .iter()
            .filter_map(|(k, v)| k.parse::<CognitiveFunction>().ok().map(|f| (f, *v)))
            .collect();
        FcInit {
            used_real_fc_scores: true,
            fc_func_count,
            block_fc_count: BTreeMap::new(),
            fc_answered_count: Some(self.blocks_answered),
        }
    }
}
