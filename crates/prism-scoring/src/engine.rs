//! Scoring entry point.
//!
//! `score_assessment` is pure and synchronous: identical input produces a
//! bit-identical result, and no input makes it fail.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prism_common::EngineConfig;

use crate::aggregate::{aggregate, FcInit};
use crate::assemble::{assemble, ScoreResult};
use crate::classify::classify;
use crate::key::{AnswerRow, KeyByQuestion};

/// Everything one scoring call needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreInput {
    /// Only used to correlate log events.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub answers: Vec<AnswerRow>,
    #[serde(default, alias = "keyByQ")]
    pub key_by_q: KeyByQuestion,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default, alias = "fcInit")]
    pub fc_init: Option<FcInit>,
}

/// Map questionnaire answers to a ranked type classification.
pub fn score_assessment(input: &ScoreInput) -> ScoreResult {
    let config = &input.config;
    let table = config.prototypes();

    let aggregation = aggregate(
        &input.answers,
        &input.key_by_q,
        input.fc_init.as_ref(),
        config.effective_fc_expected_min(),
    );
    let classification = classify(&aggregation.strengths, table, config.effective_softmax_temp());
    let result = assemble(&classification, &aggregation, table, config);

    tracing::debug!(
        session_id = ?input.session_id,
        type_code = %result.profile.type_code,
        gap_to_second = result.gap_to_second,
        rows = aggregation.coverage.rows_seen,
        likert_used = aggregation.coverage.likert_used,
        fc_hits = aggregation.coverage.fc_hits,
        skipped = aggregation.coverage.skipped_no_key + aggregation.coverage.skipped_unparsed,
        custom_prototypes = config.type_prototypes.is_some(),
        "assessment scored"
    );

    result
}
