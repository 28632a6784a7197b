//! Result assembly: packages a classification into the public profile shape.
//!
//! Purely structural apart from rounding of the confidence metrics and diagnostics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use prism_common::config::{ConfBandCuts, ConfRawParams, DimsThresholds, FitBandThresholds};
use prism_common::{CognitiveFunction, EngineConfig, PrototypeTable, Quadrant, Role, TypeCode};

use crate::aggregate::{Aggregation, Coverage, FunctionVector};
use crate::classify::Classification;

/// Number of ranked candidates exposed in `top_types`.
pub const TOP_N: usize = 3;

/// Strength must lie this close to its role expectation to count as coherent.
pub const SEAT_TOLERANCE: f64 = 0.75;

/// A function's dimension level is its strength scaled by this factor.
pub const DIMENSION_SCALE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedType {
    pub code: TypeCode,
    pub share: f64,
    pub score: f64,
}

/// Per-source block breakdown; reserved for downstream enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockScores {
    pub likert: BTreeMap<String, f64>,
    pub fc: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadrantScores {
    #[serde(rename = "Core")]
    pub core: f64,
    #[serde(rename = "Critic")]
    pub critic: f64,
    #[serde(rename = "Hidden")]
    pub hidden: f64,
    #[serde(rename = "Instinct")]
    pub instinct: f64,
}

impl QuadrantScores {
    fn slot(&mut self, quadrant: Quadrant) -> &mut f64 {
        match quadrant {
            Quadrant::Core     => &mut self.core,
            Quadrant::Critic   => &mut self.critic,
            Quadrant::Hidden   => &mut self.hidden,
            Quadrant::Instinct => &mut self.instinct,
        }
    }
}

/// Validity indicators; reserved for downstream enrichment and always neutral here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validity {
    pub attention: f64,
    pub inconsistency: f64,
    pub sd_index: f64,
    pub duplicates: f64,
    pub state_modifiers: BTreeMap<String, f64>,
    pub required_tag_gaps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitBand {
    HighFit,
    ModerateFit,
    LowFit,
}

/// Whether enough forced-choice blocks were answered to trust the forced-choice half of a strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FcCoverageBucket {
    Full,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimsHighlights {
    pub coherent: Vec<CognitiveFunction>,
    pub unique: Vec<CognitiveFunction>,
}

/// How far one type's raw score sits from the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMetric {
    pub code: TypeCode,
    pub raw: f64,
    /// Absolute distance from the mean raw score over all types
    pub dist: f64,
    /// Raw score over the perfect-fit score, clamped to [0, 1]
    pub norm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Fraction of functions whose strength sits near the expectation for their role in the top type
    pub seat_coherence: f64,
    /// Mean strength per quadrant of the top type
    pub quadrants: QuadrantScores,
    pub coverage: Coverage,
    pub dimensions: BTreeMap<CognitiveFunction, f64>,
    pub dims_highlights: DimsHighlights,
    pub distance_metrics: Vec<DistanceMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub type_code: TypeCode,
    #[serde(rename = "type")]
    pub type_alias: TypeCode,
    pub base_func: CognitiveFunction,
    pub creative_func: CognitiveFunction,
    pub top_types: Vec<RankedType>,
    pub strengths: BTreeMap<CognitiveFunction, f64>,
    pub type_scores: BTreeMap<TypeCode, f64>,
    pub close_call: bool,
    pub conf_raw: f64,
    pub confidence: Confidence,
    /// Top score as a percentage of the perfect-fit score
    pub fit_pct: f64,
    pub fit_band: FitBand,
    pub fc_answered_ct: u32,
    pub fc_coverage_bucket: FcCoverageBucket,
    pub blocks: BlockScores,
    pub blocks_norm: QuadrantScores,
    pub overlay: String,
    pub overlay_neuro: String,
    pub overlay_state: String,
    pub validity: Validity,
    pub diagnostics: Diagnostics,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub profile: Profile,
    pub gap_to_second: f64,
    /// Currently identical to `gap_to_second`.
    pub confidence_margin: f64,
    pub results_version: String,
}

pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// Shannon entropy of the share distribution, in bits.
pub fn entropy_bits(shares: &[f64; 16]) -> f64 {
    -shares
        .iter()
        .filter(|p| **p > 0.0)
        .map(|p| p * p.log2())
        .sum::<f64>()
}

/// Logistic confidence from the score gap, the share gap and the entropy of the shares.
pub fn conf_raw(classification: &Classification, params: &ConfRawParams) -> f64 {
    let score_gap = finite_or_zero(classification.score_gap_to_second());
    let share_gap = finite_or_zero(classification.gap_to_second());
    let entropy = finite_or_zero(entropy_bits(&classification.shares));
    let z = params.a * score_gap + params.b * share_gap - params.c * entropy;
    round4(1.0 / (1.0 + (-z).exp()))
}

pub fn confidence_band(conf_raw: f64, cuts: &ConfBandCuts) -> Confidence {
    if conf_raw >= cuts.high {
        Confidence::High
    } else if conf_raw >= cuts.moderate {
        Confidence::Moderate
    } else {
        Confidence::Low
    }
}

/// `score` as a percentage of `max_score`, clamped to 0–100. Non-finite scores count as 0.
pub fn fit_percent(score: f64, max_score: f64) -> f64 {
    100.0 * (finite_or_zero(score) / max_score).clamp(0.0, 1.0)
}

pub fn fit_band(fit_pct: f64, thresholds: &FitBandThresholds) -> FitBand {
    if fit_pct >= thresholds.high_fit {
        FitBand::HighFit
    } else if fit_pct >= thresholds.moderate_fit {
        FitBand::ModerateFit
    } else {
        FitBand::LowFit
    }
}

pub fn fc_coverage_bucket(answered: u32, expected_min: f64) -> FcCoverageBucket {
    if f64::from(answered) >= expected_min {
        FcCoverageBucket::Full
    } else {
        FcCoverageBucket::Low
    }
}

pub fn dimensions(strengths: &FunctionVector) -> BTreeMap<CognitiveFunction, f64> {
    strengths
        .iter()
        .map(|(f, s)| (f, round3(s * DIMENSION_SCALE)))
        .collect()
}

/// Functions whose dimension level reaches the coherent / unique thresholds, in canonical order.
pub fn dims_highlights(dims: &BTreeMap<CognitiveFunction, f64>, thresholds: &DimsThresholds) -> DimsHighlights {
    let at_least = |cut: f64| -> Vec<CognitiveFunction> {
        CognitiveFunction::ALL
            .iter()
            .copied()
            .filter(|f| dims.get(f).is_some_and(|d| *d >= cut))
            .collect()
    };
    DimsHighlights {
        coherent: at_least(thresholds.coherent),
        unique: at_least(thresholds.unique),
    }
}

pub fn distance_metrics(scores: &[f64; 16], max_score: f64) -> Vec<DistanceMetric> {
    let raw: Vec<f64> = scores.iter().map(|s| finite_or_zero(*s)).collect();
    let mean = raw.iter().map(|s| s / raw.len() as f64).sum::<f64>();
    TypeCode::ALL
        .iter()
        .map(|&code| {
            let r = raw[code.index()];
            DistanceMetric {
                code,
                raw: round3(r),
                dist: round3((r - mean).abs()),
                norm: round4((r / max_score).clamp(0.0, 1.0)),
            }
        })
        .collect()
}

pub fn seat_coherence(top: TypeCode, strengths: &FunctionVector, table: &PrototypeTable) -> f64 {
    let aligned = table
        .assignment(top)
        .filter(|(func, role)| (strengths.get(*func) - role.expected_strength()).abs() <= SEAT_TOLERANCE)
        .count();
    aligned as f64 / CognitiveFunction::ALL.len() as f64
}

pub fn quadrant_means(top: TypeCode, strengths: &FunctionVector, table: &PrototypeTable) -> QuadrantScores {
    let mut sums = QuadrantScores::default();
    for (func, role) in table.assignment(top) {
        *sums.slot(role.quadrant()) += strengths.get(func);
    }
    // each quadrant holds exactly two roles
    QuadrantScores {
        core: round3(sums.core / 2.0),
        critic: round3(sums.critic / 2.0),
        hidden: round3(sums.hidden / 2.0),
        instinct: round3(sums.instinct / 2.0),
    }
}

/// Build the public result from the pipeline's intermediate outputs.
pub fn assemble(
    classification: &Classification,
    aggregation: &Aggregation,
    table: &PrototypeTable,
    config: &EngineConfig,
) -> ScoreResult {
    let top = classification.top();
    let gap = round3(classification.gap_to_second());

    let top_types = classification
        .ranking
        .iter()
        .take(TOP_N)
        .map(|&code| RankedType {
            code,
            share: classification.share(code),
            score: classification.score(code),
        })
        .collect();

    let type_scores = TypeCode::ALL
        .iter()
        .map(|&code| (code, classification.score(code)))
        .collect();

    let fit_max_score = config.effective_fit_max_score();
    let dims = dimensions(&aggregation.strengths);
    let diagnostics = Diagnostics {
        seat_coherence: round3(seat_coherence(top, &aggregation.strengths, table)),
        quadrants: quadrant_means(top, &aggregation.strengths, table),
        coverage: aggregation.coverage,
        dims_highlights: dims_highlights(&dims, &config.dims_thresholds),
        dimensions: dims,
        distance_metrics: distance_metrics(&classification.scores, fit_max_score),
    };

    let conf = conf_raw(classification, &config.conf_raw_params);
    let fit_pct = round3(fit_percent(classification.score(top), fit_max_score));

    let profile = Profile {
        type_code: top,
        type_alias: top,
        base_func: table.function_in(top, Role::Base),
        creative_func: table.function_in(top, Role::Creative),
        top_types,
        strengths: aggregation.strengths.to_map(),
        type_scores,
        close_call: classification.gap_to_second() < config.close_call_threshold,
        conf_raw: conf,
        confidence: confidence_band(conf, &config.conf_band_cuts),
        fit_pct,
        fit_band: fit_band(fit_pct, &config.fit_band_thresholds),
        fc_answered_ct: aggregation.fc_answered,
        fc_coverage_bucket: fc_coverage_bucket(aggregation.fc_answered, config.effective_fc_expected_min()),
        blocks: BlockScores::default(),
        blocks_norm: QuadrantScores::default(),
        overlay: "0".to_string(),
        overlay_neuro: "0".to_string(),
        overlay_state: "0".to_string(),
        validity: Validity::default(),
        diagnostics,
        version: config.results_version.clone(),
    };

    ScoreResult {
        profile,
        gap_to_second: gap,
        confidence_margin: gap,
        results_version: config.results_version.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregation;
    use crate::classify::classify;
    use prism_common::CognitiveFunction::*;

    fn aggregation_from(strengths: FunctionVector) -> Aggregation {
        Aggregation {
            strengths,
            likert_means: FunctionVector::default(),
            fc_counts: FunctionVector::default(),
            coverage: Coverage::default(),
            fc_answered: 0,
        }
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(0.1236), 0.124);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn test_seat_coherence_perfect_fit() {
        let table = PrototypeTable::fallback();
        let mut s = FunctionVector::new([2.5; 8]);
        s.set(Ti, 4.5);
        s.set(Ne, 3.5);
        assert_eq!(seat_coherence(TypeCode::Lii, &s, table), 1.0);
        // same strengths read against ILE: Ne expected 4.5 (off by 1), Ti expected 3.5 (off by 1)
        assert_eq!(seat_coherence(TypeCode::Ile, &s, table), 0.75);
    }

    #[test]
    fn test_quadrant_means_follow_top_type() {
        let table = PrototypeTable::fallback();
        let mut s = FunctionVector::default();
        s.set(Ti, 4.0);
        s.set(Ne, 2.0);
        let q = quadrant_means(TypeCode::Lii, &s, table);
        assert_eq!(q.core, 3.0);
        assert_eq!(q.critic, 0.0);
    }

    #[test]
    fn test_conf_raw_uniform_shares() {
        let c = classify(&FunctionVector::default(), PrototypeTable::fallback(), 1.0);
        assert!((entropy_bits(&c.shares) - 4.0).abs() < 1e-12);
        // σ(−0.2 × 4)
        assert_eq!(conf_raw(&c, &ConfRawParams::default()), 0.31);
    }

    #[test]
    fn test_conf_raw_certain_leader() {
        let mut scores = [0.0f64; 16];
        scores[TypeCode::Lii.index()] = 2.0;
        let mut shares = [0.0f64; 16];
        shares[TypeCode::Lii.index()] = 1.0;
        let c = Classification { scores, shares, ranking: crate::classify::rank(&shares) };
        // σ(0.25 × 2 + 0.35 × 1 − 0)
        assert_eq!(conf_raw(&c, &ConfRawParams::default()), 0.7006);
    }

    #[test]
    fn test_confidence_bands() {
        let cuts = ConfBandCuts::default();
        assert_eq!(confidence_band(0.75, &cuts), Confidence::High);
        assert_eq!(confidence_band(0.7, &cuts), Confidence::Moderate);
        assert_eq!(confidence_band(0.55, &cuts), Confidence::Moderate);
        assert_eq!(confidence_band(0.5499, &cuts), Confidence::Low);
    }

    #[test]
    fn test_fit_percent_and_bands() {
        let t = FitBandThresholds::default();
        assert_eq!(fit_percent(13.0, 6.5), 100.0);
        assert_eq!(fit_percent(-1.0, 6.5), 0.0);
        assert_eq!(fit_percent(f64::INFINITY, 6.5), 0.0);
        assert!((fit_percent(3.25, 6.5) - 50.0).abs() < 1e-12);
        assert_eq!(fit_band(60.0, &t), FitBand::HighFit);
        assert_eq!(fit_band(59.9, &t), FitBand::ModerateFit);
        assert_eq!(fit_band(45.0, &t), FitBand::ModerateFit);
        assert_eq!(fit_band(44.9, &t), FitBand::LowFit);
    }

    #[test]
    fn test_fc_coverage_bucket() {
        assert_eq!(fc_coverage_bucket(12, 12.0), FcCoverageBucket::Full);
        assert_eq!(fc_coverage_bucket(11, 12.0), FcCoverageBucket::Low);
        assert_eq!(fc_coverage_bucket(0, 12.0), FcCoverageBucket::Low);
    }

    #[test]
    fn test_dims_highlights() {
        let mut s = FunctionVector::default();
        s.set(Ti, 5.0);
        s.set(Fe, 5.5);
        s.set(Ne, 4.375);
        s.set(Si, 4.0);
        let dims = dimensions(&s);
        assert_eq!(dims[&Ti], 4.0);
        assert_eq!(dims[&Ne], 3.5);

        let h = dims_highlights(&dims, &DimsThresholds::default());
        assert_eq!(h.coherent, vec![Ti, Fe, Ne]);
        assert_eq!(h.unique, vec![Fe]);
    }

    #[test]
    fn test_distance_metrics() {
        let mut scores = [1.0f64; 16];
        scores[TypeCode::Lii.index()] = 3.0;
        let metrics = distance_metrics(&scores, 6.5);
        assert_eq!(metrics.len(), 16);
        assert_eq!(metrics[0].code, TypeCode::Eie);

        let lii = &metrics[TypeCode::Lii.index()];
        assert_eq!(lii.raw, 3.0);
        // mean = 18 / 16 = 1.125
        assert_eq!(lii.dist, 1.875);
        assert_eq!(lii.norm, 0.4615);
        assert_eq!(metrics[0].dist, 0.125);
    }

    #[test]
    fn test_distance_metrics_ignore_non_finite_scores() {
        let mut scores = [2.0f64; 16];
        scores[0] = f64::INFINITY;
        let metrics = distance_metrics(&scores, 6.5);
        assert!(metrics.iter().all(|m| m.raw.is_finite() && m.dist.is_finite() && m.norm.is_finite()));
        assert_eq!(metrics[0].raw, 0.0);
    }

    #[test]
    fn test_assembled_shape() {
        let table = PrototypeTable::fallback();
        let config = EngineConfig::default();
        let mut s = FunctionVector::default();
        s.set(Te, 3.0);
        s.set(Si, 2.0);
        let agg = aggregation_from(s);
        let c = classify(&agg.strengths, table, 1.0);
        let result = assemble(&c, &agg, table, &config);

        assert_eq!(result.profile.type_code, TypeCode::Lse);
        assert_eq!(result.profile.type_alias, TypeCode::Lse);
        assert_eq!(result.profile.base_func, Te);
        assert_eq!(result.profile.creative_func, Si);
        assert_eq!(result.profile.top_types.len(), TOP_N);
        assert_eq!(result.profile.type_scores.len(), 16);
        assert_eq!(result.profile.strengths.len(), 8);
        assert_eq!(result.gap_to_second, result.confidence_margin);
        assert_eq!(result.results_version, "v1.2.1");
        assert_eq!(result.profile.version, "v1.2.1");
        assert_eq!(result.profile.blocks_norm, QuadrantScores::default());
    }

    #[test]
    fn test_profile_serializes_wire_names() {
        let table = PrototypeTable::fallback();
        let agg = aggregation_from(FunctionVector::default());
        let c = classify(&agg.strengths, table, 1.0);
        let json = serde_json::to_value(assemble(&c, &agg, table, &EngineConfig::default())).unwrap();

        assert_eq!(json["profile"]["type_code"], "EIE");
        assert_eq!(json["profile"]["type"], "EIE");
        assert_eq!(json["profile"]["blocks_norm"]["Core"], 0.0);
        assert_eq!(json["profile"]["overlay"], "0");
        assert!(json["profile"]["strengths"]["Ti"].is_number());
        assert!(json["profile"]["type_scores"]["SLI"].is_number());
        assert_eq!(json["profile"]["close_call"], true);
        assert_eq!(json["profile"]["confidence"], "Low");
        assert_eq!(json["profile"]["conf_raw"], 0.31);
        assert_eq!(json["profile"]["fit_band"], "low_fit");
        assert_eq!(json["profile"]["fc_coverage_bucket"], "low");
        assert_eq!(json["profile"]["fc_answered_ct"], 0);
        assert_eq!(json["profile"]["diagnostics"]["distance_metrics"].as_array().map(Vec::len), Some(16));
        assert_eq!(json["profile"]["diagnostics"]["dims_highlights"]["coherent"], serde_json::json!([]));
        assert_eq!(json["profile"]["diagnostics"]["dimensions"]["Ti"], 0.0);
    }
}
