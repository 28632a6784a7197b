//! Type classification: prototype projection, softmax shares, deterministic ranking.

use prism_common::{PrototypeTable, TypeCode};

use crate::aggregate::FunctionVector;

/// Shares closer than this are treated as equal and ordered by type code.
pub const TIE_EPSILON: f64 = 1e-9;

/// Raw prototype score per type: Σ role_weight × strength, functions in canonical order.
pub fn type_scores(strengths: &FunctionVector, table: &PrototypeTable) -> [f64; 16] {
    let mut scores = [0.0f64; 16];
    for code in TypeCode::ALL {
        scores[code.index()] = table
            .assignment(code)
            .map(|(func, role)| role.weight() * strengths.get(func))
            .sum();
    }
    scores
}

/// Softmax over `scores / temp`.
///
/// The maximum is subtracted before exponentiating; the result is the standard
/// softmax but cannot overflow at low temperatures. If any score is not finite
/// the shares are uniform.
pub fn softmax(scores: &[f64; 16], temp: f64) -> [f64; 16] {
    if !scores.iter().all(|s| s.is_finite()) {
        tracing::warn!("non-finite type score, using uniform shares");
        return [1.0 / 16.0; 16];
    }
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut exps = [0.0f64; 16];
    for (e, s) in exps.iter_mut().zip(scores.iter()) {
        *e = ((s - max) / temp).exp();
    }
    let sum: f64 = exps.iter().sum();
    let sum = if sum > 0.0 && sum.is_finite() { sum } else { 1.0 };
    exps.map(|e| e / sum)
}

/// Rank all 16 types by descending share.
///
/// Runs of shares whose neighbours differ by less than [`TIE_EPSILON`] are
/// ordered alphabetically, which makes the order total even for all-equal input.
pub fn rank(shares: &[f64; 16]) -> Vec<TypeCode> {
    let mut order: Vec<TypeCode> = TypeCode::ALL.to_vec();
    order.sort_by(|a, b| {
        shares[b.index()]
            .total_cmp(&shares[a.index()])
            .then_with(|| a.cmp(b))
    });

    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len()
            && (shares[order[end - 1].index()] - shares[order[end].index()]).abs() < TIE_EPSILON
        {
            end += 1;
        }
        order[start..end].sort();
        start = end;
    }
    order
}

/// Scores, shares and ranking for one strength vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub scores: [f64; 16],
    pub shares: [f64; 16],
    pub ranking: Vec<TypeCode>,
}

impl Classification {
    pub fn top(&self) -> TypeCode {
        self.ranking[0]
    }

    pub fn score(&self, code: TypeCode) -> f64 {
        self.scores[code.index()]
    }

    pub fn share(&self, code: TypeCode) -> f64 {
        self.shares[code.index()]
    }

    /// Share of the leader minus share of the runner-up.
    pub fn gap_to_second(&self) -> f64 {
        match self.ranking.as_slice() {
            [first, second, ..] => self.share(*first) - self.share(*second),
            [first] => self.share(*first),
            [] => 0.0,
        }
    }

    /// Raw score of the leader minus raw score of the runner-up.
    pub fn score_gap_to_second(&self) -> f64 {
        match self.ranking.as_slice() {
            [first, second, ..] => self.score(*first) - self.score(*second),
            [first] => self.score(*first),
            [] => 0.0,
        }
    }
}

/// Score, normalise and rank all prototypes.
pub fn classify(strengths: &FunctionVector, table: &PrototypeTable, temp: f64) -> Classification {
    let scores = type_scores(strengths, table);
    let shares = softmax(&scores, temp);
    let ranking = rank(&shares);
    Classification { scores, shares, ranking }
}
