//! Shared fixtures for PRISM tests.
//!
//! Fixtures are built as caller-shaped JSON so tests exercise the same wire
//! format the scoring entry point receives.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use prism_common::CognitiveFunction;

pub use pretty_assertions;

/// Likert scales a generated strength item may use.
pub const LIKERT_SCALES: [&str; 4] = ["LIKERT_1_5", "LIKERT_1_7", "STATE_1_7", "FREQUENCY"];

/// Key record for a Likert strength item on `func`.
pub fn likert_key(func: CognitiveFunction, scale: &str, reverse: bool) -> Value {
    json!({
        "tag": format!("{}_S", func.as_str()),
        "scale_type": scale,
        "reverse_scored": reverse,
    })
}

/// Key record for a two-option forced-choice block.
pub fn forced_choice_key(a: CognitiveFunction, b: CognitiveFunction) -> Value {
    json!({
        "fc_map": { "A": a.as_str(), "B": b.as_str() },
        "scale_type": "FORCED_CHOICE_2",
    })
}

pub fn answer(question_id: u32, value: Value) -> Value {
    json!({ "question_id": question_id, "answer_value": value })
}

/// Four answers: Ti=5, Ne=4, Ne=3 on 1–5 Likert and forced-choice `A` with `{A: Ti, B: Ne}`.
pub fn worked_example() -> Value {
    use CognitiveFunction::*;
    json!({
        "answers": [
            answer(1, json!(5)),
            answer(2, json!(4)),
            answer(3, json!(3)),
            answer(4, json!("A")),
        ],
        "keyByQ": {
            "1": likert_key(Ti, "LIKERT_1_5", false),
            "2": likert_key(Ne, "LIKERT_1_5", false),
            "3": likert_key(Ne, "LIKERT_1_5", false),
            "4": forced_choice_key(Ti, Ne),
        },
        "config": { "softmaxTemp": 1, "fcExpectedMin": 12 },
    })
}

/// Seeded generator for randomized sessions.
pub struct SessionGen {
    rng: StdRng,
}

impl SessionGen {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    fn function(&mut self) -> CognitiveFunction {
        CognitiveFunction::ALL[self.rng.gen_range(0..CognitiveFunction::ALL.len())]
    }

    fn likert_value(&mut self, scale: &str) -> Value {
        let top = if scale.ends_with("_7") { 7 } else { 5 };
        match self.rng.gen_range(0..10) {
            0 => json!("Strongly agree"),
            1 => json!(format!("{} ", self.rng.gen_range(1..=top))),
            2 => Value::Null,
            _ => json!(self.rng.gen_range(1..=top)),
        }
    }

    /// A session of `items` questions mixing Likert strength items and forced-choice blocks.
    pub fn session(&mut self, items: u32) -> Value {
        let mut key = Map::new();
        let mut answers = Vec::with_capacity(items as usize);

        for qid in 1..=items {
            if self.rng.gen_bool(0.25) {
                let (a, b) = (self.function(), self.function());
                key.insert(qid.to_string(), forced_choice_key(a, b));
                let letter = if self.rng.gen_bool(0.5) { "A" } else { "b" };
                answers.push(answer(qid, json!(letter)));
            } else {
                let scale = LIKERT_SCALES[self.rng.gen_range(0..LIKERT_SCALES.len())];
                let func = self.function();
                key.insert(qid.to_string(), likert_key(func, scale, self.rng.gen_bool(0.2)));
                let value = self.likert_value(scale);
                answers.push(answer(qid, value));
            }
        }

        let temp: f64 = self.rng.gen_range(0.05..3.0);
        json!({
            "answers": answers,
            "keyByQ": key,
            "config": { "softmaxTemp": temp },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_reproducible() {
        assert_eq!(SessionGen::new(7).session(20), SessionGen::new(7).session(20));
    }

    #[test]
    fn test_worked_example_shape() {
        let ex = worked_example();
        assert_eq!(ex["answers"].as_array().map(Vec::len), Some(4));
        assert_eq!(ex["keyByQ"]["1"]["tag"], "Ti_S");
        assert_eq!(ex["keyByQ"]["4"]["fc_map"]["B"], "Ne");
    }
}
