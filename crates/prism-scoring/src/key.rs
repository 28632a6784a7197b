//! Question key records and raw answer rows as delivered by callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Scale a question is answered on. Governs reverse scoring and range conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScaleType {
    Likert5,
    Likert7,
    State7,
    Frequency,
    /// Any `CATEGORICAL*` scale; the full name is kept.
    Categorical(String),
    /// Unrecognised scales (forced-choice blocks, free text, ...) pass through untouched.
    Other(String),
}

impl ScaleType {
    /// 7-point scales: `LIKERT_1_7` and `STATE_1_7`.
    pub fn is_seven_point(&self) -> bool {
        matches!(self, ScaleType::Likert7 | ScaleType::State7)
    }

    /// Scales already on the common 1–5 range.
    pub fn is_five_point(&self) -> bool {
        matches!(self, ScaleType::Likert5 | ScaleType::Frequency | ScaleType::Categorical(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScaleType::Likert5        => "LIKERT_1_5",
            ScaleType::Likert7        => "LIKERT_1_7",
            ScaleType::State7         => "STATE_1_7",
            ScaleType::Frequency      => "FREQUENCY",
            ScaleType::Categorical(s) => s,
            ScaleType::Other(s)       => s,
        }
    }
}

impl From<String> for ScaleType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "LIKERT_1_5" => ScaleType::Likert5,
            "LIKERT_1_7" => ScaleType::Likert7,
            "STATE_1_7"  => ScaleType::State7,
            "FREQUENCY"  => ScaleType::Frequency,
            _ if s.starts_with("CATEGORICAL") => ScaleType::Categorical(s),
            _ => ScaleType::Other(s),
        }
    }
}

impl From<&str> for ScaleType {
    fn from(s: &str) -> Self {
        ScaleType::from(s.to_string())
    }
}

impl From<ScaleType> for String {
    fn from(s: ScaleType) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suffix marking a Likert strength item tag, e.g. `Ti_S`.
pub const STRENGTH_TAG_SUFFIX: &str = "_S";

/// Scoring metadata for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionKey {
    #[serde(default)]
    pub tag: Option<String>,
    /// Forced-choice option letter → function tag.
    #[serde(default)]
    pub fc_map: Option<BTreeMap<String, String>>,
    pub scale_type: ScaleType,
    #[serde(default)]
    pub reverse_scored: bool,
}

impl QuestionKey {
    pub fn likert(tag: &str, scale_type: impl Into<ScaleType>) -> Self {
        Self {
            tag: Some(tag.to_string()),
            fc_map: None,
            scale_type: scale_type.into(),
            reverse_scored: false,
        }
    }

    pub fn forced_choice(options: &[(&str, &str)], scale_type: impl Into<ScaleType>) -> Self {
        Self {
            tag: None,
            fc_map: Some(
                options
                    .iter()
                    .map(|(letter, func)| (letter.to_string(), func.to_string()))
                    .collect(),
            ),
            scale_type: scale_type.into(),
            reverse_scored: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse_scored = true;
        self
    }

    /// Function prefix of a strength tag (`"Ti_S"` → `"Ti"`), if this is a strength item.
    pub fn strength_tag(&self) -> Option<&str> {
        let tag = self.tag.as_deref()?;
        if !tag.ends_with(STRENGTH_TAG_SUFFIX) {
            return None;
        }
        tag.split('_').next()
    }
}

/// Question id → key record. Ids are compared as strings.
pub type KeyByQuestion = BTreeMap<String, QuestionKey>;

/// Raw answer value: a number, a label or letter, or anything else a client sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl AnswerValue {
    /// The value rendered as text, as a forced-choice letter is read.
    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::Number(n) => n.to_string(),
            AnswerValue::Text(s)   => s.clone(),
            AnswerValue::Other(v)  => v.to_string(),
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        AnswerValue::Number(n)
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        AnswerValue::Number(n as f64)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

/// One `(question id, raw value)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRow {
    #[serde(deserialize_with = "question_id_from_wire")]
    pub question_id: String,
    #[serde(default)]
    pub answer_value: Option<AnswerValue>,
}

impl AnswerRow {
    pub fn new(question_id: impl ToString, value: impl Into<AnswerValue>) -> Self {
        Self {
            question_id: question_id.to_string(),
            answer_value: Some(value.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireQuestionId {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Question ids arrive as integers or strings; both key the same way.
pub(crate) fn question_id_from_wire<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match WireQuestionId::deserialize(deserializer)? {
        WireQuestionId::Int(n)   => n.to_string(),
        WireQuestionId::Float(n) => n.to_string(),
        WireQuestionId::Text(s)  => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_type_from_wire() {
        assert_eq!(ScaleType::from("LIKERT_1_5"), ScaleType::Likert5);
        assert_eq!(ScaleType::from("STATE_1_7"), ScaleType::State7);
        assert!(ScaleType::from("CATEGORICAL_5").is_five_point());
        assert_eq!(ScaleType::from("FORCED_CHOICE_2"), ScaleType::Other("FORCED_CHOICE_2".to_string()));
        assert!(!ScaleType::from("FORCED_CHOICE_2").is_five_point());
    }

    #[test]
    fn test_strength_tag() {
        assert_eq!(QuestionKey::likert("Ti_S", "LIKERT_1_5").strength_tag(), Some("Ti"));
        assert_eq!(QuestionKey::likert("Ti_D", "LIKERT_1_5").strength_tag(), None);
        assert_eq!(QuestionKey::forced_choice(&[("A", "Ti")], "FORCED_CHOICE_2").strength_tag(), None);
    }

    #[test]
    fn test_answer_row_accepts_numeric_and_string_ids() {
        let rows: Vec<AnswerRow> = serde_json::from_str(
            r#"[{"question_id": 7, "answer_value": 4},
                {"question_id": "8", "answer_value": "A"},
                {"question_id": 9, "answer_value": null},
                {"question_id": 10, "answer_value": true}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].question_id, "7");
        assert_eq!(rows[0].answer_value, Some(AnswerValue::Number(4.0)));
        assert_eq!(rows[1].answer_value, Some(AnswerValue::Text("A".to_string())));
        assert_eq!(rows[2].answer_value, None);
        assert_eq!(rows[3].answer_value, Some(AnswerValue::Other(serde_json::Value::Bool(true))));
    }

    #[test]
    fn test_key_record_defaults() {
        let key: QuestionKey = serde_json::from_str(r#"{"scale_type": "LIKERT_1_7"}"#).unwrap();
        assert!(key.tag.is_none());
        assert!(key.fc_map.is_none());
        assert!(!key.reverse_scored);
        assert!(key.scale_type.is_seven_point());
    }

    #[test]
    fn test_number_as_text_matches_letter_reading() {
        assert_eq!(AnswerValue::Number(5.0).as_text(), "5");
        assert_eq!(AnswerValue::from(" b ").as_text(), " b ");
    }
}
