//! Collapsing stored response rows to one answer per question.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::{question_id_from_wire, AnswerRow, AnswerValue};

/// A stored response row. A session may hold several rows per question when answers were revised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(deserialize_with = "question_id_from_wire")]
    pub question_id: String,
    #[serde(default)]
    pub answer_value: Option<AnswerValue>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Keep the newest row per question.
///
/// A later `created_at` wins; equal timestamps resolve to the row that comes later
/// in the input, and a missing timestamp sorts before any real one. Output keeps
/// the order in which questions were first seen.
pub fn latest_per_question(rows: &[StoredResponse]) -> Vec<AnswerRow> {
    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<&StoredResponse> = Vec::new();

    for row in rows {
        match slot_of.get(row.question_id.as_str()) {
            Some(&slot) => {
                if row.created_at >= latest[slot].created_at {
                    latest[slot] = row;
                }
            }
            None => {
                slot_of.insert(row.question_id.as_str(), latest.len());
                latest.push(row);
            }
        }
    }

    let dropped = rows.len() - latest.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = latest.len(), "collapsed revised answers");
    }

    latest
        .into_iter()
        .map(|row| AnswerRow {
            question_id: row.question_id.clone(),
            answer_value: row.answer_value.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stored(id: i64, qid: &str, value: f64, at: Option<i64>) -> StoredResponse {
        StoredResponse {
            id: Some(id),
            question_id: qid.to_string(),
            answer_value: Some(AnswerValue::Number(value)),
            created_at: at.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        }
    }

    #[test]
    fn test_newer_timestamp_wins() {
        let rows = vec![
            stored(1, "1", 2.0, Some(200)),
            stored(2, "2", 3.0, Some(100)),
            stored(3, "1", 5.0, Some(100)),
        ];
        let answers = latest_per_question(&rows);
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].question_id, "1");
        assert_eq!(answers[0].answer_value, Some(AnswerValue::Number(2.0)));
        assert_eq!(answers[1].question_id, "2");
    }

    #[test]
    fn test_ties_and_missing_timestamps_take_later_row() {
        let rows = vec![
            stored(1, "1", 2.0, Some(100)),
            stored(2, "1", 4.0, Some(100)),
            stored(3, "3", 1.0, None),
            stored(4, "3", 5.0, None),
        ];
        let answers = latest_per_question(&rows);
        assert_eq!(answers[0].answer_value, Some(AnswerValue::Number(4.0)));
        assert_eq!(answers[1].answer_value, Some(AnswerValue::Number(5.0)));
    }

    #[test]
    fn test_untimestamped_row_never_replaces_timestamped() {
        let rows = vec![stored(1, "1", 2.0, Some(100)), stored(2, "1", 4.0, None)];
        let answers = latest_per_question(&rows);
        assert_eq!(answers[0].answer_value, Some(AnswerValue::Number(2.0)));
    }

    #[test]
    fn test_deserialize_stored_rows() {
        let rows: Vec<StoredResponse> = serde_json::from_str(
            r#"[{"id": 1, "question_id": 4, "answer_value": "A", "created_at": "2024-05-01T10:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].question_id, "4");
        assert!(rows[0].created_at.is_some());
    }
}
