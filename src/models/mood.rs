use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// The five mood categories, ordered by valence (saddest first).
pub const MOOD_LABELS: [&str; 5] = ["😢", "😟", "😐", "😊", "😁"];

/// Valence applied to labels outside the known set under the lenient policy.
pub const NEUTRAL_VALENCE: i64 = 3;

/// Fixed total mapping from mood label to valence 1..5.
pub fn valence_of(label: &str) -> i64 {
    match label {
        "😢" => 1,
        "😟" => 2,
        "😐" => 3,
        "😊" => 4,
        "😁" => 5,
        _ => NEUTRAL_VALENCE,
    }
}

pub fn is_known_label(label: &str) -> bool {
    MOOD_LABELS.contains(&label)
}

/// One logged mood. The label is stored as raw text so the aggregation
/// layer's lenient path stays reachable for rows predating a label change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: String,
    pub note: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[validate(length(min = 1, message = "Mood is required"))]
    pub mood: String,
    #[validate(length(max = 500, message = "Note must be 500 characters or fewer"))]
    pub note: Option<String>,
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valence_covers_all_labels() {
        let valences: Vec<i64> = MOOD_LABELS.iter().map(|l| valence_of(l)).collect();
        assert_eq!(valences, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unknown_label_is_neutral() {
        assert_eq!(valence_of("🤖"), NEUTRAL_VALENCE);
        assert!(!is_known_label("🤖"));
    }
}
