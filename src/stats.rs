use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::mood::{valence_of, MoodEntry};

/// Aggregate dashboard statistics, recomputed from the full entry list on
/// every request. Nothing here is persisted.
#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_entries: usize,
    /// Label → count. Categories never logged are absent, not zero-filled.
    pub mood_counts: BTreeMap<String, i64>,
    /// Date → label of the last entry processed for that date.
    pub mood_trends: BTreeMap<NaiveDate, String>,
    pub current_streak: u32,
    /// One decimal place; "0.0" for an empty list.
    pub average_mood: String,
}

/// Computes dashboard statistics over one user's entries, sorted ascending
/// by `entry_date` (ties in insertion order).
///
/// The streak is a single running counter over the pass, not a historical
/// maximum: a one-day gap between consecutive processed entries increments
/// it, a longer gap resets it to 1, and a zero-day gap (same-day duplicate)
/// leaves it untouched. The reported value is whatever the counter holds
/// after the final entry.
pub fn compute_dashboard_stats(entries: &[MoodEntry]) -> DashboardStats {
    let mut mood_counts: BTreeMap<String, i64> = BTreeMap::new();
    let mut mood_trends: BTreeMap<NaiveDate, String> = BTreeMap::new();
    let mut streak: u32 = 0;
    let mut last_date: Option<NaiveDate> = None;

    for entry in entries {
        *mood_counts.entry(entry.mood.clone()).or_insert(0) += 1;

        // Last write wins for a given date.
        mood_trends.insert(entry.entry_date, entry.mood.clone());

        match last_date {
            None => streak = 1,
            Some(prev) => {
                let gap = (entry.entry_date - prev).num_days();
                if gap == 1 {
                    streak += 1;
                } else if gap > 1 {
                    streak = 1;
                }
                // gap == 0: same-day duplicate, counter unchanged
            }
        }
        last_date = Some(entry.entry_date);
    }

    let average_mood = if entries.is_empty() {
        "0.0".to_string()
    } else {
        let weighted: i64 = mood_counts
            .iter()
            .map(|(label, count)| valence_of(label) * count)
            .sum();
        format!("{:.1}", weighted as f64 / entries.len() as f64)
    };

    DashboardStats {
        total_entries: entries.len(),
        mood_counts,
        mood_trends,
        current_streak: streak,
        average_mood,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(date: &str, mood: &str) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            mood: mood.to_string(),
            note: None,
            entry_date: date.parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_list_yields_zeros() {
        let stats = compute_dashboard_stats(&[]);
        assert_eq!(stats.total_entries, 0);
        assert!(stats.mood_counts.is_empty());
        assert!(stats.mood_trends.is_empty());
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.average_mood, "0.0");
    }

    #[test]
    fn consecutive_days_build_streak() {
        let entries = vec![
            entry("2024-01-01", "😊"),
            entry("2024-01-02", "😐"),
            entry("2024-01-03", "😁"),
            entry("2024-01-04", "😊"),
        ];
        let stats = compute_dashboard_stats(&entries);
        assert_eq!(stats.current_streak, 4);
    }

    #[test]
    fn gap_resets_streak_to_one() {
        // Worked example: 2024-01-01 😊, 2024-01-02 😊, 2024-01-04 😢.
        let entries = vec![
            entry("2024-01-01", "😊"),
            entry("2024-01-02", "😊"),
            entry("2024-01-04", "😢"),
        ];
        let stats = compute_dashboard_stats(&entries);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.mood_counts.get("😊"), Some(&2));
        assert_eq!(stats.mood_counts.get("😢"), Some(&1));
        assert_eq!(stats.average_mood, "3.0"); // (4+4+1)/3
    }

    #[test]
    fn same_day_duplicates_leave_streak_unchanged() {
        let entries = vec![
            entry("2024-01-01", "😊"),
            entry("2024-01-02", "😐"),
            entry("2024-01-02", "😟"),
            entry("2024-01-03", "😁"),
        ];
        let stats = compute_dashboard_stats(&entries);
        // Duplicate on the 2nd neither increments nor resets.
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn trend_map_is_last_write_wins_per_date() {
        let entries = vec![
            entry("2024-01-02", "😐"),
            entry("2024-01-02", "😟"),
        ];
        let stats = compute_dashboard_stats(&entries);
        let date: NaiveDate = "2024-01-02".parse().unwrap();
        assert_eq!(stats.mood_trends.get(&date).map(String::as_str), Some("😟"));
    }

    #[test]
    fn single_category_average_is_its_valence() {
        for n in [1usize, 3, 7] {
            let entries: Vec<MoodEntry> = (0..n)
                .map(|i| entry(&format!("2024-02-{:02}", i + 1), "😊"))
                .collect();
            let stats = compute_dashboard_stats(&entries);
            assert_eq!(stats.average_mood, "4.0", "n = {}", n);
        }
    }

    #[test]
    fn unknown_label_averages_at_neutral_valence() {
        let entries = vec![entry("2024-01-01", "🤖"), entry("2024-01-02", "😁")];
        let stats = compute_dashboard_stats(&entries);
        assert_eq!(stats.average_mood, "4.0"); // (3+5)/2
        assert_eq!(stats.mood_counts.get("🤖"), Some(&1));
    }

    #[test]
    fn streak_conflates_current_with_last_observed() {
        // A long run followed by a gapped entry reports 1, even though the
        // most recent consecutive run seen had length 3.
        let entries = vec![
            entry("2024-01-01", "😊"),
            entry("2024-01-02", "😊"),
            entry("2024-01-03", "😊"),
            entry("2024-01-10", "😢"),
        ];
        let stats = compute_dashboard_stats(&entries);
        assert_eq!(stats.current_streak, 1);
    }
}
