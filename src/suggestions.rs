//! Coping-suggestion selection: dominant-mood detection, the prompt sent to
//! the model, list-formatted response parsing, and the canned per-category
//! fallback used when the model is unconfigured or unusable.

pub const MAX_SUGGESTIONS: usize = 3;

/// Most frequent label in the recent window; ties go to the label
/// encountered first.
pub fn dominant_mood(recent: &[String]) -> Option<&str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in recent {
        match counts.iter_mut().find(|(l, _)| *l == label.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, n) in counts {
        // Strict comparison keeps the first-encountered label on ties.
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((label, n));
        }
    }
    best.map(|(label, _)| label)
}

pub fn suggestion_prompt(recent: &[String]) -> String {
    format!(
        "Based on these recent mood entries: {}, provide 3 personalized, actionable \
         suggestions to improve mood. Keep each suggestion under 50 words and make them \
         positive and encouraging. Format as a simple numbered list.",
        recent.join(", ")
    )
}

/// Keeps only lines carrying a numbered-list or bulleted-list marker,
/// strips the marker, and caps the result at [`MAX_SUGGESTIONS`].
pub fn parse_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(strip_list_marker)
        .filter(|s| !s.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> Option<&str> {
    let line = line.trim();

    // Numbered: one or more digits followed by a dot.
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        return line[digits..].strip_prefix('.').map(str::trim_start);
    }

    for marker in ['•', '-', '*'] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim_start());
        }
    }
    None
}

/// Pre-written suggestions per mood category, used when no model is
/// configured or its reply yields nothing parseable.
pub fn fallback_suggestions(mood: &str) -> Vec<String> {
    let canned: [&str; 3] = match mood {
        "😢" => [
            "Reach out to someone you trust and let them know how you're feeling.",
            "Write down three things weighing on you, then one small step for each.",
            "Be gentle with yourself today — rest counts as progress too.",
        ],
        "😟" => [
            "Try a 4-7-8 breathing cycle: inhale 4s, hold 7s, exhale 8s, repeat four times.",
            "Take a short walk outside and name five things you can see.",
            "Jot down what's worrying you — putting it on paper shrinks it.",
        ],
        "😐" => [
            "Do one small thing you've been putting off; momentum lifts mood.",
            "Put on a song you love and actually listen to it.",
            "Text a friend you haven't spoken to in a while.",
        ],
        "😊" => [
            "Note what made today good so you can come back to it later.",
            "Share your good mood — a kind message to someone costs nothing.",
            "Use the energy: tackle something you've been saving for a good day.",
        ],
        "😁" => [
            "Celebrate it! Write down what's working in your life right now.",
            "Channel the high energy into something creative.",
            "Plan something to look forward to while optimism is easy.",
        ],
        _ => [
            "Take a few slow, deep breaths and check in with how you feel.",
            "Step outside for a few minutes of fresh air.",
            "Write a short note about your day — it helps more than it seems.",
        ],
    };
    canned.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_numbered_list_and_drops_unmarked_lines() {
        let text = "1. Take a walk.\n2. Call a friend.\n3. Breathe deeply.\nExtra line";
        assert_eq!(
            parse_suggestions(text),
            vec!["Take a walk.", "Call a friend.", "Breathe deeply."]
        );
    }

    #[test]
    fn parses_bulleted_lists() {
        let text = "• First idea\n- Second idea\n* Third idea\n* Fourth idea";
        assert_eq!(
            parse_suggestions(text),
            vec!["First idea", "Second idea", "Third idea"]
        );
    }

    #[test]
    fn unparseable_text_yields_nothing() {
        assert!(parse_suggestions("Here are some thoughts on your mood.").is_empty());
        assert!(parse_suggestions("").is_empty());
    }

    #[test]
    fn marker_without_content_is_skipped() {
        assert_eq!(parse_suggestions("1.\n2. Real one"), vec!["Real one"]);
    }

    #[test]
    fn dominant_mood_picks_most_frequent() {
        let recent = labels(&["😊", "😢", "😊"]);
        assert_eq!(dominant_mood(&recent), Some("😊"));
    }

    #[test]
    fn dominant_mood_tie_goes_to_first_encountered() {
        let recent = labels(&["😐", "😁", "😁", "😐"]);
        assert_eq!(dominant_mood(&recent), Some("😐"));
    }

    #[test]
    fn dominant_mood_empty_window_is_none() {
        assert_eq!(dominant_mood(&[]), None);
    }

    #[test]
    fn fallback_always_returns_three() {
        for label in crate::models::mood::MOOD_LABELS {
            assert_eq!(fallback_suggestions(label).len(), 3);
        }
        assert_eq!(fallback_suggestions("unknown").len(), 3);
    }
}
