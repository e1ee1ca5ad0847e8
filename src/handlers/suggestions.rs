use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::chat_buffer::{ConversationTurn, TurnRole, SYSTEM_PROMPT};
use crate::error::{AppError, AppResult};
use crate::models::chat::SuggestionsResponse;
use crate::suggestions::{dominant_mood, fallback_suggestions, parse_suggestions, suggestion_prompt};
use crate::AppState;

/// How many of the newest entries feed the recent-mood window.
const RECENT_WINDOW: i64 = 7;

pub async fn get_suggestions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<SuggestionsResponse>> {
    let recent: Vec<String> = sqlx::query_scalar::<_, String>(
        r#"
        SELECT mood FROM mood_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(auth_user.id)
    .bind(RECENT_WINDOW)
    .fetch_all(&state.db)
    .await?;

    if recent.is_empty() {
        return Err(AppError::Validation(
            "Log some moods first to get personalized suggestions".into(),
        ));
    }

    // Try the model first; any failure path lands on the canned table so
    // the endpoint never 503s for suggestions.
    if state.llm.is_configured() {
        let turns = vec![
            ConversationTurn::new(TurnRole::System, SYSTEM_PROMPT),
            ConversationTurn::new(TurnRole::User, suggestion_prompt(&recent)),
        ];

        match state.llm.complete(&turns).await {
            Ok(text) => {
                let suggestions = parse_suggestions(&text);
                if !suggestions.is_empty() {
                    return Ok(Json(SuggestionsResponse {
                        suggestions,
                        source: "openai".into(),
                    }));
                }
                tracing::warn!(
                    user_id = %auth_user.id,
                    "Model reply had no parseable list lines, using fallback"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI API unavailable, using fallback suggestions");
            }
        }
    }

    let mood = dominant_mood(&recent).unwrap_or("😐");
    Ok(Json(SuggestionsResponse {
        suggestions: fallback_suggestions(mood),
        source: "fallback".into(),
    }))
}
