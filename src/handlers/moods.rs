use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood::{is_known_label, CreateMoodRequest, MoodEntry, MoodQuery};
use crate::stats::{compute_dashboard_stats, DashboardStats};
use crate::AppState;

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if state.config.strict_mood_labels && !is_known_label(&body.mood) {
        return Err(AppError::Validation(format!(
            "Unknown mood label: {}",
            body.mood
        )));
    }

    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    // No ON CONFLICT clause: multiple entries per day are allowed.
    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, note, entry_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.mood)
    .bind(&body.note)
    .bind(entry_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let entries = if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT * FROM mood_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(auth_user.id)
        .bind(start)
        .bind(end)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT * FROM mood_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(auth_user.id)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(entries))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<DashboardStats>> {
    // created_at tie-break makes same-day last-write-wins deterministic.
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
        ORDER BY entry_date ASC, created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(compute_dashboard_stats(&entries)))
}
