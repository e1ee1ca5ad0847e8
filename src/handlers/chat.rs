use axum::{extract::State, Extension, Json};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::chat_buffer::{ChatBuffers, ConversationTurn, TurnRole};
use crate::error::{AppError, AppResult};
use crate::models::chat::{ChatMessage, ChatRequest, ChatResponse};
use crate::AppState;

pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if !state.llm.is_configured() {
        return Err(AppError::ServiceUnavailable(
            "AI service temporarily unavailable. Please try again later.".into(),
        ));
    }

    // Hold the user's buffer lock across the whole exchange so a second
    // request from the same user cannot interleave its turns.
    let mut buffer = state.chat_buffers.lock_user(auth_user.id).await;

    buffer.push(ConversationTurn::new(TurnRole::User, body.message.clone()));
    ChatBuffers::trim(&mut buffer, state.chat_buffers.cap());

    let reply = match state.llm.complete(&buffer).await {
        Ok(reply) => reply,
        Err(e) => {
            // Roll back the unanswered turn so the buffer keeps whole
            // exchanges only.
            buffer.pop();
            tracing::warn!(error = %e, user_id = %auth_user.id, "OpenAI API failed for chat");
            return Err(AppError::ServiceUnavailable(
                "AI service temporarily unavailable. Please try again later.".into(),
            ));
        }
    };

    buffer.push(ConversationTurn::new(TurnRole::Assistant, reply.clone()));
    ChatBuffers::trim(&mut buffer, state.chat_buffers.cap());
    drop(buffer);

    // Best-effort mirror to the persistent history; the conversation
    // continues even if logging fails.
    persist_chat_message(state.db.clone(), auth_user.id, "user", body.message);
    persist_chat_message(state.db.clone(), auth_user.id, "assistant", reply.clone());

    Ok(Json(ChatResponse { response: reply }))
}

pub async fn get_history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let history = sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT * FROM chat_messages
        WHERE user_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(history))
}

fn persist_chat_message(db: PgPool, user_id: Uuid, sender: &'static str, content: String) {
    tokio::spawn(async move {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (id, user_id, sender, content)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(sender)
        .bind(&content)
        .execute(&db)
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, user_id = %user_id, sender = sender, "Failed to persist chat message");
        }
    });
}
