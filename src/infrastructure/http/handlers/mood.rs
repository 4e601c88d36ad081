//! Mood Detection Handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::application::DetectMoodCommand;
use crate::infrastructure::http::dto::MoodResponseDto;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// POST /api/detect-mood
///
/// 请求体 `{"photoDataUri": "<data uri>"}`，字段类型在入口处手动校验，
/// 因此先按任意 JSON 解析
pub async fn detect_mood(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MoodResponseDto>, ApiError> {
    let Json(body) = body?;
    let cmd = DetectMoodCommand::from_body(&body)?;

    let result = state.detect_mood_handler.handle(cmd).await?;

    Ok(Json(result.into()))
}
