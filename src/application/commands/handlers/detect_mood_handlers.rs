//! Detect Mood Command Handler

use std::sync::Arc;

use crate::application::commands::detect_mood_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{ClassifiedOutcome, InferenceRequest, MoodDetectorPort};

/// DetectMood Handler - 执行一次情绪识别
pub struct DetectMoodHandler {
    detector: Arc<dyn MoodDetectorPort>,
}

impl DetectMoodHandler {
    pub fn new(detector: Arc<dyn MoodDetectorPort>) -> Self {
        Self { detector }
    }

    pub async fn handle(&self, cmd: DetectMoodCommand) -> Result<DetectMoodResponse, ApplicationError> {
        let request = InferenceRequest::new(cmd.payload);
        let request_id = request.request_id;

        tracing::debug!(
            request_id = %request_id,
            payload_len = request.payload.len(),
            "Dispatching mood inference"
        );

        match self.detector.detect(request).await {
            ClassifiedOutcome::Success(reading) => {
                tracing::info!(
                    request_id = %request_id,
                    mood = %reading.mood,
                    detail = ?reading.detail,
                    "Mood detected"
                );
                Ok(DetectMoodResponse::detected(reading))
            }
            ClassifiedOutcome::LogicalError { detail } => {
                // 语义错误不视为致命，返回兜底值
                tracing::warn!(
                    request_id = %request_id,
                    detail = %detail,
                    "Mood worker reported a logical error, falling back to Neutral"
                );
                Ok(DetectMoodResponse::fallback(detail))
            }
            ClassifiedOutcome::Failure(failure) => {
                tracing::error!(
                    request_id = %request_id,
                    kind = failure.kind(),
                    error = %failure,
                    "Mood inference failed"
                );
                Err(failure.into())
            }
        }
    }
}
