//! Data Transfer Objects

use serde::Serialize;

use crate::application::DetectMoodResponse;
use crate::domain::mood::Mood;

/// 情绪识别成功响应
///
/// 语义错误同样以该格式返回：`result` 为兜底值 `Neutral`，`detail` 说明原因
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MoodResponseDto {
    pub result: Mood,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<DetectMoodResponse> for MoodResponseDto {
    fn from(response: DetectMoodResponse) -> Self {
        Self {
            result: response.mood,
            detail: response.detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_body_omits_detail() {
        let dto = MoodResponseDto {
            result: Mood::Happy,
            detail: None,
        };
        assert_eq!(serde_json::to_value(&dto).unwrap(), json!({ "result": "Happy" }));
    }

    #[test]
    fn test_fallback_body() {
        let dto = MoodResponseDto::from(DetectMoodResponse::fallback("no face detected".into()));
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({ "result": "Neutral", "detail": "no face detected" })
        );
    }
}
