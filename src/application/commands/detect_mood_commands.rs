//! Detect Mood Commands - 情绪识别命令

use serde_json::Value;

use crate::application::error::ApplicationError;
use crate::application::ports::MoodReading;
use crate::domain::mood::{ImagePayload, Mood};

/// 请求体中携带图片的字段名
pub const PHOTO_FIELD: &str = "photoDataUri";

/// 情绪识别命令
#[derive(Debug, Clone)]
pub struct DetectMoodCommand {
    pub payload: ImagePayload,
}

impl DetectMoodCommand {
    /// 请求入口校验
    ///
    /// 只检查形状：必须是对象、字段存在、是非空字符串。内容原样透传
    pub fn from_body(body: &Value) -> Result<Self, ApplicationError> {
        let field = body
            .as_object()
            .ok_or_else(|| ApplicationError::validation("Request body must be a JSON object"))?
            .get(PHOTO_FIELD);

        match field {
            Some(Value::String(data)) if !data.is_empty() => Ok(Self {
                payload: ImagePayload::new(data.as_str())?,
            }),
            _ => Err(ApplicationError::validation(format!(
                "Missing or invalid {}",
                PHOTO_FIELD
            ))),
        }
    }
}

/// 情绪识别响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectMoodResponse {
    pub mood: Mood,
    pub detail: Option<String>,
}

impl DetectMoodResponse {
    pub fn detected(reading: MoodReading) -> Self {
        Self {
            mood: reading.mood,
            detail: reading.detail,
        }
    }

    /// worker 报告了语义错误：返回兜底情绪并携带诊断信息
    pub fn fallback(detail: String) -> Self {
        Self {
            mood: Mood::FALLBACK,
            detail: Some(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gate_accepts_string_payload() {
        let cmd = DetectMoodCommand::from_body(&json!({ "photoDataUri": "data:image/jpeg;base64,/9j/" }))
            .unwrap();
        assert_eq!(cmd.payload.as_bytes(), b"data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_gate_rejects_missing_field() {
        let err = DetectMoodCommand::from_body(&json!({ "photo": "x" })).unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }

    #[test]
    fn test_gate_rejects_non_string_field() {
        for body in [
            json!({ "photoDataUri": 42 }),
            json!({ "photoDataUri": null }),
            json!({ "photoDataUri": ["a"] }),
            json!({ "photoDataUri": "" }),
        ] {
            assert!(DetectMoodCommand::from_body(&body).is_err(), "{}", body);
        }
    }

    #[test]
    fn test_gate_rejects_non_object_body() {
        assert!(DetectMoodCommand::from_body(&json!("data:image/png;base64,AA")).is_err());
    }
}
