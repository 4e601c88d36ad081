//! Mood Detector Port - 情绪推理抽象
//!
//! 定义情绪推理的抽象接口与结果分类，具体实现在 infrastructure/bridge 层

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::mood::{ImagePayload, Mood};

/// 单次推理请求
///
/// 每个请求对应一个独立的 worker 进程，不跨请求共享任何状态
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// 请求标识（用于日志追踪）
    pub request_id: Uuid,
    /// 图片负载，原样写入 worker 的 stdin
    pub payload: ImagePayload,
}

impl InferenceRequest {
    pub fn new(payload: ImagePayload) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            payload,
        }
    }
}

/// 推理得到的情绪
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodReading {
    pub mood: Mood,
    /// worker 附带的说明（stdout 的 `detail` 字段或非致命的 stderr 诊断）
    pub detail: Option<String>,
}

/// worker 的硬失败
///
/// 这些失败都会以服务端错误返回给调用方，并附带诊断信息
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerFailure {
    #[error("mood worker produced malformed output: {detail}")]
    MalformedOutput { detail: String },

    #[error("mood worker exited with {}: {detail}", describe_exit(.code))]
    NonZeroExit { code: Option<i32>, detail: String },

    #[error("failed to start mood worker: {detail}")]
    Spawn { detail: String },

    #[error("failed to write payload to mood worker: {detail}")]
    Stdin { detail: String },

    #[error("mood worker timed out: {detail}")]
    Timeout { detail: String },
}

impl WorkerFailure {
    /// 稳定的分类名，用于日志字段
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedOutput { .. } => "malformed_output",
            Self::NonZeroExit { .. } => "non_zero_exit",
            Self::Spawn { .. } => "spawn",
            Self::Stdin { .. } => "stdin",
            Self::Timeout { .. } => "timeout",
        }
    }

    /// 返回给调用方的简短错误描述
    pub fn summary(&self) -> &'static str {
        match self {
            Self::MalformedOutput { .. } => "Mood worker returned malformed output",
            Self::NonZeroExit { .. } => "Mood worker exited with an error",
            Self::Spawn { .. } => "Failed to start mood worker",
            Self::Stdin { .. } => "Failed to send image to mood worker",
            Self::Timeout { .. } => "Mood worker timed out",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::MalformedOutput { detail }
            | Self::NonZeroExit { detail, .. }
            | Self::Spawn { detail }
            | Self::Stdin { detail }
            | Self::Timeout { detail } => detail,
        }
    }
}

pub(crate) fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// 单次推理的最终分类结果，每个请求恰好产生一个
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedOutcome {
    /// worker 正常给出结果
    Success(MoodReading),
    /// worker 正常结束但报告了语义错误（如未检测到人脸），结果回落为 Neutral
    LogicalError { detail: String },
    /// 硬失败
    Failure(WorkerFailure),
}

impl ClassifiedOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::LogicalError { .. } => "logical_error",
            Self::Failure(failure) => failure.kind(),
        }
    }

    /// 该结果对外呈现的情绪（硬失败时没有）
    pub fn mood(&self) -> Option<Mood> {
        match self {
            Self::Success(reading) => Some(reading.mood),
            Self::LogicalError { .. } => Some(Mood::FALLBACK),
            Self::Failure(_) => None,
        }
    }
}

impl From<WorkerFailure> for ClassifiedOutcome {
    fn from(failure: WorkerFailure) -> Self {
        Self::Failure(failure)
    }
}

/// Mood Detector Port
///
/// 外部推理进程的抽象接口
#[async_trait]
pub trait MoodDetectorPort: Send + Sync {
    /// 执行一次推理
    ///
    /// 所有错误都在内部分类，不会以 `Err` 逃逸
    async fn detect(&self, request: InferenceRequest) -> ClassifiedOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_error_reports_fallback_mood() {
        let outcome = ClassifiedOutcome::LogicalError {
            detail: "no face detected".to_string(),
        };
        assert_eq!(outcome.mood(), Some(Mood::Neutral));
        assert_eq!(outcome.kind(), "logical_error");
    }

    #[test]
    fn test_failure_display_includes_exit_code() {
        let failure = WorkerFailure::NonZeroExit {
            code: Some(2),
            detail: "boom".to_string(),
        };
        assert_eq!(failure.to_string(), "mood worker exited with code 2: boom");
        assert_eq!(failure.detail(), "boom");

        let killed = WorkerFailure::NonZeroExit {
            code: None,
            detail: String::new(),
        };
        assert!(killed.to_string().contains("terminated by signal"));
    }
}
