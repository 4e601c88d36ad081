//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::application::ports::WorkerFailure;
use crate::domain::mood::MoodError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 推理 worker 硬失败
    #[error(transparent)]
    Worker(#[from] WorkerFailure),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<MoodError> for ApplicationError {
    fn from(err: MoodError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
