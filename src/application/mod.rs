//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（MoodDetector）
//! - commands: 情绪识别命令及处理器（含请求入口校验）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::DetectMoodHandler, DetectMoodCommand, DetectMoodResponse, PHOTO_FIELD,
};

pub use error::ApplicationError;

pub use ports::{
    ClassifiedOutcome, InferenceRequest, MoodDetectorPort, MoodReading, WorkerFailure,
};
