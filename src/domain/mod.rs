//! Domain Layer - 领域层
//!
//! Mood Context: 情绪识别结果与输入负载

pub mod mood;
