//! 应用层 - 命令
//!
//! 情绪识别用例

mod detect_mood_commands;

pub mod handlers;

pub use detect_mood_commands::*;
