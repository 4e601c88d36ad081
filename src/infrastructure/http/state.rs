//! Application State

use std::sync::Arc;

use crate::application::{DetectMoodHandler, MoodDetectorPort};

/// 应用状态
///
/// 只持有无状态的处理器；每个请求的 worker 进程都是请求私有的
pub struct AppState {
    // ========== Ports ==========
    pub mood_detector: Arc<dyn MoodDetectorPort>,

    // ========== Command Handlers ==========
    pub detect_mood_handler: DetectMoodHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(mood_detector: Arc<dyn MoodDetectorPort>) -> Self {
        Self {
            mood_detector: mood_detector.clone(),
            detect_mood_handler: DetectMoodHandler::new(mood_detector),
        }
    }
}
