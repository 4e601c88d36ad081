//! Inference Bridge - 外部推理进程桥接
//!
//! 数据流：Launcher 启动 worker → 所有终止信号提交给 Arbiter →
//! 唯一的最终信号交给 Classifier → 得到 ClassifiedOutcome

mod arbiter;
mod classifier;
mod hints;
mod launcher;
mod process_detector;

pub use process_detector::{ProcessBridgeConfig, ProcessMoodDetector};
