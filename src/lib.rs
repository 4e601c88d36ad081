//! MoodTune - 基于摄像头照片的情绪识别服务
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Mood Context: 情绪枚举与图片负载
//!
//! 应用层 (application/):
//! - Ports: MoodDetectorPort（推理端口）
//! - Commands: 请求校验与情绪识别命令处理器
//!
//! 基础设施层 (infrastructure/):
//! - Bridge: 外部推理进程的启动、结算与输出分类
//! - HTTP: RESTful API

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
