//! Configuration Types
//!
//! 定义所有配置结构体

use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// 默认 worker 可执行文件名
pub fn default_executable() -> &'static str {
    if cfg!(windows) {
        "mood-detector.exe"
    } else {
        "mood-detector"
    }
}

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 推理 worker 配置
    #[serde(default)]
    pub worker: WorkerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024 // 10 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 推理 worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// worker 可执行文件（路径或 PATH 中的名称）
    #[serde(default = "default_worker_executable")]
    pub executable: String,

    /// 固定启动参数，例如解释器脚本路径
    /// 负载始终走 stdin，不会出现在参数中
    #[serde(default, deserialize_with = "deserialize_args")]
    pub args: Vec<String>,

    /// 单次推理超时（秒），不设置则不限时
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// stdout/stderr 各自保留的最大字节数
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_worker_executable() -> String {
    default_executable().to_string()
}

fn default_max_output_bytes() -> usize {
    1024 * 1024 // 1 MB
}

/// 启动参数的写法：列表（配置文件或空格分隔的环境变量），
/// 或环境变量层已解析成标量的单个参数（如 `MOODTUNE_WORKER__ARGS=7`）
#[derive(Deserialize)]
#[serde(untagged)]
enum ArgsValue {
    List(Vec<ArgToken>),
    Single(ArgToken),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArgToken {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<ArgToken> for String {
    fn from(token: ArgToken) -> Self {
        match token {
            ArgToken::Text(text) => text,
            ArgToken::Integer(value) => value.to_string(),
            ArgToken::Float(value) => value.to_string(),
            ArgToken::Flag(value) => value.to_string(),
        }
    }
}

fn deserialize_args<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let args = match ArgsValue::deserialize(deserializer)? {
        ArgsValue::List(tokens) => tokens.into_iter().map(String::from).collect(),
        ArgsValue::Single(ArgToken::Text(text)) => {
            text.split_whitespace().map(str::to_string).collect()
        }
        ArgsValue::Single(token) => vec![String::from(token)],
    };
    Ok(args)
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            executable: default_worker_executable(),
            args: Vec::new(),
            timeout_secs: None,
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

impl WorkerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
