//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{default_executable, AppConfig};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "MOODTUNE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `MOODTUNE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `MOODTUNE_SERVER__PORT=8080`
/// - `MOODTUNE_WORKER__EXECUTABLE=/opt/moodtune/bin/python3`
/// - `MOODTUNE_WORKER__ARGS="detect_emotion.py --quiet"`（空格分隔）
/// - `MOODTUNE_WORKER__TIMEOUT_SECS=30`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("server.max_body_bytes", 10 * 1024 * 1024)?
        .set_default("worker.executable", default_executable())?
        .set_default("worker.args", Vec::<String>::new())?
        .set_default("worker.max_output_bytes", 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: MOODTUNE_WORKER__EXECUTABLE=python3
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("worker.args"),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.worker.executable.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Worker executable cannot be empty".to_string(),
        ));
    }

    if config.worker.max_output_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "Worker max_output_bytes cannot be 0".to_string(),
        ));
    }

    if config.worker.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "Worker timeout_secs cannot be 0; omit it to disable the deadline".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Max Body Size: {} bytes", config.server.max_body_bytes);
    tracing::info!("Worker Executable: {}", config.worker.executable);
    tracing::info!("Worker Args: {:?}", config.worker.args);
    match config.worker.timeout_secs {
        Some(secs) => tracing::info!("Worker Timeout: {}s", secs),
        None => tracing::info!("Worker Timeout: disabled"),
    }
    tracing::info!("Worker Max Output: {} bytes", config.worker.max_output_bytes);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    // 环境变量是进程级状态，读取配置的测试串行执行
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 设置环境变量，drop 时清除
    struct ScopedEnv(Vec<&'static str>);

    impl ScopedEnv {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
            Self(vars.iter().map(|(key, _)| *key).collect())
        }
    }

    impl Drop for ScopedEnv {
        fn drop(&mut self) {
            for key in &self.0 {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_executable() {
        let mut config = AppConfig::default();
        config.worker.executable = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_timeout() {
        let mut config = AppConfig::default();
        config.worker.timeout_secs = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_output_cap() {
        let mut config = AppConfig::default();
        config.worker.max_output_bytes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let _lock = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[worker]
executable = "python3"
args = ["src/python/detect_emotion.py"]
timeout_secs = 45
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.worker.args, vec!["src/python/detect_emotion.py"]);
        assert_eq!(config.worker.timeout_secs, Some(45));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let _lock = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[worker]\ntimeout_secs = 0").unwrap();

        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_env_overrides_worker() {
        let _lock = env_lock();
        let _env = ScopedEnv::set(&[
            ("MOODTUNE_WORKER__EXECUTABLE", "/opt/bin/python3"),
            ("MOODTUNE_WORKER__ARGS", "detect_emotion.py --quiet"),
            ("MOODTUNE_WORKER__TIMEOUT_SECS", "30"),
        ]);

        let config = load_config_from_path(None).unwrap();
        assert_eq!(config.worker.executable, "/opt/bin/python3");
        assert_eq!(config.worker.args, vec!["detect_emotion.py", "--quiet"]);
        assert_eq!(config.worker.timeout_secs, Some(30));
    }

    #[test]
    fn test_env_numeric_single_arg() {
        let _lock = env_lock();
        let _env = ScopedEnv::set(&[("MOODTUNE_WORKER__ARGS", "7")]);

        let config = load_config_from_path(None).unwrap();
        assert_eq!(config.worker.args, vec!["7"]);
    }

    #[test]
    fn test_env_overrides_file() {
        let _lock = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[worker]\nexecutable = \"python3\"\ntimeout_secs = 45").unwrap();
        let _env = ScopedEnv::set(&[("MOODTUNE_WORKER__TIMEOUT_SECS", "5")]);

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.worker.executable, "python3");
        assert_eq!(config.worker.timeout_secs, Some(5));
    }
}
