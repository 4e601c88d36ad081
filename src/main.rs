//! MoodTune - 情绪识别服务入口
//!
//! 组装顺序: config -> tracing -> ProcessMoodDetector -> AppState -> HttpServer

use std::sync::Arc;

use moodtune::config::{load_config, print_config, LogConfig, WorkerConfig};
use moodtune::infrastructure::http::{AppState, HttpServer, ServerConfig};
use moodtune::infrastructure::{ProcessBridgeConfig, ProcessMoodDetector};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},moodtune={},tower_http=debug", log.level, log.level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn bridge_config(worker: &WorkerConfig) -> ProcessBridgeConfig {
    let mut config = ProcessBridgeConfig::new(&worker.executable).with_args(&worker.args);
    config.max_output_bytes = worker.max_output_bytes;
    if let Some(timeout) = worker.timeout() {
        config = config.with_timeout(timeout);
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("MoodTune - mood detection bridge");
    print_config(&config);

    let detector = Arc::new(ProcessMoodDetector::new(bridge_config(&config.worker)));
    let state = AppState::new(detector);

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.server.max_body_bytes);
    let server = HttpServer::new(server_config, state);

    server.run_with_shutdown(shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
