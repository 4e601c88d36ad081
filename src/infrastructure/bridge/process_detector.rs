//! Process Mood Detector - 外部推理进程桥接
//!
//! 实现 MoodDetectorPort：启动 worker → 仲裁完成信号 → 分类 → 回收进程

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use super::arbiter::{CompletionArbiter, CompletionEvent};
use super::classifier::{classify, excerpt};
use super::launcher::ProcessLauncher;
use crate::application::ports::{ClassifiedOutcome, InferenceRequest, MoodDetectorPort, WorkerFailure};
use crate::config::default_executable;

/// 日志中输出的 stdout/stderr 摘要长度（字符）
const LOG_EXCERPT_CHARS: usize = 512;

/// 进程桥接配置
#[derive(Debug, Clone)]
pub struct ProcessBridgeConfig {
    /// worker 可执行文件（路径或 PATH 中的名称）
    pub executable: String,
    /// 固定参数（如解释器脚本路径），不携带任何请求数据
    pub args: Vec<String>,
    /// 截止时间，`None` 表示不限时
    pub timeout: Option<Duration>,
    /// stdout/stderr 各自保留的最大字节数
    pub max_output_bytes: usize,
}

impl Default for ProcessBridgeConfig {
    fn default() -> Self {
        Self {
            executable: default_executable().to_string(),
            args: Vec::new(),
            timeout: None,
            max_output_bytes: 1024 * 1024,
        }
    }
}

impl ProcessBridgeConfig {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Default::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// 基于子进程的情绪识别
///
/// 每次调用启动一个新进程，不复用、不重试
pub struct ProcessMoodDetector {
    launcher: ProcessLauncher,
}

impl ProcessMoodDetector {
    pub fn new(config: ProcessBridgeConfig) -> Self {
        tracing::info!(
            executable = %config.executable,
            args = ?config.args,
            timeout = ?config.timeout,
            "ProcessMoodDetector initialized"
        );
        Self {
            launcher: ProcessLauncher::new(config),
        }
    }

    async fn run(&self, request: InferenceRequest) -> ClassifiedOutcome {
        let started = Instant::now();
        let (arbiter, settlement) = CompletionArbiter::new();

        let worker = match self.launcher.launch(request.payload, Arc::clone(&arbiter)) {
            Ok(worker) => Some(worker),
            Err(error) => {
                arbiter.submit(CompletionEvent::SpawnFailed {
                    program: self.launcher.program().to_string(),
                    error,
                });
                None
            }
        };
        // 只让信号源持有仲裁器；全部退出而未提交时 settlement 返回 None
        drop(arbiter);

        let event = settlement.wait().await;

        if let Some(worker) = worker {
            let pid = worker.pid();
            worker.shutdown().await;
            tracing::debug!(pid = ?pid, "Mood worker released");
        }

        let Some(event) = event else {
            tracing::error!("Mood worker finished without reporting completion");
            return WorkerFailure::NonZeroExit {
                code: None,
                detail: "worker finished without reporting an exit status".to_string(),
            }
            .into();
        };

        log_event(&event, started.elapsed());
        classify(event)
    }
}

fn log_event(event: &CompletionEvent, elapsed: Duration) {
    match event {
        CompletionEvent::Exited(exit) => {
            let stdout = String::from_utf8_lossy(&exit.stdout);
            let stderr = String::from_utf8_lossy(&exit.stderr);
            if exit.code == Some(0) && stderr.trim().is_empty() {
                tracing::debug!(
                    exit_code = ?exit.code,
                    elapsed_ms = elapsed.as_millis() as u64,
                    stdout = %excerpt(stdout.trim(), LOG_EXCERPT_CHARS),
                    "Mood worker exited"
                );
            } else {
                tracing::warn!(
                    exit_code = ?exit.code,
                    elapsed_ms = elapsed.as_millis() as u64,
                    stdout = %excerpt(stdout.trim(), LOG_EXCERPT_CHARS),
                    stderr = %excerpt(stderr.trim(), LOG_EXCERPT_CHARS),
                    "Mood worker exited with diagnostics"
                );
            }
        }
        CompletionEvent::SpawnFailed { program, error } => {
            tracing::error!(program = %program, error = %error, "Failed to spawn mood worker");
        }
        CompletionEvent::StdinFailed(error) => {
            tracing::error!(
                error = %error,
                elapsed_ms = elapsed.as_millis() as u64,
                "Failed to write payload to mood worker"
            );
        }
        CompletionEvent::DeadlineElapsed(timeout) => {
            tracing::error!(timeout = ?timeout, "Mood worker deadline elapsed");
        }
    }
}

#[async_trait]
impl MoodDetectorPort for ProcessMoodDetector {
    async fn detect(&self, request: InferenceRequest) -> ClassifiedOutcome {
        let span = tracing::info_span!("mood_inference", request_id = %request.request_id);
        self.run(request).instrument(span).await
    }
}
