//! Process Launcher - 启动 worker 进程
//!
//! 每个请求启动一个 worker，负载通过 stdin 传入（不走 argv，避免长度限制，
//! 也避免负载出现在进程列表中）。stdin 写入、stdout/stderr 收集、等待退出
//! 与可选的截止时间各自作为独立任务运行，终止信号全部提交给仲裁器。

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinSet};

use super::arbiter::{CompletionArbiter, CompletionEvent, WorkerExit};
use super::ProcessBridgeConfig;
use crate::domain::mood::ImagePayload;

/// 结算后等待各任务收尾的最长时间
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// 读取缓冲区大小
const READ_CHUNK: usize = 8192;

/// worker 进程启动器
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    config: ProcessBridgeConfig,
}

impl ProcessLauncher {
    pub fn new(config: ProcessBridgeConfig) -> Self {
        Self { config }
    }

    /// 实际尝试启动的可执行文件
    pub fn program(&self) -> &str {
        &self.config.executable
    }

    /// 启动 worker 并接上所有信号源
    ///
    /// 启动失败时直接返回错误，由调用方提交给仲裁器
    pub fn launch(
        &self,
        payload: ImagePayload,
        arbiter: Arc<CompletionArbiter>,
    ) -> io::Result<WorkerProcess> {
        let mut child = Command::new(&self.config.executable)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let pid = child.id();
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("worker stdin unavailable"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("worker stdout unavailable"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("worker stderr unavailable"))?;

        tracing::debug!(
            pid = ?pid,
            program = %self.config.executable,
            payload_len = payload.len(),
            "Mood worker spawned"
        );

        let mut tasks = JoinSet::new();
        let (kill_tx, kill_rx) = oneshot::channel();

        tasks.spawn(write_payload(stdin, payload, Arc::clone(&arbiter)));
        tasks.spawn(watch_exit(
            child,
            stdout,
            stderr,
            self.config.max_output_bytes,
            kill_rx,
            Arc::clone(&arbiter),
        ));

        let deadline = self.config.timeout.map(|timeout| {
            let arbiter = Arc::clone(&arbiter);
            tasks.spawn(async move {
                tokio::time::sleep(timeout).await;
                arbiter.submit(CompletionEvent::DeadlineElapsed(timeout));
            })
        });

        Ok(WorkerProcess {
            pid,
            tasks,
            kill_tx: Some(kill_tx),
            deadline,
        })
    }
}

/// 单个请求独占的 worker 进程
///
/// 正常路径调用 [`WorkerProcess::shutdown`] 终止并回收；
/// 若请求被放弃而直接 drop，`JoinSet` 会中止所有任务，子进程由 `kill_on_drop` 结束
#[derive(Debug)]
pub struct WorkerProcess {
    pid: Option<u32>,
    tasks: JoinSet<()>,
    kill_tx: Option<oneshot::Sender<()>>,
    deadline: Option<AbortHandle>,
}

impl WorkerProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// 终止（若仍在运行）并回收 worker，等待所有任务结束
    pub async fn shutdown(mut self) {
        if let Some(deadline) = self.deadline.take() {
            deadline.abort();
        }
        if let Some(kill_tx) = self.kill_tx.take() {
            // 进程已退出时接收端已关闭
            let _ = kill_tx.send(());
        }

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(joined) = self.tasks.join_next().await {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::error!(pid = ?self.pid, error = %e, "Mood worker task panicked");
                    }
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(pid = ?self.pid, "Mood worker tasks did not finish in time, aborting");
            self.tasks.abort_all();
        }
    }
}

/// 写入负载后关闭 stdin 表示输入结束
async fn write_payload(mut stdin: ChildStdin, payload: ImagePayload, arbiter: Arc<CompletionArbiter>) {
    let result = async {
        stdin.write_all(payload.as_bytes()).await?;
        stdin.flush().await
    }
    .await;
    drop(stdin);

    match result {
        Ok(()) => tracing::trace!(bytes = payload.len(), "Payload written to mood worker"),
        Err(error) => {
            tracing::debug!(error = %error, "Failed to write payload to mood worker");
            arbiter.submit(CompletionEvent::StdinFailed(error));
        }
    }
}

/// 等待进程退出并收集输出；收到终止信号时杀死并回收进程
async fn watch_exit(
    mut child: Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
    limit: usize,
    mut kill_rx: oneshot::Receiver<()>,
    arbiter: Arc<CompletionArbiter>,
) {
    let finished = tokio::select! {
        exit = collect_exit(&mut child, stdout, stderr, limit) => Some(exit),
        // 已结算或 WorkerProcess 被丢弃
        _ = &mut kill_rx => None,
    };

    match finished {
        Some(exit) => {
            arbiter.submit(CompletionEvent::Exited(exit));
        }
        None => {
            if let Err(e) = child.kill().await {
                tracing::warn!(pid = ?child.id(), error = %e, "Failed to kill mood worker");
            } else {
                tracing::debug!("Mood worker terminated");
            }
        }
    }
}

async fn collect_exit(
    child: &mut Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
    limit: usize,
) -> WorkerExit {
    let (status, stdout, stderr) = tokio::join!(
        child.wait(),
        read_capped(stdout, limit, "stdout"),
        read_capped(stderr, limit, "stderr"),
    );

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to wait for mood worker");
            None
        }
    };

    WorkerExit { code, stdout, stderr }
}

/// 读到 EOF，最多保留 `limit` 字节；超出部分继续读取并丢弃，避免 worker 因管道写满而阻塞
async fn read_capped<R>(mut reader: R, limit: usize, stream: &'static str) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    let mut discarded = 0usize;

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                let keep = n.min(limit.saturating_sub(buf.len()));
                buf.extend_from_slice(&chunk[..keep]);
                discarded += n - keep;
            }
            Err(e) => {
                tracing::warn!(stream, error = %e, "Failed to read mood worker output");
                break;
            }
        }
    }

    if discarded > 0 {
        tracing::warn!(stream, limit, discarded, "Mood worker output truncated");
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_capped_keeps_prefix_and_drains() {
        let data = vec![b'x'; 20_000];
        let buf = read_capped(&data[..], 100, "stdout").await;
        assert_eq!(buf.len(), 100);
    }

    #[tokio::test]
    async fn test_read_capped_under_limit() {
        let buf = read_capped(&b"{\"result\":\"Sad\"}"[..], 1024, "stdout").await;
        assert_eq!(buf, b"{\"result\":\"Sad\"}");
    }

    #[tokio::test]
    async fn test_launch_missing_executable_fails() {
        let launcher = ProcessLauncher::new(ProcessBridgeConfig {
            executable: "/nonexistent/moodtune/mood-detector".to_string(),
            ..Default::default()
        });
        let (arbiter, _settlement) = CompletionArbiter::new();

        let err = launcher
            .launch(ImagePayload::new("x").unwrap(), arbiter)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
