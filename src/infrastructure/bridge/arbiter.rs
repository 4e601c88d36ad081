//! Completion Arbiter - 一次性结算
//!
//! worker 的多个完成信号（启动失败、stdin 写入失败、进程退出、超时）
//! 来自互相独立的异步来源，且并不互斥。仲裁器只接受第一个信号，
//! 之后的信号一律丢弃，保证每个请求恰好得到一个结果。

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

/// worker 退出时的完整输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerExit {
    /// 退出码，被信号终止时为 `None`
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// 竞争结算的完成信号
#[derive(Debug)]
pub enum CompletionEvent {
    /// 进程未能启动
    SpawnFailed { program: String, error: io::Error },
    /// 向 stdin 写入负载失败
    StdinFailed(io::Error),
    /// 进程退出，stdout/stderr 已读到 EOF
    Exited(WorkerExit),
    /// 超过配置的截止时间
    DeadlineElapsed(Duration),
}

impl CompletionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::StdinFailed(_) => "stdin_failed",
            Self::Exited(_) => "exited",
            Self::DeadlineElapsed(_) => "deadline_elapsed",
        }
    }
}

/// PENDING → SETTLED 的原子标志，只能转换一次
#[derive(Debug, Default)]
pub struct ResolutionGuard {
    settled: AtomicBool,
}

impl ResolutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试结算，只有第一个调用者返回 `true`
    pub fn try_settle(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// 完成信号仲裁器
///
/// 所有信号源共享同一个 `Arc<CompletionArbiter>`；
/// 结果通过 [`Settlement`] 交给唯一的消费者
#[derive(Debug)]
pub struct CompletionArbiter {
    guard: ResolutionGuard,
    // 只有赢得 guard 的一方会取出 sender
    slot: Mutex<Option<oneshot::Sender<CompletionEvent>>>,
}

impl CompletionArbiter {
    /// 创建仲裁器及其结算接收端
    pub fn new() -> (Arc<Self>, Settlement) {
        let (tx, rx) = oneshot::channel();
        let arbiter = Arc::new(Self {
            guard: ResolutionGuard::new(),
            slot: Mutex::new(Some(tx)),
        });
        (arbiter, Settlement { rx })
    }

    /// 提交一个完成信号
    ///
    /// 返回 `true` 表示该信号成为最终结果；已结算时信号被丢弃并返回 `false`
    pub fn submit(&self, event: CompletionEvent) -> bool {
        if !self.guard.try_settle() {
            tracing::debug!(event = event.kind(), "Discarding completion signal after settlement");
            return false;
        }

        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(sender) = sender {
            tracing::debug!(event = event.kind(), "Completion settled");
            // 接收端已放弃时无需处理
            let _ = sender.send(event);
        }
        true
    }
}

/// 结算接收端
#[derive(Debug)]
pub struct Settlement {
    rx: oneshot::Receiver<CompletionEvent>,
}

impl Settlement {
    /// 等待最终结果
    ///
    /// 所有信号源都已退出且未提交任何信号时返回 `None`
    pub async fn wait(self) -> Option<CompletionEvent> {
        self.rx.await.ok()
    }
}
