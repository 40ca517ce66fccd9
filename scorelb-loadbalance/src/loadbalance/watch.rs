use super::Balancer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 后台刷新任务句柄
///
/// 通过 [`Balancer::spawn_watch`] 创建，调用 [`WatchHandle::shutdown`] 停止。
#[derive(Debug)]
pub struct WatchHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// 停止刷新循环并等待任务退出
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!("Watch task failed: {}", e);
        }
    }
}

impl Balancer {
    /// 刷新循环：执行一轮刷新，然后等待 `interval`，直到 `cancel` 被取消
    pub async fn watch(&self, interval: Duration, cancel: CancellationToken) {
        info!(
            "Starting watch loop for {} nodes with interval: {:?}",
            self.nodes().len(),
            interval
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.refresh_once() => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!("Watch loop stopped");
    }

    /// 在当前任务中无限执行刷新循环，永不返回
    pub async fn watch_forever(&self, interval: Duration) {
        self.watch(interval, CancellationToken::new()).await
    }

    /// 在后台 tokio 任务中执行刷新循环
    pub fn spawn_watch(self: &Arc<Self>, interval: Duration) -> WatchHandle {
        let cancel = CancellationToken::new();
        let balancer = self.clone();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            balancer.watch(interval, token).await;
        });

        WatchHandle { cancel, task }
    }
}
