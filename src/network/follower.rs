//! Polling block follower
//!
//! Watches the chain tip through a [`BlockSource`] and forwards every new
//! block, in height order, over a bounded channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::SdkConfig;
use crate::rpc::{RpcClient, RpcError};

/// Floor for the polling period; a zero period would stall the timer
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Where the follower reads the chain from
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Index of the newest block
    async fn height(&self) -> Result<u64, RpcError>;
    /// Block payload at `height`
    async fn block(&self, height: u64) -> Result<Value, RpcError>;
}

#[async_trait]
impl BlockSource for RpcClient {
    async fn height(&self) -> Result<u64, RpcError> {
        self.block_height().await
    }

    async fn block(&self, height: u64) -> Result<Value, RpcError> {
        RpcClient::block(self, height).await
    }
}

/// Block follower. Nothing runs until [`BlockFollower::start`].
pub struct BlockFollower {
    source: Arc<dyn BlockSource>,
    start_height: u64,
    poll_interval: Duration,
    capacity: usize,
}

impl BlockFollower {
    /// `start_height` is the last height already seen; delivery begins
    /// at the block after it.
    pub fn new(
        source: Arc<dyn BlockSource>,
        start_height: u64,
        poll_interval: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            source,
            start_height,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            capacity: capacity.max(1),
        }
    }

    pub fn from_config(
        source: Arc<dyn BlockSource>,
        start_height: u64,
        config: &SdkConfig,
    ) -> Self {
        Self::new(
            source,
            start_height,
            config.poll_interval(),
            config.follower_channel_capacity,
        )
    }

    /// Spawn the polling task
    pub fn start(self) -> (FollowerHandle, mpsc::Receiver<Value>) {
        let (block_tx, block_rx) = mpsc::channel(self.capacity);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let cursor = Arc::new(AtomicU64::new(self.start_height));

        let source = self.source;
        let poll_interval = self.poll_interval;
        let task_cursor = cursor.clone();
        log::info!(
            "Block follower started after height {} (every {:?})",
            self.start_height,
            poll_interval
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            // A long catch-up tick waits a full period before the next poll
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        log::info!("Block follower shutting down...");
                        break;
                    }
                    open = async {
                        ticker.tick().await;
                        poll_once(source.as_ref(), &task_cursor, &block_tx).await
                    } => {
                        if !open {
                            log::info!("Block receiver dropped, follower stopping");
                            break;
                        }
                    }
                }
            }
        });

        let handle = FollowerHandle {
            cursor,
            shutdown_tx,
            task: Some(task),
        };
        (handle, block_rx)
    }
}

/// One tick. Returns `false` once the receiver is gone.
async fn poll_once(
    source: &dyn BlockSource,
    cursor: &AtomicU64,
    blocks: &mpsc::Sender<Value>,
) -> bool {
    let height = match source.height().await {
        Ok(height) => height,
        Err(e) => {
            log::warn!("Failed to fetch chain height: {}", e);
            return true;
        }
    };

    let mut last = cursor.load(Ordering::SeqCst);
    while last < height {
        let next = last + 1;
        let block = match source.block(next).await {
            Ok(block) => block,
            Err(e) => {
                log::warn!("Failed to fetch block {}: {}", next, e);
                return true;
            }
        };
        if blocks.send(block).await.is_err() {
            return false;
        }
        cursor.store(next, Ordering::SeqCst);
        log::debug!("Delivered block {}", next);
        last = next;
    }
    if height > 0 && last == height {
        log::info!("Follower at height {}", height);
    }
    true
}

/// Control side of a running follower
pub struct FollowerHandle {
    cursor: Arc<AtomicU64>,
    shutdown_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl FollowerHandle {
    /// Last height delivered
    pub fn current_height(&self) -> u64 {
        self.cursor.load(Ordering::SeqCst)
    }

    /// Signal shutdown and wait for the task to finish
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("Block follower task failed: {}", e);
            }
        }
    }
}
