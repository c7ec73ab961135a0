//! Slot management for the single countdown task a match may run.

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to a running countdown task.
struct CountdownHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the at-most-one countdown task of the active match.
///
/// The engine only manages the task slot; the countdown loop itself is
/// spawned by the caller and must never touch the slot, so stopping can
/// await the task without deadlocking.
pub struct TimerEngine {
    slot: Mutex<Option<CountdownHandle>>,
}

impl TimerEngine {
    /// Create an engine with no countdown running.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Stop any running countdown, then install a fresh one.
    ///
    /// `spawn` receives the cancellation receiver the new task must watch.
    /// The previous task is fully stopped (cancelled and joined) before the
    /// replacement starts, so two countdowns never tick concurrently.
    pub async fn replace<F>(&self, spawn: F)
    where
        F: FnOnce(watch::Receiver<bool>) -> JoinHandle<()>,
    {
        let mut slot = self.slot.lock().await;
        stop_handle(slot.take()).await;

        let (cancel, cancelled) = watch::channel(false);
        let task = spawn(cancelled);
        *slot = Some(CountdownHandle { cancel, task });
        debug!("countdown task installed");
    }

    /// Stop the running countdown, if any, waiting until it has exited.
    pub async fn stop(&self) {
        let handle = self.slot.lock().await.take();
        stop_handle(handle).await;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

async fn stop_handle(handle: Option<CountdownHandle>) {
    let Some(handle) = handle else {
        return;
    };
    // The task may already have finished on its own; a closed channel is fine.
    let _ = handle.cancel.send(true);
    if let Err(err) = handle.task.await {
        if !err.is_cancelled() {
            warn!(error = %err, "countdown task ended abnormally");
        }
    }
    debug!("countdown task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    #[tokio::test]
    async fn stop_waits_for_the_task_to_acknowledge() {
        let engine = TimerEngine::new();
        let acknowledged = Arc::new(AtomicBool::new(false));
        let flag = acknowledged.clone();

        engine
            .replace(move |mut cancelled| {
                tokio::spawn(async move {
                    let _ = cancelled.changed().await;
                    flag.store(true, Ordering::SeqCst);
                })
            })
            .await;

        engine.stop().await;
        assert!(acknowledged.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn replace_cancels_the_previous_task_first() {
        let engine = TimerEngine::new();
        let stopped = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let counter = stopped.clone();
            engine
                .replace(move |mut cancelled| {
                    tokio::spawn(async move {
                        let _ = cancelled.changed().await;
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                })
                .await;
        }

        // Two of the three tasks were replaced, the last one is still live.
        assert_eq!(stopped.load(Ordering::SeqCst), 2);
        engine.stop().await;
        assert_eq!(stopped.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stop_without_a_task_is_a_no_op() {
        let engine = TimerEngine::new();
        engine.stop().await;
        engine.stop().await;
    }
}
