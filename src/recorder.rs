use std::future::Future;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::model::SnapshotRecord;
use crate::store::SnapshotStore;
use crate::time::{duration_until, following_snapshot_at, next_snapshot_at, now};
use crate::Located;

type QuitSignal = oneshot::Receiver<Quit>;

#[derive(Debug, Clone, Copy)]
struct Quit;

/// Background task that opens a new statistics period at midnight UTC on the 5th of every month.
#[derive(Debug)]
pub struct SnapshotRecorder {
    tx: oneshot::Sender<Quit>,
    handle: JoinHandle<()>,
}

impl SnapshotRecorder {
    pub fn spawn<S>(store: S) -> Self
    where
        S: SnapshotStore + 'static,
    {
        Self::spawn_task(|mut quit| async move {
            let mut next = next_snapshot_at(now());
            loop {
                tracing::info!(%next, "waiting for the next statistics period");

                tokio::select! {
                    _ = tokio::time::sleep(duration_until(next, now())) => {
                        record(&store).await;
                        next = following_snapshot_at(next, now());
                    }
                    _ = &mut quit => break,
                }
            }

            tracing::info!("snapshot recorder stopped");
        })
    }

    fn spawn_task<F>(f: impl FnOnce(QuitSignal) -> F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::task::spawn(f(rx));
        Self { tx, handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal the task to stop and wait until it has.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Quit);
        let _ = self.handle.await;
    }
}

/// Store an empty snapshot stamped with the current time; failures are logged and skipped.
pub async fn record(store: &impl SnapshotStore) {
    match store.record_snapshot(SnapshotRecord::opened_at(now())).await {
        Ok(snapshot) => {
            tracing::info!(created_at = ?snapshot.created_at, "recorded a new statistics period");
        }
        Err(error) => {
            tracing::warn!(%error, location = %error.location(), "failed to record statistics snapshot");
        }
    }
}
