//! Checkpoint module for resumable runs
//!
//! This module handles:
//! - Atomic JSON snapshots of the results of completed targets
//! - Loading a previous snapshot when a run is resumed
//! - The background task that snapshots the shared results periodically
//!
//! A checkpoint is advisory: deleting it between runs only means the next run
//! starts from scratch.

mod json;
mod traits;

pub use json::{read_entries, JsonCheckpoint};
pub use traits::{CheckpointError, CheckpointResult, CheckpointStore};

use crate::extract::CompanyRecord;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Results of completed targets, keyed by link
///
/// Ordered by key so that snapshots are stable between saves.
pub type ResultSet = BTreeMap<String, CompanyRecord>;

/// Returns the checkpoint path that belongs to an output file
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use yc_harvest::checkpoint::checkpoint_path_for;
///
/// let path = checkpoint_path_for(Path::new("out/companies.csv"));
/// assert_eq!(path, Path::new("out/companies.csv.ckpt.json"));
/// ```
pub fn checkpoint_path_for(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".ckpt.json");
    output.with_file_name(name)
}

/// Loads the checkpoint at `path`, or an empty set if there is none
pub fn load_checkpoint(path: &Path) -> ResultSet {
    JsonCheckpoint::new(path).load()
}

/// Atomically writes `results` as the checkpoint at `path`
pub fn save_checkpoint(path: &Path, results: &ResultSet) -> CheckpointResult<()> {
    JsonCheckpoint::new(path).save(results)
}

/// Serialized, off-thread access to a checkpoint store
///
/// Writes run on the blocking thread pool one at a time. A write that has
/// started finishes even if the task awaiting it is aborted, and the next
/// write waits for it, so a later snapshot is never overwritten by an
/// earlier one.
#[derive(Clone)]
pub struct CheckpointWriter {
    store: Arc<dyn CheckpointStore>,
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl CheckpointWriter {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            store,
            gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Loads the last snapshot on the blocking thread pool
    pub async fn load(&self) -> ResultSet {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Checkpoint load task failed: {}", e);
                ResultSet::new()
            }
        }
    }

    /// Writes `results` as the new snapshot
    pub async fn save(&self, results: ResultSet) -> CheckpointResult<()> {
        let permit = Arc::clone(&self.gate).lock_owned().await;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            store.save(&results)
        })
        .await
        .map_err(|e| CheckpointError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}

/// Snapshots the current contents of `results`, if there are any
///
/// The lock is held only while cloning; the write happens afterwards.
pub async fn save_snapshot(
    writer: &CheckpointWriter,
    results: &Mutex<ResultSet>,
) -> CheckpointResult<bool> {
    let snapshot = results.lock().unwrap().clone();
    if snapshot.is_empty() {
        return Ok(false);
    }
    writer.save(snapshot).await?;
    Ok(true)
}

/// Starts the periodic snapshot task
///
/// While `active_workers` is non-zero the task sleeps for `interval` and then
/// saves a snapshot of `results`. Failed saves are logged and retried on the
/// next tick. Stop it with [`stop_checkpointer`].
pub fn spawn_checkpointer(
    writer: CheckpointWriter,
    results: Arc<Mutex<ResultSet>>,
    active_workers: Arc<AtomicUsize>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while active_workers.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(interval).await;
            if let Err(e) = save_snapshot(&writer, &results).await {
                tracing::warn!("Periodic checkpoint failed: {}", e);
            }
        }
    })
}

/// Stops the periodic snapshot task and waits for it to finish
///
/// Cancellation is expected and swallowed; a panic inside the task is logged.
/// A write already running on the blocking pool still completes.
pub async fn stop_checkpointer(handle: JoinHandle<()>) {
    handle.abort();
    match handle.await {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => tracing::error!("Checkpoint task failed: {}", e),
    }
}
