//! Upload progress tracking.
//!
//! Progress entries are process-wide and follow an explicit lifecycle: an
//! upload registers when it starts, its [`UploadGuard`] records progress and
//! the terminal state, and the entry is removed once a client has read that
//! terminal state. A guard dropped before completion (handler error, client
//! disconnect) marks the upload as failed.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{GroveError, Result};

/// Terminal entries nobody asked for are dropped after this long.
const FINISHED_RETENTION: Duration = Duration::from_secs(600);

/// Upload state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Uploading)
    }
}

/// Snapshot of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadProgress {
    pub upload_id: Uuid,
    pub status: UploadStatus,
    /// Percentage 0-100, when the total size is known.
    pub progress: u8,
    pub received_bytes: u64,
    pub total_bytes: Option<u64>,
    /// Created file, once completed.
    pub file_id: Option<i64>,
    /// Failure reason.
    pub error: Option<String>,
}

#[derive(Debug)]
struct Entry {
    progress: UploadProgress,
    finished_at: Option<Instant>,
}

/// Process-wide registry of in-flight and recently finished uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    entries: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Entry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new upload.
    ///
    /// Fails if `upload_id` belongs to an upload that is still running.
    pub fn start(&self, upload_id: Uuid, total_bytes: Option<u64>) -> Result<UploadGuard> {
        let mut entries = self.write();

        let now = Instant::now();
        entries.retain(|_, entry| match entry.finished_at {
            Some(at) => now.duration_since(at) < FINISHED_RETENTION,
            None => true,
        });

        if let Some(existing) = entries.get(&upload_id) {
            if !existing.progress.status.is_terminal() {
                return Err(GroveError::Validation(format!(
                    "upload {upload_id} is already in progress"
                )));
            }
        }

        entries.insert(
            upload_id,
            Entry {
                progress: UploadProgress {
                    upload_id,
                    status: UploadStatus::Uploading,
                    progress: 0,
                    received_bytes: 0,
                    total_bytes,
                    file_id: None,
                    error: None,
                },
                finished_at: None,
            },
        );
        tracing::debug!("Upload {} started", upload_id);

        Ok(UploadGuard {
            tracker: self.clone(),
            upload_id,
            finished: false,
        })
    }

    /// Current state of an upload, without changing it.
    pub fn get(&self, upload_id: &Uuid) -> Option<UploadProgress> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(upload_id)
            .map(|entry| entry.progress.clone())
    }

    /// Read the state of an upload for a client.
    ///
    /// Terminal states are removed once read.
    pub fn poll(&self, upload_id: &Uuid) -> Option<UploadProgress> {
        let mut entries = self.write();
        let progress = entries.get(upload_id)?.progress.clone();
        if progress.status.is_terminal() {
            entries.remove(upload_id);
        }
        Some(progress)
    }

    /// Number of tracked uploads.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, upload_id: &Uuid, f: impl FnOnce(&mut Entry)) {
        if let Some(entry) = self.write().get_mut(upload_id) {
            f(entry);
        }
    }
}

/// Handle owned by the task receiving an upload.
#[derive(Debug)]
pub struct UploadGuard {
    tracker: UploadTracker,
    upload_id: Uuid,
    finished: bool,
}

impl UploadGuard {
    pub fn upload_id(&self) -> Uuid {
        self.upload_id
    }

    /// Record the number of bytes received so far.
    pub fn advance(&self, received_bytes: u64) {
        self.tracker.update(&self.upload_id, |entry| {
            let progress = &mut entry.progress;
            progress.received_bytes = received_bytes;
            if let Some(total) = progress.total_bytes.filter(|t| *t > 0) {
                // Stays below 100 until the upload is stored
                progress.progress = ((received_bytes.min(total) * 100) / total).min(99) as u8;
            }
        });
    }

    /// Mark the upload as stored.
    pub fn complete(mut self, file_id: i64) {
        self.finished = true;
        self.tracker.update(&self.upload_id, |entry| {
            entry.progress.status = UploadStatus::Completed;
            entry.progress.progress = 100;
            entry.progress.file_id = Some(file_id);
            entry.finished_at = Some(Instant::now());
        });
        tracing::debug!("Upload {} completed as file {}", self.upload_id, file_id);
    }

    /// Mark the upload as failed.
    pub fn fail(mut self, reason: impl Into<String>) {
        self.finished = true;
        self.mark_failed(reason.into());
    }

    fn mark_failed(&self, reason: String) {
        tracing::debug!("Upload {} failed: {}", self.upload_id, reason);
        self.tracker.update(&self.upload_id, |entry| {
            entry.progress.status = UploadStatus::Failed;
            entry.progress.error = Some(reason);
            entry.finished_at = Some(Instant::now());
        });
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.mark_failed("upload interrupted".to_string());
        }
    }
}
