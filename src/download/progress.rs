//! The single "current download" slot and the observers that feed it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::SlotBusy;

/// Receives the cumulative byte count after every chunk written.
pub trait ProgressObserver {
    fn on_progress(&self, bytes: u64);
}

impl<F: Fn(u64)> ProgressObserver for F {
    fn on_progress(&self, bytes: u64) {
        self(bytes)
    }
}

/// The transfer currently shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub file_name: String,
    pub total_size: u64,
    pub bytes_transferred: u64,
    pub done: bool,
}

/// Shared record of the active transfer. Only one transfer may be active; the
/// next one can begin once the previous one is marked complete.
#[derive(Debug, Default)]
pub struct ProgressSlot {
    task: Mutex<Option<DownloadTask>>,
}

impl ProgressSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<DownloadTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `file_name` the active transfer.
    pub fn begin(&self, file_name: &str, total_size: u64) -> Result<DownloadTask, SlotBusy> {
        let mut slot = self.lock();
        if let Some(active) = slot.as_ref().filter(|t| !t.done) {
            return Err(SlotBusy {
                active: active.file_name.clone(),
                requested: file_name.to_string(),
            });
        }
        let task = DownloadTask {
            file_name: file_name.to_string(),
            total_size,
            bytes_transferred: 0,
            done: false,
        };
        *slot = Some(task.clone());
        Ok(task)
    }

    /// Stores a new cumulative count and returns a copy of the updated task.
    pub fn record(&self, bytes: u64) -> Option<DownloadTask> {
        let mut slot = self.lock();
        let task = slot.as_mut().filter(|t| !t.done)?;
        task.bytes_transferred = bytes;
        Some(task.clone())
    }

    /// Marks the active transfer finished, releasing the slot.
    pub fn complete(&self) -> Option<DownloadTask> {
        let mut slot = self.lock();
        let task = slot.as_mut()?;
        task.done = true;
        Some(task.clone())
    }

    pub fn snapshot(&self) -> Option<DownloadTask> {
        self.lock().clone()
    }

    /// True when no transfer is running.
    pub fn is_idle(&self) -> bool {
        self.lock().as_ref().is_none_or(|t| t.done)
    }
}

/// Renders the active transfer. Implementations get copies, never the lock.
pub trait ProgressDisplay: Send + Sync {
    fn started(&self, task: &DownloadTask);
    fn update(&self, task: &DownloadTask);
    fn finished(&self, task: &DownloadTask);
}

/// Bridges a stream copy to the slot and its display.
pub struct SlotObserver<'a> {
    slot: &'a ProgressSlot,
    display: &'a dyn ProgressDisplay,
}

impl<'a> SlotObserver<'a> {
    pub fn new(slot: &'a ProgressSlot, display: &'a dyn ProgressDisplay) -> Self {
        Self { slot, display }
    }
}

impl ProgressObserver for SlotObserver<'_> {
    fn on_progress(&self, bytes: u64) {
        if let Some(task) = self.slot.record(bytes) {
            self.display.update(&task);
        }
    }
}
