//! Session counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Lock-free counters shared by the report path, the worker and callers.
#[derive(Debug, Default)]
pub struct SessionCounters {
    frames_received: AtomicU64,
    frames_ignored: AtomicU64,
    malformed_lengths: AtomicU64,
    jobs_submitted: AtomicU64,
    jobs_executed: AtomicU64,
    jobs_dropped: AtomicU64,
    jobs_coalesced: AtomicU64,
    settings_pushes: AtomicU64,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_frames_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_frames_ignored(&self) {
        self.frames_ignored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_malformed_lengths(&self) {
        self.malformed_lengths.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_jobs_submitted(&self) {
        self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_jobs_executed(&self) {
        self.jobs_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_jobs_dropped(&self) {
        self.jobs_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_jobs_coalesced(&self) {
        self.jobs_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_settings_pushes(&self) {
        self.settings_pushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_ignored: self.frames_ignored.load(Ordering::Relaxed),
            malformed_lengths: self.malformed_lengths.load(Ordering::Relaxed),
            jobs_submitted: self.jobs_submitted.load(Ordering::Relaxed),
            jobs_executed: self.jobs_executed.load(Ordering::Relaxed),
            jobs_dropped: self.jobs_dropped.load(Ordering::Relaxed),
            jobs_coalesced: self.jobs_coalesced.load(Ordering::Relaxed),
            settings_pushes: self.settings_pushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SessionCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames_received: u64,
    /// Wrong size or unknown report type.
    pub frames_ignored: u64,
    /// Declared length did not match the report type; still processed.
    pub malformed_lengths: u64,
    pub jobs_submitted: u64,
    pub jobs_executed: u64,
    /// Rejected because the job queue was full or closed.
    pub jobs_dropped: u64,
    /// Transitions folded into a job that was already queued.
    pub jobs_coalesced: u64,
    /// Successful settings or auto-buttons requests.
    pub settings_pushes: u64,
}
