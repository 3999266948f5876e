use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// In-process counters exposed on `/api/v1/metrics`.
#[derive(Clone)]
pub struct Metrics {
    pub registrations: Arc<AtomicU64>,
    pub logins: Arc<AtomicU64>,
    pub failed_logins: Arc<AtomicU64>,
    pub diseases_created: Arc<AtomicU64>,
    pub diseases_imported: Arc<AtomicU64>,
    pub import_row_errors: Arc<AtomicU64>,
    pub posts_created: Arc<AtomicU64>,
    pub comments_created: Arc<AtomicU64>,
    pub scans_recorded: Arc<AtomicU64>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            registrations: Arc::new(AtomicU64::new(0)),
            logins: Arc::new(AtomicU64::new(0)),
            failed_logins: Arc::new(AtomicU64::new(0)),
            diseases_created: Arc::new(AtomicU64::new(0)),
            diseases_imported: Arc::new(AtomicU64::new(0)),
            import_row_errors: Arc::new(AtomicU64::new(0)),
            posts_created: Arc::new(AtomicU64::new(0)),
            comments_created: Arc::new(AtomicU64::new(0)),
            scans_recorded: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_registrations(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_logins(&self) {
        self.logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_failed_logins(&self) {
        self.failed_logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_diseases_created(&self) {
        self.diseases_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_import(&self, imported: u64, row_errors: u64) {
        self.diseases_imported.fetch_add(imported, Ordering::Relaxed);
        self.import_row_errors.fetch_add(row_errors, Ordering::Relaxed);
    }

    pub fn inc_posts(&self) {
        self.posts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_comments(&self) {
        self.comments_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_scans(&self) {
        self.scans_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            logins: self.logins.load(Ordering::Relaxed),
            failed_logins: self.failed_logins.load(Ordering::Relaxed),
            diseases_created: self.diseases_created.load(Ordering::Relaxed),
            diseases_imported: self.diseases_imported.load(Ordering::Relaxed),
            import_row_errors: self.import_row_errors.load(Ordering::Relaxed),
            posts_created: self.posts_created.load(Ordering::Relaxed),
            comments_created: self.comments_created.load(Ordering::Relaxed),
            scans_recorded: self.scans_recorded.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub registrations: u64,
    pub logins: u64,
    pub failed_logins: u64,
    pub diseases_created: u64,
    pub diseases_imported: u64,
    pub import_row_errors: u64,
    pub posts_created: u64,
    pub comments_created: u64,
    pub scans_recorded: u64,
    pub uptime_seconds: u64,
}
