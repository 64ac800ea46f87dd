use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Process-lifetime request counters.
pub struct Metrics {
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    chat_requests: AtomicUsize,
    summarize_requests: AtomicUsize,

    // Timing (in microseconds)
    total_chat_time_us: AtomicU64,
    total_summarize_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            chat_requests: AtomicUsize::new(0),
            summarize_requests: AtomicUsize::new(0),
            total_chat_time_us: AtomicU64::new(0),
            total_summarize_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_chat(&self, duration: Duration, success: bool) {
        self.record_request(success);
        self.chat_requests.fetch_add(1, Ordering::Relaxed);
        self.total_chat_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_summarize(&self, duration: Duration, success: bool) {
        self.record_request(success);
        self.summarize_requests.fetch_add(1, Ordering::Relaxed);
        self.total_summarize_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            chat_requests: self.chat_requests.load(Ordering::Relaxed),
            summarize_requests: self.summarize_requests.load(Ordering::Relaxed),
            avg_chat_time_ms: avg_time_ms(&self.total_chat_time_us, &self.chat_requests),
            avg_summarize_time_ms: avg_time_ms(&self.total_summarize_time_us, &self.summarize_requests),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub chat_requests: usize,
    pub summarize_requests: usize,
    pub avg_chat_time_ms: f64,
    pub avg_summarize_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
