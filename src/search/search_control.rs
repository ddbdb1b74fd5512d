//! Shared cancellation and accounting state for a running search.
//!
//! One `SearchControl` is created per search request and shared (via `Arc`)
//! between the caller and the worker thread. The caller may request a stop
//! at any time; the search calls `bump_nodes_and_check` at every node.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct SearchControl {
    stop: AtomicBool,
    nodes_visited: AtomicU64,
    node_budget: AtomicU64,    // 0 means unlimited
    time_budget_ms: AtomicU64, // 0 means unlimited
    started_at: Mutex<Option<Instant>>,
}

impl Default for SearchControl {
    fn default() -> Self {
        Self {
            stop: AtomicBool::new(false),
            nodes_visited: AtomicU64::new(0),
            node_budget: AtomicU64::new(0),
            time_budget_ms: AtomicU64::new(0),
            started_at: Mutex::new(None),
        }
    }
}

impl SearchControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nodes_visited(&self) -> u64 {
        self.nodes_visited.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_node_budget(&self, budget: Option<u64>) {
        self.node_budget.store(budget.unwrap_or(0), Ordering::Relaxed);
    }

    #[inline]
    pub fn set_time_budget(&self, budget: Option<Duration>) {
        let ms = budget.map(|d| d.as_millis().max(1) as u64).unwrap_or(0);
        self.time_budget_ms.store(ms, Ordering::Relaxed);
    }

    /// Reset counters and the clock at the start of a search. A pending stop
    /// request is kept so a cancel that races the worker start still wins.
    pub fn start_clock(&self) {
        self.nodes_visited.store(0, Ordering::Relaxed);
        if let Ok(mut guard) = self.started_at.lock() {
            *guard = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        let Ok(guard) = self.started_at.lock() else {
            return Duration::ZERO;
        };
        guard.map(|started| started.elapsed()).unwrap_or(Duration::ZERO)
    }

    /// Adds node count and returns true if the search must unwind.
    #[inline]
    pub fn bump_nodes_and_check(&self, n: u64) -> bool {
        let new_nodes = self.nodes_visited.fetch_add(n, Ordering::Relaxed) + n;
        if self.stop_requested() {
            return true;
        }
        let limit = self.node_budget.load(Ordering::Relaxed);
        if limit != 0 && new_nodes >= limit {
            return true;
        }
        self.time_budget_exceeded()
    }

    pub fn time_budget_exceeded(&self) -> bool {
        let budget_ms = self.time_budget_ms.load(Ordering::Relaxed);
        if budget_ms == 0 {
            return false;
        }
        self.elapsed().as_millis() as u64 >= budget_ms
    }
}
