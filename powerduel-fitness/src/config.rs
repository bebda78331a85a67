//! Configuration for fitness evaluation
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};

/// Configuration for fitness evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Whether to score chromosomes in parallel
    pub parallel: bool,
    /// Ceiling on worker threads (0 = rayon's global pool)
    pub worker_threads: usize,
    /// Largest opposing plan set the evaluator will enumerate
    pub max_opponent_plans: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            worker_threads: 256,
            max_opponent_plans: 1_000_000,
        }
    }
}

impl EvalConfig {
    /// Score on the calling thread only
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    /// Set the worker thread ceiling
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    /// Set the opposing plan limit
    pub fn with_max_opponent_plans(mut self, max_opponent_plans: u64) -> Self {
        self.max_opponent_plans = max_opponent_plans;
        self
    }

    /// Threads a dedicated pool would get, or None to use the global pool.
    ///
    /// The ceiling is clamped to the machine's available parallelism.
    pub fn pool_size(&self) -> Option<usize> {
        if !self.parallel || self.worker_threads == 0 {
            return None;
        }
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(self.worker_threads);
        Some(self.worker_threads.min(available))
    }
}
