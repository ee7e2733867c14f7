//! Metrics collection utilities.
//!
//! Provides aggregated global and per-task-type solve statistics with
//! latency percentiles for observability.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Aggregated metrics across all task types.
#[derive(Debug, Clone)]
pub struct GlobalStats {
    pub started_at: DateTime<Utc>,
    pub created: u64,
    pub solved: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub average_solve_time: Option<Duration>,
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            created: 0,
            solved: 0,
            failed: 0,
            timed_out: 0,
            average_solve_time: None,
        }
    }
}

/// Per task type metrics snapshot.
#[derive(Debug, Clone)]
pub struct TaskTypeStats {
    pub task_type: String,
    pub created: u64,
    pub solved: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub polls: u64,
    pub transient_errors: u64,
    pub average_solve_time: Option<Duration>,
    pub p95_solve_time: Option<Duration>,
}

impl TaskTypeStats {
    fn from_accumulator(task_type: &str, acc: &TaskTypeAccumulator) -> Self {
        let (avg, p95) = acc.latency_stats();
        Self {
            task_type: task_type.to_string(),
            created: acc.created,
            solved: acc.solved,
            failed: acc.failed,
            timed_out: acc.timed_out,
            polls: acc.polls,
            transient_errors: acc.transient_errors,
            average_solve_time: avg,
            p95_solve_time: p95,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub global: GlobalStats,
    pub task_types: Vec<TaskTypeStats>,
}

impl MetricsSnapshot {
    pub fn task_type(&self, task_type: &str) -> Option<&TaskTypeStats> {
        self.task_types.iter().find(|s| s.task_type == task_type)
    }
}

#[derive(Debug)]
struct TaskTypeAccumulator {
    created: u64,
    solved: u64,
    failed: u64,
    timed_out: u64,
    polls: u64,
    transient_errors: u64,
    solve_times: VecDeque<Duration>,
    max_window: usize,
}

impl TaskTypeAccumulator {
    fn new(max_window: usize) -> Self {
        Self {
            created: 0,
            solved: 0,
            failed: 0,
            timed_out: 0,
            polls: 0,
            transient_errors: 0,
            solve_times: VecDeque::with_capacity(max_window),
            max_window,
        }
    }

    fn record_solve_time(&mut self, elapsed: Duration) {
        if self.solve_times.len() == self.max_window {
            self.solve_times.pop_front();
        }
        self.solve_times.push_back(elapsed);
    }

    fn latency_stats(&self) -> (Option<Duration>, Option<Duration>) {
        if self.solve_times.is_empty() {
            return (None, None);
        }
        let mut samples: Vec<_> = self.solve_times.iter().cloned().collect();
        samples.sort_unstable();
        let avg = samples.iter().map(|d| d.as_secs_f64()).sum::<f64>() / samples.len() as f64;
        let p95_index = ((samples.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);
        (Some(Duration::from_secs_f64(avg)), Some(samples[p95_index]))
    }
}

#[derive(Debug)]
struct MetricsState {
    global: GlobalStats,
    max_window: usize,
    task_types: HashMap<String, TaskTypeAccumulator>,
}

impl MetricsState {
    fn new(max_window: usize) -> Self {
        Self {
            global: GlobalStats::default(),
            max_window,
            task_types: HashMap::new(),
        }
    }

    fn accumulator_mut(&mut self, task_type: &str) -> &mut TaskTypeAccumulator {
        let max_window = self.max_window;
        self.task_types
            .entry(task_type.to_string())
            .or_insert_with(|| TaskTypeAccumulator::new(max_window))
    }
}

/// Thread-safe metrics collector shared by concurrent solves.
#[derive(Clone, Debug)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsState>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState::new(128))),
        }
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsState::new(window.max(16)))),
        }
    }

    fn with_state<F: FnOnce(&mut MetricsState)>(&self, f: F) {
        // A panicking handler must not take metrics down with it.
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }

    pub fn record_created(&self, task_type: &str) {
        self.with_state(|state| {
            state.global.created += 1;
            state.accumulator_mut(task_type).created += 1;
        });
    }

    pub fn record_poll(&self, task_type: &str, transient_error: bool) {
        self.with_state(|state| {
            let acc = state.accumulator_mut(task_type);
            acc.polls += 1;
            if transient_error {
                acc.transient_errors += 1;
            }
        });
    }

    pub fn record_solved(&self, task_type: &str, elapsed: Duration) {
        self.with_state(|state| {
            state.global.solved += 1;
            state.global.average_solve_time = Some(match state.global.average_solve_time {
                Some(avg) => {
                    Duration::from_secs_f64(avg.as_secs_f64() * 0.9 + elapsed.as_secs_f64() * 0.1)
                }
                None => elapsed,
            });
            let acc = state.accumulator_mut(task_type);
            acc.solved += 1;
            acc.record_solve_time(elapsed);
        });
    }

    pub fn record_failed(&self, task_type: &str) {
        self.with_state(|state| {
            state.global.failed += 1;
            state.accumulator_mut(task_type).failed += 1;
        });
    }

    pub fn record_timed_out(&self, task_type: &str) {
        self.with_state(|state| {
            state.global.timed_out += 1;
            state.accumulator_mut(task_type).timed_out += 1;
        });
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let task_types = guard
            .task_types
            .iter()
            .map(|(task_type, acc)| TaskTypeStats::from_accumulator(task_type, acc))
            .collect();
        MetricsSnapshot {
            global: guard.global.clone(),
            task_types,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
