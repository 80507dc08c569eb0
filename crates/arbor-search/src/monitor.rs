// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Search Monitoring Interface
//!
//! A callback interface for observing the lifecycle of a running
//! search. Implementations collect telemetry or emit progress output;
//! they cannot steer the search, which is cancelled cooperatively
//! through the registry's stop flag instead. Monitors are shared by
//! every worker thread, so hooks take `&self` and implementations
//! synchronise internally.

use crate::params::SearchGoal;
use crate::stats::SearchStatistics;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait SearchMonitor<B>: Send + Sync {
    fn name(&self) -> &str;

    fn on_enter_search(&self, _strategy: &str, _goal: SearchGoal) {}

    /// A strictly better incumbent bound was installed.
    fn on_improvement(&self, _bound: B) {}

    /// `count` subtree tasks were handed to the pool.
    fn on_spawn(&self, _count: usize) {}

    fn on_exit_search(&self, _stats: &SearchStatistics) {}
}

impl<B> std::fmt::Debug for dyn SearchMonitor<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

/// The default monitor. Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMonitor;

impl<B> SearchMonitor<B> for NoOpMonitor {
    fn name(&self) -> &str {
        "NoOpMonitor"
    }
}

/// Prints a line per incumbent improvement and a summary table at the
/// end of the search, rate-limited by `interval`.
#[derive(Debug)]
pub struct LogMonitor {
    start: Instant,
    last_line: Mutex<Option<Instant>>,
    interval: Duration,
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl LogMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            last_line: Mutex::new(None),
            interval,
        }
    }

    fn should_print(&self) -> bool {
        let mut last = self.last_line.lock().unwrap();
        let now = Instant::now();
        let due = match *last {
            None => true,
            Some(at) => now.duration_since(at) >= self.interval,
        };
        if due {
            *last = Some(now);
        }
        due
    }
}

impl<B: std::fmt::Display> SearchMonitor<B> for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&self, strategy: &str, goal: SearchGoal) {
        println!("Strategy: {}", strategy);
        println!("Goal:     {}", goal);
        println!(
            "{:<9} | {:<14}",
            "Elapsed", "Incumbent"
        );
        println!("{}", "-".repeat(26));
    }

    fn on_improvement(&self, bound: B) {
        if self.should_print() {
            let elapsed = self.start.elapsed().as_secs_f32();
            println!("{:<9} | {:<14}", format!("{:.1}s", elapsed), bound);
        }
    }

    fn on_exit_search(&self, stats: &SearchStatistics) {
        println!("{}", stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_monitor_name() {
        let m = NoOpMonitor;
        assert_eq!(SearchMonitor::<i64>::name(&m), "NoOpMonitor");
        SearchMonitor::<i64>::on_improvement(&m, 3);
        SearchMonitor::<i64>::on_spawn(&m, 1);
    }

    #[test]
    fn test_log_monitor_rate_limits() {
        let m = LogMonitor::new(Duration::from_secs(3600));
        // First line is due immediately, the second is suppressed.
        assert!(m.should_print());
        assert!(!m.should_print());
    }
}
