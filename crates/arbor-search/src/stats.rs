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

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared by every task of one search. All updates
/// use relaxed ordering; the totals are read after the schedulers have
/// stopped.
#[derive(Debug, Default)]
pub struct StatRecorder {
    nodes: AtomicU64,
    spawns: AtomicU64,
    prunes: AtomicU64,
    backtracks: AtomicU64,
    max_depth: AtomicU64,
    nodes_at_improvement: AtomicU64,
}

impl StatRecorder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn on_node(&self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn on_spawn(&self) {
        self.spawns.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn on_prune(&self) {
        self.prunes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn on_backtrack(&self) {
        self.backtracks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn on_depth(&self, depth: usize) {
        self.max_depth.fetch_max(depth as u64, Ordering::Relaxed);
    }

    /// Records the node count at the moment an incumbent improvement
    /// landed. Best-first orderings push this number down.
    #[inline]
    pub fn on_improvement(&self) {
        self.nodes_at_improvement
            .store(self.nodes.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    #[inline]
    pub fn nodes_explored(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn tasks_spawned(&self) -> u64 {
        self.spawns.load(Ordering::Relaxed)
    }

    /// Folds the counters into a statistics value.
    pub fn snapshot(&self, workers: usize, duration: std::time::Duration) -> SearchStatistics {
        SearchStatisticsBuilder::new()
            .nodes_explored(self.nodes.load(Ordering::Relaxed))
            .tasks_spawned(self.spawns.load(Ordering::Relaxed))
            .prunes(self.prunes.load(Ordering::Relaxed))
            .backtracks(self.backtracks.load(Ordering::Relaxed))
            .max_depth(self.max_depth.load(Ordering::Relaxed))
            .nodes_at_last_improvement(self.nodes_at_improvement.load(Ordering::Relaxed))
            .used_workers(workers)
            .duration(duration)
            .build()
    }
}

/// Totals of one finished search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatistics {
    pub nodes_explored: u64,
    pub tasks_spawned: u64,
    pub prunes: u64,
    pub backtracks: u64,
    pub max_depth: u64,
    pub nodes_at_last_improvement: u64,
    pub used_workers: usize,
    pub duration: std::time::Duration,
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Nodes explored:  {}", self.nodes_explored)?;
        writeln!(f, "Tasks spawned:   {}", self.tasks_spawned)?;
        writeln!(f, "Prunes:          {}", self.prunes)?;
        writeln!(f, "Backtracks:      {}", self.backtracks)?;
        writeln!(f, "Max depth:       {}", self.max_depth)?;
        writeln!(f, "Workers:         {}", self.used_workers)?;
        write!(f, "Duration:        {:.3}s", self.duration.as_secs_f64())
    }
}

#[derive(Debug, Clone)]
pub struct SearchStatisticsBuilder {
    nodes_explored: u64,
    tasks_spawned: u64,
    prunes: u64,
    backtracks: u64,
    max_depth: u64,
    nodes_at_last_improvement: u64,
    used_workers: usize,
    duration: std::time::Duration,
}

impl Default for SearchStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStatisticsBuilder {
    pub fn new() -> Self {
        Self {
            nodes_explored: 0,
            tasks_spawned: 0,
            prunes: 0,
            backtracks: 0,
            max_depth: 0,
            nodes_at_last_improvement: 0,
            used_workers: 1,
            duration: std::time::Duration::ZERO,
        }
    }

    pub fn nodes_explored(mut self, nodes: u64) -> Self {
        self.nodes_explored = nodes;
        self
    }

    pub fn tasks_spawned(mut self, tasks: u64) -> Self {
        self.tasks_spawned = tasks;
        self
    }

    pub fn prunes(mut self, prunes: u64) -> Self {
        self.prunes = prunes;
        self
    }

    pub fn backtracks(mut self, backtracks: u64) -> Self {
        self.backtracks = backtracks;
        self
    }

    pub fn max_depth(mut self, depth: u64) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn nodes_at_last_improvement(mut self, nodes: u64) -> Self {
        self.nodes_at_last_improvement = nodes;
        self
    }

    pub fn used_workers(mut self, workers: usize) -> Self {
        self.used_workers = workers;
        self
    }

    pub fn duration(mut self, duration: std::time::Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn build(self) -> SearchStatistics {
        SearchStatistics {
            nodes_explored: self.nodes_explored,
            tasks_spawned: self.tasks_spawned,
            prunes: self.prunes,
            backtracks: self.backtracks,
            max_depth: self.max_depth,
            nodes_at_last_improvement: self.nodes_at_last_improvement,
            used_workers: self.used_workers,
            duration: self.duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_counts() {
        let rec = StatRecorder::new();
        rec.on_node();
        rec.on_node();
        rec.on_spawn();
        rec.on_prune();
        rec.on_backtrack();
        rec.on_depth(3);
        rec.on_depth(7);
        rec.on_depth(5);

        let stats = rec.snapshot(2, std::time::Duration::from_millis(5));
        assert_eq!(stats.nodes_explored, 2);
        assert_eq!(stats.tasks_spawned, 1);
        assert_eq!(stats.prunes, 1);
        assert_eq!(stats.backtracks, 1);
        assert_eq!(stats.max_depth, 7);
        assert_eq!(stats.used_workers, 2);
    }

    #[test]
    fn test_improvement_marker_tracks_node_count() {
        let rec = StatRecorder::new();
        rec.on_node();
        rec.on_node();
        rec.on_improvement();
        rec.on_node();

        let stats = rec.snapshot(1, std::time::Duration::ZERO);
        assert_eq!(stats.nodes_explored, 3);
        assert_eq!(stats.nodes_at_last_improvement, 2);
    }

    #[test]
    fn test_builder_defaults() {
        let stats = SearchStatisticsBuilder::new().build();
        assert_eq!(stats.nodes_explored, 0);
        assert_eq!(stats.used_workers, 1);
        assert_eq!(stats.duration, std::time::Duration::ZERO);
    }
}
