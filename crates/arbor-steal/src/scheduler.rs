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

//! # Scheduler
//!
//! One OS thread per worker, each looping on `Policy::get_work`. A
//! worker that finds the pool empty backs off with a bounded sleep and
//! retries until the stop flag is set. Stopping is cooperative: the
//! currently running task finishes before the worker re-checks the
//! flag.

use crate::policy::Policy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Bounded exponential backoff for idle workers: a few spins, then
/// sleeps doubling up to one millisecond.
struct Backoff {
    step: u32,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6;
    const MAX_SLEEP_MICROS: u64 = 1000;

    fn new() -> Self {
        Self { step: 0 }
    }

    fn reset(&mut self) {
        self.step = 0;
    }

    fn snooze(&mut self) {
        if self.step < Self::SPIN_LIMIT {
            for _ in 0..(1 << self.step) {
                std::hint::spin_loop();
            }
        } else {
            let exp = (self.step - Self::SPIN_LIMIT).min(4);
            let micros = (50u64 << exp).min(Self::MAX_SLEEP_MICROS);
            std::thread::sleep(Duration::from_micros(micros));
        }
        self.step = self.step.saturating_add(1);
    }
}

/// Worker threads draining a shared pool.
pub struct Scheduler {
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Starts `workers` threads pulling from `pool`.
    pub fn start(pool: Arc<dyn Policy>, workers: usize) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let workers = workers.max(1);

        let threads = (0..workers)
            .map(|index| {
                let pool = Arc::clone(&pool);
                let stop = Arc::clone(&stop);
                std::thread::Builder::new()
                    .name(format!("arbor-worker-{}", index))
                    .spawn(move || worker_loop(pool, stop))
                    .expect("failed to spawn scheduler worker thread")
            })
            .collect();

        Self { stop, threads }
    }

    /// The number of worker threads.
    pub fn workers(&self) -> usize {
        self.threads.len()
    }

    /// Signals all workers to stop and joins them. Tasks already
    /// picked up run to completion.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.threads {
            handle.join().expect("scheduler worker thread panicked");
        }
    }
}

fn worker_loop(pool: Arc<dyn Policy>, stop: Arc<AtomicBool>) {
    let mut backoff = Backoff::new();
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        match pool.get_work() {
            Some(task) => {
                task();
                backoff.reset();
            }
            None => backoff.snooze(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Workpool;
    use crate::task::WorkHint;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_workers_drain_the_pool() {
        let pool = Arc::new(Workpool::new(2));
        let ran = Arc::new(AtomicU32::new(0));

        for _ in 0..16 {
            let ran = Arc::clone(&ran);
            pool.add_work(
                Box::new(move || {
                    ran.fetch_add(1, Ordering::Relaxed);
                }),
                WorkHint::None,
            );
        }

        let scheduler = Scheduler::start(pool.clone(), 2);
        assert_eq!(scheduler.workers(), 2);

        while pool.pending() > 0 {
            std::thread::sleep(Duration::from_millis(1));
        }
        scheduler.stop();

        assert_eq!(ran.load(Ordering::Relaxed), 16);
    }

    #[test]
    fn test_tasks_can_spawn_more_tasks() {
        let pool = Arc::new(Workpool::new(2));
        let ran = Arc::new(AtomicU32::new(0));

        let seed = {
            let pool = Arc::clone(&pool);
            let ran = Arc::clone(&ran);
            Box::new(move || {
                ran.fetch_add(1, Ordering::Relaxed);
                for _ in 0..4 {
                    let ran = Arc::clone(&ran);
                    pool.add_work(
                        Box::new(move || {
                            ran.fetch_add(1, Ordering::Relaxed);
                        }),
                        WorkHint::None,
                    );
                }
            })
        };
        pool.add_work(seed, WorkHint::None);

        let scheduler = Scheduler::start(pool.clone(), 2);
        while ran.load(Ordering::Relaxed) < 5 {
            std::thread::sleep(Duration::from_millis(1));
        }
        scheduler.stop();
        assert_eq!(ran.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_stop_with_empty_pool_returns_promptly() {
        let pool = Arc::new(Workpool::new(1));
        let scheduler = Scheduler::start(pool, 1);
        std::thread::sleep(Duration::from_millis(2));
        scheduler.stop();
    }
}
