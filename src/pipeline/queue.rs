//! Shared FIFO work queue for the worker pool
//!
//! Workers block on [`WorkQueue::pop`] until a job is available and call
//! [`WorkQueue::task_done`] once they are finished with it. The coordinator
//! waits in [`WorkQueue::join`] until every pushed job has been acknowledged,
//! then pushes one [`Job::Shutdown`] per worker.

use crate::input::Target;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// One unit of work handed to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Scrape this target
    Scrape(Target),

    /// No more work; the worker should exit
    Shutdown,
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    /// Jobs pushed but not yet acknowledged
    unfinished: usize,
}

/// FIFO queue with blocking pop and completion tracking
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    available: Notify,
    drained: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a queue holding a scrape job for each target
    pub fn seeded(targets: impl IntoIterator<Item = Target>) -> Self {
        let queue = Self::new();
        for target in targets {
            queue.push(Job::Scrape(target));
        }
        queue
    }

    /// Appends a job and wakes one waiting worker
    pub fn push(&self, job: Job) {
        {
            let mut state = self.state.lock().unwrap();
            state.jobs.push_back(job);
            state.unfinished += 1;
        }
        self.available.notify_one();
    }

    /// Pushes one shutdown job per worker
    pub fn close(&self, workers: usize) {
        for _ in 0..workers {
            self.push(Job::Shutdown);
        }
    }

    /// Takes the next job, waiting while the queue is empty
    pub async fn pop(&self) -> Job {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (job, more) = {
                let mut state = self.state.lock().unwrap();
                let job = state.jobs.pop_front();
                (job, !state.jobs.is_empty())
            };

            if let Some(job) = job {
                // Pass the wake-up on so that other idle workers see the rest
                if more {
                    self.available.notify_one();
                }
                return job;
            }

            notified.await;
        }
    }

    /// Acknowledges that a popped job has been fully handled
    pub fn task_done(&self) {
        let drained = {
            let mut state = self.state.lock().unwrap();
            state.unfinished = state.unfinished.saturating_sub(1);
            state.unfinished == 0
        };
        if drained {
            self.drained.notify_waiters();
        }
    }

    /// Waits until every pushed job has been acknowledged
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.unfinished() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Number of jobs waiting to be popped
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of jobs pushed but not yet acknowledged
    pub fn unfinished(&self) -> usize {
        self.state.lock().unwrap().unfinished
    }
}
