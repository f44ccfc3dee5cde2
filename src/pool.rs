//! Fixed-size worker pool with a FIFO task queue and a blocking barrier.
//!
//! Tasks receive the id of the worker running them (`0..worker_count()`), which
//! the engine uses to pick that worker's scratch lattice. `join` blocks until
//! the queue is empty and every worker is idle; both conditions are checked
//! under the mutex that guards the queue and the idle counter.
//!
//! A panic inside a task is caught at the task boundary so the worker survives
//! and the barrier still completes; the next `join` reports it as
//! [`DpMatchError::WorkerPanicked`].

use crate::util::{DpMatchError, DpMatchResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce(usize) + Send + 'static>;

struct PoolState {
    queue: VecDeque<Task>,
    idle: usize,
    panicked: usize,
    shutdown: bool,
}

struct PoolShared {
    state: Mutex<PoolState>,
    work_ready: Condvar,
    all_idle: Condvar,
    size: usize,
}

/// Long-lived worker threads draining a shared task queue.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
}

/// Returns the host parallelism, falling back to a single worker.
pub fn host_parallelism() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl WorkerPool {
    /// Starts `workers` threads.
    pub fn new(workers: usize) -> DpMatchResult<Self> {
        if workers == 0 {
            return Err(DpMatchError::InvalidInput("worker count must be at least 1"));
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                idle: 0,
                panicked: 0,
                shutdown: false,
            }),
            work_ready: Condvar::new(),
            all_idle: Condvar::new(),
            size: workers,
        });

        // Dropping a partially built pool shuts down the threads already started.
        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(workers),
        };
        for id in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("dpmatch-worker-{id}"))
                .spawn(move || worker_loop(&shared, id))
                .map_err(|err| DpMatchError::WorkerSpawn {
                    worker: id,
                    reason: err.to_string(),
                })?;
            pool.handles.push(handle);
        }
        Ok(pool)
    }

    /// Returns the fixed number of workers.
    pub fn worker_count(&self) -> usize {
        self.shared.size
    }

    /// Enqueues a task and returns immediately.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            state.queue.push_back(Box::new(task));
        }
        self.shared.work_ready.notify_one();
    }

    /// Blocks until the queue is drained and all workers are idle.
    ///
    /// Must not be called from inside a task: the calling worker would never
    /// become idle.
    pub fn join(&self) -> DpMatchResult<()> {
        let mut state = self.shared.state.lock();
        while !(state.queue.is_empty() && state.idle == self.shared.size) {
            if state.shutdown {
                break;
            }
            self.shared.all_idle.wait(&mut state);
        }
        let count = std::mem::take(&mut state.panicked);
        if count > 0 {
            return Err(DpMatchError::WorkerPanicked { count });
        }
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.work_ready.notify_all();
        self.shared.all_idle.notify_all();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: &PoolShared, id: usize) {
    let mut state = shared.state.lock();
    loop {
        if let Some(task) = state.queue.pop_front() {
            let outcome = MutexGuard::unlocked(&mut state, || {
                panic::catch_unwind(AssertUnwindSafe(move || task(id)))
            });
            if outcome.is_err() {
                state.panicked += 1;
            }
            continue;
        }
        if state.shutdown {
            return;
        }

        state.idle += 1;
        if state.idle == shared.size {
            shared.all_idle.notify_all();
        }
        shared.work_ready.wait(&mut state);
        state.idle -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::WorkerPool;
    use crate::util::DpMatchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn rejects_empty_pool() {
        assert!(matches!(
            WorkerPool::new(0),
            Err(DpMatchError::InvalidInput(_))
        ));
    }

    #[test]
    fn host_parallelism_sizes_a_usable_pool() {
        let workers = super::host_parallelism();
        assert!(workers >= 1);
        let pool = WorkerPool::new(workers).unwrap();
        assert_eq!(pool.worker_count(), workers);
        pool.join().unwrap();
    }

    #[test]
    fn join_on_fresh_pool_returns() {
        let pool = WorkerPool::new(3).unwrap();
        pool.join().unwrap();
        assert_eq!(pool.worker_count(), 3);
    }

    #[test]
    fn worker_ids_are_in_range() {
        let pool = WorkerPool::new(4).unwrap();
        let max_id = Arc::new(AtomicUsize::new(0));
        for _ in 0..200 {
            let max_id = Arc::clone(&max_id);
            pool.submit(move |id| {
                max_id.fetch_max(id, Ordering::SeqCst);
            });
        }
        pool.join().unwrap();
        assert!(max_id.load(Ordering::SeqCst) < 4);
    }

    #[test]
    fn panicking_task_is_reported_once() {
        let pool = WorkerPool::new(2).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        pool.submit(|_| panic!("task failure"));
        for _ in 0..10 {
            let done = Arc::clone(&done);
            pool.submit(move |_| {
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(
            pool.join(),
            Err(DpMatchError::WorkerPanicked { count: 1 })
        );
        assert_eq!(done.load(Ordering::SeqCst), 10);
        pool.join().unwrap();
    }

    #[test]
    fn drop_drains_queued_tasks() {
        let done = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(1).unwrap();
            for _ in 0..50 {
                let done = Arc::clone(&done);
                pool.submit(move |_| {
                    done.fetch_add(1, Ordering::SeqCst);
                });
            }
        }
        assert_eq!(done.load(Ordering::SeqCst), 50);
    }
}
