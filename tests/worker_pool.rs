use dpmatch::lowlevel::{host_parallelism, WorkerPool};
use dpmatch::DpMatchError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn run_counted(workers: usize, tasks: usize) {
    let pool = WorkerPool::new(workers).unwrap();
    let hits: Arc<Vec<AtomicUsize>> = Arc::new((0..tasks).map(|_| AtomicUsize::new(0)).collect());
    let bad_worker = Arc::new(AtomicUsize::new(0));

    for i in 0..tasks {
        let hits = Arc::clone(&hits);
        let bad_worker = Arc::clone(&bad_worker);
        pool.submit(move |worker| {
            if worker >= workers {
                bad_worker.fetch_add(1, Ordering::Relaxed);
            }
            hits[i].fetch_add(1, Ordering::Relaxed);
        });
    }
    pool.join().unwrap();

    assert_eq!(bad_worker.load(Ordering::Relaxed), 0);
    for (i, hit) in hits.iter().enumerate() {
        assert_eq!(hit.load(Ordering::Relaxed), 1, "task {i} ran {hit:?} times");
    }
}

#[test]
fn every_task_runs_exactly_once() {
    for workers in [1, 2, host_parallelism()] {
        for tasks in [0, 1, 7, 3000] {
            run_counted(workers, tasks);
        }
    }
}

#[test]
fn join_is_a_barrier_between_batches() {
    let pool = WorkerPool::new(4).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    for batch in 1..=5usize {
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.submit(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.join().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), batch * 100);
    }
}

#[test]
fn panicking_task_does_not_stall_the_pool() {
    let pool = WorkerPool::new(2).unwrap();
    let done = Arc::new(AtomicUsize::new(0));
    for i in 0..10 {
        let done = Arc::clone(&done);
        pool.submit(move |_| {
            if i == 3 {
                panic!("task failure");
            }
            done.fetch_add(1, Ordering::Relaxed);
        });
    }
    assert_eq!(pool.join(), Err(DpMatchError::WorkerPanicked { count: 1 }));
    assert_eq!(done.load(Ordering::Relaxed), 9);
    assert!(pool.join().is_ok());
}
