use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;
use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::drivers::TraceError;
/// A unit of work submitted to [`WorkerPool::join_all`].
pub type Job<'a, T> = Box<dyn FnOnce() -> Result<T, TraceError> + Send + 'a>;
/// Boxes a closure as a [`Job`].
pub fn job<'a, T, F>(f: F) -> Job<'a, T>
where
    F: FnOnce() -> Result<T, TraceError> + Send + 'a,
{
    Box::new(f)
}
/// Fixed-size pool running independent pure computations.
pub struct WorkerPool {
    pool: ThreadPool,
}
impl WorkerPool {
    /// `None` lets rayon size the pool to the host's available parallelism.
    pub fn new(threads: Option<usize>) -> Result<Self, TraceError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|idx| format!("spice-worker-{idx}"));
        if let Some(threads) = threads {
            if threads == 0 {
                return Err(TraceError::InvalidArgument(
                    "worker thread count must be at least 1".into(),
                ));
            }
            builder = builder.num_threads(threads);
        }
        Ok(Self {
            pool: builder.build()?,
        })
    }
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
    /// Runs every job to completion, then returns `(key, value)` pairs in
    /// submission order.
    ///
    /// Failures are reported in submission order as well: the first failed job in the
    /// input wins, regardless of which job finished first. A panicking job is turned
    /// into [`TraceError::TaskPanicked`].
    pub fn join_all<'a, K, T>(&self, jobs: Vec<(K, Job<'a, T>)>) -> Result<Vec<(K, T)>, TraceError>
    where
        K: Send,
        T: Send,
    {
        let outcomes: Vec<(K, Result<T, TraceError>)> = self.pool.install(|| {
            jobs.into_par_iter()
                .enumerate()
                .map(|(task, (key, job))| {
                    let started = Instant::now();
                    let outcome = catch_unwind(AssertUnwindSafe(job))
                        .unwrap_or(Err(TraceError::TaskPanicked { task }));
                    debug!("task {task} finished in {:?}", started.elapsed());
                    (key, outcome)
                })
                .collect()
        });
        outcomes
            .into_iter()
            .map(|(key, outcome)| outcome.map(|value| (key, value)))
            .collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::sleep;
    use std::time::Duration;
    #[test]
    fn results_come_back_in_submission_order() {
        let pool = WorkerPool::new(Some(4)).unwrap();
        let data: Vec<f64> = (0..100).map(|v| v as f64).collect();
        let jobs: Vec<(usize, Job<'_, f64>)> = (0..8)
            .map(|chunk| {
                let slice = &data[chunk * 10..chunk * 10 + 10];
                let work = job(move || {
                    sleep(Duration::from_millis((8 - chunk) as u64 * 3));
                    Ok(slice.iter().sum())
                });
                (chunk, work)
            })
            .collect();
        let results = pool.join_all(jobs).unwrap();
        let keys: Vec<usize> = results.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, (0..8).collect::<Vec<_>>());
        assert_eq!(results[0].1, 45.0);
        assert_eq!(results[7].1, 745.0);
    }
    #[test]
    fn first_submitted_failure_wins() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let b_done = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&b_done);
        let jobs: Vec<(&str, Job<'_, u32>)> = vec![
            (
                "a",
                job(|| {
                    sleep(Duration::from_millis(50));
                    Err(TraceError::InvalidArgument("task a".into()))
                }),
            ),
            (
                "b",
                job(move || {
                    flag.store(true, Ordering::SeqCst);
                    Ok(7)
                }),
            ),
        ];
        match pool.join_all(jobs) {
            Err(TraceError::InvalidArgument(msg)) => assert_eq!(msg, "task a"),
            other => panic!("unexpected result: {other:?}"),
        }
        // The later, faster job still ran to completion.
        assert!(b_done.load(Ordering::SeqCst));
    }
    #[test]
    fn successful_jobs_do_not_mask_a_failure() {
        let pool = WorkerPool::new(None).unwrap();
        let jobs: Vec<(u8, Job<'_, u8>)> = vec![
            (0, job(|| Ok(1))),
            (1, job(|| Err(TraceError::InvalidSampleRate))),
            (2, job(|| Ok(3))),
        ];
        assert!(matches!(
            pool.join_all(jobs),
            Err(TraceError::InvalidSampleRate)
        ));
    }
    #[test]
    fn panics_become_errors() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let jobs: Vec<(u8, Job<'_, u8>)> = vec![(0, job(|| Ok(1))), (1, job(|| panic!("boom")))];
        assert!(matches!(
            pool.join_all(jobs),
            Err(TraceError::TaskPanicked { task: 1 })
        ));
    }
    #[test]
    fn zero_threads_is_invalid() {
        assert!(matches!(
            WorkerPool::new(Some(0)),
            Err(TraceError::InvalidArgument(_))
        ));
        assert!(WorkerPool::new(None).unwrap().threads() >= 1);
    }
}
