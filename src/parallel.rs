//! Fork-join task substrate
//!
//! Every data-parallel loop in the engine (row-wise commitments, generator
//! folding, chunked MSM) goes through this module. Work runs on one fixed-size
//! worker pool built on first use; the caller blocks until every task of the
//! batch has finished.
//!
//! ## Sizing
//! The worker count comes from the `G09ZK_THREADS` environment variable and
//! defaults to the hardware concurrency. `G09ZK_THREADS=1` disables the pool
//! and every helper below runs serially on the calling thread.
//!
//! ## Nesting
//! A helper invoked from inside a worker does not dispatch again: it runs the
//! batch inline, in index order, on the worker that called it. Only the
//! outermost call fans out.
//!
//! ## Disjoint writes
//! [`for_each`] hands task `i` an exclusive `&mut` to slot `i` of a
//! pre-allocated output slice, so no locking is needed and results are read
//! only after the join.

#![forbid(unsafe_code)]

use std::sync::OnceLock;

use rayon::prelude::*;

/// Environment variable holding the worker count.
pub const THREADS_ENV: &str = "G09ZK_THREADS";

/// Minimum number of indices per task for loops whose body is a group
/// operation (a few microseconds each).
pub const GROUP_GRAIN: usize = 16;

/// Minimum number of indices per task for loops whose body is field
/// arithmetic.
pub const FIELD_GRAIN: usize = 2048;

static WORKERS: OnceLock<Option<rayon::ThreadPool>> = OnceLock::new();

/// Number of workers requested through [`THREADS_ENV`] (or the hardware
/// concurrency when the variable is absent or malformed).
pub fn thread_count() -> usize {
    std::env::var(THREADS_ENV)
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

fn workers() -> Option<&'static rayon::ThreadPool> {
    WORKERS
        .get_or_init(|| {
            let threads = thread_count();
            if threads <= 1 {
                tracing::info!("worker pool disabled, running serially");
                return None;
            }
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("g09zk-worker-{i}"))
                .build()
            {
                Ok(pool) => {
                    tracing::info!(threads, "worker pool started");
                    Some(pool)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "worker pool unavailable, running serially");
                    None
                }
            }
        })
        .as_ref()
}

/// `true` when the current thread is a pool worker.
#[inline]
pub fn in_worker() -> bool {
    rayon::current_thread_index().is_some()
}

/// The pool to dispatch on, or `None` when the batch must run inline.
#[inline]
fn dispatch() -> Option<&'static rayon::ThreadPool> {
    if in_worker() {
        None
    } else {
        workers()
    }
}

/// Run `f(i, &mut out[i])` for every slot, at most `grain` slots per task.
pub fn for_each<T, Fun>(out: &mut [T], grain: usize, f: Fun)
where
    T: Send,
    Fun: Fn(usize, &mut T) + Sync + Send,
{
    match dispatch() {
        Some(pool) if out.len() > grain => pool.install(|| {
            out.par_iter_mut()
                .with_min_len(grain.max(1))
                .enumerate()
                .for_each(|(i, slot)| f(i, slot))
        }),
        _ => out.iter_mut().enumerate().for_each(|(i, slot)| f(i, slot)),
    }
}

/// Collect `f(0), f(1), .., f(count - 1)` in index order.
pub fn map<T, Fun>(count: usize, grain: usize, f: Fun) -> Vec<T>
where
    T: Send,
    Fun: Fn(usize) -> T + Sync + Send,
{
    match dispatch() {
        Some(pool) if count > grain => pool.install(|| {
            (0..count)
                .into_par_iter()
                .with_min_len(grain.max(1))
                .map(&f)
                .collect()
        }),
        _ => (0..count).map(f).collect(),
    }
}

/// Run two closures, potentially in parallel, and return both results.
pub fn invoke<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    match dispatch() {
        Some(pool) => pool.join(a, b),
        None => (a(), b()),
    }
}

/// Run three closures, potentially in parallel, and return all results.
pub fn invoke3<A, B, C, RA, RB, RC>(a: A, b: B, c: C) -> (RA, RB, RC)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    C: FnOnce() -> RC + Send,
    RA: Send,
    RB: Send,
    RC: Send,
{
    let ((ra, rb), rc) = invoke(|| invoke(a, b), c);
    (ra, rb, rc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_each_writes_every_slot_once() {
        let mut out = vec![0usize; 10_000];
        for_each(&mut out, 64, |i, slot| *slot += i * 2);
        assert!(out.iter().enumerate().all(|(i, v)| *v == i * 2));
    }

    #[test]
    fn map_preserves_index_order() {
        let v = map(5_000, 16, |i| i as u64 * 3);
        assert_eq!(v.len(), 5_000);
        assert_eq!(v[0], 0);
        assert_eq!(v[4_999], 4_999 * 3);
        assert!(v.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn invoke_returns_both_results() {
        let (a, b) = invoke(|| 2 + 2, || "four");
        assert_eq!(a, 4);
        assert_eq!(b, "four");
        let (x, y, z) = invoke3(|| 1u8, || 2u16, || 3u32);
        assert_eq!((x, y, z), (1, 2, 3));
    }

    #[test]
    fn nested_calls_run_inline_on_the_worker() {
        let (outer, _) = invoke(
            || {
                let me = std::thread::current().id();
                map(1_000, 1, |_| std::thread::current().id() == me)
            },
            || (),
        );
        assert_eq!(outer.len(), 1_000);
        assert!(outer.iter().all(|same| *same));
    }

    #[test]
    fn empty_batches_are_no_ops() {
        let mut out: Vec<u8> = Vec::new();
        for_each(&mut out, 1, |_, _| unreachable!());
        assert!(map(0, 1, |i| i).is_empty());
    }
}
