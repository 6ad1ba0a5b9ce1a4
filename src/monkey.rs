//! Randomized pairwise-swap hill climbing ("monkey sort").
//!
//! Workers draw random pixel pairs and check, without locking, whether trading
//! their assigned colors would lower the pair's combined distance. Most pairs
//! fail that check. The ones that pass are re-checked under the grid's commit
//! lock before the swap is applied, since the first look may have raced with
//! another worker's commit.

use log::{debug, error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;

use crate::pixel::{PixelGrid, PixelRecord};

pub const DEFAULT_WORKERS: usize = 16;
pub const DEFAULT_ITERATIONS: u64 = 300_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonkeyConfig {
    /// Number of concurrent workers.
    pub workers: usize,
    /// Swap attempts per worker.
    pub iterations: u64,
    /// Worker `w` seeds its generator with `seed + w`. Entropy when unset.
    pub seed: Option<u64>,
}

impl Default for MonkeyConfig {
    fn default() -> Self {
        MonkeyConfig {
            workers: DEFAULT_WORKERS,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonkeyReport {
    /// Attempts made by workers that ran to completion.
    pub attempts: u64,
    /// Swaps that were committed.
    pub accepted: u64,
    /// Workers that panicked or could not be started.
    pub interrupted_workers: usize,
}

/// Supplies the candidate pairs a worker examines.
pub trait PairSource {
    /// Two indices in `0..len`. They may be equal.
    fn next_pair(&mut self, len: usize) -> (usize, usize);
}

/// Uniform independent draws from a private generator.
pub struct RandomPairs<R> {
    rng: R,
}

impl<R: Rng> RandomPairs<R> {
    pub fn new(rng: R) -> Self {
        RandomPairs { rng }
    }
}

impl<R: Rng> PairSource for RandomPairs<R> {
    fn next_pair(&mut self, len: usize) -> (usize, usize) {
        (self.rng.gen_range(0..len), self.rng.gen_range(0..len))
    }
}

fn improves(first: &PixelRecord, second: &PixelRecord) -> bool {
    let old = first.cached_distance() + second.cached_distance();
    let new = first.distance_from(second.assigned_color())
        + second.distance_from(first.assigned_color());
    new < old
}

/// Trades the assigned colors of two pixels if that strictly lowers their
/// combined distance. Returns whether the swap was committed.
///
/// # Panics
///
/// If either index is out of bounds.
pub fn try_swap(grid: &PixelGrid, first: usize, second: usize) -> bool {
    let pixels = grid.pixels();
    let (a, b) = (&pixels[first], &pixels[second]);
    if !improves(a, b) {
        return false;
    }

    let _guard = grid.lock();
    if !improves(a, b) {
        return false;
    }
    let first_color = a.assigned_color();
    a.assign(b.assigned_color());
    b.assign(first_color);
    true
}

fn run_worker<S: PairSource>(grid: &PixelGrid, source: &mut S, iterations: u64) -> u64 {
    let len = grid.len();
    let mut accepted = 0;
    for _ in 0..iterations {
        let (first, second) = source.next_pair(len);
        if try_swap(grid, first, second) {
            accepted += 1;
        }
    }
    accepted
}

/// Runs `config.workers` workers of `config.iterations` random swap attempts
/// each, returning once every worker has finished.
pub fn monkey_sort(grid: &PixelGrid, config: &MonkeyConfig) -> MonkeyReport {
    let seed = config.seed;
    monkey_sort_with(grid, config.workers, config.iterations, |worker| {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
            None => StdRng::from_entropy(),
        };
        RandomPairs::new(rng)
    })
}

/// Like [`monkey_sort`], with each worker's pair source built by
/// `make_source(worker_index)` on the worker's own thread.
///
/// A worker that panics is logged and counted in
/// [`MonkeyReport::interrupted_workers`]; the others keep going. The grid stays
/// a bijection either way because only whole swaps are ever committed.
pub fn monkey_sort_with<S, F>(
    grid: &PixelGrid,
    workers: usize,
    iterations: u64,
    make_source: F,
) -> MonkeyReport
where
    S: PairSource,
    F: Fn(usize) -> S + Sync,
{
    let mut report = MonkeyReport::default();
    if grid.is_empty() {
        return report;
    }

    let make_source = &make_source;
    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                thread::Builder::new()
                    .name(format!("monkey-{}", worker))
                    .spawn_scoped(scope, move || {
                        let mut source = make_source(worker);
                        run_worker(grid, &mut source, iterations)
                    })
            })
            .collect();

        for (worker, handle) in handles.into_iter().enumerate() {
            let handle = match handle {
                Ok(handle) => handle,
                Err(e) => {
                    error!("could not start worker {}: {}", worker, e);
                    report.interrupted_workers += 1;
                    continue;
                }
            };
            match handle.join() {
                Ok(accepted) => {
                    debug!("worker {} accepted {} swaps", worker, accepted);
                    report.attempts += iterations;
                    report.accepted += accepted;
                }
                Err(_) => {
                    error!(
                        "worker {} was interrupted, continuing with partial improvement",
                        worker
                    );
                    report.interrupted_workers += 1;
                }
            }
        }
    });

    report
}
