//! Worker pool for the per-portal computation.
//!
//! Workers take portal numbers from a single shared counter until it runs past
//! the end. The calling thread sleeps on a condition variable and wakes only
//! when a worker publishes progress, or when the queue or the workers run out.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::PvsError;
use crate::flood::PortalVis;
use crate::portals::PvsInfo;

/// Upper bound on worker threads
pub const MAX_THREADS: usize = 64;

/// Knobs for a single build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// When false the builder skips vis and returns the all-visible table
    pub enabled: bool,
    /// Worker threads, clamped to `1..=MAX_THREADS`
    pub threads: usize,
    /// Portals claimed between two progress reports
    pub report_every: usize,
    /// Minimum time between two progress reports
    pub report_interval: Duration,
}

impl BuildConfig {
    /// Thresholds for an offline build with a log-only progress display
    pub fn batch() -> Self {
        Self {
            enabled: true,
            threads: default_threads(),
            report_every: 512,
            report_interval: Duration::from_millis(2500),
        }
    }

    /// Thresholds for a live progress bar
    pub fn interactive() -> Self {
        Self {
            report_every: 32,
            report_interval: Duration::from_millis(50),
            ..Self::batch()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// The number of workers that will actually be spawned
    pub fn thread_count(&self) -> usize {
        self.threads.clamp(1, MAX_THREADS)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::batch()
    }
}

/// One worker per available CPU
pub fn default_threads() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// Receives `(current, total)` portal counts while a build runs. Only ever
/// called from the thread that started the build.
pub trait ProgressSink {
    fn update(&mut self, current: usize, total: usize);

    /// Called once after the final `update`
    fn finish(&mut self) {}
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn update(&mut self, current: usize, total: usize) {
        self(current, total)
    }
}

/// Discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&mut self, _: usize, _: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    NotStarted,
    Running,
    Draining,
    Done,
}

struct ClaimState {
    next_portal: usize,
    last_report: usize,
    last_report_time: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    current: usize,
    total: usize,
    /// Set by a worker that claimed past the last portal
    done: bool,
    /// Set on publish, cleared when the scheduler reads it
    fresh: bool,
    live_workers: usize,
    state: BuildState,
}

impl Progress {
    fn finished(&self) -> bool {
        self.done || self.live_workers == 0
    }
}

/// Shared state of one build: the claim counter and the progress snapshot,
/// each behind its own lock.
pub struct BuildContext {
    max_portals: usize,
    report_every: usize,
    report_interval: Duration,
    claim: Mutex<ClaimState>,
    progress: Mutex<Progress>,
    ping: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BuildContext {
    pub fn new(max_portals: usize, config: &BuildConfig) -> Self {
        Self {
            max_portals,
            report_every: config.report_every,
            report_interval: config.report_interval,
            claim: Mutex::new(ClaimState {
                next_portal: 0,
                last_report: 0,
                last_report_time: Instant::now(),
            }),
            progress: Mutex::new(Progress {
                current: 0,
                total: max_portals,
                done: false,
                fresh: false,
                live_workers: 0,
                state: BuildState::NotStarted,
            }),
            ping: Condvar::new(),
        }
    }

    pub fn state(&self) -> BuildState {
        lock(&self.progress).state
    }

    /// Portal numbers handed out so far, capped at the portal count
    pub fn claimed(&self) -> usize {
        lock(&self.claim).next_portal.min(self.max_portals)
    }

    /// Take the next portal number. Numbers at or past the portal count mean
    /// the queue is empty. Publishes progress when both the count and the time
    /// threshold have been crossed, and always publishes completion.
    pub fn claim_next_portal(&self) -> usize {
        let mut claim = lock(&self.claim);
        let res = claim.next_portal;
        claim.next_portal += 1;

        if res >= self.max_portals {
            // Must report completion or the scheduler never wakes
            self.publish(res, true);
        } else if res - claim.last_report >= self.report_every {
            claim.last_report = res;
            let now = Instant::now();
            if now.duration_since(claim.last_report_time) >= self.report_interval {
                claim.last_report_time = now;
                self.publish(res, false);
            }
        }
        res
    }

    fn publish(&self, current: usize, done: bool) {
        let mut progress = lock(&self.progress);
        progress.current = current.min(self.max_portals);
        progress.total = self.max_portals;
        progress.done |= done;
        progress.fresh = true;
        self.ping.notify_one();
    }

    fn set_state(&self, state: BuildState) {
        debug!("PVS: build state {:?}", state);
        lock(&self.progress).state = state;
    }

    fn worker_starting(&self) {
        lock(&self.progress).live_workers += 1;
    }

    fn worker_exited(&self) {
        let mut progress = lock(&self.progress);
        progress.live_workers -= 1;
        self.ping.notify_one();
    }

    /// Block until a worker publishes something, then take it
    fn next_snapshot(&self) -> Progress {
        let progress = lock(&self.progress);
        let mut progress = self
            .ping
            .wait_while(progress, |p| !p.fresh && !p.finished())
            .unwrap_or_else(PoisonError::into_inner);
        progress.fresh = false;
        *progress
    }

    /// Run `threads` workers over every portal of `nfo`, forwarding progress
    /// to `sink`, and check that every portal got its result.
    pub fn run(
        &self,
        nfo: &PvsInfo,
        threads: usize,
        sink: &mut dyn ProgressSink,
    ) -> Result<(), PvsError> {
        debug_assert_eq!(nfo.num_portals(), self.max_portals);
        let threads = threads.clamp(1, MAX_THREADS);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(threads);
            for n in 0..threads {
                self.worker_starting();
                let spawned = thread::Builder::new()
                    .name(format!("pvs-worker-{n}"))
                    .spawn_scoped(scope, move || worker_loop(self, nfo));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        self.worker_exited();
                        warn!("PVS: could not create worker thread {n}: {e}");
                    }
                }
            }
            if handles.is_empty() {
                error!("Cannot create PVS worker threads");
                return Err(PvsError::NoWorkerThreads);
            }
            self.set_state(BuildState::Running);

            let mut was_progress = false;
            loop {
                let snap = self.next_snapshot();
                let finished = snap.finished();
                if finished {
                    self.set_state(BuildState::Draining);
                    // Don't spam a single update for tiny levels
                    if !was_progress {
                        break;
                    }
                }
                sink.update(snap.current, snap.total);
                was_progress = true;
                if finished {
                    break;
                }
            }
            sink.update(self.max_portals, self.max_portals);
            sink.finish();

            for handle in handles {
                if handle.join().is_err() {
                    error!("PVS: worker thread panicked");
                }
            }
            self.set_state(BuildState::Done);
            Ok(())
        })?;

        let claimed = lock(&self.claim).next_portal;
        if claimed < self.max_portals || !nfo.is_complete() {
            error!("PVS worker threads gone ape");
            return Err(PvsError::QueueNotDrained {
                completed: nfo.completed(),
                total: self.max_portals,
            });
        }
        Ok(())
    }
}

/// Decrements the live worker count however the worker exits
struct WorkerExit<'a>(&'a BuildContext);

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        self.0.worker_exited();
    }
}

fn worker_loop(ctx: &BuildContext, nfo: &PvsInfo) {
    let _exit = WorkerExit(ctx);
    let mut vis = PortalVis::new(nfo);
    loop {
        let pnum = ctx.claim_next_portal();
        if pnum >= nfo.num_portals() {
            break;
        }
        if !vis.process(pnum) {
            warn!("PVS: portal {pnum} was processed twice");
        }
    }
}

/// Compute every portal's visibility on a pool of `config.thread_count()`
/// workers
pub fn run_portal_vis<S: ProgressSink>(
    nfo: &PvsInfo,
    config: &BuildConfig,
    sink: &mut S,
) -> Result<(), PvsError> {
    let ctx = BuildContext::new(nfo.num_portals(), config);
    ctx.run(nfo, config.thread_count(), sink)
}
