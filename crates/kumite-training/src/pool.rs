//! The evaluation worker pool.
//!
//! A fixed set of persistent worker threads runs match jobs batch by batch.
//! The pool follows the coordinator/worker discipline the rest of the
//! trainer depends on:
//!
//! - **Isolation** - a worker receives deep-copied job snapshots over a
//!   channel and reports results back over another; no shared mutable state
//! - **Readiness** - each worker announces itself once initialized, and a
//!   batch dispatches only to workers that have announced; a batch started
//!   early simply uses fewer workers
//! - **Fault containment** - a panic inside a job is caught, the worker
//!   reports the fault and retires, and the coordinator respawns it at the
//!   next batch. The faulted worker's unfinished jobs are re-queued exactly
//!   once; a job lost a second time is recorded as a zero-fitness loss for
//!   both participants rather than poisoning the batch
//! - **Batch barrier** - [`WorkerPool::evaluate`] returns only when every
//!   job is accounted for, so the caller may touch the population afterwards
//!
//! Matches are pure bounded computation (5400 ticks), so there are no
//! wall-clock timeouts: a dispatched job always terminates.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        mpsc::{Receiver, Sender, channel},
    },
    thread::{self, JoinHandle},
};

use crate::{
    job::{MatchJob, MatchResult},
    runner,
};

/// Hard cap on worker threads regardless of hardware concurrency.
pub const MAX_WORKERS: usize = 8;

type JobRunner = Arc<dyn Fn(&MatchJob) -> MatchResult + Send + Sync>;

enum WorkerMessage {
    Ready { worker: usize },
    Finished { worker: usize, result: Box<MatchResult> },
    Fault { worker: usize },
}

struct WorkerHandle {
    jobs_tx: Sender<Vec<MatchJob>>,
    thread: Option<JoinHandle<()>>,
    ready: bool,
    alive: bool,
}

pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    // Kept so `messages_rx.recv()` can never observe a fully closed channel
    // while the pool itself is alive.
    messages_tx: Sender<WorkerMessage>,
    messages_rx: Receiver<WorkerMessage>,
    runner: JobRunner,
}

impl WorkerPool {
    /// A pool of `worker_count` match-evaluation workers.
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        Self::with_runner(worker_count, Arc::new(|job: &MatchJob| runner::run_match(job)))
    }

    /// The default worker count: hardware concurrency, capped at
    /// [`MAX_WORKERS`].
    #[must_use]
    pub fn default_worker_count() -> usize {
        thread::available_parallelism().map_or(1, std::num::NonZero::get).min(MAX_WORKERS)
    }

    fn with_runner(worker_count: usize, runner: JobRunner) -> Self {
        let (messages_tx, messages_rx) = channel();
        let mut pool = Self {
            workers: Vec::with_capacity(worker_count.max(1)),
            messages_tx,
            messages_rx,
            runner,
        };
        for id in 0..worker_count.max(1) {
            let worker = pool.spawn_worker(id);
            pool.workers.push(worker);
        }
        pool
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn spawn_worker(&self, id: usize) -> WorkerHandle {
        let (jobs_tx, jobs_rx) = channel::<Vec<MatchJob>>();
        let runner = Arc::clone(&self.runner);
        let messages_tx = self.messages_tx.clone();
        let thread = thread::spawn(move || worker_loop(id, &jobs_rx, &runner, &messages_tx));
        WorkerHandle {
            jobs_tx,
            thread: Some(thread),
            ready: false,
            alive: true,
        }
    }

    /// Evaluates a batch of jobs, returning one result per job in job-id
    /// order. Blocks until the batch is complete.
    pub fn evaluate(&mut self, jobs: &[MatchJob]) -> Vec<MatchResult> {
        let mut results = self.dispatch_round(jobs.to_vec());

        let missing: Vec<MatchJob> = jobs
            .iter()
            .filter(|job| !results.iter().any(|r| r.job_id == job.job_id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            // one retry round for jobs lost to worker faults
            results.extend(self.dispatch_round(missing.clone()));
            for job in &missing {
                if !results.iter().any(|r| r.job_id == job.job_id) {
                    results.push(MatchResult::forfeited(job));
                }
            }
        }

        results.sort_by_key(|result| result.job_id);
        results
    }

    fn dispatch_round(&mut self, jobs: Vec<MatchJob>) -> Vec<MatchResult> {
        if jobs.is_empty() {
            return Vec::new();
        }

        self.respawn_dead_workers();
        self.drain_pending_messages();
        self.wait_for_any_ready();

        let ready_ids: Vec<usize> = self
            .workers
            .iter()
            .enumerate()
            .filter(|(_, worker)| worker.alive && worker.ready)
            .map(|(id, _)| id)
            .collect();

        // Contiguous chunks, one per ready worker.
        let chunk_len = jobs.len().div_ceil(ready_ids.len());
        let mut assigned: Vec<Vec<MatchJob>> = self.workers.iter().map(|_| Vec::new()).collect();
        let mut outstanding = 0;
        for (slot, chunk) in jobs.chunks(chunk_len).enumerate() {
            let id = ready_ids[slot];
            if self.workers[id].jobs_tx.send(chunk.to_vec()).is_ok() {
                assigned[id] = chunk.to_vec();
                outstanding += chunk.len();
            } else {
                // Channel closed: the worker died without a fault message.
                self.workers[id].alive = false;
                self.workers[id].ready = false;
            }
        }

        let mut results = Vec::with_capacity(outstanding);
        while outstanding > 0 {
            let Ok(message) = self.messages_rx.recv() else {
                break;
            };
            match message {
                WorkerMessage::Ready { worker } => self.workers[worker].ready = true,
                WorkerMessage::Finished { worker, result } => {
                    let pending = &mut assigned[worker];
                    if let Some(pos) = pending.iter().position(|j| j.job_id == result.job_id) {
                        pending.remove(pos);
                        outstanding -= 1;
                    }
                    results.push(*result);
                }
                WorkerMessage::Fault { worker } => {
                    // Pending results from this worker are gone; its jobs go
                    // back to the caller for the retry round.
                    self.workers[worker].ready = false;
                    self.workers[worker].alive = false;
                    outstanding -= assigned[worker].len();
                    assigned[worker].clear();
                }
            }
        }
        results
    }

    fn respawn_dead_workers(&mut self) {
        for id in 0..self.workers.len() {
            if self.workers[id].alive {
                continue;
            }
            if let Some(thread) = self.workers[id].thread.take() {
                let _ = thread.join();
            }
            self.workers[id] = self.spawn_worker(id);
        }
    }

    fn drain_pending_messages(&mut self) {
        while let Ok(message) = self.messages_rx.try_recv() {
            self.apply_out_of_band(message);
        }
    }

    fn wait_for_any_ready(&mut self) {
        while !self.workers.iter().any(|worker| worker.alive && worker.ready) {
            let Ok(message) = self.messages_rx.recv() else {
                return;
            };
            self.apply_out_of_band(message);
        }
    }

    fn apply_out_of_band(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Ready { worker } => self.workers[worker].ready = true,
            WorkerMessage::Fault { worker } => {
                self.workers[worker].ready = false;
                self.workers[worker].alive = false;
            }
            // A result with no round waiting for it belongs to a batch that
            // already gave the job up; discard it.
            WorkerMessage::Finished { .. } => {}
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for mut worker in self.workers.drain(..) {
            let thread = worker.thread.take();
            drop(worker); // closes the job channel, the worker loop exits
            if let Some(thread) = thread {
                let _ = thread.join();
            }
        }
    }
}

fn worker_loop(
    id: usize,
    jobs_rx: &Receiver<Vec<MatchJob>>,
    runner: &JobRunner,
    messages_tx: &Sender<WorkerMessage>,
) {
    if messages_tx.send(WorkerMessage::Ready { worker: id }).is_err() {
        return;
    }
    while let Ok(chunk) = jobs_rx.recv() {
        for job in chunk {
            match catch_unwind(AssertUnwindSafe(|| runner(&job))) {
                Ok(result) => {
                    let message = WorkerMessage::Finished {
                        worker: id,
                        result: Box::new(result),
                    };
                    if messages_tx.send(message).is_err() {
                        return;
                    }
                }
                Err(_) => {
                    // The worker retires on a fault; the pool respawns it at
                    // the next batch boundary.
                    let _ = messages_tx.send(WorkerMessage::Fault { worker: id });
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::{job::build_jobs, population::Population};

    use super::*;

    fn sample_jobs(count: usize) -> Vec<MatchJob> {
        let mut rng = Pcg32::seed_from_u64(1);
        let population = Population::random(count * 2, &mut rng);
        let jobs = build_jobs(population.genomes(), &mut rng);
        assert_eq!(jobs.len(), count);
        jobs
    }

    /// A runner that skips the simulation and echoes the job.
    fn echo_runner() -> JobRunner {
        Arc::new(|job: &MatchJob| {
            let mut result = MatchResult::forfeited(job);
            result.genome1_fitness_delta = 1.0;
            result
        })
    }

    #[test]
    fn test_every_job_gets_a_result_in_order() {
        let mut pool = WorkerPool::with_runner(3, echo_runner());
        let jobs = sample_jobs(7);
        let results = pool.evaluate(&jobs);
        let ids: Vec<usize> = results.iter().map(|r| r.job_id).collect();
        assert_eq!(ids, (0..7).collect::<Vec<_>>());
        assert!(results.iter().all(|r| r.genome1_fitness_delta == 1.0));
    }

    #[test]
    fn test_pool_survives_multiple_batches() {
        let mut pool = WorkerPool::with_runner(2, echo_runner());
        for _ in 0..3 {
            let jobs = sample_jobs(4);
            assert_eq!(pool.evaluate(&jobs).len(), 4);
        }
    }

    #[test]
    fn test_more_workers_than_jobs() {
        let mut pool = WorkerPool::with_runner(4, echo_runner());
        let jobs = sample_jobs(1);
        assert_eq!(pool.evaluate(&jobs).len(), 1);
    }

    #[test]
    fn test_faulted_job_is_requeued_once_and_recovers() {
        static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
        let runner: JobRunner = Arc::new(|job: &MatchJob| {
            if job.job_id == 2 && ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("transient worker failure");
            }
            MatchResult::forfeited(job)
        });
        let mut pool = WorkerPool::with_runner(2, runner);
        let jobs = sample_jobs(4);
        let results = pool.evaluate(&jobs);
        let ids: Vec<usize> = results.iter().map(|r| r.job_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(ATTEMPTS.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_twice_faulted_job_is_a_zero_fitness_loss() {
        let runner: JobRunner = Arc::new(|job: &MatchJob| {
            assert!(job.job_id != 1, "poisoned job");
            let mut result = MatchResult::forfeited(job);
            result.genome1_fitness_delta = 1.0;
            result
        });
        let mut pool = WorkerPool::with_runner(2, runner);
        let jobs = sample_jobs(3);
        let results = pool.evaluate(&jobs);
        assert_eq!(results.len(), 3);
        let poisoned = results.iter().find(|r| r.job_id == 1).unwrap();
        assert_eq!(poisoned.genome1_fitness_delta, 0.0);
        assert!(!poisoned.genome1_won && !poisoned.genome2_won);
        // The healthy jobs still scored.
        assert!(results.iter().filter(|r| r.genome1_fitness_delta == 1.0).count() >= 2);
    }

    #[test]
    fn test_real_runner_smoke() {
        // Two real (small) matches through the actual simulation.
        let mut pool = WorkerPool::new(2);
        let jobs = sample_jobs(2);
        let results = pool.evaluate(&jobs);
        assert_eq!(results.len(), 2);
        for (job, result) in jobs.iter().zip(&results) {
            assert_eq!(result.genome1_id, job.genome1.id);
            assert_eq!(result.genome2_id, job.genome2.id);
        }
    }
}
