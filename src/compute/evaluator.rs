//! Parallel batch evaluation over a fixed pool of worker slots.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::schema::{Candidate, FitnessScheme};

use super::scheduler::EvaluationQueue;
use super::worker::{EvaluationError, Problem, WorkerHandle};

/// Best-so-far retention collaborator, notified once per computed fitness.
///
/// Calls are serialized by the evaluator's coordinating thread; retention and
/// eviction policy are entirely the implementation's concern.
pub trait Archive {
    /// Record a newly computed fitness with the parameters that produced it
    /// and the running evaluation count.
    fn add(&mut self, fitness: &[f64], params: &[f64], num_evaluations: u64);
}

/// No-op archive for callers that only want the filled-in batch.
impl Archive for () {
    fn add(&mut self, _fitness: &[f64], _params: &[f64], _num_evaluations: u64) {}
}

/// Snapshot of evaluator counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorStats {
    /// Fitness values computed since construction.
    pub num_evaluations: u64,
    /// Batches evaluated since construction.
    pub num_batches: u64,
    /// Worker slots in the pool.
    pub num_workers: usize,
}

/// Distributes fitness computation for candidate batches across worker slots.
///
/// The pool is fixed at construction: one long-lived worker slot per entry,
/// each holding a private clone of the problem. Per batch, one claim/dispatch
/// task runs per slot; candidates are handed out greedily, so no ordering of
/// candidate-to-worker assignment is guaranteed.
pub struct ParallelEvaluator<A: Archive> {
    scheme: FitnessScheme,
    queue: EvaluationQueue,
    workers: Vec<WorkerHandle>,
    archive: A,
    num_evaluations: AtomicU64,
    num_batches: u64,
    last_fitness: Option<Vec<f64>>,
}

impl<A: Archive> ParallelEvaluator<A> {
    /// Build a pool of `num_workers` slots, cloning the problem once per slot.
    pub fn new<P: Problem + Clone>(
        scheme: FitnessScheme,
        problem: &P,
        num_workers: usize,
        archive: A,
    ) -> Result<Self, EvaluationError> {
        if num_workers == 0 {
            return Err(EvaluationError::EmptyPool);
        }
        let workers = (0..num_workers)
            .map(|id| WorkerHandle::spawn(id, problem.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            scheme,
            queue: EvaluationQueue::new(num_workers),
            workers,
            archive,
            num_evaluations: AtomicU64::new(0),
            num_batches: 0,
            last_fitness: None,
        })
    }

    /// Fill in the fitness of every candidate still holding the NA sentinel.
    ///
    /// Candidates that already carry a fitness are left untouched. For every
    /// newly computed fitness the evaluation counter is incremented, the
    /// most recent fitness is recorded, and the archive is notified with
    /// (fitness, parameters, evaluation count).
    ///
    /// The batch is all-or-nothing: the first failing worker call poisons the
    /// scheduler, sibling tasks finish their current iteration, and that
    /// failure is returned once every task has unwound. Fitness computed
    /// before the abort stays on the candidates; no rollback.
    pub fn evaluate_batch(&mut self, candidates: &mut [Candidate]) -> Result<(), EvaluationError> {
        let needs_eval: Vec<bool> = candidates
            .iter()
            .map(|c| self.scheme.is_na(&c.fitness))
            .collect();
        let pending = needs_eval.iter().filter(|&&n| n).count();
        debug!(
            "evaluating batch: {pending} of {} candidates pending on {} workers",
            candidates.len(),
            self.workers.len()
        );
        self.queue.reset(needs_eval);
        self.num_batches += 1;

        let failure = Mutex::new(None);
        let results: Vec<(usize, Vec<f64>)> = {
            let queue = &self.queue;
            let shared: &[Candidate] = candidates;
            let failure = &failure;
            let (result_tx, result_rx) = mpsc::channel();
            thread::scope(|scope| {
                for worker in self.workers.iter_mut() {
                    let results = result_tx.clone();
                    scope.spawn(move || worker_task(queue, worker, shared, results, failure));
                }
                drop(result_tx);
                // Drain until every task has dropped its sender; the tasks
                // have all ended by the time this returns.
                result_rx.iter().collect()
            })
        };

        for (index, fitness) in results {
            let count = self.num_evaluations.fetch_add(1, Ordering::Relaxed) + 1;
            self.archive
                .add(&fitness, &candidates[index].params, count);
            self.last_fitness = Some(fitness.clone());
            candidates[index].fitness = fitness;
        }

        match failure.into_inner().unwrap() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Evaluate a single candidate through the full batch machinery.
    ///
    /// Deliberately routes the one point through scheduling, so it pays the
    /// whole claim/dispatch overhead per call; callers with many points
    /// should batch them instead.
    pub fn evaluate(&mut self, candidate: &mut Candidate) -> Result<(), EvaluationError> {
        self.evaluate_batch(std::slice::from_mut(candidate))
    }

    /// The fitness scheme evaluations are interpreted under.
    pub fn scheme(&self) -> &FitnessScheme {
        &self.scheme
    }

    /// Number of worker slots.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Total fitness values computed since construction.
    pub fn num_evaluations(&self) -> u64 {
        self.num_evaluations.load(Ordering::Relaxed)
    }

    /// The most recently computed fitness, if any.
    pub fn last_fitness(&self) -> Option<&[f64]> {
        self.last_fitness.as_deref()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> EvaluatorStats {
        EvaluatorStats {
            num_evaluations: self.num_evaluations(),
            num_batches: self.num_batches,
            num_workers: self.workers.len(),
        }
    }

    /// The archive collaborator.
    pub fn archive(&self) -> &A {
        &self.archive
    }
}

/// Claim/dispatch loop for one worker slot.
///
/// Claims run against the shared queue; the remote call happens out-of-line
/// on the worker thread. The slot's busy flag is cleared on every way out of
/// an iteration, success or failure, so waiting siblings are never left
/// blocked by a crashed call.
fn worker_task(
    queue: &EvaluationQueue,
    worker: &mut WorkerHandle,
    candidates: &[Candidate],
    results: Sender<(usize, Vec<f64>)>,
    failure: &Mutex<Option<EvaluationError>>,
) {
    while let Some(index) = queue.claim(worker.id()) {
        match worker.invoke(&candidates[index].params) {
            Ok(fitness) => {
                // The receiver outlives every task; this cannot fail.
                let _ = results.send((index, fitness));
            }
            Err(error) => {
                warn!(
                    "worker {} failed on candidate {index}: {error}; aborting batch",
                    worker.id()
                );
                queue.abort();
                let mut first = failure.lock().unwrap();
                // First failure wins; later ones are dropped.
                if first.is_none() {
                    *first = Some(error);
                }
            }
        }
        queue.finished(worker.id());
    }
}
