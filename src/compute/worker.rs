//! Worker slots: private problem copies living on dedicated threads.
//!
//! The worker boundary is an abstract remote invocation; here it is realized
//! with in-process request/response channels, one pair per slot. Each slot
//! owns its own clone of the problem, so problem-internal state is never
//! shared between two workers.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Errors surfaced by the evaluation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// The problem reported a failure for a parameter vector.
    #[error("fitness computation failed: {0}")]
    Fitness(String),
    /// A worker thread died or its channels closed.
    #[error("worker {worker} is no longer reachable")]
    WorkerLost { worker: usize },
    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The evaluator was constructed without worker slots.
    #[error("worker pool must have at least one slot")]
    EmptyPool,
}

/// A fitness computation target.
///
/// The pool clones the problem once per worker slot at construction, so
/// implementations may keep mutable caches without any synchronization.
pub trait Problem: Send + 'static {
    /// Compute the fitness tuple for a parameter vector.
    fn fitness(&mut self, params: &[f64]) -> Result<Vec<f64>, EvaluationError>;
}

/// Remote-resident wrapper around one private problem copy.
struct Worker<P> {
    problem: P,
}

impl<P: Problem> Worker<P> {
    fn compute(&mut self, params: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        self.problem.fitness(params)
    }
}

/// Handle to a long-lived worker slot.
///
/// The slot is a dedicated thread holding one problem copy; [`invoke`] is a
/// blocking request/response round trip. Handles are created once per slot
/// and live across many evaluation batches.
///
/// [`invoke`]: WorkerHandle::invoke
#[derive(Debug)]
pub struct WorkerHandle {
    id: usize,
    requests: Option<Sender<Vec<f64>>>,
    responses: Receiver<Result<Vec<f64>, EvaluationError>>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Spawn a worker slot around its own problem copy.
    pub fn spawn<P: Problem>(id: usize, problem: P) -> Result<Self, EvaluationError> {
        let (request_tx, request_rx) = mpsc::channel::<Vec<f64>>();
        let (response_tx, response_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name(format!("fitness-worker-{id}"))
            .spawn(move || {
                let mut worker = Worker { problem };
                while let Ok(params) = request_rx.recv() {
                    if response_tx.send(worker.compute(&params)).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            id,
            requests: Some(request_tx),
            responses: response_rx,
            thread: Some(thread),
        })
    }

    /// Worker slot id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Compute fitness for `params` on this slot, blocking until the result
    /// arrives.
    ///
    /// A slot whose thread has died (for example because the problem
    /// panicked) reports [`EvaluationError::WorkerLost`].
    pub fn invoke(&mut self, params: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        let worker = self.id;
        let requests = self
            .requests
            .as_ref()
            .ok_or(EvaluationError::WorkerLost { worker })?;
        requests
            .send(params.to_vec())
            .map_err(|_| EvaluationError::WorkerLost { worker })?;
        self.responses
            .recv()
            .map_err(|_| EvaluationError::WorkerLost { worker })?
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
