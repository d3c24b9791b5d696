//! Distributed fitness evaluation for multi-objective black-box optimization.
//!
//! This crate provides the two load-bearing pieces of a multi-objective
//! optimizer: a comparison algebra for N-dimensional fitness values under
//! Pareto, epsilon and epsilon-box dominance, and a parallel evaluator that
//! dispatches fitness computation for candidate batches across a fixed pool
//! of long-lived worker slots.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Fitness scheme and candidate types
//! - `compute`: Dominance comparison, scheduling and the worker pool
//!
//! # Example
//!
//! ```rust
//! use pareto_eval::{
//!     compute::{EvaluationError, ParallelEvaluator, Problem},
//!     schema::{Candidate, FitnessScheme},
//! };
//!
//! // The problem is an external collaborator; each worker slot gets its
//! // own clone.
//! #[derive(Clone)]
//! struct Sphere;
//!
//! impl Problem for Sphere {
//!     fn fitness(&mut self, params: &[f64]) -> Result<Vec<f64>, EvaluationError> {
//!         Ok(vec![params.iter().map(|x| x * x).sum()])
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scheme = FitnessScheme::pareto(1)?;
//! let mut evaluator = ParallelEvaluator::new(scheme.clone(), &Sphere, 2, ())?;
//!
//! let mut batch = vec![
//!     Candidate::new(vec![1.0, 2.0], &scheme),
//!     Candidate::new(vec![0.0, 0.0], &scheme),
//! ];
//! evaluator.evaluate_batch(&mut batch)?;
//!
//! assert_eq!(batch[0].fitness, vec![5.0]);
//! assert!(scheme.is_better(&batch[1].fitness, &batch[0].fitness));
//! # Ok(())
//! # }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{
    Archive, BoxComparison, EvaluationError, EvaluationQueue, FitnessRef, IndexedFitness,
    ParallelEvaluator, Problem, WorkerHandle,
};
pub use schema::{Aggregator, Candidate, Direction, Dominance, FitnessScheme, SchemeError};
