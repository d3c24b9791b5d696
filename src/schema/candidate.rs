//! Candidate solutions: a parameter vector plus a fitness slot.

use serde::{Deserialize, Serialize};

use super::FitnessScheme;

/// A candidate solution owned by the optimization layer.
///
/// The fitness slot holds the scheme's NA sentinel (all NaN) until the
/// evaluator fills it in; the evaluator never touches the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Parameter vector in problem space.
    pub params: Vec<f64>,
    /// Fitness tuple, or the NA sentinel when not yet evaluated.
    pub fitness: Vec<f64>,
}

impl Candidate {
    /// Create an unevaluated candidate for the given scheme.
    pub fn new(params: Vec<f64>, scheme: &FitnessScheme) -> Self {
        Self {
            params,
            fitness: scheme.na_fitness(),
        }
    }

    /// Create a candidate with a pre-filled fitness.
    pub fn with_fitness(params: Vec<f64>, fitness: Vec<f64>) -> Self {
        Self { params, fitness }
    }

    /// True once the fitness slot no longer holds the NA sentinel.
    pub fn is_evaluated(&self, scheme: &FitnessScheme) -> bool {
        !scheme.is_na(&self.fitness)
    }
}
