//! Fitness scheme types: shape, direction and dominance notion of fitness values.

use serde::{Deserialize, Serialize};

/// Optimization direction, applied to every objective of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Lower fitness is better.
    #[default]
    Minimize,
    /// Higher fitness is better.
    Maximize,
}

/// Aggregator collapsing a fitness tuple to one scalar.
///
/// Used for display and optional scalar ranking, never for dominance decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Aggregator {
    /// Component sum.
    #[default]
    Sum,
    /// Component mean.
    Mean,
}

impl Aggregator {
    /// Apply the aggregator to a fitness tuple.
    pub fn apply(&self, fitness: &[f64]) -> f64 {
        let sum: f64 = fitness.iter().sum();
        match self {
            Aggregator::Sum => sum,
            Aggregator::Mean => sum / fitness.len().max(1) as f64,
        }
    }
}

/// Dominance notion used when comparing two fitness tuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dominance {
    /// Plain Pareto dominance, zero slack per objective.
    Pareto,
    /// Pareto dominance relaxed by a uniform slack epsilon on every objective.
    Epsilon { epsilon: f64 },
    /// Dominance over objective space discretized into boxes, one threshold
    /// per objective; residual distance breaks ties within a box.
    EpsilonBox { thresholds: Vec<f64> },
}

/// Scheme validation errors.
#[derive(Debug, thiserror::Error)]
pub enum SchemeError {
    #[error("Scheme must have at least one objective")]
    NoObjectives,
    #[error("Epsilon must be positive, got {0}")]
    NonPositiveEpsilon(f64),
    #[error("Expected {expected} box thresholds, got {actual}")]
    ThresholdCountMismatch { expected: usize, actual: usize },
    #[error("Box threshold {index} must be positive, got {value}")]
    NonPositiveThreshold { index: usize, value: f64 },
    #[error("Conversion to epsilon-box needs thresholds; the source scheme has none to reuse")]
    NoThresholdsToReuse,
}

/// Immutable configuration describing how fitness values are shaped, compared
/// and reported.
///
/// A scheme fixes the number of objectives, the optimization direction, the
/// reporting aggregator and the dominance notion. Constructors validate their
/// parameters, so a scheme obtained through them is always well formed;
/// schemes deserialized from JSON should be checked with [`validate`].
///
/// [`validate`]: FitnessScheme::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessScheme {
    /// Number of objectives per fitness tuple.
    pub num_objectives: usize,
    /// Minimize or maximize.
    #[serde(default)]
    pub direction: Direction,
    /// Scalar aggregation for reporting.
    #[serde(default)]
    pub aggregator: Aggregator,
    /// Dominance notion.
    pub dominance: Dominance,
}

impl FitnessScheme {
    /// Pareto dominance scheme over `num_objectives` objectives, minimizing.
    pub fn pareto(num_objectives: usize) -> Result<Self, SchemeError> {
        let scheme = Self {
            num_objectives,
            direction: Direction::default(),
            aggregator: Aggregator::default(),
            dominance: Dominance::Pareto,
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Epsilon-dominance scheme with uniform slack `epsilon`, minimizing.
    pub fn epsilon(num_objectives: usize, epsilon: f64) -> Result<Self, SchemeError> {
        let scheme = Self {
            num_objectives,
            direction: Direction::default(),
            aggregator: Aggregator::default(),
            dominance: Dominance::Epsilon { epsilon },
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Epsilon-box dominance scheme with one positive threshold per objective,
    /// minimizing.
    pub fn epsilon_box(num_objectives: usize, thresholds: Vec<f64>) -> Result<Self, SchemeError> {
        let scheme = Self {
            num_objectives,
            direction: Direction::default(),
            aggregator: Aggregator::default(),
            dominance: Dominance::EpsilonBox { thresholds },
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Switch the scheme to maximization.
    pub fn maximizing(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Replace the reporting aggregator.
    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Validate scheme parameters.
    pub fn validate(&self) -> Result<(), SchemeError> {
        if self.num_objectives == 0 {
            return Err(SchemeError::NoObjectives);
        }
        match &self.dominance {
            Dominance::Pareto => {}
            Dominance::Epsilon { epsilon } => {
                if !(*epsilon > 0.0) {
                    return Err(SchemeError::NonPositiveEpsilon(*epsilon));
                }
            }
            Dominance::EpsilonBox { thresholds } => {
                if thresholds.len() != self.num_objectives {
                    return Err(SchemeError::ThresholdCountMismatch {
                        expected: self.num_objectives,
                        actual: thresholds.len(),
                    });
                }
                for (index, &value) in thresholds.iter().enumerate() {
                    if !(value > 0.0) {
                        return Err(SchemeError::NonPositiveThreshold { index, value });
                    }
                }
            }
        }
        Ok(())
    }

    /// True if lower fitness is better.
    pub fn is_minimizing(&self) -> bool {
        self.direction == Direction::Minimize
    }

    /// The reserved not-available fitness value (all components NaN).
    pub fn na_fitness(&self) -> Vec<f64> {
        vec![f64::NAN; self.num_objectives]
    }

    /// True if any component of `fitness` is NaN.
    pub fn is_na(&self, fitness: &[f64]) -> bool {
        fitness.iter().any(|v| v.is_nan())
    }

    /// Collapse a fitness tuple to a scalar via the scheme's aggregator.
    pub fn aggregate(&self, fitness: &[f64]) -> f64 {
        self.aggregator.apply(fitness)
    }

    /// Reinterpret the scheme under plain Pareto dominance, keeping shape,
    /// direction and aggregator.
    pub fn to_pareto(&self) -> Self {
        Self {
            dominance: Dominance::Pareto,
            ..self.clone()
        }
    }

    /// Reinterpret the scheme under epsilon-dominance with the given slack.
    pub fn to_epsilon(&self, epsilon: f64) -> Result<Self, SchemeError> {
        let scheme = Self {
            dominance: Dominance::Epsilon { epsilon },
            ..self.clone()
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Reinterpret the scheme under epsilon-box dominance.
    ///
    /// With `Some(thresholds)` the supplied per-objective thresholds are used;
    /// with `None` they are reused from an existing epsilon or epsilon-box
    /// scheme (a uniform epsilon is broadcast to every objective).
    pub fn to_epsilon_box(&self, thresholds: Option<Vec<f64>>) -> Result<Self, SchemeError> {
        let thresholds = match thresholds {
            Some(thresholds) => thresholds,
            None => match &self.dominance {
                Dominance::Epsilon { epsilon } => vec![*epsilon; self.num_objectives],
                Dominance::EpsilonBox { thresholds } => thresholds.clone(),
                Dominance::Pareto => return Err(SchemeError::NoThresholdsToReuse),
            },
        };
        let scheme = Self {
            dominance: Dominance::EpsilonBox { thresholds },
            ..self.clone()
        };
        scheme.validate()?;
        Ok(scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pareto_construction() {
        let scheme = FitnessScheme::pareto(2).unwrap();
        assert_eq!(scheme.num_objectives, 2);
        assert!(scheme.is_minimizing());
        assert!(FitnessScheme::pareto(0).is_err());
    }

    #[test]
    fn test_epsilon_requires_positive_slack() {
        assert!(FitnessScheme::epsilon(2, 0.1).is_ok());
        assert!(matches!(
            FitnessScheme::epsilon(2, 0.0),
            Err(SchemeError::NonPositiveEpsilon(_))
        ));
        assert!(FitnessScheme::epsilon(2, -1.0).is_err());
        assert!(FitnessScheme::epsilon(2, f64::NAN).is_err());
    }

    #[test]
    fn test_epsilon_box_threshold_validation() {
        assert!(FitnessScheme::epsilon_box(2, vec![1.0, 0.5]).is_ok());
        assert!(matches!(
            FitnessScheme::epsilon_box(2, vec![1.0]),
            Err(SchemeError::ThresholdCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            FitnessScheme::epsilon_box(2, vec![1.0, 0.0]),
            Err(SchemeError::NonPositiveThreshold { index: 1, .. })
        ));
    }

    #[test]
    fn test_na_fitness() {
        let scheme = FitnessScheme::pareto(3).unwrap();
        let na = scheme.na_fitness();
        assert_eq!(na.len(), 3);
        assert!(scheme.is_na(&na));
        assert!(scheme.is_na(&[1.0, f64::NAN, 2.0]));
        assert!(!scheme.is_na(&[1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_aggregate() {
        let scheme = FitnessScheme::pareto(2).unwrap();
        assert_eq!(scheme.aggregate(&[1.0, 3.0]), 4.0);

        let scheme = scheme.with_aggregator(Aggregator::Mean);
        assert_eq!(scheme.aggregate(&[1.0, 3.0]), 2.0);
    }

    #[test]
    fn test_conversions() {
        let pareto = FitnessScheme::pareto(2).unwrap().maximizing();

        let boxed = pareto.to_epsilon_box(Some(vec![0.5, 0.5])).unwrap();
        assert_eq!(boxed.direction, Direction::Maximize);
        assert_eq!(boxed.num_objectives, 2);

        // Reuse a uniform epsilon as box thresholds.
        let eps = pareto.to_epsilon(0.25).unwrap();
        let boxed = eps.to_epsilon_box(None).unwrap();
        assert_eq!(
            boxed.dominance,
            Dominance::EpsilonBox {
                thresholds: vec![0.25, 0.25]
            }
        );

        assert!(pareto.to_epsilon_box(None).is_err());
        assert_eq!(boxed.to_pareto().dominance, Dominance::Pareto);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let scheme = FitnessScheme::epsilon_box(2, vec![0.1, 0.2])
            .unwrap()
            .maximizing();
        let json = serde_json::to_string(&scheme).unwrap();
        let parsed: FitnessScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scheme);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_deserialized_scheme_is_validated_explicitly() {
        let json = r#"{"num_objectives":2,"dominance":{"Epsilon":{"epsilon":-1.0}}}"#;
        let parsed: FitnessScheme = serde_json::from_str(json).unwrap();
        assert!(parsed.validate().is_err());
    }
}
