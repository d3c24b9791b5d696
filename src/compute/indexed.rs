//! Indexed fitness: the bucket projection used by epsilon-box dominance.

use crate::schema::{Aggregator, Direction};

/// Bucket index sentinel for NaN components.
///
/// Indices are stored in minimization orientation, so the maximum index is
/// maximally bad for both directions.
pub const NAN_BUCKET: i64 = i64::MAX;

/// A fitness tuple projected onto the epsilon-box grid.
///
/// Holds the original tuple, its aggregate, one integer bucket index per
/// objective and the residual distance from the bucket corner. The projection
/// is a pure function of (tuple, thresholds, direction); maximizing schemes
/// negate components before bucketing so that a smaller index is always
/// better.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFitness {
    /// Original fitness tuple.
    pub values: Vec<f64>,
    /// Scalar aggregate of the original tuple.
    pub aggregate: f64,
    /// Bucket index per objective, in minimization orientation.
    pub index: Vec<i64>,
    /// Euclidean norm of the per-axis offsets from the bucket corner.
    pub distance: f64,
}

impl IndexedFitness {
    /// Project a fitness tuple onto the grid spanned by `thresholds`.
    ///
    /// `thresholds` must have one positive entry per component of `values`;
    /// the epsilon-box scheme validates this at construction.
    pub fn new(
        values: &[f64],
        thresholds: &[f64],
        direction: Direction,
        aggregator: Aggregator,
    ) -> Self {
        debug_assert_eq!(values.len(), thresholds.len());

        let mut index = Vec::with_capacity(values.len());
        let mut distance_sq = 0.0;
        for (&value, &threshold) in values.iter().zip(thresholds.iter()) {
            if value.is_nan() {
                index.push(NAN_BUCKET);
                continue;
            }
            let oriented = match direction {
                Direction::Minimize => value,
                Direction::Maximize => -value,
            };
            let bucket = (oriented / threshold).floor();
            let offset = oriented - bucket * threshold;
            index.push(bucket as i64);
            distance_sq += offset * offset;
        }

        Self {
            values: values.to_vec(),
            aggregate: aggregator.apply(values),
            index,
            distance: distance_sq.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_min(values: &[f64], thresholds: &[f64]) -> IndexedFitness {
        IndexedFitness::new(values, thresholds, Direction::Minimize, Aggregator::Sum)
    }

    #[test]
    fn test_bucket_indices_floor() {
        let indexed = index_min(&[0.2, 1.7, 2.0], &[1.0, 1.0, 1.0]);
        assert_eq!(indexed.index, vec![0, 1, 2]);
    }

    #[test]
    fn test_negative_values_floor_down() {
        let indexed = index_min(&[-0.2, -1.0], &[1.0, 1.0]);
        assert_eq!(indexed.index, vec![-1, -1]);
    }

    #[test]
    fn test_residual_distance() {
        // Offsets from the bucket corners are 0.3 and 0.4.
        let indexed = index_min(&[0.3, 1.4], &[1.0, 1.0]);
        assert!((indexed.distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_scaling() {
        let indexed = index_min(&[0.2, 0.2], &[0.1, 1.0]);
        assert_eq!(indexed.index, vec![2, 0]);
    }

    #[test]
    fn test_nan_maps_to_sentinel() {
        let indexed = index_min(&[f64::NAN, 0.5], &[1.0, 1.0]);
        assert_eq!(indexed.index[0], NAN_BUCKET);
        assert_eq!(indexed.index[1], 0);
        // NaN components contribute nothing to the residual distance.
        assert!((indexed.distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_maximizing_orientation() {
        let min = index_min(&[0.5], &[1.0]);
        let max = IndexedFitness::new(&[0.5], &[1.0], Direction::Maximize, Aggregator::Sum);
        assert_eq!(min.index, vec![0]);
        assert_eq!(max.index, vec![-1]);

        // Larger values bucket lower when maximizing, so they dominate.
        let better = IndexedFitness::new(&[3.5], &[1.0], Direction::Maximize, Aggregator::Sum);
        assert!(better.index[0] < max.index[0]);
    }

    #[test]
    fn test_aggregate_carried_over() {
        let indexed = index_min(&[1.0, 2.0], &[1.0, 1.0]);
        assert_eq!(indexed.aggregate, 3.0);
    }
}
