//! Dominance comparison: the comparator family shared by all fitness schemes.
//!
//! All comparators return a signed verdict in {-1, 0, +1}: -1 means the first
//! value strictly dominates, +1 the second, 0 neither. An `expected` hint lets
//! a caller asking a binary question ("is f1 better?") stop the scan as soon
//! as that question is settled; the hint can only reduce work, never change
//! the answer to the question asked.

use std::borrow::Cow;

use crate::schema::{Direction, Dominance, FitnessScheme};

use super::indexed::IndexedFitness;

/// Residual distances closer than this count as a tie within a bucket.
const DISTANCE_TOLERANCE: f64 = 10.0 * f64::EPSILON;

/// Verdict of an epsilon-box comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxComparison {
    /// Signed verdict: -1 first dominates, +1 second dominates, 0 neither.
    pub verdict: i8,
    /// True only when every bucket index component is equal.
    ///
    /// Exposed for exact-bucket duplicate detection (archive deduplication),
    /// distinct from the dominance verdict itself.
    pub bucket_match: bool,
}

/// Either side of a mixed epsilon-box comparison.
#[derive(Debug, Clone, Copy)]
pub enum FitnessRef<'a> {
    /// A raw fitness tuple, projected on the fly.
    Raw(&'a [f64]),
    /// An already projected fitness.
    Indexed(&'a IndexedFitness),
}

/// Sign-accumulation scan over component deltas, each reduced by `slack`.
///
/// The first nonzero sign sets the running verdict; a later opposite sign
/// means the pair is non-dominated. NaN deltas carry no sign. The early
/// return fires once the running verdict refutes the `expected` answer.
fn slack_scan(u: &[f64], v: &[f64], slack: f64, expected: i8) -> i8 {
    let mut verdict: i8 = 0;
    for (a, b) in u.iter().zip(v.iter()) {
        let delta = a - b - slack;
        if delta < 0.0 {
            if verdict == 0 {
                verdict = -1;
                if expected == 1 {
                    return verdict;
                }
            } else if verdict == 1 {
                return 0;
            }
        } else if delta > 0.0 {
            if verdict == 0 {
                verdict = 1;
                if expected == -1 {
                    return verdict;
                }
            } else if verdict == -1 {
                return 0;
            }
        }
    }
    verdict
}

/// The same scan over integer bucket indices.
///
/// Also reports whether every component was equal; only a completed scan with
/// no sign can report true.
fn index_scan(u: &[i64], v: &[i64], expected: i8) -> (i8, bool) {
    let mut verdict: i8 = 0;
    for (a, b) in u.iter().zip(v.iter()) {
        if a < b {
            if verdict == 0 {
                verdict = -1;
                if expected == 1 {
                    return (verdict, false);
                }
            } else if verdict == 1 {
                return (0, false);
            }
        } else if a > b {
            if verdict == 0 {
                verdict = 1;
                if expected == -1 {
                    return (verdict, false);
                }
            } else if verdict == -1 {
                return (0, false);
            }
        }
    }
    (verdict, verdict == 0)
}

/// Compare two projected fitness values under epsilon-box dominance.
///
/// Bucket indices are scanned exactly like Pareto components; full index
/// equality is a bucket-level tie, broken by residual distance (smaller wins,
/// near-equal distances tie).
pub fn compare_indexed(a: &IndexedFitness, b: &IndexedFitness, expected: i8) -> BoxComparison {
    let (verdict, bucket_match) = index_scan(&a.index, &b.index, expected);
    if !bucket_match {
        return BoxComparison {
            verdict,
            bucket_match,
        };
    }

    let delta = a.distance - b.distance;
    let verdict = if delta.abs() <= DISTANCE_TOLERANCE {
        0
    } else if delta < 0.0 {
        -1
    } else {
        1
    };
    BoxComparison {
        verdict,
        bucket_match: true,
    }
}

impl FitnessScheme {
    /// Compare two fitness tuples under the scheme's dominance notion.
    ///
    /// Returns -1 if `f1` dominates, +1 if `f2` dominates, 0 if neither.
    pub fn compare(&self, f1: &[f64], f2: &[f64]) -> i8 {
        self.compare_expecting(f1, f2, 0)
    }

    /// [`compare`] with an `expected` hint in {-1, 0, +1}.
    ///
    /// With a nonzero hint the scan may stop early once the hinted answer is
    /// refuted; the returned verdict then still answers the hinted question
    /// exactly as a full scan would.
    ///
    /// [`compare`]: FitnessScheme::compare
    pub fn compare_expecting(&self, f1: &[f64], f2: &[f64], expected: i8) -> i8 {
        debug_assert_eq!(f1.len(), self.num_objectives);
        debug_assert_eq!(f2.len(), self.num_objectives);
        match &self.dominance {
            Dominance::Pareto => self.oriented_scan(f1, f2, 0.0, expected),
            Dominance::Epsilon { epsilon } => self.oriented_scan(f1, f2, *epsilon, expected),
            Dominance::EpsilonBox { thresholds } => {
                let a = IndexedFitness::new(f1, thresholds, self.direction, self.aggregator);
                let b = IndexedFitness::new(f2, thresholds, self.direction, self.aggregator);
                compare_indexed(&a, &b, expected).verdict
            }
        }
    }

    /// True if `f1` strictly dominates `f2`.
    pub fn is_better(&self, f1: &[f64], f2: &[f64]) -> bool {
        self.compare_expecting(f1, f2, -1) == -1
    }

    /// True if `f2` strictly dominates `f1`.
    pub fn is_worse(&self, f1: &[f64], f2: &[f64]) -> bool {
        self.compare_expecting(f1, f2, 1) == 1
    }

    /// Project a fitness tuple for this scheme's epsilon-box grid.
    ///
    /// Returns `None` for schemes without box thresholds.
    pub fn index_fitness(&self, values: &[f64]) -> Option<IndexedFitness> {
        match &self.dominance {
            Dominance::EpsilonBox { thresholds } => Some(IndexedFitness::new(
                values,
                thresholds,
                self.direction,
                self.aggregator,
            )),
            _ => None,
        }
    }

    /// Epsilon-box comparison where either side may already be projected.
    ///
    /// Raw sides are projected on the fly with the scheme's thresholds.
    /// Returns `None` for schemes without box thresholds.
    pub fn compare_box(
        &self,
        f1: FitnessRef<'_>,
        f2: FitnessRef<'_>,
        expected: i8,
    ) -> Option<BoxComparison> {
        let a = self.resolve(f1)?;
        let b = self.resolve(f2)?;
        Some(compare_indexed(&a, &b, expected))
    }

    fn resolve<'a>(&self, fitness: FitnessRef<'a>) -> Option<Cow<'a, IndexedFitness>> {
        match fitness {
            FitnessRef::Raw(values) => self.index_fitness(values).map(Cow::Owned),
            FitnessRef::Indexed(indexed) => Some(Cow::Borrowed(indexed)),
        }
    }

    /// Minimizing schemes scan directly; maximizing schemes scan with the
    /// arguments swapped, which flips the verdict into the right sense.
    fn oriented_scan(&self, f1: &[f64], f2: &[f64], slack: f64, expected: i8) -> i8 {
        match self.direction {
            Direction::Minimize => slack_scan(f1, f2, slack, expected),
            Direction::Maximize => slack_scan(f2, f1, slack, expected),
        }
    }
}
