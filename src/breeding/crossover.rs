//! # Crossover
//!
//! Slot-wise recombination of two parents. Slots are copied whole, so a child can end
//! up holding a value twice in some category; both children are repaired with
//! [`Domain::repair`] before they are returned.

use crate::domain::{Chromosome, Domain};
use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// The crossover operator a run uses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossoverStrategy {
    /// Prefix/suffix exchange at one random cut.
    SinglePoint,
    /// One coin per slot decides which parent each child inherits from.
    Uniform,
    /// Single-point while the population is far from a solution, uniform once its best
    /// fitness is within `uniform_within` of the maximum.
    Tiered { uniform_within: f64 },
}

impl Default for CrossoverStrategy {
    fn default() -> Self {
        CrossoverStrategy::Tiered {
            uniform_within: 2.0,
        }
    }
}

impl CrossoverStrategy {
    /// Recombines two parents.
    ///
    /// With probability `1 - rate` the parents are returned unchanged.
    ///
    /// # Arguments
    ///
    /// * `best_gap` - How far the population's best fitness is from the maximum. Only
    ///   `Tiered` looks at it.
    ///
    /// # Errors
    ///
    /// Propagates repair errors for parents that do not fit the domain.
    pub fn crossover(
        &self,
        first: &Chromosome,
        second: &Chromosome,
        rate: f64,
        best_gap: f64,
        domain: &Domain,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(Chromosome, Chromosome)> {
        if !rng.chance(rate) {
            return Ok((first.clone(), second.clone()));
        }
        match self {
            CrossoverStrategy::SinglePoint => single_point(first, second, domain, rng),
            CrossoverStrategy::Uniform => uniform(first, second, domain, rng),
            CrossoverStrategy::Tiered { uniform_within } => {
                if best_gap <= *uniform_within {
                    uniform(first, second, domain, rng)
                } else {
                    single_point(first, second, domain, rng)
                }
            }
        }
    }
}

/// Cuts both parents at a random point in `[1, N - 1]` and exchanges the suffixes.
///
/// With fewer than two slots there is no cut point and the parents are returned as is.
pub fn single_point(
    first: &Chromosome,
    second: &Chromosome,
    domain: &Domain,
    rng: &mut RandomNumberGenerator,
) -> Result<(Chromosome, Chromosome)> {
    let slots = first.num_slots().min(second.num_slots());
    if slots < 2 {
        return Ok((first.clone(), second.clone()));
    }
    let cut = rng.range_inclusive(1, slots - 1);

    let splice = |head: &Chromosome, tail: &Chromosome| {
        let mut slots = head.slots()[..cut].to_vec();
        slots.extend_from_slice(&tail.slots()[cut..]);
        Chromosome::from_slots(slots)
    };

    Ok((
        domain.repair(&splice(first, second))?,
        domain.repair(&splice(second, first))?,
    ))
}

/// Builds complementary children: for each slot a coin decides whether the first
/// child takes it from the first parent (and the second child from the second) or the
/// other way round.
pub fn uniform(
    first: &Chromosome,
    second: &Chromosome,
    domain: &Domain,
    rng: &mut RandomNumberGenerator,
) -> Result<(Chromosome, Chromosome)> {
    let slots = first.num_slots().min(second.num_slots());
    let mut left = Vec::with_capacity(slots);
    let mut right = Vec::with_capacity(slots);

    for (a, b) in first.slots().iter().zip(second.slots()) {
        if rng.chance(0.5) {
            left.push(a.clone());
            right.push(b.clone());
        } else {
            left.push(b.clone());
            right.push(a.clone());
        }
    }

    Ok((
        domain.repair(&Chromosome::from_slots(left))?,
        domain.repair(&Chromosome::from_slots(right))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttributeCategory;

    fn domain() -> Domain {
        Domain::new(vec![
            AttributeCategory::new("a", ["0", "1", "2", "3"]),
            AttributeCategory::new("b", ["0", "1", "2", "3"]),
            AttributeCategory::new("c", ["0", "1", "2", "3"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let domain = domain();
        let mut rng = RandomNumberGenerator::from_seed(1);
        let a = domain.random_chromosome(&mut rng).unwrap();
        let b = domain.random_chromosome(&mut rng).unwrap();
        for strategy in [
            CrossoverStrategy::SinglePoint,
            CrossoverStrategy::Uniform,
            CrossoverStrategy::default(),
        ] {
            let (x, y) = strategy.crossover(&a, &b, 0.0, 0.0, &domain, &mut rng).unwrap();
            assert_eq!(x, a);
            assert_eq!(y, b);
        }
    }

    #[test]
    fn test_children_keep_permutation_invariant() {
        let domain = domain();
        let mut rng = RandomNumberGenerator::from_seed(2);
        for _ in 0..100 {
            let a = domain.random_chromosome(&mut rng).unwrap();
            let b = domain.random_chromosome(&mut rng).unwrap();
            let (x, y) = single_point(&a, &b, &domain, &mut rng).unwrap();
            assert!(domain.is_consistent(&x));
            assert!(domain.is_consistent(&y));
            let (x, y) = uniform(&a, &b, &domain, &mut rng).unwrap();
            assert!(domain.is_consistent(&x));
            assert!(domain.is_consistent(&y));
        }
    }

    #[test]
    fn test_identical_parents_give_identical_children() {
        let domain = domain();
        let mut rng = RandomNumberGenerator::from_seed(3);
        let a = domain.random_chromosome(&mut rng).unwrap();
        let (x, y) = single_point(&a, &a, &domain, &mut rng).unwrap();
        assert_eq!(x, a);
        assert_eq!(y, a);
    }

    #[test]
    fn test_single_point_keeps_first_slot() {
        let domain = domain();
        let mut rng = RandomNumberGenerator::from_seed(4);
        let a = domain.random_chromosome(&mut rng).unwrap();
        let b = domain.random_chromosome(&mut rng).unwrap();
        // cut >= 1, and repair only rewrites later duplicates
        let (x, y) = single_point(&a, &b, &domain, &mut rng).unwrap();
        assert_eq!(x.slots()[0], a.slots()[0]);
        assert_eq!(y.slots()[0], b.slots()[0]);
    }
}
