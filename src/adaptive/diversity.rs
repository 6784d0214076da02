use crate::breeding::mutation::swap_mutate;
use crate::constraints::{ConstraintSet, ConstraintShape};
use crate::domain::{AttributeRef, Chromosome, Domain};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Rebuilds a stagnant population around its best chromosome, and builds variants of
/// a chromosome aimed at one specific constraint.
///
/// A diversity explosion splits the target size into cohorts:
///
/// | cohort | share | content |
/// |---|---|---|
/// | preserved | 5% (at least 1) | copies of the best |
/// | multi-swap | 30% | the best after 1 to `max_intensity` swaps, rising across the cohort |
/// | shuffled | 40% | the best with one category fully shuffled, cycling through categories |
/// | hybrid | 20% | slot-wise mix of the best and a fresh random chromosome, repaired |
/// | random | the rest | fresh random chromosomes |
///
/// After an explosion a run also adds `stagnation_variations` targeted variants of
/// the best chromosome for the first constraint it misses.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DiversityInjector {
    preserved_share: f64,
    multi_swap_share: f64,
    shuffle_share: f64,
    hybrid_share: f64,
    /// Chance a hybrid keeps the best chromosome's slot
    hybrid_keep: f64,
    max_intensity: usize,
    stagnation_variations: usize,
}

impl DiversityInjector {
    /// Creates an injector with custom cohort shares.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a share is negative, the shares add up
    /// to more than 1, or `max_intensity` is 0.
    pub fn new(
        preserved_share: f64,
        multi_swap_share: f64,
        shuffle_share: f64,
        hybrid_share: f64,
        max_intensity: usize,
    ) -> Result<Self> {
        let injector = Self {
            preserved_share,
            multi_swap_share,
            shuffle_share,
            hybrid_share,
            max_intensity,
            ..Self::default()
        };
        injector.validate()?;
        Ok(injector)
    }

    /// Sets how many targeted variants follow an explosion.
    pub fn with_stagnation_variations(mut self, count: usize) -> Self {
        self.stagnation_variations = count;
        self
    }

    pub fn get_stagnation_variations(&self) -> usize {
        self.stagnation_variations
    }

    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a share or the hybrid keep chance is
    /// outside `[0, 1]`, the shares add up to more than 1, or `max_intensity` is 0.
    pub fn validate(&self) -> Result<()> {
        let shares = [
            self.preserved_share,
            self.multi_swap_share,
            self.shuffle_share,
            self.hybrid_share,
        ];
        if shares.iter().any(|s| !(0.0..=1.0).contains(s)) || shares.iter().sum::<f64>() > 1.0 {
            return Err(GeneticError::Configuration(
                "Cohort shares must be in [0, 1] and add up to at most 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.hybrid_keep) {
            return Err(GeneticError::Configuration(format!(
                "Hybrid keep chance must be in [0, 1], got {}",
                self.hybrid_keep
            )));
        }
        if self.max_intensity == 0 {
            return Err(GeneticError::Configuration(
                "Maximum swap intensity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds exactly `target_size` chromosomes around `best`.
    ///
    /// # Errors
    ///
    /// Returns an error if `best` does not fit the domain.
    pub fn diversity_explosion(
        &self,
        best: &Chromosome,
        target_size: usize,
        domain: &Domain,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>> {
        if target_size == 0 {
            return Ok(Vec::new());
        }
        let best = domain.repair(best)?;

        let share = |fraction: f64| (target_size as f64 * fraction).floor() as usize;
        let mut remaining = target_size;
        let mut take = |wanted: usize| {
            let n = wanted.min(remaining);
            remaining -= n;
            n
        };
        let preserved = take(share(self.preserved_share).max(1));
        let multi_swap = take(share(self.multi_swap_share));
        let shuffled = take(share(self.shuffle_share));
        let hybrids = take(share(self.hybrid_share));
        let random = remaining;

        let mut population = Vec::with_capacity(target_size);
        population.extend(std::iter::repeat(best.clone()).take(preserved));

        for i in 0..multi_swap {
            let intensity = if multi_swap > 1 {
                1 + i * (self.max_intensity - 1) / (multi_swap - 1)
            } else {
                1
            };
            let mut variant = best.clone();
            for _ in 0..intensity {
                variant = swap_mutate(&variant, 1.0, rng);
            }
            population.push(variant);
        }

        let categories = domain.num_categories();
        for i in 0..shuffled {
            let category = i % categories;
            let mut column = best.column(category);
            rng.shuffle(&mut column);
            let mut variant = best.clone();
            variant.set_column(category, &column);
            population.push(variant);
        }

        for _ in 0..hybrids {
            let fresh = domain.random_chromosome(rng)?;
            let slots = best
                .slots()
                .iter()
                .zip(fresh.slots())
                .map(|(kept, new)| {
                    if rng.chance(self.hybrid_keep) {
                        kept.clone()
                    } else {
                        new.clone()
                    }
                })
                .collect();
            population.push(domain.repair(&Chromosome::from_slots(slots))?);
        }

        for _ in 0..random {
            population.push(domain.random_chromosome(rng)?);
        }

        Ok(population)
    }

    /// Builds up to `count` variants of `best` that place the attributes of constraint
    /// `constraint_index` the way its declared shape requires.
    ///
    /// Every valid placement is enumerated (one for a fixed slot, every slot for a
    /// same-slot pair, both orders on every adjacent pair for adjacency, every valid
    /// start for a positional pair). Variants cycle through the placements; each full
    /// cycle adds one more swap in a category the constraint does not mention. Opaque
    /// constraints, and indices with no constraint, give no variants.
    pub fn force_targeted_variations(
        &self,
        best: &Chromosome,
        constraint_index: usize,
        count: usize,
        constraints: &ConstraintSet,
        rng: &mut RandomNumberGenerator,
    ) -> Vec<Chromosome> {
        let shape = constraints.shape(constraint_index);
        let placements = placements(&shape, best.num_slots());
        if placements.is_empty() {
            return Vec::new();
        }

        let touched = shape.categories();
        let untouched: Vec<usize> = (0..best.num_categories())
            .filter(|c| !touched.contains(c))
            .collect();

        (0..count)
            .map(|i| {
                let mut variant = best.clone();
                for &(attribute, slot) in &placements[i % placements.len()] {
                    variant.place_in_place(attribute, slot);
                }
                let extra_swaps = i / placements.len();
                if !untouched.is_empty() && variant.num_slots() >= 2 {
                    for _ in 0..extra_swaps {
                        let category = untouched[rng.index(untouched.len())];
                        let (a, b) = rng.distinct_pair(variant.num_slots());
                        variant.swap_in_place(category, a, b);
                    }
                }
                variant
            })
            .collect()
    }
}

fn placements(shape: &ConstraintShape, slots: usize) -> Vec<Vec<(AttributeRef, usize)>> {
    match *shape {
        ConstraintShape::Opaque => Vec::new(),
        ConstraintShape::FixedSlot { attribute, slot } if slot < slots => {
            vec![vec![(attribute, slot)]]
        }
        ConstraintShape::FixedSlot { .. } => Vec::new(),
        ConstraintShape::SameSlot(a, b) => (0..slots).map(|s| vec![(a, s), (b, s)]).collect(),
        ConstraintShape::Adjacency(a, b) => (0..slots.saturating_sub(1))
            .flat_map(|s| [vec![(a, s), (b, s + 1)], vec![(a, s + 1), (b, s)]])
            .collect(),
        ConstraintShape::PositionalPair {
            left,
            right,
            offset,
        } => (0..slots.saturating_sub(offset))
            .map(|s| vec![(left, s), (right, s + offset)])
            .collect(),
    }
}

impl Default for DiversityInjector {
    fn default() -> Self {
        Self {
            preserved_share: 0.05,
            multi_swap_share: 0.30,
            shuffle_share: 0.40,
            hybrid_share: 0.20,
            hybrid_keep: 0.6,
            max_intensity: 5,
            stagnation_variations: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{
        ConstraintSetBuilder, FixedSlot, ImmediatelyLeftOf, NextTo, Predicate, SameSlot,
    };
    use crate::domain::AttributeCategory;

    fn domain() -> Domain {
        Domain::new(vec![
            AttributeCategory::new("a", ["0", "1", "2", "3", "4"]),
            AttributeCategory::new("b", ["0", "1", "2", "3", "4"]),
            AttributeCategory::new("c", ["0", "1", "2", "3", "4"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_explosion_has_exact_size_and_valid_members() {
        let domain = domain();
        let injector = DiversityInjector::default();
        let mut rng = RandomNumberGenerator::from_seed(21);
        let best = domain.random_chromosome(&mut rng).unwrap();

        for target in [1, 7, 100, 333] {
            let population = injector
                .diversity_explosion(&best, target, &domain, &mut rng)
                .unwrap();
            assert_eq!(population.len(), target);
            assert_eq!(population[0], best);
            assert!(population.iter().all(|c| domain.is_consistent(c)));
        }
        assert!(injector
            .diversity_explosion(&best, 0, &domain, &mut rng)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_explosion_preserves_five_percent() {
        let domain = domain();
        let injector = DiversityInjector::default();
        let mut rng = RandomNumberGenerator::from_seed(22);
        let best = domain.random_chromosome(&mut rng).unwrap();
        let population = injector
            .diversity_explosion(&best, 100, &domain, &mut rng)
            .unwrap();
        assert!(population[..5].iter().all(|c| *c == best));
        // the first multi-swap variant has exactly one swap
        assert_ne!(population[5], best);
    }

    #[test]
    fn test_targeted_variations_satisfy_their_constraint() {
        let domain = domain();
        let a1 = domain.attribute("a", "1").unwrap();
        let b2 = domain.attribute("b", "2").unwrap();
        let c3 = domain.attribute("c", "3").unwrap();
        let constraints = ConstraintSetBuilder::new()
            .with_constraint(FixedSlot::new("a1 in 2", a1, 2))
            .with_constraint(SameSlot::new("a1 b2", a1, b2))
            .with_constraint(NextTo::new("b2 next to c3", b2, c3))
            .with_constraint(ImmediatelyLeftOf::new("a1 left of c3", a1, c3))
            .build(&domain)
            .unwrap();
        let injector = DiversityInjector::default();
        let mut rng = RandomNumberGenerator::from_seed(23);
        let best = domain.random_chromosome(&mut rng).unwrap();

        for index in 0..constraints.len() {
            let variants =
                injector.force_targeted_variations(&best, index, 25, &constraints, &mut rng);
            assert_eq!(variants.len(), 25);
            for variant in &variants {
                assert!(domain.is_consistent(variant));
                assert!(constraints.constraint(index).unwrap().is_satisfied(variant));
            }
        }
    }

    #[test]
    fn test_targeted_variations_cover_every_placement() {
        let domain = domain();
        let a1 = domain.attribute("a", "1").unwrap();
        let b2 = domain.attribute("b", "2").unwrap();
        let constraints = ConstraintSetBuilder::new()
            .with_constraint(NextTo::new("a1 next to b2", a1, b2))
            .build(&domain)
            .unwrap();
        let injector = DiversityInjector::default();
        let mut rng = RandomNumberGenerator::from_seed(24);
        let best = domain.random_chromosome(&mut rng).unwrap();

        let variants = injector.force_targeted_variations(&best, 0, 8, &constraints, &mut rng);
        let mut pairs: Vec<(usize, usize)> = variants
            .iter()
            .map(|v| (v.slot_of(a1).unwrap(), v.slot_of(b2).unwrap()))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        assert_eq!(pairs.len(), 8);
    }

    #[test]
    fn test_opaque_constraint_has_no_variations() {
        let domain = domain();
        let constraints = ConstraintSetBuilder::new()
            .with_constraint(Predicate::new("anything", |_: &Chromosome| false))
            .build(&domain)
            .unwrap();
        let injector = DiversityInjector::default();
        let mut rng = RandomNumberGenerator::from_seed(25);
        let best = domain.random_chromosome(&mut rng).unwrap();
        assert!(injector
            .force_targeted_variations(&best, 0, 10, &constraints, &mut rng)
            .is_empty());
        assert!(injector
            .force_targeted_variations(&best, 7, 10, &constraints, &mut rng)
            .is_empty());
    }

    #[test]
    fn test_invalid_shares_rejected() {
        assert!(DiversityInjector::new(0.5, 0.5, 0.5, 0.0, 5).is_err());
        assert!(DiversityInjector::new(0.05, 0.3, 0.4, 0.2, 0).is_err());
        assert!(DiversityInjector::new(0.05, 0.3, 0.4, 0.2, 5).is_ok());
    }
}
