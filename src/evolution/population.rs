//! Building whole populations: the first generation, immigrants and restarts.

use crate::constraints::{ConstraintSet, ConstraintShape};
use crate::domain::{Chromosome, Domain};
use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// How a fresh batch of chromosomes is composed.
///
/// The first `random_share` of the batch is uniformly random, the next `seeded_share`
/// starts random but has every fixed-slot constraint placed, and the rest is random
/// again.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedingPlan {
    random_share: f64,
    seeded_share: f64,
}

impl SeedingPlan {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a share is outside `[0, 1]` or the
    /// two add up to more than 1.
    pub fn new(random_share: f64, seeded_share: f64) -> Result<Self> {
        let plan = Self {
            random_share,
            seeded_share,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn get_random_share(&self) -> f64 {
        self.random_share
    }

    pub fn get_seeded_share(&self) -> f64 {
        self.seeded_share
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.random_share)
            || !in_range(self.seeded_share)
            || self.random_share + self.seeded_share > 1.0
        {
            return Err(GeneticError::Configuration(format!(
                "Seeding shares must be in [0, 1] and sum to at most 1, got {} and {}",
                self.random_share, self.seeded_share
            )));
        }
        Ok(())
    }

    /// Builds `size` chromosomes.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain cannot produce a chromosome.
    pub fn populate(
        &self,
        size: usize,
        domain: &Domain,
        constraints: &ConstraintSet,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<Chromosome>> {
        let random = ((size as f64) * self.random_share).floor() as usize;
        let seeded = (((size as f64) * self.seeded_share).floor() as usize).min(size - random);

        let mut population = Vec::with_capacity(size);
        for i in 0..size {
            let chromosome = if (random..random + seeded).contains(&i) {
                seeded_chromosome(domain, constraints, rng)?
            } else {
                domain.random_chromosome(rng)?
            };
            population.push(chromosome);
        }
        Ok(population)
    }
}

impl Default for SeedingPlan {
    fn default() -> Self {
        Self {
            random_share: 0.7,
            seeded_share: 0.2,
        }
    }
}

/// A random chromosome with every fixed-slot constraint in `constraints` placed.
///
/// Placements happen in constraint order, so of two fixed-slot constraints that
/// contradict each other the later one wins.
///
/// # Errors
///
/// Returns an error if the domain cannot produce a chromosome.
pub fn seeded_chromosome(
    domain: &Domain,
    constraints: &ConstraintSet,
    rng: &mut RandomNumberGenerator,
) -> Result<Chromosome> {
    let mut chromosome = domain.random_chromosome(rng)?;
    for index in 0..constraints.len() {
        if let ConstraintShape::FixedSlot { attribute, slot } = constraints.shape(index) {
            chromosome.place_in_place(attribute, slot);
        }
    }
    Ok(chromosome)
}

/// When a run gives up on its population and how much of it survives.
///
/// After `after` generations without improvement the best `keep_share` of the
/// population is kept, or `near_optimal_keep_share` while the best fitness is within
/// `near_optimal_within` of the maximum. The rest is rebuilt from scratch. At least one
/// chromosome is always kept.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestartPolicy {
    after: usize,
    keep_share: f64,
    near_optimal_keep_share: f64,
    near_optimal_within: f64,
}

impl RestartPolicy {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if `after` is 0 or a share is outside
    /// `[0, 1]`.
    pub fn new(
        after: usize,
        keep_share: f64,
        near_optimal_keep_share: f64,
        near_optimal_within: f64,
    ) -> Result<Self> {
        let policy = Self {
            after,
            keep_share,
            near_optimal_keep_share,
            near_optimal_within,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn with_after(mut self, after: usize) -> Self {
        self.after = after;
        self
    }

    pub fn get_after(&self) -> usize {
        self.after
    }

    pub fn get_keep_share(&self) -> f64 {
        self.keep_share
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.after == 0 {
            return Err(GeneticError::Configuration(
                "Restart threshold must be greater than 0".to_string(),
            ));
        }
        for share in [self.keep_share, self.near_optimal_keep_share] {
            if !(0.0..=1.0).contains(&share) {
                return Err(GeneticError::Configuration(format!(
                    "Restart keep share must be in [0, 1], got {}",
                    share
                )));
            }
        }
        Ok(())
    }

    /// Whether a run that has not improved for `stalled` generations should restart.
    pub fn is_due(&self, stalled: usize) -> bool {
        stalled >= self.after
    }

    /// How many of `population_size` chromosomes survive a restart at `gap` from the
    /// maximum.
    pub fn survivors(&self, population_size: usize, gap: f64) -> usize {
        let share = if gap <= self.near_optimal_within {
            self.near_optimal_keep_share
        } else {
            self.keep_share
        };
        ((population_size as f64 * share).floor() as usize)
            .max(1)
            .min(population_size)
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            after: 1000,
            keep_share: 0.08,
            near_optimal_keep_share: 0.15,
            near_optimal_within: 1.0,
        }
    }
}
