use crate::domain::Chromosome;
use crate::error::Result;
use crate::rng::RandomNumberGenerator;
use crate::selection::selection_strategy::{check_inputs, SelectionStrategy};

/// Fitness-proportional selection.
///
/// Each candidate is picked with probability proportional to its fitness. If any
/// fitness is negative, every value is shifted by `|min| + offset` first so the
/// weakest candidate keeps a small chance. If the total is not positive the pick is
/// uniform.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RouletteWheelSelection {
    offset: f64,
}

impl RouletteWheelSelection {
    pub fn new() -> Self {
        Self { offset: 1.0 }
    }

    /// Sets the offset added on top of `|min|` when shifting negative fitness values.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn get_offset(&self) -> f64 {
        self.offset
    }

    /// Picks an index from already validated, non-empty fitness values.
    pub(crate) fn spin(&self, fitness: &[f64], rng: &mut RandomNumberGenerator) -> usize {
        let weight = |f: f64| if f.is_finite() { f } else { 0.0 };

        let min = fitness
            .iter()
            .copied()
            .map(weight)
            .fold(f64::INFINITY, f64::min);
        let shift = if min < 0.0 { -min + self.offset } else { 0.0 };

        let total: f64 = fitness.iter().map(|&f| weight(f) + shift).sum();
        if !total.is_finite() || total <= 0.0 {
            return rng.index(fitness.len());
        }

        let target = rng.uniform_up_to(total);
        let mut cumulative = 0.0;
        for (index, &f) in fitness.iter().enumerate() {
            cumulative += weight(f) + shift;
            if cumulative > target {
                return index;
            }
        }

        // Rounding can leave the last partial sum just below `target`.
        fitness.len() - 1
    }
}

impl Default for RouletteWheelSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for RouletteWheelSelection {
    fn select(
        &self,
        population: &[Chromosome],
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        check_inputs(population, fitness)?;
        Ok(self.spin(fitness, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneticError;

    fn population(n: usize) -> Vec<Chromosome> {
        (0..n)
            .map(|i| Chromosome::from_slots(vec![vec![i]]))
            .collect()
    }

    #[test]
    fn test_zero_fitness_is_uniform() {
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(1);
        let pop = population(4);
        let fitness = vec![0.0; 4];
        let mut counts = [0usize; 4];
        for _ in 0..400 {
            counts[selection.select(&pop, &fitness, &mut rng).unwrap()] += 1;
        }
        assert!(counts.iter().all(|&c| c > 0));
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(2);
        let pop = population(3);
        let fitness = vec![0.0, 5.0, 0.0];
        for _ in 0..200 {
            assert_eq!(selection.select(&pop, &fitness, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_negative_fitness_is_shifted() {
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(3);
        let pop = population(2);
        // shifted to [1.0, 11.0]
        let fitness = vec![-5.0, 5.0];
        let mut counts = [0usize; 2];
        for _ in 0..1200 {
            counts[selection.select(&pop, &fitness, &mut rng).unwrap()] += 1;
        }
        assert!(counts[0] > 0);
        assert!(counts[1] > counts[0] * 4);
    }

    #[test]
    fn test_rejects_bad_input() {
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(4);
        assert_eq!(
            selection.select(&[], &[], &mut rng),
            Err(GeneticError::EmptyPopulation)
        );
        assert!(selection.select(&population(2), &[1.0], &mut rng).is_err());
    }
}
