use crate::error::{GeneticError, Result};

/// A parent-pool size that applies once the population's best fitness is within
/// `within` of the maximum score.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolTier {
    pub within: f64,
    pub size: usize,
}

/// How many of the best individuals parents are drawn from.
///
/// The pool narrows as the population closes in on a solution. Tiers are checked in
/// order of increasing `within`; when none applies, `default_size` is used. With the
/// default tiers and 15 constraints: best 14 draws from the top 10, 13 from the top
/// 50, anything lower from the top 200.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParentPool {
    tiers: Vec<PoolTier>,
    default_size: usize,
}

impl ParentPool {
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a size is 0 or a band is negative or
    /// not a number.
    pub fn new(mut tiers: Vec<PoolTier>, default_size: usize) -> Result<Self> {
        tiers.sort_by(|a, b| a.within.total_cmp(&b.within));
        let pool = Self {
            tiers,
            default_size,
        };
        pool.validate()?;
        Ok(pool)
    }

    /// A pool of the same size at every fitness level.
    pub fn flat(size: usize) -> Self {
        Self {
            tiers: Vec::new(),
            default_size: size,
        }
    }

    /// # Errors
    ///
    /// See [`new`](Self::new). Also rejects tiers that are not ordered by increasing
    /// band.
    pub fn validate(&self) -> Result<()> {
        if self.default_size == 0 || self.tiers.iter().any(|tier| tier.size == 0) {
            return Err(GeneticError::Configuration(
                "Parent pool size cannot be zero".to_string(),
            ));
        }
        if let Some(tier) = self
            .tiers
            .iter()
            .find(|tier| !tier.within.is_finite() || tier.within < 0.0)
        {
            return Err(GeneticError::Configuration(format!(
                "Tier band must be a non-negative number, got {}",
                tier.within
            )));
        }
        if self.tiers.windows(2).any(|pair| pair[0].within > pair[1].within) {
            return Err(GeneticError::Configuration(
                "Parent pool tiers must be ordered by increasing band".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_tiers(&self) -> &[PoolTier] {
        &self.tiers
    }

    pub fn get_default_size(&self) -> usize {
        self.default_size
    }

    /// The pool size for a population whose best fitness is `gap` from the maximum.
    pub fn size_for(&self, gap: f64) -> usize {
        self.tiers
            .iter()
            .find(|tier| gap <= tier.within)
            .map_or(self.default_size, |tier| tier.size)
    }
}

impl Default for ParentPool {
    fn default() -> Self {
        Self {
            tiers: vec![
                PoolTier {
                    within: 1.0,
                    size: 10,
                },
                PoolTier {
                    within: 2.0,
                    size: 50,
                },
            ],
            default_size: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_narrows_near_a_solution() {
        let pool = ParentPool::default();
        assert_eq!(pool.size_for(0.0), 10);
        assert_eq!(pool.size_for(1.0), 10);
        assert_eq!(pool.size_for(2.0), 50);
        assert_eq!(pool.size_for(3.0), 200);
        assert_eq!(pool.size_for(15.0), 200);
    }

    #[test]
    fn test_flat_pool() {
        let pool = ParentPool::flat(25);
        assert_eq!(pool.size_for(0.0), 25);
        assert_eq!(pool.size_for(9.0), 25);
        assert!(pool.validate().is_ok());
        assert!(ParentPool::flat(0).validate().is_err());
    }

    #[test]
    fn test_new_sorts_and_validates() {
        let pool = ParentPool::new(
            vec![
                PoolTier {
                    within: 3.0,
                    size: 40,
                },
                PoolTier {
                    within: 0.5,
                    size: 5,
                },
            ],
            100,
        )
        .unwrap();
        assert_eq!(pool.size_for(0.0), 5);
        assert_eq!(pool.size_for(2.0), 40);
        assert_eq!(pool.size_for(4.0), 100);

        assert!(ParentPool::new(
            vec![PoolTier {
                within: f64::NAN,
                size: 5
            }],
            100
        )
        .is_err());
        assert!(ParentPool::new(
            vec![PoolTier {
                within: 1.0,
                size: 0
            }],
            100
        )
        .is_err());

        let unsorted = ParentPool {
            tiers: vec![
                PoolTier {
                    within: 3.0,
                    size: 40,
                },
                PoolTier {
                    within: 0.5,
                    size: 5,
                },
            ],
            default_size: 100,
        };
        assert!(unsorted.validate().is_err());
    }
}
