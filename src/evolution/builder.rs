use crate::{
    constraints::ConstraintSet,
    domain::Domain,
    error::{GeneticError, Result},
};

use super::{EvolutionLauncher, EvolutionOptions};

/// Builder for [`EvolutionLauncher`]. The domain and constraints are required; the
/// options default to [`EvolutionOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct EvolutionLauncherBuilder {
    domain: Option<Domain>,
    constraints: Option<ConstraintSet>,
    options: Option<EvolutionOptions>,
}

impl EvolutionLauncherBuilder {
    pub fn new() -> Self {
        Self {
            domain: None,
            constraints: None,
            options: None,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_options(mut self, options: EvolutionOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if the domain or constraints are missing
    /// or the options fail validation.
    pub fn build(self) -> Result<EvolutionLauncher> {
        let domain = self
            .domain
            .ok_or_else(|| GeneticError::Configuration("Domain not specified".to_string()))?;

        let constraints = self.constraints.ok_or_else(|| {
            GeneticError::Configuration("Constraint set not specified".to_string())
        })?;

        EvolutionLauncher::new(domain, constraints, self.options.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttributeCategory;

    fn domain() -> Domain {
        Domain::new(vec![
            AttributeCategory::new("color", ["red", "green"]),
            AttributeCategory::new("pet", ["cat", "dog"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_parts() {
        let error = EvolutionLauncherBuilder::new()
            .with_constraints(ConstraintSet::default())
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            GeneticError::Configuration("Domain not specified".to_string())
        );

        let error = EvolutionLauncherBuilder::new()
            .with_domain(domain())
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            GeneticError::Configuration("Constraint set not specified".to_string())
        );
    }

    #[test]
    fn test_build_with_default_options() {
        let launcher = EvolutionLauncher::builder()
            .with_domain(domain())
            .with_constraints(ConstraintSet::default())
            .build()
            .unwrap();
        assert_eq!(launcher.get_options(), &EvolutionOptions::default());
    }
}
