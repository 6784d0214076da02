//! # Constraints Module
//!
//! This module defines how puzzle rules are expressed and scored.
//!
//! ## Overview
//!
//! A rule is any type implementing the [`Constraint`] trait: a name, a boolean check
//! over a [`Chromosome`], and an optional [`ConstraintShape`] that tells the directed
//! operators which attributes and slots the rule is about. Rules are collected into an
//! ordered, immutable [`ConstraintSet`] which provides the fitness functions the engine
//! uses.
//!
//! ## Key Components
//!
//! - `Constraint` trait: a single boolean rule
//! - `ConstraintShape`: the declared structure of a rule (fixed slot, same slot, ...)
//! - `ConstraintSet`: ordered rules with weights and adjacency flags, built with
//!   `ConstraintSetBuilder`
//! - `FitnessReport`: a per-chromosome breakdown of satisfied and missing rules
//! - `WeightedFitness`: scores by the sum of satisfied weights instead of the count
//! - Combinatorial constraints: ready-made rules for the common shapes
//!
//! ## Basic Usage
//!
//! ```rust
//! use zebra_ga::constraints::{ConstraintSetBuilder, FixedSlot, NextTo, SameSlot};
//! use zebra_ga::domain::{AttributeCategory, Domain};
//!
//! let domain = Domain::new(vec![
//!     AttributeCategory::new("color", ["red", "green", "blue"]),
//!     AttributeCategory::new("pet", ["cat", "dog", "fish"]),
//! ])
//! .unwrap();
//!
//! let red = domain.attribute("color", "red").unwrap();
//! let cat = domain.attribute("pet", "cat").unwrap();
//! let fish = domain.attribute("pet", "fish").unwrap();
//!
//! let constraints = ConstraintSetBuilder::new()
//!     .with_constraint(FixedSlot::new("red first", red, 0))
//!     .with_constraint(SameSlot::new("red cat", red, cat))
//!     .with_constraint(NextTo::new("cat next to fish", cat, fish))
//!     .build(&domain)
//!     .unwrap();
//!
//! let chromosome = domain
//!     .chromosome_from_values(&[
//!         vec!["red", "cat"],
//!         vec!["green", "fish"],
//!         vec!["blue", "dog"],
//!     ])
//!     .unwrap();
//!
//! assert_eq!(constraints.fitness(&chromosome), 3);
//! assert!(constraints.missing_constraints(&chromosome).is_empty());
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use crate::domain::{AttributeRef, Chromosome, Domain};
use crate::error::{GeneticError, Result};
use crate::evolution::Challenge;

pub mod combinatorial;

pub use combinatorial::{FixedSlot, ImmediatelyLeftOf, NextTo, Predicate, SameSlot};

/// The declared structure of a constraint.
///
/// Directed operators use the shape to build variants that are likely to satisfy a
/// missing rule. A rule that declares `Opaque` is still scored normally but never gets
/// targeted variants.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintShape {
    /// No declared structure.
    Opaque,
    /// `attribute` must sit in `slot`.
    FixedSlot { attribute: AttributeRef, slot: usize },
    /// Both attributes must share a slot.
    SameSlot(AttributeRef, AttributeRef),
    /// The attributes must sit in neighbouring slots, in either order.
    Adjacency(AttributeRef, AttributeRef),
    /// `right` must sit exactly `offset` slots after `left`.
    PositionalPair {
        left: AttributeRef,
        right: AttributeRef,
        offset: usize,
    },
}

/// The variant of a [`ConstraintShape`] without its payload.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Opaque,
    FixedSlot,
    SameSlot,
    Adjacency,
    PositionalPair,
}

impl Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Opaque => "opaque",
            ShapeKind::FixedSlot => "fixed-slot",
            ShapeKind::SameSlot => "same-slot",
            ShapeKind::Adjacency => "adjacency",
            ShapeKind::PositionalPair => "positional-pair",
        };
        write!(f, "{}", name)
    }
}

impl ConstraintShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ConstraintShape::Opaque => ShapeKind::Opaque,
            ConstraintShape::FixedSlot { .. } => ShapeKind::FixedSlot,
            ConstraintShape::SameSlot(..) => ShapeKind::SameSlot,
            ConstraintShape::Adjacency(..) => ShapeKind::Adjacency,
            ConstraintShape::PositionalPair { .. } => ShapeKind::PositionalPair,
        }
    }

    /// The attributes the rule mentions, in declaration order.
    pub fn attributes(&self) -> Vec<AttributeRef> {
        match *self {
            ConstraintShape::Opaque => Vec::new(),
            ConstraintShape::FixedSlot { attribute, .. } => vec![attribute],
            ConstraintShape::SameSlot(a, b) | ConstraintShape::Adjacency(a, b) => vec![a, b],
            ConstraintShape::PositionalPair { left, right, .. } => vec![left, right],
        }
    }

    /// The categories the rule mentions, sorted and without repeats.
    pub fn categories(&self) -> Vec<usize> {
        let mut categories: Vec<usize> = self.attributes().iter().map(|a| a.category).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Whether the rule depends on slot neighbourhood. Directed mutation swaps adjacent
    /// slots for such rules.
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            ConstraintShape::Adjacency(..) | ConstraintShape::PositionalPair { .. }
        )
    }

    fn validate(&self, domain: &Domain) -> std::result::Result<(), String> {
        for attribute in self.attributes() {
            if !domain.contains(attribute) {
                return Err(format!(
                    "attribute (category {}, value {}) is not in the domain",
                    attribute.category, attribute.value
                ));
            }
        }
        match *self {
            ConstraintShape::FixedSlot { slot, .. } if slot >= domain.num_slots() => Err(
                format!("slot {} is out of range for {} slots", slot, domain.num_slots()),
            ),
            ConstraintShape::SameSlot(a, b) if a.category == b.category => Err(format!(
                "'{}' and '{}' belong to the same category and can never share a slot",
                domain.label(a),
                domain.label(b)
            )),
            ConstraintShape::PositionalPair { offset, .. }
                if offset == 0 || offset >= domain.num_slots() =>
            {
                Err(format!(
                    "offset {} is out of range for {} slots",
                    offset,
                    domain.num_slots()
                ))
            }
            _ => Ok(()),
        }
    }
}

/// A boolean rule over a chromosome.
pub trait Constraint: Debug + Send + Sync {
    /// A human-readable name used in reports and logs.
    fn name(&self) -> &str;

    /// Returns `true` if the chromosome satisfies the rule.
    fn is_satisfied(&self, chromosome: &Chromosome) -> bool;

    /// The declared structure of the rule.
    ///
    /// The default implementation declares no structure.
    fn shape(&self) -> ConstraintShape {
        ConstraintShape::Opaque
    }
}

#[derive(Debug, Clone)]
struct ConstraintEntry {
    constraint: Arc<dyn Constraint>,
    shape: ConstraintShape,
    weight: f64,
    adjacency_sensitive: bool,
}

/// An ordered, immutable list of constraints with per-rule weights.
///
/// Cloning is cheap: the rules themselves are shared.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    entries: Vec<ConstraintEntry>,
}

impl ConstraintSet {
    /// Creates a new constraint set builder.
    pub fn builder() -> ConstraintSetBuilder {
        ConstraintSetBuilder::new()
    }

    /// Returns the number of constraints in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set has no constraints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn constraint(&self, index: usize) -> Option<&dyn Constraint> {
        self.entries.get(index).map(|e| e.constraint.as_ref())
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.constraint.name())
    }

    /// Weight of the rule at `index`, or `0.0` if there is no such rule.
    pub fn weight(&self, index: usize) -> f64 {
        self.entries.get(index).map_or(0.0, |e| e.weight)
    }

    /// Declared shape of the rule at `index`, `Opaque` if there is no such rule.
    pub fn shape(&self, index: usize) -> ConstraintShape {
        self.entries
            .get(index)
            .map_or(ConstraintShape::Opaque, |e| e.shape)
    }

    pub fn is_adjacency_sensitive(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| e.adjacency_sensitive)
    }

    pub fn has_negative_weights(&self) -> bool {
        self.entries.iter().any(|e| e.weight < 0.0)
    }

    /// The highest weighted score any chromosome can reach: the sum of all positive
    /// weights.
    pub fn max_weighted_fitness(&self) -> f64 {
        self.entries.iter().map(|e| e.weight.max(0.0)).sum()
    }

    /// Number of satisfied constraints. `0` for an empty set.
    pub fn fitness(&self, chromosome: &Chromosome) -> usize {
        self.entries
            .iter()
            .filter(|e| e.constraint.is_satisfied(chromosome))
            .count()
    }

    /// Sum of the weights of the satisfied constraints.
    pub fn weighted_fitness(&self, chromosome: &Chromosome) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.constraint.is_satisfied(chromosome))
            .map(|e| e.weight)
            .sum()
    }

    /// Indices of the unsatisfied constraints, ascending.
    pub fn missing_constraints(&self, chromosome: &Chromosome) -> Vec<usize> {
        self.partition(chromosome).1
    }

    /// The first unsatisfied constraint that declares a shape, if any.
    pub fn first_missing_shaped(&self, chromosome: &Chromosome) -> Option<usize> {
        self.entries.iter().position(|e| {
            e.shape.kind() != ShapeKind::Opaque && !e.constraint.is_satisfied(chromosome)
        })
    }

    /// Indices of the satisfied constraints, ascending.
    pub fn satisfied(&self, chromosome: &Chromosome) -> Vec<usize> {
        self.partition(chromosome).0
    }

    /// Returns `true` if every constraint holds.
    pub fn is_solution(&self, chromosome: &Chromosome) -> bool {
        self.entries
            .iter()
            .all(|e| e.constraint.is_satisfied(chromosome))
    }

    /// Full breakdown of how `chromosome` fares against the set.
    pub fn report(&self, chromosome: &Chromosome) -> FitnessReport {
        let (satisfied, missing) = self.partition(chromosome);

        let mut by_shape: BTreeMap<ShapeKind, ShapeTally> = BTreeMap::new();
        for entry in &self.entries {
            by_shape.entry(entry.shape.kind()).or_default().total += 1;
        }
        for &index in &satisfied {
            if let Some(tally) = by_shape.get_mut(&self.entries[index].shape.kind()) {
                tally.satisfied += 1;
            }
        }

        FitnessReport {
            score: satisfied.len(),
            weighted_score: satisfied.iter().map(|&i| self.entries[i].weight).sum(),
            max_score: self.len(),
            missing_names: missing
                .iter()
                .map(|&i| self.entries[i].constraint.name().to_string())
                .collect(),
            satisfied,
            missing,
            by_shape,
        }
    }

    fn partition(&self, chromosome: &Chromosome) -> (Vec<usize>, Vec<usize>) {
        let mut satisfied = Vec::new();
        let mut missing = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.constraint.is_satisfied(chromosome) {
                satisfied.push(index);
            } else {
                missing.push(index);
            }
        }
        (satisfied, missing)
    }
}

impl Challenge for ConstraintSet {
    fn score(&self, chromosome: &Chromosome) -> f64 {
        self.fitness(chromosome) as f64
    }

    fn max_score(&self) -> f64 {
        self.len() as f64
    }
}

/// Builder for creating a constraint set with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSetBuilder {
    constraints: Vec<(Arc<dyn Constraint>, f64)>,
    adjacency_overrides: Vec<(usize, bool)>,
}

impl ConstraintSetBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint with weight `1.0`.
    pub fn with_constraint<C>(self, constraint: C) -> Self
    where
        C: Constraint + 'static,
    {
        self.with_weighted_constraint(constraint, 1.0)
    }

    /// Adds a constraint with an explicit weight.
    pub fn with_weighted_constraint<C>(mut self, constraint: C, weight: f64) -> Self
    where
        C: Constraint + 'static,
    {
        self.constraints.push((Arc::new(constraint), weight));
        self
    }

    /// Adds an already shared constraint.
    pub fn with_shared_constraint(mut self, constraint: Arc<dyn Constraint>, weight: f64) -> Self {
        self.constraints.push((constraint, weight));
        self
    }

    /// Overrides the adjacency-sensitive flag of the rule at `index`.
    ///
    /// By default a rule is adjacency sensitive when its shape is positional.
    pub fn with_adjacency_sensitive(mut self, index: usize, sensitive: bool) -> Self {
        self.adjacency_overrides.push((index, sensitive));
        self
    }

    /// Builds the constraint set, validating it against `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if a weight is not finite, a declared
    /// shape refers to attributes or slots outside the domain, or an adjacency override
    /// names a rule that does not exist.
    pub fn build(self, domain: &Domain) -> Result<ConstraintSet> {
        let mut entries = Vec::with_capacity(self.constraints.len());

        for (index, (constraint, weight)) in self.constraints.into_iter().enumerate() {
            if !weight.is_finite() {
                return Err(GeneticError::Configuration(format!(
                    "Constraint {} ('{}') has a non-finite weight",
                    index,
                    constraint.name()
                )));
            }
            let shape = constraint.shape();
            shape.validate(domain).map_err(|reason| {
                GeneticError::Configuration(format!(
                    "Constraint {} ('{}'): {}",
                    index,
                    constraint.name(),
                    reason
                ))
            })?;
            entries.push(ConstraintEntry {
                adjacency_sensitive: shape.is_positional(),
                constraint,
                shape,
                weight,
            });
        }

        let count = entries.len();
        for (index, sensitive) in self.adjacency_overrides {
            let entry = entries.get_mut(index).ok_or_else(|| {
                GeneticError::Configuration(format!(
                    "Adjacency override for constraint {} but only {} constraints exist",
                    index, count
                ))
            })?;
            entry.adjacency_sensitive = sensitive;
        }

        Ok(ConstraintSet { entries })
    }
}

/// Satisfied and total rule counts for one shape kind.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeTally {
    pub satisfied: usize,
    pub total: usize,
}

/// How one chromosome fares against a constraint set.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessReport {
    pub score: usize,
    pub weighted_score: f64,
    pub max_score: usize,
    pub satisfied: Vec<usize>,
    pub missing: Vec<usize>,
    pub missing_names: Vec<String>,
    pub by_shape: BTreeMap<ShapeKind, ShapeTally>,
}

impl FitnessReport {
    pub fn is_solution(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Display for FitnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} constraints satisfied", self.score, self.max_score)?;
        for (kind, tally) in &self.by_shape {
            write!(f, ", {} {}/{}", kind, tally.satisfied, tally.total)?;
        }
        Ok(())
    }
}

/// Scores chromosomes by the weighted sum of satisfied constraints.
#[derive(Debug, Clone)]
pub struct WeightedFitness {
    constraints: ConstraintSet,
}

impl WeightedFitness {
    pub fn new(constraints: ConstraintSet) -> Self {
        Self { constraints }
    }

    /// Returns a reference to the wrapped constraint set.
    pub fn inner(&self) -> &ConstraintSet {
        &self.constraints
    }
}

impl Challenge for WeightedFitness {
    fn score(&self, chromosome: &Chromosome) -> f64 {
        self.constraints.weighted_fitness(chromosome)
    }

    fn max_score(&self) -> f64 {
        self.constraints.max_weighted_fitness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttributeCategory;

    fn domain() -> Domain {
        Domain::new(vec![
            AttributeCategory::new("color", ["red", "green", "blue"]),
            AttributeCategory::new("pet", ["cat", "dog", "fish"]),
        ])
        .unwrap()
    }

    fn chromosome(domain: &Domain) -> Chromosome {
        domain
            .chromosome_from_values(&[
                vec!["red", "cat"],
                vec!["green", "fish"],
                vec!["blue", "dog"],
            ])
            .unwrap()
    }

    #[test]
    fn test_empty_set_scores_zero() {
        let domain = domain();
        let set = ConstraintSetBuilder::new().build(&domain).unwrap();
        let c = chromosome(&domain);
        assert_eq!(set.fitness(&c), 0);
        assert_eq!(set.weighted_fitness(&c), 0.0);
        assert!(set.missing_constraints(&c).is_empty());
        assert_eq!(set.max_score(), 0.0);
    }

    #[test]
    fn test_fitness_and_missing() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let blue = domain.attribute("color", "blue").unwrap();
        let dog = domain.attribute("pet", "dog").unwrap();
        let set = ConstraintSetBuilder::new()
            .with_constraint(FixedSlot::new("red first", red, 0))
            .with_weighted_constraint(FixedSlot::new("blue first", blue, 0), 2.5)
            .with_constraint(SameSlot::new("blue dog", blue, dog))
            .build(&domain)
            .unwrap();

        let c = chromosome(&domain);
        assert_eq!(set.fitness(&c), 2);
        assert_eq!(set.weighted_fitness(&c), 2.0);
        assert_eq!(set.missing_constraints(&c), vec![1]);
        assert_eq!(set.satisfied(&c), vec![0, 2]);
        assert_eq!(set.max_weighted_fitness(), 4.5);
        assert!(!set.is_solution(&c));
    }

    #[test]
    fn test_report_breakdown() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let green = domain.attribute("color", "green").unwrap();
        let cat = domain.attribute("pet", "cat").unwrap();
        let set = ConstraintSetBuilder::new()
            .with_constraint(FixedSlot::new("red first", red, 0))
            .with_constraint(FixedSlot::new("green first", green, 0))
            .with_constraint(NextTo::new("green next to cat", green, cat))
            .with_constraint(Predicate::new("always", |_: &Chromosome| true))
            .build(&domain)
            .unwrap();

        let report = set.report(&chromosome(&domain));
        assert_eq!(report.score, 3);
        assert_eq!(report.max_score, 4);
        assert_eq!(report.missing, vec![1]);
        assert_eq!(report.missing_names, vec!["green first".to_string()]);
        assert_eq!(
            report.by_shape[&ShapeKind::FixedSlot],
            ShapeTally {
                satisfied: 1,
                total: 2
            }
        );
        assert_eq!(report.by_shape[&ShapeKind::Adjacency].satisfied, 1);
        assert_eq!(report.by_shape[&ShapeKind::Opaque].total, 1);
        assert!(!report.is_solution());
    }

    #[test]
    fn test_adjacency_flags_default_and_override() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let green = domain.attribute("color", "green").unwrap();
        let cat = domain.attribute("pet", "cat").unwrap();
        let set = ConstraintSetBuilder::new()
            .with_constraint(SameSlot::new("red cat", red, cat))
            .with_constraint(NextTo::new("green next to cat", green, cat))
            .with_constraint(ImmediatelyLeftOf::new("red left of green", red, green))
            .with_adjacency_sensitive(0, true)
            .with_adjacency_sensitive(2, false)
            .build(&domain)
            .unwrap();

        assert!(set.is_adjacency_sensitive(0));
        assert!(set.is_adjacency_sensitive(1));
        assert!(!set.is_adjacency_sensitive(2));
        assert!(!set.is_adjacency_sensitive(9));
        assert_eq!(set.shape(9), ConstraintShape::Opaque);
    }

    #[test]
    fn test_build_rejects_bad_configuration() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let green = domain.attribute("color", "green").unwrap();

        let result = ConstraintSetBuilder::new()
            .with_weighted_constraint(FixedSlot::new("red first", red, 0), f64::NAN)
            .build(&domain);
        assert!(matches!(result, Err(GeneticError::Configuration(_))));

        let result = ConstraintSetBuilder::new()
            .with_constraint(FixedSlot::new("red tenth", red, 10))
            .build(&domain);
        assert!(result.is_err());

        let result = ConstraintSetBuilder::new()
            .with_constraint(SameSlot::new("red green", red, green))
            .build(&domain);
        assert!(result.is_err());

        let result = ConstraintSetBuilder::new()
            .with_constraint(FixedSlot::new("ghost", AttributeRef::new(5, 0), 0))
            .build(&domain);
        assert!(result.is_err());

        let result = ConstraintSetBuilder::new()
            .with_adjacency_sensitive(0, true)
            .build(&domain);
        assert!(result.is_err());
    }

    #[test]
    fn test_first_missing_shaped_skips_opaque_rules() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let green = domain.attribute("color", "green").unwrap();
        let set = ConstraintSetBuilder::new()
            .with_constraint(Predicate::new("never", |_: &Chromosome| false))
            .with_constraint(FixedSlot::new("red first", red, 0))
            .with_constraint(FixedSlot::new("green first", green, 0))
            .build(&domain)
            .unwrap();
        let red_first = chromosome(&domain);
        assert_eq!(set.first_missing_shaped(&red_first), Some(2));

        let only_opaque = ConstraintSetBuilder::new()
            .with_constraint(Predicate::new("never", |_: &Chromosome| false))
            .build(&domain)
            .unwrap();
        assert_eq!(only_opaque.first_missing_shaped(&red_first), None);
    }

    #[test]
    fn test_out_of_range_override_reports_constraint_count() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let result = ConstraintSetBuilder::new()
            .with_constraint(FixedSlot::new("red first", red, 0))
            .with_adjacency_sensitive(3, true)
            .build(&domain);
        match result {
            Err(GeneticError::Configuration(message)) => {
                assert!(message.contains("constraint 3 but only 1 constraints exist"));
            }
            other => panic!("unexpected result: {:?}", other.map(|set| set.len())),
        }
    }

    #[test]
    fn test_weighted_fitness_challenge() {
        let domain = domain();
        let red = domain.attribute("color", "red").unwrap();
        let blue = domain.attribute("color", "blue").unwrap();
        let set = ConstraintSetBuilder::new()
            .with_weighted_constraint(FixedSlot::new("red first", red, 0), 3.0)
            .with_weighted_constraint(FixedSlot::new("blue first", blue, 0), -1.0)
            .build(&domain)
            .unwrap();
        assert!(set.has_negative_weights());

        let weighted = WeightedFitness::new(set);
        let c = chromosome(&domain);
        assert_eq!(weighted.score(&c), 3.0);
        assert_eq!(weighted.max_score(), 3.0);
    }

    #[test]
    fn test_shape_categories() {
        let shape = ConstraintShape::SameSlot(AttributeRef::new(1, 0), AttributeRef::new(0, 2));
        assert_eq!(shape.categories(), vec![0, 1]);
        assert_eq!(shape.kind(), ShapeKind::SameSlot);
        assert!(!shape.is_positional());
        assert!(ConstraintShape::Opaque.categories().is_empty());
    }
}
