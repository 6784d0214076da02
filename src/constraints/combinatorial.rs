//! # Combinatorial Constraints
//!
//! Ready-made rules for the shapes that logic-grid puzzles are built from. Each one
//! declares its [`ConstraintShape`] so the directed operators can target it.
//! [`Predicate`] wraps an arbitrary closure for anything else.

use std::fmt::{self, Debug};

use crate::constraints::{Constraint, ConstraintShape};
use crate::domain::{AttributeRef, Chromosome};

/// Requires `attribute` to sit in `slot`.
#[derive(Debug, Clone)]
pub struct FixedSlot {
    name: String,
    attribute: AttributeRef,
    slot: usize,
}

impl FixedSlot {
    pub fn new<S: Into<String>>(name: S, attribute: AttributeRef, slot: usize) -> Self {
        Self {
            name: name.into(),
            attribute,
            slot,
        }
    }
}

impl Constraint for FixedSlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self, chromosome: &Chromosome) -> bool {
        chromosome.holds(self.slot, self.attribute)
    }

    fn shape(&self) -> ConstraintShape {
        ConstraintShape::FixedSlot {
            attribute: self.attribute,
            slot: self.slot,
        }
    }
}

/// Requires two attributes from different categories to share a slot.
#[derive(Debug, Clone)]
pub struct SameSlot {
    name: String,
    first: AttributeRef,
    second: AttributeRef,
}

impl SameSlot {
    pub fn new<S: Into<String>>(name: S, first: AttributeRef, second: AttributeRef) -> Self {
        Self {
            name: name.into(),
            first,
            second,
        }
    }
}

impl Constraint for SameSlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self, chromosome: &Chromosome) -> bool {
        chromosome
            .slot_of(self.first)
            .is_some_and(|slot| chromosome.holds(slot, self.second))
    }

    fn shape(&self) -> ConstraintShape {
        ConstraintShape::SameSlot(self.first, self.second)
    }
}

/// Requires two attributes to sit in neighbouring slots, in either order.
#[derive(Debug, Clone)]
pub struct NextTo {
    name: String,
    first: AttributeRef,
    second: AttributeRef,
}

impl NextTo {
    pub fn new<S: Into<String>>(name: S, first: AttributeRef, second: AttributeRef) -> Self {
        Self {
            name: name.into(),
            first,
            second,
        }
    }
}

impl Constraint for NextTo {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self, chromosome: &Chromosome) -> bool {
        match (chromosome.slot_of(self.first), chromosome.slot_of(self.second)) {
            (Some(a), Some(b)) => a.abs_diff(b) == 1,
            _ => false,
        }
    }

    fn shape(&self) -> ConstraintShape {
        ConstraintShape::Adjacency(self.first, self.second)
    }
}

/// Requires `right` to sit exactly `offset` slots after `left`. The offset is `1`
/// unless set with [`ImmediatelyLeftOf::with_offset`].
#[derive(Debug, Clone)]
pub struct ImmediatelyLeftOf {
    name: String,
    left: AttributeRef,
    right: AttributeRef,
    offset: usize,
}

impl ImmediatelyLeftOf {
    pub fn new<S: Into<String>>(name: S, left: AttributeRef, right: AttributeRef) -> Self {
        Self {
            name: name.into(),
            left,
            right,
            offset: 1,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl Constraint for ImmediatelyLeftOf {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self, chromosome: &Chromosome) -> bool {
        match (chromosome.slot_of(self.left), chromosome.slot_of(self.right)) {
            (Some(left), Some(right)) => right == left + self.offset,
            _ => false,
        }
    }

    fn shape(&self) -> ConstraintShape {
        ConstraintShape::PositionalPair {
            left: self.left,
            right: self.right,
            offset: self.offset,
        }
    }
}

/// A rule backed by an arbitrary closure. Its shape is always opaque.
///
/// # Examples
///
/// ```
/// use zebra_ga::constraints::{Constraint, Predicate};
/// use zebra_ga::domain::Chromosome;
///
/// let first_slot_is_zero = Predicate::new("slot 0 holds value 0 everywhere", |c: &Chromosome| {
///     c.slots()[0].iter().all(|&v| v == 0)
/// });
///
/// let chromosome = Chromosome::from_slots(vec![vec![0, 0], vec![1, 1]]);
/// assert!(first_slot_is_zero.is_satisfied(&chromosome));
/// ```
pub struct Predicate<F>
where
    F: Fn(&Chromosome) -> bool + Send + Sync,
{
    name: String,
    check: F,
}

impl<F> Predicate<F>
where
    F: Fn(&Chromosome) -> bool + Send + Sync,
{
    pub fn new<S: Into<String>>(name: S, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> Debug for Predicate<F>
where
    F: Fn(&Chromosome) -> bool + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Constraint for Predicate<F>
where
    F: Fn(&Chromosome) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self, chromosome: &Chromosome) -> bool {
        (self.check)(chromosome)
    }
}
