//! # Attribute Domain & Chromosome Model
//!
//! A [`Domain`] is an ordered list of [`AttributeCategory`] values that all share one
//! cardinality `N`. That cardinality is also the number of slots: a [`Chromosome`]
//! assigns every category value to exactly one of `N` ordered slots.
//!
//! Values are stored as indices into their category's value list, so a chromosome is a
//! small grid of `usize` values that is cheap to clone, hash and compare.
//!
//! ## Invariant
//!
//! For every category, the values across all slots form a permutation of that
//! category's value set. [`Domain::random_chromosome`] produces such chromosomes and
//! [`Domain::repair`] restores the property after slot-wise recombination.
//!
//! ## Example
//!
//! ```rust
//! use zebra_ga::domain::{AttributeCategory, Domain};
//! use zebra_ga::rng::RandomNumberGenerator;
//!
//! let domain = Domain::new(vec![
//!     AttributeCategory::new("color", ["red", "green", "blue"]),
//!     AttributeCategory::new("pet", ["cat", "dog", "fish"]),
//! ])
//! .unwrap();
//!
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let chromosome = domain.random_chromosome(&mut rng).unwrap();
//!
//! assert!(domain.is_consistent(&chromosome));
//! assert_eq!(domain.serialize(&chromosome).len(), 3);
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// A named category with an ordered list of distinct values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCategory {
    name: String,
    values: Vec<String>,
}

impl AttributeCategory {
    /// Creates a new category. Uniqueness is checked when the category is added to a
    /// [`Domain`].
    pub fn new<S, I, V>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the index of `value` in this category.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

/// Identifies one value of one category, both by index into the [`Domain`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeRef {
    pub category: usize,
    pub value: usize,
}

impl AttributeRef {
    pub fn new(category: usize, value: usize) -> Self {
        Self { category, value }
    }
}

/// One candidate assignment: `slots[i][c]` is the value index of category `c` in slot `i`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chromosome {
    slots: Vec<Vec<usize>>,
}

impl Chromosome {
    /// Wraps a slot grid without checking it. Use [`Domain::is_consistent`] or
    /// [`Domain::repair`] when the grid comes from outside the operators.
    pub fn from_slots(slots: Vec<Vec<usize>>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[Vec<usize>] {
        &self.slots
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn num_categories(&self) -> usize {
        self.slots.first().map_or(0, Vec::len)
    }

    /// Value index of `category` in `slot`.
    pub fn value(&self, slot: usize, category: usize) -> usize {
        self.slots[slot][category]
    }

    /// Returns `true` if `slot` holds `attribute`.
    pub fn holds(&self, slot: usize, attribute: AttributeRef) -> bool {
        self.slots
            .get(slot)
            .and_then(|s| s.get(attribute.category))
            .is_some_and(|&v| v == attribute.value)
    }

    /// First slot holding `attribute`, if any.
    pub fn slot_of(&self, attribute: AttributeRef) -> Option<usize> {
        (0..self.slots.len()).find(|&slot| self.holds(slot, attribute))
    }

    /// The values of one category, in slot order.
    pub fn column(&self, category: usize) -> Vec<usize> {
        self.slots.iter().map(|slot| slot[category]).collect()
    }

    /// Returns a copy with the values of `category` exchanged between slots `a` and `b`.
    pub fn swapped(&self, category: usize, a: usize, b: usize) -> Chromosome {
        let mut copy = self.clone();
        copy.swap_in_place(category, a, b);
        copy
    }

    /// Exchanges the values of `category` between slots `a` and `b` in place.
    ///
    /// This is the one in-place edit on a chromosome. Operators only call it on a
    /// private clone before returning that clone, so shared chromosomes never change.
    pub fn swap_in_place(&mut self, category: usize, a: usize, b: usize) {
        if a == b {
            return;
        }
        let tmp = self.slots[a][category];
        self.slots[a][category] = self.slots[b][category];
        self.slots[b][category] = tmp;
    }

    /// Moves `attribute` into `slot` by swapping it with whatever occupies that slot.
    /// Does nothing if the attribute is not present.
    pub(crate) fn place_in_place(&mut self, attribute: AttributeRef, slot: usize) {
        if let Some(current) = self.slot_of(attribute) {
            self.swap_in_place(attribute.category, current, slot);
        }
    }

    pub(crate) fn set_column(&mut self, category: usize, column: &[usize]) {
        for (slot, &value) in self.slots.iter_mut().zip(column) {
            slot[category] = value;
        }
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .slots
            .iter()
            .map(|slot| {
                let values: Vec<String> = slot.iter().map(usize::to_string).collect();
                format!("[{}]", values.join(","))
            })
            .collect();
        write!(f, "{}", rows.join(" "))
    }
}

/// The validated set of categories a run works over.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    categories: Vec<AttributeCategory>,
}

impl Domain {
    /// Creates a domain.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if there are no categories, a category is
    /// empty, a category repeats a value, two categories share a name, or the
    /// categories do not all have the same cardinality.
    pub fn new(categories: Vec<AttributeCategory>) -> Result<Self> {
        let first = categories.first().ok_or_else(|| {
            GeneticError::Configuration("Domain needs at least one category".to_string())
        })?;
        let cardinality = first.len();

        let mut names = HashSet::new();
        for category in &categories {
            if category.is_empty() {
                return Err(GeneticError::Configuration(format!(
                    "Category '{}' has no values",
                    category.name()
                )));
            }
            if !names.insert(category.name()) {
                return Err(GeneticError::Configuration(format!(
                    "Category '{}' is declared twice",
                    category.name()
                )));
            }
            if category.len() != cardinality {
                return Err(GeneticError::Configuration(format!(
                    "Category '{}' has {} values but '{}' has {}",
                    category.name(),
                    category.len(),
                    first.name(),
                    cardinality
                )));
            }
            let mut seen = HashSet::new();
            for value in category.values() {
                if !seen.insert(value.as_str()) {
                    return Err(GeneticError::Configuration(format!(
                        "Category '{}' repeats value '{}'",
                        category.name(),
                        value
                    )));
                }
            }
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[AttributeCategory] {
        &self.categories
    }

    pub fn category(&self, index: usize) -> Option<&AttributeCategory> {
        self.categories.get(index)
    }

    pub fn num_categories(&self) -> usize {
        self.categories.len()
    }

    /// Number of slots, equal to the shared category cardinality.
    pub fn num_slots(&self) -> usize {
        self.categories.first().map_or(0, AttributeCategory::len)
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name() == name)
    }

    /// Resolves a `(category, value)` pair by name.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Configuration`] if either name is unknown.
    pub fn attribute(&self, category: &str, value: &str) -> Result<AttributeRef> {
        let category_index = self.category_index(category).ok_or_else(|| {
            GeneticError::Configuration(format!("Unknown category '{}'", category))
        })?;
        let value_index = self.categories[category_index]
            .position(value)
            .ok_or_else(|| {
                GeneticError::Configuration(format!(
                    "Category '{}' has no value '{}'",
                    category, value
                ))
            })?;
        Ok(AttributeRef::new(category_index, value_index))
    }

    /// Returns `true` if `attribute` indexes a real category and value.
    pub fn contains(&self, attribute: AttributeRef) -> bool {
        self.categories
            .get(attribute.category)
            .is_some_and(|c| attribute.value < c.len())
    }

    /// Human-readable `category=value` label for an attribute.
    pub fn label(&self, attribute: AttributeRef) -> String {
        match self.categories.get(attribute.category) {
            Some(category) => match category.values().get(attribute.value) {
                Some(value) => format!("{}={}", category.name(), value),
                None => format!("{}=#{}", category.name(), attribute.value),
            },
            None => format!("#{}=#{}", attribute.category, attribute.value),
        }
    }

    /// Draws a chromosome by taking an independent random permutation per category.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Domain`] if a category's cardinality differs from the
    /// slot count.
    pub fn random_chromosome(&self, rng: &mut RandomNumberGenerator) -> Result<Chromosome> {
        let num_slots = self.num_slots();
        let mut slots = vec![Vec::with_capacity(self.num_categories()); num_slots];

        for category in &self.categories {
            if category.len() != num_slots {
                return Err(GeneticError::Domain(format!(
                    "Category '{}' has {} values for {} slots",
                    category.name(),
                    category.len(),
                    num_slots
                )));
            }
            let mut permutation: Vec<usize> = (0..num_slots).collect();
            rng.shuffle(&mut permutation);
            for (slot, value) in slots.iter_mut().zip(permutation) {
                slot.push(value);
            }
        }

        Ok(Chromosome::from_slots(slots))
    }

    /// Restores the permutation invariant.
    ///
    /// For each category, every repeated value after its first occurrence (and every
    /// out-of-range value) is replaced by a value missing from that category, taken in
    /// ascending domain order. Repairing a consistent chromosome returns it unchanged,
    /// so `repair(repair(c)) == repair(c)`.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Domain`] if the chromosome has the wrong number of slots
    /// or categories, and [`GeneticError::RepairExhaustion`] if a category runs out of
    /// replacement values.
    pub fn repair(&self, chromosome: &Chromosome) -> Result<Chromosome> {
        self.check_shape(chromosome)?;

        let num_slots = self.num_slots();
        let mut repaired = chromosome.clone();

        for (category_index, category) in self.categories.iter().enumerate() {
            let mut seen = vec![false; category.len()];
            let mut duplicates = Vec::new();

            for slot in 0..num_slots {
                let value = chromosome.value(slot, category_index);
                if value < seen.len() && !seen[value] {
                    seen[value] = true;
                } else {
                    duplicates.push(slot);
                }
            }

            if duplicates.is_empty() {
                continue;
            }

            let mut missing = (0..category.len()).filter(|&v| !seen[v]);
            for slot in duplicates {
                let replacement = missing.next().ok_or_else(|| {
                    GeneticError::RepairExhaustion(format!(
                        "Category '{}' has no unused value left for slot {}",
                        category.name(),
                        slot
                    ))
                })?;
                repaired.slots[slot][category_index] = replacement;
            }
        }

        Ok(repaired)
    }

    /// Returns `true` if the chromosome has the domain's shape and every category is a
    /// permutation of its values.
    pub fn is_consistent(&self, chromosome: &Chromosome) -> bool {
        if self.check_shape(chromosome).is_err() {
            return false;
        }
        (0..self.num_categories()).all(|category| {
            let mut seen = vec![false; self.num_slots()];
            chromosome.slots().iter().all(|slot| {
                let value = slot[category];
                value < seen.len() && !std::mem::replace(&mut seen[value], true)
            })
        })
    }

    /// Renders a chromosome as per-slot tuples of value names, in category order.
    ///
    /// Value indices outside the domain render as `"?"`.
    pub fn serialize<'a>(&'a self, chromosome: &Chromosome) -> Vec<Vec<&'a str>> {
        chromosome
            .slots()
            .iter()
            .map(|slot| {
                slot.iter()
                    .zip(&self.categories)
                    .map(|(&value, category)| {
                        category.values().get(value).map_or("?", String::as_str)
                    })
                    .collect()
            })
            .collect()
    }

    /// Builds a chromosome from per-slot rows of value names, in category order.
    ///
    /// # Errors
    ///
    /// Returns [`GeneticError::Domain`] if a row has the wrong length or names an
    /// unknown value. The result is not repaired; check it with [`Domain::is_consistent`].
    pub fn chromosome_from_values<S: AsRef<str>>(&self, rows: &[Vec<S>]) -> Result<Chromosome> {
        let mut slots = Vec::with_capacity(rows.len());
        for (slot, row) in rows.iter().enumerate() {
            if row.len() != self.num_categories() {
                return Err(GeneticError::Domain(format!(
                    "Slot {} has {} values but the domain has {} categories",
                    slot,
                    row.len(),
                    self.num_categories()
                )));
            }
            let mut values = Vec::with_capacity(row.len());
            for (category, value) in self.categories.iter().zip(row) {
                let index = category.position(value.as_ref()).ok_or_else(|| {
                    GeneticError::Domain(format!(
                        "Category '{}' has no value '{}'",
                        category.name(),
                        value.as_ref()
                    ))
                })?;
                values.push(index);
            }
            slots.push(values);
        }
        Ok(Chromosome::from_slots(slots))
    }

    fn check_shape(&self, chromosome: &Chromosome) -> Result<()> {
        if chromosome.num_slots() != self.num_slots() {
            return Err(GeneticError::Domain(format!(
                "Chromosome has {} slots, domain has {}",
                chromosome.num_slots(),
                self.num_slots()
            )));
        }
        if let Some(slot) = chromosome
            .slots()
            .iter()
            .position(|s| s.len() != self.num_categories())
        {
            return Err(GeneticError::Domain(format!(
                "Slot {} has {} values, domain has {} categories",
                slot,
                chromosome.slots()[slot].len(),
                self.num_categories()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain::new(vec![
            AttributeCategory::new("color", ["red", "green", "blue"]),
            AttributeCategory::new("pet", ["cat", "dog", "fish"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_domain_rejects_duplicates() {
        let result = Domain::new(vec![AttributeCategory::new("color", ["red", "red"])]);
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_domain_rejects_mismatched_cardinality() {
        let result = Domain::new(vec![
            AttributeCategory::new("color", ["red", "green"]),
            AttributeCategory::new("pet", ["cat", "dog", "fish"]),
        ]);
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_domain_rejects_empty() {
        assert!(Domain::new(Vec::new()).is_err());
        let result = Domain::new(vec![AttributeCategory::new("color", Vec::<String>::new())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_domain_rejects_repeated_category_name() {
        let result = Domain::new(vec![
            AttributeCategory::new("color", ["red", "green"]),
            AttributeCategory::new("color", ["a", "b"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_random_chromosome_is_consistent() {
        let domain = domain();
        let mut rng = RandomNumberGenerator::from_seed(9);
        for _ in 0..50 {
            let chromosome = domain.random_chromosome(&mut rng).unwrap();
            assert_eq!(chromosome.num_slots(), 3);
            assert_eq!(chromosome.num_categories(), 2);
            assert!(domain.is_consistent(&chromosome));
        }
    }

    #[test]
    fn test_repair_replaces_duplicates_in_domain_order() {
        let domain = domain();
        // color column [2, 2, 2]: slots 1 and 2 are duplicates, missing values are 0 and 1
        let broken = Chromosome::from_slots(vec![vec![2, 0], vec![2, 1], vec![2, 2]]);
        let repaired = domain.repair(&broken).unwrap();

        assert_eq!(repaired.column(0), vec![2, 0, 1]);
        assert_eq!(repaired.column(1), vec![0, 1, 2]);
        assert!(domain.is_consistent(&repaired));
    }

    #[test]
    fn test_repair_handles_out_of_range_values() {
        let domain = domain();
        let broken = Chromosome::from_slots(vec![vec![7, 0], vec![1, 0], vec![0, 9]]);
        let repaired = domain.repair(&broken).unwrap();
        assert!(domain.is_consistent(&repaired));
        assert_eq!(repaired.column(0), vec![2, 1, 0]);
        assert_eq!(repaired.column(1), vec![0, 1, 2]);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let domain = domain();
        let broken = Chromosome::from_slots(vec![vec![1, 1], vec![1, 1], vec![0, 1]]);
        let once = domain.repair(&broken).unwrap();
        let twice = domain.repair(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_repair_rejects_wrong_shape() {
        let domain = domain();
        let wrong = Chromosome::from_slots(vec![vec![0, 0], vec![1, 1]]);
        assert!(matches!(domain.repair(&wrong), Err(GeneticError::Domain(_))));

        let wrong = Chromosome::from_slots(vec![vec![0], vec![1], vec![2]]);
        assert!(matches!(domain.repair(&wrong), Err(GeneticError::Domain(_))));
    }

    #[test]
    fn test_serialize_and_parse() {
        let domain = domain();
        let rows = vec![
            vec!["blue", "cat"],
            vec!["red", "fish"],
            vec!["green", "dog"],
        ];
        let chromosome = domain.chromosome_from_values(&rows).unwrap();
        assert!(domain.is_consistent(&chromosome));
        assert_eq!(domain.serialize(&chromosome), rows);
    }

    #[test]
    fn test_parse_unknown_value() {
        let domain = domain();
        let rows = vec![vec!["blue", "cow"], vec!["red", "fish"], vec!["green", "dog"]];
        assert!(domain.chromosome_from_values(&rows).is_err());
    }

    #[test]
    fn test_attribute_lookup_and_slot_of() {
        let domain = domain();
        let fish = domain.attribute("pet", "fish").unwrap();
        assert_eq!(fish, AttributeRef::new(1, 2));
        assert!(domain.attribute("pet", "cow").is_err());
        assert!(domain.attribute("drink", "tea").is_err());

        let chromosome = Chromosome::from_slots(vec![vec![0, 2], vec![1, 0], vec![2, 1]]);
        assert_eq!(chromosome.slot_of(fish), Some(0));
        assert!(chromosome.holds(0, fish));
        assert_eq!(domain.label(fish), "pet=fish");
    }

    #[test]
    fn test_swapped_leaves_original_untouched() {
        let original = Chromosome::from_slots(vec![vec![0, 0], vec![1, 1], vec![2, 2]]);
        let swapped = original.swapped(1, 0, 2);
        assert_eq!(original.column(1), vec![0, 1, 2]);
        assert_eq!(swapped.column(1), vec![2, 1, 0]);
        assert_eq!(swapped.column(0), vec![0, 1, 2]);
    }

    #[test]
    fn test_place_in_place() {
        let mut chromosome = Chromosome::from_slots(vec![vec![0, 0], vec![1, 1], vec![2, 2]]);
        chromosome.place_in_place(AttributeRef::new(0, 2), 0);
        assert_eq!(chromosome.column(0), vec![2, 1, 0]);
    }
}
