//! # Reference instance
//!
//! The five-house puzzle: five houses in a row, each with a color, a resident
//! nationality, a drink, a brand of cigar and a pet. Its fifteen rules, in their
//! usual order, are
//!
//! 1. The Norwegian lives in the first house.
//! 2. The Brit lives in the red house.
//! 3. The Swede keeps dogs.
//! 4. The Dane drinks tea.
//! 5. The green house is immediately left of the white house.
//! 6. The green house's owner drinks coffee.
//! 7. The person who smokes Pall Mall rears birds.
//! 8. The owner of the yellow house smokes Dunhill.
//! 9. The man in the center house drinks milk.
//! 10. The man who smokes Blends lives next to the one who keeps cats.
//! 11. The man who keeps horses lives next to the one who smokes Dunhill.
//! 12. The owner who smokes BlueMaster drinks beer.
//! 13. The German smokes Prince.
//! 14. The Norwegian lives next to the blue house.
//! 15. The man who smokes Blends has a neighbour who drinks water.
//!
//! ```rust
//! use zebra_ga::instances::{zebra_constraints, zebra_domain};
//!
//! let domain = zebra_domain().unwrap();
//! let constraints = zebra_constraints(&domain).unwrap();
//! assert_eq!(constraints.len(), 15);
//! ```

use crate::constraints::{ConstraintSet, FixedSlot, ImmediatelyLeftOf, NextTo, SameSlot};
use crate::domain::{AttributeCategory, Domain};
use crate::error::Result;

pub const COLOR: &str = "color";
pub const NATIONALITY: &str = "nationality";
pub const DRINK: &str = "drink";
pub const SMOKE: &str = "smoke";
pub const PET: &str = "pet";

/// The five categories of the puzzle, five values each.
pub fn zebra_domain() -> Result<Domain> {
    Domain::new(vec![
        AttributeCategory::new(COLOR, ["Yellow", "Blue", "White", "Green", "Red"]),
        AttributeCategory::new(
            NATIONALITY,
            ["Norwegian", "Dane", "Brit", "Swede", "German"],
        ),
        AttributeCategory::new(DRINK, ["Water", "Tea", "Coffee", "Beer", "Milk"]),
        AttributeCategory::new(
            SMOKE,
            ["Dunhill", "Blends", "BlueMaster", "PallMall", "Prince"],
        ),
        AttributeCategory::new(PET, ["Cats", "Horses", "Birds", "Fish", "Dogs"]),
    ])
}

/// The fifteen rules, built against `domain`.
///
/// # Errors
///
/// Returns an error if `domain` lacks one of the categories or values the rules name.
pub fn zebra_constraints(domain: &Domain) -> Result<ConstraintSet> {
    let attr = |category: &str, value: &str| domain.attribute(category, value);

    ConstraintSet::builder()
        .with_constraint(FixedSlot::new(
            "The Norwegian lives in the first house",
            attr(NATIONALITY, "Norwegian")?,
            0,
        ))
        .with_constraint(SameSlot::new(
            "The Brit lives in the red house",
            attr(NATIONALITY, "Brit")?,
            attr(COLOR, "Red")?,
        ))
        .with_constraint(SameSlot::new(
            "The Swede keeps dogs",
            attr(NATIONALITY, "Swede")?,
            attr(PET, "Dogs")?,
        ))
        .with_constraint(SameSlot::new(
            "The Dane drinks tea",
            attr(NATIONALITY, "Dane")?,
            attr(DRINK, "Tea")?,
        ))
        .with_constraint(ImmediatelyLeftOf::new(
            "The green house is immediately left of the white house",
            attr(COLOR, "Green")?,
            attr(COLOR, "White")?,
        ))
        .with_constraint(SameSlot::new(
            "The green house's owner drinks coffee",
            attr(COLOR, "Green")?,
            attr(DRINK, "Coffee")?,
        ))
        .with_constraint(SameSlot::new(
            "The Pall Mall smoker rears birds",
            attr(SMOKE, "PallMall")?,
            attr(PET, "Birds")?,
        ))
        .with_constraint(SameSlot::new(
            "The owner of the yellow house smokes Dunhill",
            attr(COLOR, "Yellow")?,
            attr(SMOKE, "Dunhill")?,
        ))
        .with_constraint(FixedSlot::new(
            "The man in the center house drinks milk",
            attr(DRINK, "Milk")?,
            2,
        ))
        .with_constraint(NextTo::new(
            "The Blends smoker lives next to the cat owner",
            attr(SMOKE, "Blends")?,
            attr(PET, "Cats")?,
        ))
        .with_constraint(NextTo::new(
            "The horse owner lives next to the Dunhill smoker",
            attr(PET, "Horses")?,
            attr(SMOKE, "Dunhill")?,
        ))
        .with_constraint(SameSlot::new(
            "The BlueMaster smoker drinks beer",
            attr(SMOKE, "BlueMaster")?,
            attr(DRINK, "Beer")?,
        ))
        .with_constraint(SameSlot::new(
            "The German smokes Prince",
            attr(NATIONALITY, "German")?,
            attr(SMOKE, "Prince")?,
        ))
        .with_constraint(NextTo::new(
            "The Norwegian lives next to the blue house",
            attr(NATIONALITY, "Norwegian")?,
            attr(COLOR, "Blue")?,
        ))
        .with_constraint(NextTo::new(
            "The Blends smoker has a neighbour who drinks water",
            attr(SMOKE, "Blends")?,
            attr(DRINK, "Water")?,
        ))
        .build(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ShapeKind;

    // The unique solution, one row per house.
    const SOLUTION: [[&str; 5]; 5] = [
        ["Yellow", "Norwegian", "Water", "Dunhill", "Cats"],
        ["Blue", "Dane", "Tea", "Blends", "Horses"],
        ["Red", "Brit", "Milk", "PallMall", "Birds"],
        ["Green", "German", "Coffee", "Prince", "Fish"],
        ["White", "Swede", "Beer", "BlueMaster", "Dogs"],
    ];

    #[test]
    fn test_known_solution_satisfies_every_rule() {
        let domain = zebra_domain().unwrap();
        let constraints = zebra_constraints(&domain).unwrap();
        let rows: Vec<Vec<&str>> = SOLUTION.iter().map(|row| row.to_vec()).collect();
        let solution = domain.chromosome_from_values(&rows).unwrap();

        assert!(constraints.is_solution(&solution));
        assert_eq!(constraints.fitness(&solution), 15);
        assert_eq!(domain.serialize(&solution), rows);
    }

    #[test]
    fn test_rule_shapes() {
        let domain = zebra_domain().unwrap();
        let constraints = zebra_constraints(&domain).unwrap();
        let rows: Vec<Vec<&str>> = SOLUTION.iter().map(|row| row.to_vec()).collect();
        let report = constraints.report(&domain.chromosome_from_values(&rows).unwrap());

        let total = |kind| report.by_shape.get(&kind).map_or(0, |t| t.total);
        assert_eq!(total(ShapeKind::FixedSlot), 2);
        assert_eq!(total(ShapeKind::SameSlot), 8);
        assert_eq!(total(ShapeKind::PositionalPair), 1);
        assert_eq!(total(ShapeKind::Adjacency), 4);
        assert!(constraints.is_adjacency_sensitive(4));
        assert!(!constraints.is_adjacency_sensitive(1));
    }
}
