//! Units and price normalization
//!
//! Every supported unit converts into one of three base units (kg, L, piece).
//! A normalized price is the price of one base unit, which makes different
//! package sizes directly comparable.

use serde::{Deserialize, Serialize};

/// Unit a weight/volume/count was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "ml")]
    Ml,
    #[serde(rename = "pcs")]
    Pcs,
}

/// Standard unit a normalized price is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseUnit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "pcs")]
    Pcs,
}

impl Unit {
    pub const ALL: [Unit; 5] = [Unit::Kg, Unit::G, Unit::L, Unit::Ml, Unit::Pcs];

    /// Parse a user-entered unit. Case-insensitive, with common spellings.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(Unit::Kg),
            "g" | "gram" | "grams" => Some(Unit::G),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(Unit::L),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(Unit::Ml),
            "pcs" | "pc" | "piece" | "pieces" | "each" => Some(Unit::Pcs),
            _ => None,
        }
    }

    /// Canonical string, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "L",
            Unit::Ml => "ml",
            Unit::Pcs => "pcs",
        }
    }

    /// Multiplier converting a quantity in this unit to its base unit
    pub fn conversion_factor(&self) -> f64 {
        match self {
            Unit::G | Unit::Ml => 0.001,
            Unit::Kg | Unit::L | Unit::Pcs => 1.0,
        }
    }

    pub fn base_unit(&self) -> BaseUnit {
        match self {
            Unit::Kg | Unit::G => BaseUnit::Kg,
            Unit::L | Unit::Ml => BaseUnit::L,
            Unit::Pcs => BaseUnit::Pcs,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BaseUnit {
    /// Display label ("kg", "L", "pcs")
    pub fn label(&self) -> &'static str {
        match self {
            BaseUnit::Kg => "kg",
            BaseUnit::L => "L",
            BaseUnit::Pcs => "pcs",
        }
    }
}

impl std::fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Price per base unit.
///
/// Returns `0.0` when the quantity in base units is not positive. That value is
/// a sentinel for "no meaningful price", not a real price.
pub fn normalize(price: f64, weight: f64, unit: Unit) -> f64 {
    let base_weight = weight * unit.conversion_factor();
    if base_weight > 0.0 {
        price / base_weight
    } else {
        0.0
    }
}

/// Display label of the base unit for a unit string, if the unit is known
pub fn base_unit_label(unit: &str) -> Option<&'static str> {
    Unit::from_str(unit).map(|u| u.base_unit().label())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalize_kilograms() {
        assert!(approx(normalize(10.0, 2.0, Unit::Kg), 5.0));
    }

    #[test]
    fn test_normalize_grams() {
        // 500 g = 0.5 kg
        assert!(approx(normalize(10.0, 500.0, Unit::G), 20.0));
    }

    #[test]
    fn test_normalize_millilitres() {
        assert!(approx(normalize(5.0, 1000.0, Unit::Ml), 5.0));
    }

    #[test]
    fn test_normalize_pieces() {
        assert!(approx(normalize(3.0, 6.0, Unit::Pcs), 0.5));
    }

    #[test]
    fn test_normalize_zero_weight_is_sentinel() {
        assert_eq!(normalize(10.0, 0.0, Unit::Kg), 0.0);
        assert_eq!(normalize(10.0, -2.0, Unit::G), 0.0);
    }

    #[test]
    fn test_unit_grouping() {
        assert_eq!(base_unit_label("g"), Some("kg"));
        assert_eq!(base_unit_label("kg"), Some("kg"));
        assert_eq!(base_unit_label("ml"), Some("L"));
        assert_eq!(base_unit_label("L"), Some("L"));
        assert_eq!(base_unit_label("pcs"), Some("pcs"));
        assert_eq!(base_unit_label("oz"), None);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!(Unit::from_str("KG"), Some(Unit::Kg));
        assert_eq!(Unit::from_str(" l "), Some(Unit::L));
        assert_eq!(Unit::from_str("litre"), Some(Unit::L));
        assert_eq!(Unit::from_str("piece"), Some(Unit::Pcs));
        assert_eq!(Unit::from_str("cup"), None);
    }

    #[test]
    fn test_as_str_round_trips() {
        for unit in Unit::ALL {
            assert_eq!(Unit::from_str(unit.as_str()), Some(unit));
        }
    }
}
