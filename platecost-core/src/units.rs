//! The unit conversion table.
//!
//! Every unit converts into exactly one base dimension: grams for mass,
//! milliliters for volume, single items for count. Conversions never cross
//! dimensions.

use crate::error::CostingError;
use platecost_schemas::unit::{Dimension, UnitDefinition};
use std::collections::HashMap;
use tracing::debug;

/// A unit, tagged by the dimension it measures. The factor converts one of
/// this unit into the dimension's base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Mass(f64),
    Volume(f64),
    Count,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Mass(_) => Dimension::Mass,
            Unit::Volume(_) => Dimension::Volume,
            Unit::Count => Dimension::Count,
        }
    }

    pub fn base_factor(&self) -> f64 {
        match self {
            Unit::Mass(factor) | Unit::Volume(factor) => *factor,
            Unit::Count => 1.0,
        }
    }
}

const STANDARD_UNITS: &[(&str, Unit)] = &[
    ("mg", Unit::Mass(0.001)),
    ("g", Unit::Mass(1.0)),
    ("gr", Unit::Mass(1.0)),
    ("kg", Unit::Mass(1000.0)),
    ("oz", Unit::Mass(28.3495)),
    ("lb", Unit::Mass(453.592)),
    ("ml", Unit::Volume(1.0)),
    ("cl", Unit::Volume(10.0)),
    ("dl", Unit::Volume(100.0)),
    ("l", Unit::Volume(1000.0)),
    ("lt", Unit::Volume(1000.0)),
    ("tsp", Unit::Volume(4.92892)),
    ("tbsp", Unit::Volume(14.7868)),
    ("cup", Unit::Volume(236.588)),
    ("gal", Unit::Volume(3785.41)),
    ("und", Unit::Count),
    ("unit", Unit::Count),
    ("u", Unit::Count),
    ("pc", Unit::Count),
];

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct UnitTable {
    units: HashMap<String, Unit>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl UnitTable {
    /// A table holding no units at all.
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// The built-in kitchen units: metric and US mass/volume plus item counts.
    pub fn standard() -> Self {
        let units = STANDARD_UNITS
            .iter()
            .map(|(symbol, unit)| (symbol.to_string(), *unit))
            .collect();
        Self { units }
    }

    /// The standard table extended (or overridden) by catalog definitions.
    pub fn with_definitions(defs: &[UnitDefinition]) -> Result<Self, CostingError> {
        let mut table = Self::standard();
        for def in defs {
            let unit = match def.dimension {
                Dimension::Mass => Unit::Mass(def.base_factor),
                Dimension::Volume => Unit::Volume(def.base_factor),
                Dimension::Count if def.base_factor == 1.0 => Unit::Count,
                Dimension::Count => {
                    return Err(CostingError::InvalidFactor {
                        symbol: def.symbol.clone(),
                        factor: def.base_factor,
                    })
                }
            };
            table.register(&def.symbol, unit)?;
        }
        Ok(table)
    }

    pub fn register(&mut self, symbol: &str, unit: Unit) -> Result<(), CostingError> {
        let factor = unit.base_factor();
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CostingError::InvalidFactor {
                symbol: symbol.to_string(),
                factor,
            });
        }
        let key = normalize(symbol);
        if key.is_empty() {
            return Err(CostingError::UnknownUnit(symbol.to_string()));
        }
        debug!(symbol = %key, ?unit, "registering unit");
        self.units.insert(key, unit);
        Ok(())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.units.contains_key(&normalize(symbol))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn kind_of(&self, symbol: &str) -> Result<Unit, CostingError> {
        self.units
            .get(&normalize(symbol))
            .copied()
            .ok_or_else(|| CostingError::UnknownUnit(symbol.to_string()))
    }

    pub fn factor_of(&self, symbol: &str) -> Result<f64, CostingError> {
        self.kind_of(symbol).map(|unit| unit.base_factor())
    }

    pub fn to_base(&self, quantity: f64, symbol: &str) -> Result<f64, CostingError> {
        Ok(quantity * self.factor_of(symbol)?)
    }

    /// Converts `quantity` from one unit to another of the same dimension.
    pub fn convert(&self, quantity: f64, from: &str, to: &str) -> Result<f64, CostingError> {
        let from_unit = self.kind_of(from)?;
        let to_unit = self.kind_of(to)?;
        if from_unit.dimension() != to_unit.dimension() {
            return Err(CostingError::DimensionMismatch {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(quantity * from_unit.base_factor() / to_unit.base_factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_factors() {
        let table = UnitTable::standard();
        assert_eq!(table.factor_of("g").unwrap(), 1.0);
        assert_eq!(table.factor_of("kg").unwrap(), 1000.0);
        assert_eq!(table.factor_of("l").unwrap(), 1000.0);
        assert_eq!(table.factor_of("und").unwrap(), 1.0);
        assert_eq!(table.kind_of("ml").unwrap().dimension(), Dimension::Volume);
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table = UnitTable::standard();
        assert_eq!(table.factor_of(" KG ").unwrap(), 1000.0);
        assert!(table.contains("Lb"));
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let table = UnitTable::standard();
        match table.factor_of("bushel") {
            Err(CostingError::UnknownUnit(symbol)) => assert_eq!(symbol, "bushel"),
            other => panic!("expected UnknownUnit, got {:?}", other),
        }
    }

    #[test]
    fn convert_within_dimension() {
        let table = UnitTable::standard();
        assert_eq!(table.convert(2.5, "kg", "g").unwrap(), 2500.0);
        assert_eq!(table.convert(500.0, "ml", "l").unwrap(), 0.5);
    }

    #[test]
    fn convert_across_dimensions_is_rejected() {
        let table = UnitTable::standard();
        assert!(matches!(
            table.convert(1.0, "g", "l"),
            Err(CostingError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            table.convert(1.0, "und", "kg"),
            Err(CostingError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn register_rejects_non_positive_factors() {
        let mut table = UnitTable::empty();
        assert!(table.register("pinch", Unit::Mass(0.0)).is_err());
        assert!(table.register("pinch", Unit::Mass(f64::NAN)).is_err());
        assert!(table.is_empty());
        table.register("pinch", Unit::Mass(0.36)).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn catalog_definitions_extend_the_standard_table() {
        let defs = vec![
            UnitDefinition {
                symbol: "arroba".to_string(),
                dimension: Dimension::Mass,
                base_factor: 12500.0,
                description: None,
            },
            UnitDefinition {
                symbol: "botella".to_string(),
                dimension: Dimension::Volume,
                base_factor: 750.0,
                description: Some("wine bottle".to_string()),
            },
        ];
        let table = UnitTable::with_definitions(&defs).unwrap();
        assert_eq!(table.convert(1.0, "arroba", "kg").unwrap(), 12.5);
        assert_eq!(table.factor_of("botella").unwrap(), 750.0);
        assert!(table.contains("g"));
    }

    #[test]
    fn count_definitions_must_use_unit_factor() {
        let defs = vec![UnitDefinition {
            symbol: "dozen".to_string(),
            dimension: Dimension::Count,
            base_factor: 12.0,
            description: None,
        }];
        assert!(matches!(
            UnitTable::with_definitions(&defs),
            Err(CostingError::InvalidFactor { .. })
        ));
    }
}
