use serde::{Deserialize, Serialize};

/// The physical dimension a unit measures. Quantities are only ever compared
/// within the same dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

/// A catalog-supplied unit, extending the built-in conversion table.
///
/// `base_factor` converts one of this unit into grams (mass), milliliters
/// (volume) or single items (count). Count units must use a factor of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub symbol: String,
    pub dimension: Dimension,
    pub base_factor: f64,
    pub description: Option<String>,
}
