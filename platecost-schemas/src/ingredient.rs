use crate::measurement::Measurement;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Produce,
    Dairy,
    Meat,
    Dry,
    Beverage,
    Packaging,
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub vendor: Option<String>,
    pub sku: Option<String>,
    pub notes: Option<String>,
}

/// The current purchase snapshot of an ingredient: what was last paid for
/// how much. Later purchases overwrite it; averaging is the record store's
/// concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub price: f64,
    pub quantity: Measurement<f64>,
}

/// How the ingredient is sold to us, e.g. a 12-pack or a 5 kg sack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub quantity: f64,
    pub unit_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// A unique, machine-readable identifier (e.g., "ING-FLOUR-01").
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub category: IngredientCategory,
    pub purchase: Purchase,
    /// Pack size used by the "buy price / pack size" base price mode.
    pub presentation: Option<Presentation>,
    /// Number of servings one purchase produces, for items costed in yield mode.
    pub yield_count: Option<f64>,
    pub metadata: Option<Metadata>,
}
