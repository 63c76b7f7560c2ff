use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a recipe line consumes its ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineUsage {
    /// A measured quantity, converted through the unit table.
    Measured { quantity: f64, unit: String },
    /// A share of one purchase that is split into `yield_count` servings.
    /// Falls back to the ingredient's own yield count when absent.
    Servings {
        #[serde(default)]
        yield_count: Option<f64>,
        #[serde(default = "one")]
        servings: f64,
    },
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecipeLine {
    pub ingredient_ref: String,
    pub usage: LineUsage,
    /// The line cost at the time the recipe was last saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_snapshot: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Recipe {
    pub recipe_id: String,
    pub recipe_name: String,
    #[serde(default)]
    pub lines: Vec<RecipeLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_margin_pct: Option<f64>,
    /// Set when `sale_price` was fixed by hand; reopening keeps that price
    /// instead of re-deriving it from the margin.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub price_fixed: bool,
    /// Columns the record store keeps that the engine passes through untouched.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, serde_json::Value>,
}
