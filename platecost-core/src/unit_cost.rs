use crate::{error::CostingError, units::UnitTable};
use platecost_schemas::ingredient::Ingredient;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What was paid for one package or lot of an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub total_price: f64,
    pub total_quantity: f64,
    pub unit: String,
}

impl PurchaseRecord {
    pub fn new(total_price: f64, total_quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            total_price,
            total_quantity,
            unit: unit.into(),
        }
    }
}

impl From<&Ingredient> for PurchaseRecord {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            total_price: ingredient.purchase.price,
            total_quantity: ingredient.purchase.quantity.value,
            unit: ingredient.purchase.quantity.unit.clone(),
        }
    }
}

/// One purchase divided into equal servings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YieldSplit {
    pub cost_per_serving: f64,
    pub quantity_per_serving: f64,
}

pub(crate) fn usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Cost of using `use_qty` of `use_unit` out of the given purchase.
///
/// Returns 0 for incomplete input: a zero, negative or missing quantity or
/// price, an unknown unit, or units of different dimensions.
pub fn unit_cost(
    table: &UnitTable,
    purchase: &PurchaseRecord,
    use_qty: f64,
    use_unit: &str,
) -> f64 {
    if !usable(purchase.total_price) || !usable(purchase.total_quantity) || !usable(use_qty) {
        return 0.0;
    }
    match try_unit_cost(table, purchase, use_qty, use_unit) {
        Ok(cost) => cost,
        Err(CostingError::UnknownUnit(symbol)) => {
            warn!(unit = %symbol, "unknown unit, costing line at zero");
            0.0
        }
        Err(err) => {
            warn!(error = %err, "cannot cost line, costing it at zero");
            0.0
        }
    }
}

/// Strict variant of [`unit_cost`] for batch validation.
///
/// A zero price or zero usage still costs 0, but unknown units, mismatched
/// dimensions and negative or non-finite quantities are reported.
pub fn try_unit_cost(
    table: &UnitTable,
    purchase: &PurchaseRecord,
    use_qty: f64,
    use_unit: &str,
) -> Result<f64, CostingError> {
    for value in [purchase.total_price, purchase.total_quantity, use_qty] {
        if !value.is_finite() || value < 0.0 {
            return Err(CostingError::InvalidQuantity(value));
        }
    }

    let bought = table.kind_of(&purchase.unit)?;
    let used = table.kind_of(use_unit)?;
    if bought.dimension() != used.dimension() {
        return Err(CostingError::DimensionMismatch {
            from: purchase.unit.clone(),
            to: use_unit.to_string(),
        });
    }

    let bought_base = purchase.total_quantity * bought.base_factor();
    let use_base = use_qty * used.base_factor();
    if bought_base == 0.0 {
        return Ok(0.0);
    }
    Ok(purchase.total_price / bought_base * use_base)
}

/// Splits a purchase across `yield_count` servings without unit conversion,
/// e.g. a bag of 50 balloons.
pub fn yield_split(purchase_price: f64, purchase_quantity: f64, yield_count: f64) -> YieldSplit {
    if !usable(yield_count) {
        return YieldSplit::default();
    }
    YieldSplit {
        cost_per_serving: purchase_price / yield_count,
        quantity_per_serving: purchase_quantity / yield_count,
    }
}

/// Price of one unit of a pack: buy price divided by pack size.
pub fn base_price(buy_price: f64, presentation_quantity: f64) -> f64 {
    if !usable(presentation_quantity) {
        return 0.0;
    }
    buy_price / presentation_quantity
}

/// Base price of an ingredient that declares a pack presentation.
pub fn pack_base_price(ingredient: &Ingredient) -> Option<f64> {
    ingredient
        .presentation
        .as_ref()
        .map(|p| base_price(ingredient.purchase.price, p.quantity))
}
