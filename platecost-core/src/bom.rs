use crate::{
    error::CostingError,
    unit_cost::{self, PurchaseRecord},
    units::UnitTable,
};
use platecost_schemas::{
    ingredient::Ingredient,
    recipe::{LineUsage, Recipe, RecipeLine},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// How a line consumes its purchase, with every reference resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Usage {
    Measured { quantity: f64, unit: String },
    Servings { yield_count: f64, servings: f64 },
}

/// One ingredient's consumption inside a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageLine {
    pub ingredient_ref: String,
    pub usage: Usage,
    pub purchase: PurchaseRecord,
}

impl UsageLine {
    pub fn measured(
        ingredient_ref: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        purchase: PurchaseRecord,
    ) -> Self {
        Self {
            ingredient_ref: ingredient_ref.into(),
            usage: Usage::Measured {
                quantity,
                unit: unit.into(),
            },
            purchase,
        }
    }

    pub fn servings(
        ingredient_ref: impl Into<String>,
        yield_count: f64,
        servings: f64,
        purchase: PurchaseRecord,
    ) -> Self {
        Self {
            ingredient_ref: ingredient_ref.into(),
            usage: Usage::Servings {
                yield_count,
                servings,
            },
            purchase,
        }
    }

    /// Resolves a record-store line against its ingredient.
    pub fn resolve(line: &RecipeLine, ingredient: &Ingredient) -> Result<Self, CostingError> {
        let usage = match &line.usage {
            LineUsage::Measured { quantity, unit } => Usage::Measured {
                quantity: *quantity,
                unit: unit.clone(),
            },
            LineUsage::Servings {
                yield_count,
                servings,
            } => Usage::Servings {
                yield_count: yield_count
                    .or(ingredient.yield_count)
                    .ok_or_else(|| CostingError::MissingYield(ingredient.ingredient_id.clone()))?,
                servings: *servings,
            },
        };
        Ok(Self {
            ingredient_ref: line.ingredient_ref.clone(),
            usage,
            purchase: PurchaseRecord::from(ingredient),
        })
    }

    pub fn line_cost(&self, table: &UnitTable) -> f64 {
        match &self.usage {
            Usage::Measured { quantity, unit } => {
                unit_cost::unit_cost(table, &self.purchase, *quantity, unit)
            }
            Usage::Servings {
                yield_count,
                servings,
            } => {
                let inputs = [self.purchase.total_price, *yield_count, *servings];
                if inputs.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    warn!(
                        ingredient = %self.ingredient_ref,
                        yield_count = *yield_count,
                        servings = *servings,
                        "invalid servings line, costing it at zero"
                    );
                    return 0.0;
                }
                if !inputs.into_iter().all(unit_cost::usable) {
                    return 0.0;
                }
                let split = unit_cost::yield_split(
                    self.purchase.total_price,
                    self.purchase.total_quantity,
                    *yield_count,
                );
                split.cost_per_serving * servings
            }
        }
    }

    fn to_record(&self, cost_snapshot: f64) -> RecipeLine {
        let usage = match &self.usage {
            Usage::Measured { quantity, unit } => LineUsage::Measured {
                quantity: *quantity,
                unit: unit.clone(),
            },
            Usage::Servings {
                yield_count,
                servings,
            } => LineUsage::Servings {
                yield_count: Some(*yield_count),
                servings: *servings,
            },
        };
        RecipeLine {
            ingredient_ref: self.ingredient_ref.clone(),
            usage,
            cost_snapshot: Some(cost_snapshot),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CostedLine {
    pub line: UsageLine,
    pub line_cost: f64,
}

/// The ingredient list of a recipe under construction.
///
/// Line costs are fixed when a line enters the list; the total is summed
/// on every call to [`BillOfMaterials::total_cost`].
#[derive(Debug, Clone, Default)]
pub struct BillOfMaterials {
    pub name: String,
    lines: Vec<CostedLine>,
}

impl BillOfMaterials {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Builds the bill of materials for a stored recipe, looking every line's
    /// ingredient up in the catalog.
    pub fn from_recipe(
        recipe: &Recipe,
        ingredients: &HashMap<String, Ingredient>,
        table: &UnitTable,
    ) -> Result<Self, CostingError> {
        let lines = recipe
            .lines
            .iter()
            .map(|line| {
                let ingredient = ingredients
                    .get(&line.ingredient_ref)
                    .ok_or_else(|| CostingError::IngredientNotFound(line.ingredient_ref.clone()))?;
                UsageLine::resolve(line, ingredient)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut bom = Self::new(recipe.recipe_name.clone());
        bom.replace_lines(lines, table);
        Ok(bom)
    }

    /// Appends a line and returns its cost.
    pub fn add_line(&mut self, line: UsageLine, table: &UnitTable) -> f64 {
        let line_cost = line.line_cost(table);
        debug!(recipe = %self.name, ingredient = %line.ingredient_ref, line_cost, "line added");
        self.lines.push(CostedLine { line, line_cost });
        line_cost
    }

    pub fn remove_line(&mut self, index: usize) -> Result<CostedLine, CostingError> {
        if index >= self.lines.len() {
            return Err(CostingError::LineIndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        let removed = self.lines.remove(index);
        debug!(recipe = %self.name, ingredient = %removed.line.ingredient_ref, "line removed");
        Ok(removed)
    }

    /// Discards the current list and costs `lines` from scratch.
    pub fn replace_lines(&mut self, lines: Vec<UsageLine>, table: &UnitTable) {
        self.lines = lines
            .into_iter()
            .map(|line| {
                let line_cost = line.line_cost(table);
                CostedLine { line, line_cost }
            })
            .collect();
    }

    pub fn lines(&self) -> &[CostedLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.lines.iter().map(|l| l.line_cost).sum()
    }

    pub fn is_finalizable(&self) -> bool {
        !self.lines.is_empty()
    }

    /// A recipe without ingredients must not be saved as final.
    pub fn ensure_finalizable(&self) -> Result<(), CostingError> {
        if self.is_finalizable() {
            Ok(())
        } else {
            Err(CostingError::EmptyRecipe(self.name.clone()))
        }
    }

    /// Line records with `cost_snapshot` filled in, ready to be written back.
    pub fn to_recipe_lines(&self) -> Vec<RecipeLine> {
        self.lines
            .iter()
            .map(|l| l.line.to_record(l.line_cost))
            .collect()
    }
}
