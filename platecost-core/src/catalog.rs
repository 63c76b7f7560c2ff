use crate::{error::CostingError, units::UnitTable};
use platecost_schemas::{ingredient::Ingredient, recipe::Recipe};
use std::collections::HashMap;

/// The record store's contents as the engine sees them: units, ingredients
/// and recipes keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub units: UnitTable,
    pub ingredients: HashMap<String, Ingredient>,
    pub recipes: HashMap<String, Recipe>,
}

impl Catalog {
    pub fn new(units: UnitTable) -> Self {
        Self {
            units,
            ingredients: HashMap::new(),
            recipes: HashMap::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: impl IntoIterator<Item = Ingredient>) -> Self {
        for ingredient in ingredients {
            self.ingredients
                .insert(ingredient.ingredient_id.clone(), ingredient);
        }
        self
    }

    pub fn with_recipes(mut self, recipes: impl IntoIterator<Item = Recipe>) -> Self {
        for recipe in recipes {
            self.recipes.insert(recipe.recipe_id.clone(), recipe);
        }
        self
    }

    pub fn ingredient(&self, id: &str) -> Result<&Ingredient, CostingError> {
        self.ingredients
            .get(id)
            .ok_or_else(|| CostingError::IngredientNotFound(id.to_string()))
    }

    pub fn recipe(&self, id: &str) -> Result<&Recipe, CostingError> {
        self.recipes
            .get(id)
            .ok_or_else(|| CostingError::RecipeNotFound(id.to_string()))
    }

    /// Recipe ids in a stable order for reports.
    pub fn recipe_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
