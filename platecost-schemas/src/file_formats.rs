use crate::{command::Command, ingredient::Ingredient, recipe::Recipe, unit::UnitDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UnitFile {
    pub schema_version: String,
    pub units: Vec<UnitDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientFile {
    pub schema_version: String,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeFile {
    pub schema_version: String,
    pub recipes: Vec<Recipe>,
}

/// A scripted pricing session: a recipe to open and the edits to replay on it.
#[derive(Debug, Deserialize)]
pub struct SessionFile {
    pub schema_version: String,
    pub recipe_id: String,
    #[serde(default)]
    pub commands: Vec<Command>,
}
