use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostingError {
    #[error("Unit '{0}' is not registered in the conversion table")]
    UnknownUnit(String),

    #[error("Cannot convert between '{from}' and '{to}': they measure different dimensions")]
    DimensionMismatch { from: String, to: String },

    #[error("Unit '{symbol}' has an invalid conversion factor {factor}")]
    InvalidFactor { symbol: String, factor: f64 },

    #[error("Quantity {0} must be a finite, non-negative number")]
    InvalidQuantity(f64),

    #[error("Recipe '{0}' has no ingredients and cannot be finalized")]
    EmptyRecipe(String),

    #[error("Line {index} does not exist (recipe has {len} lines)")]
    LineIndexOutOfRange { index: usize, len: usize },

    #[error("Ingredient '{0}' not found in catalog")]
    IngredientNotFound(String),

    #[error("Recipe '{0}' not found in catalog")]
    RecipeNotFound(String),

    #[error("Ingredient '{0}' is used in yield mode but has no yield count")]
    MissingYield(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("YAML error for '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}
