use anyhow::{Context, Result};
use platecost_core::{catalog::Catalog, units::UnitTable};
use platecost_schemas::{
    file_formats::{IngredientFile, RecipeFile, SessionFile, UnitFile},
    ingredient::Ingredient,
    pricing::Settings,
    recipe::Recipe,
    unit::UnitDefinition,
};
use std::{collections::HashMap, fs, path::Path};
use tracing::{info, warn};

pub const UNITS_DIR: &str = "1_units";
pub const INGREDIENTS_DIR: &str = "2_ingredients";
pub const RECIPES_DIR: &str = "3_recipes";
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Loads the catalog from a directory laid out as
/// `1_units/`, `2_ingredients/`, `3_recipes/`.
///
/// The units directory is optional; without it only the built-in units exist.
pub fn load_catalog(base_path: &Path) -> Result<Catalog> {
    info!(path = %base_path.display(), "loading catalog");

    let units_dir = base_path.join(UNITS_DIR);
    let unit_defs: Vec<UnitDefinition> = if units_dir.is_dir() {
        load_yaml_files_into_map(
            &units_dir,
            |file: UnitFile| file.units,
            |item: &UnitDefinition| item.symbol.clone(),
        )?
        .into_values()
        .collect()
    } else {
        Vec::new()
    };
    let units = UnitTable::with_definitions(&unit_defs)
        .context("Invalid unit definition in catalog")?;

    let ingredients = load_yaml_files_into_map(
        base_path.join(INGREDIENTS_DIR),
        |file: IngredientFile| file.ingredients,
        |item: &Ingredient| item.ingredient_id.clone(),
    )?;
    let recipes = load_yaml_files_into_map(
        base_path.join(RECIPES_DIR),
        |file: RecipeFile| file.recipes,
        |item: &Recipe| item.recipe_id.clone(),
    )?;

    info!(
        units = units.len(),
        ingredients = ingredients.len(),
        recipes = recipes.len(),
        "catalog loaded"
    );
    Ok(Catalog {
        units,
        ingredients,
        recipes,
    })
}

/// Reads pricing and currency settings. An explicit path must exist; the
/// implicit `settings.yaml` in the catalog falls back to defaults.
pub fn load_settings(explicit: Option<&Path>, catalog_path: &Path) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let implicit = catalog_path.join(SETTINGS_FILE);
            if !implicit.is_file() {
                warn!(path = %implicit.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            implicit
        }
    };
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
}

pub fn load_session(path: &Path) -> Result<SessionFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {:?}", path))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
}

/// Generic helper to load all YAML files in a directory into a HashMap.
fn load_yaml_files_into_map<P, F, E, T, K>(
    dir_path: P,
    extract_vec: E,
    get_key: K,
) -> Result<HashMap<String, T>>
where
    P: AsRef<Path>,
    F: for<'de> serde::Deserialize<'de>, // The file wrapper struct (e.g., IngredientFile)
    E: Fn(F) -> Vec<T>,                  // Extracts the Vec<T> from the wrapper
    K: Fn(&T) -> String,                 // Key for the map from an item T
{
    let mut map = HashMap::new();
    for entry in fs::read_dir(dir_path.as_ref())
        .with_context(|| format!("Failed to read directory: {:?}", dir_path.as_ref()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |s| s == "yaml" || s == "yml") {
            let content = fs::read_to_string(&path)?;
            let file_wrapper: F = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML from {:?}", path))?;

            for item in extract_vec(file_wrapper) {
                let key = get_key(&item);
                if map.insert(key.clone(), item).is_some() {
                    warn!(key = %key, file = %path.display(), "duplicate catalog entry, keeping the last one");
                }
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Writes a small catalog: flour, milk, a box sold in fifties and a
    /// brownie recipe using all three.
    pub(crate) fn write_catalog(root: &Path) -> PathBuf {
        let base = root.join("catalog");
        for dir in [UNITS_DIR, INGREDIENTS_DIR, RECIPES_DIR] {
            fs::create_dir_all(base.join(dir)).unwrap();
        }
        fs::write(
            base.join(UNITS_DIR).join("local.yaml"),
            r#"
schema_version: "1.0"
units:
  - symbol: arroba
    dimension: mass
    base_factor: 12500
    description: Traditional sack weight
"#,
        )
        .unwrap();
        fs::write(
            base.join(INGREDIENTS_DIR).join("pantry.yaml"),
            r#"
schema_version: "1.0"
ingredients:
  - ingredient_id: ING-FLOUR
    ingredient_name: Wheat flour
    category: dry
    purchase: { price: 3000, quantity: { value: 1, unit: kg } }
    presentation: null
    yield_count: null
    metadata: { vendor: Molino, sku: null, notes: null }
  - ingredient_id: ING-MILK
    ingredient_name: Whole milk
    category: dairy
    purchase: { price: 4000, quantity: { value: 1, unit: l } }
    presentation: { quantity: 1, unit_code: carton }
    yield_count: null
    metadata: null
  - ingredient_id: ING-BOX
    ingredient_name: Takeaway box
    category: packaging
    purchase: { price: 5000, quantity: { value: 50, unit: und } }
    presentation: { quantity: 50, unit_code: und }
    yield_count: 50
    metadata: null
"#,
        )
        .unwrap();
        fs::write(
            base.join(RECIPES_DIR).join("bakery.yaml"),
            r#"
schema_version: "1.0"
recipes:
  - recipe_id: REC-BROWNIE
    recipe_name: Brownie
    lines:
      - ingredient_ref: ING-FLOUR
        usage: { type: measured, quantity: 250, unit: g }
      - ingredient_ref: ING-MILK
        usage: { type: measured, quantity: 500, unit: ml }
      - ingredient_ref: ING-BOX
        usage: { type: servings }
  - recipe_id: REC-EMPTY
    recipe_name: Placeholder
"#,
        )
        .unwrap();
        base
    }

    #[test]
    fn loads_every_catalog_section() {
        let dir = tempfile::tempdir().unwrap();
        let base = write_catalog(dir.path());
        let catalog = load_catalog(&base).unwrap();

        assert_eq!(catalog.ingredients.len(), 3);
        assert_eq!(catalog.recipes.len(), 2);
        assert_eq!(catalog.units.factor_of("arroba").unwrap(), 12500.0);
        assert_eq!(catalog.recipe("REC-BROWNIE").unwrap().lines.len(), 3);
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(None, dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(load_settings(Some(&dir.path().join("nope.yaml")), dir.path()).is_err());
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "pricing:\n  safety_margin_pct: 5\n  rounding_step: 100\ncurrency:\n  symbol: COP$\n",
        )
        .unwrap();
        let settings = load_settings(None, dir.path()).unwrap();
        assert_eq!(settings.pricing.safety_margin_pct, 5.0);
        assert_eq!(settings.pricing.rounding_step, 100.0);
        assert_eq!(settings.pricing.default_profit_margin_pct, 30.0);
        assert_eq!(settings.currency.symbol, "COP$");
        assert_eq!(settings.currency.thousands_separator, ",");
    }
}
