use crate::currency::format_currency;
use crate::plotting;
use anyhow::{Context, Result};
use platecost_core::{
    bom::Usage,
    catalog::Catalog,
    ledger::{self, CostLedger},
    pricing::{PriceQuote, PricingConfig, PricingMode},
    unit_cost::{self, PurchaseRecord},
    worksheet::CostingWorksheet,
};
use platecost_schemas::{
    command::Command,
    file_formats::{RecipeFile, SessionFile},
    pricing::{CurrencyFormat, Settings},
    recipe::Recipe,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const SCHEMA_VERSION: &str = "1.0";

/// Overrides for a single `price` run, applied in the order a user would:
/// rounding first, then either a margin or a fixed price.
#[derive(Debug, Default, Clone)]
pub struct PriceOverrides {
    pub margin_pct: Option<f64>,
    pub fixed_price: Option<f64>,
    pub rounding_step: Option<f64>,
    pub safety_margin_pct: Option<f64>,
}

impl PriceOverrides {
    fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(pct) = self.safety_margin_pct {
            commands.push(Command::SetSafetyMargin { pct });
        }
        if let Some(step) = self.rounding_step {
            commands.push(Command::SetRoundingStep { step });
        }
        if let Some(pct) = self.margin_pct {
            commands.push(Command::SetProfitMargin { pct });
        }
        if let Some(price) = self.fixed_price {
            commands.push(Command::FixSalePrice { price });
        }
        commands
    }
}

/// Prints the cost of one usage of a purchase, both leniently and strictly.
pub fn run_unit_cost(
    catalog: &Catalog,
    purchase: &PurchaseRecord,
    use_qty: f64,
    use_unit: &str,
    currency: &CurrencyFormat,
) -> Result<f64> {
    let cost = unit_cost::unit_cost(&catalog.units, purchase, use_qty, use_unit);
    println!(
        "Using {} {} of {} {} bought for {} costs {}",
        use_qty,
        use_unit,
        purchase.total_quantity,
        purchase.unit,
        format_currency(purchase.total_price, currency),
        format_currency(cost, currency)
    );
    if let Err(err) = unit_cost::try_unit_cost(&catalog.units, purchase, use_qty, use_unit) {
        println!("  Warning: {}", err);
    }
    Ok(cost)
}

/// Costs a stored recipe and prints its bill of materials.
pub fn run_cost(catalog: &Catalog, recipe_id: &str, settings: &Settings) -> Result<f64> {
    let sheet = CostingWorksheet::open(catalog, recipe_id, PricingConfig::from(&settings.pricing))?;
    print_bill(&sheet, catalog, &settings.currency);
    if !sheet.bom().is_finalizable() {
        println!("  (no ingredients: this recipe cannot be finalized)");
    }
    for costed in sheet.bom().lines() {
        let Ok(ingredient) = catalog.ingredient(&costed.line.ingredient_ref) else {
            continue;
        };
        if let (Some(base), Some(pack)) = (unit_cost::pack_base_price(ingredient), &ingredient.presentation) {
            println!(
                "  {} per {}: {}",
                ingredient.ingredient_name,
                pack.unit_code,
                format_currency(base, &settings.currency)
            );
        }
    }
    Ok(sheet.bom().total_cost())
}

/// Prices a stored recipe, optionally writing the finalized record back.
pub fn run_price(
    catalog: &Catalog,
    recipe_id: &str,
    settings: &Settings,
    overrides: &PriceOverrides,
    write_back: Option<&Path>,
) -> Result<PriceQuote> {
    let mut sheet =
        CostingWorksheet::open(catalog, recipe_id, PricingConfig::from(&settings.pricing))?;
    sheet.apply_all(&overrides.commands())?;
    finish(&sheet, catalog, settings, write_back)
}

/// Replays a scripted session against a stored recipe.
pub fn run_session(
    catalog: &Catalog,
    session: &SessionFile,
    settings: &Settings,
    write_back: Option<&Path>,
) -> Result<PriceQuote> {
    let mut sheet = CostingWorksheet::open(
        catalog,
        &session.recipe_id,
        PricingConfig::from(&settings.pricing),
    )?;
    for (step, command) in session.commands.iter().enumerate() {
        sheet
            .apply(command)
            .with_context(|| format!("Session step {} ({:?}) failed", step + 1, command))?;
    }
    info!(recipe = %session.recipe_id, steps = session.commands.len(), "session replayed");
    finish(&sheet, catalog, settings, write_back)
}

fn finish(
    sheet: &CostingWorksheet<'_>,
    catalog: &Catalog,
    settings: &Settings,
    write_back: Option<&Path>,
) -> Result<PriceQuote> {
    let quote = sheet.quote();
    print_bill(sheet, catalog, &settings.currency);
    print_quote(&quote, &settings.currency);

    if let Some(path) = write_back {
        let record = sheet
            .finalize()
            .with_context(|| format!("Cannot save recipe '{}'", sheet.recipe_id()))?;
        write_recipes(path, vec![record])?;
        println!("\nSaved finalized recipe to '{}'", path.display());
    }
    Ok(quote)
}

fn write_recipes(path: &Path, recipes: Vec<Recipe>) -> Result<()> {
    let file = RecipeFile {
        schema_version: SCHEMA_VERSION.to_string(),
        recipes,
    };
    ledger::write_recipe_file(path, &file)?;
    Ok(())
}

/// Costs and prices every recipe in the catalog into a timestamped run
/// directory: a ledger CSV, finalized recipes, a markdown summary and charts.
pub fn run_report(catalog: &Catalog, settings: &Settings, output_root: &Path) -> Result<PathBuf> {
    let output_dir = output_root.join(format!(
        "report_{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let ledger_path = output_dir.join("ledger.csv");
    let ledger_str = ledger_path
        .to_str()
        .context("Output path is not valid UTF-8")?;
    let mut ledger = CostLedger::create(ledger_str)?;

    let config = PricingConfig::from(&settings.pricing);
    let mut finalized = Vec::new();
    let mut rows = Vec::new();
    for recipe_id in catalog.recipe_ids() {
        let finalized_sheet = CostingWorksheet::open(catalog, recipe_id, config)
            .and_then(|sheet| sheet.finalize().map(|record| (sheet, record)));
        match finalized_sheet {
            Ok((sheet, record)) => {
                let quote = sheet.quote();
                ledger.record(recipe_id, sheet.bom(), &quote)?;
                rows.push((record.recipe_name.clone(), quote));
                finalized.push(record);
            }
            Err(err) => warn!(recipe = %recipe_id, error = %err, "skipping recipe"),
        }
    }

    write_recipes(&output_dir.join("recipes_priced.yaml"), finalized)?;
    fs::write(
        output_dir.join("pricing_report.md"),
        generate_pricing_table(&rows, &settings.currency),
    )?;
    if let Err(err) = plotting::plot_cost_breakdowns(&output_dir, &ledger_path) {
        warn!(error = %err, "cost charts were not rendered");
    }

    println!("\nPriced {} recipes. Results are in '{}'", rows.len(), output_dir.display());
    Ok(output_dir)
}

fn generate_pricing_table(rows: &[(String, PriceQuote)], currency: &CurrencyFormat) -> String {
    let mut table = String::from("| Recipe | Cost | Sale Price | Profit | Margin |\n");
    table.push_str("|--------|------|------------|--------|--------|\n");
    for (name, quote) in rows {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {:.0}% |\n",
            name,
            format_currency(quote.total_cost, currency),
            format_currency(quote.sale_price, currency),
            format_currency(quote.profit, currency),
            quote.profit_margin_pct
        ));
    }
    table
}

fn print_bill(sheet: &CostingWorksheet<'_>, catalog: &Catalog, currency: &CurrencyFormat) {
    let bom = sheet.bom();
    println!("\n--- [Bill of Materials] {} ---", bom.name);
    for (i, costed) in bom.lines().iter().enumerate() {
        let name = catalog
            .ingredients
            .get(&costed.line.ingredient_ref)
            .map_or(costed.line.ingredient_ref.as_str(), |ingredient| ingredient.ingredient_name.as_str());
        let usage = match &costed.line.usage {
            Usage::Measured { quantity, unit } => format!("{} {}", quantity, unit),
            Usage::Servings {
                yield_count,
                servings,
            } => format!("{} of {} servings", servings, yield_count),
        };
        println!(
            "  {:>2}. {:<24} {:>18} {:>14}",
            i + 1,
            name,
            usage,
            format_currency(costed.line_cost, currency)
        );
    }
    println!("  Total Cost: {}", format_currency(bom.total_cost(), currency));
}

fn print_quote(quote: &PriceQuote, currency: &CurrencyFormat) {
    println!("\n--- [Pricing] ---");
    match quote.mode {
        PricingMode::MarginDriven { margin_pct } => {
            println!("  Mode:            margin-driven ({:.1}%)", margin_pct)
        }
        PricingMode::PriceDriven { price } => {
            println!("  Mode:            fixed price ({})", format_currency(price, currency))
        }
    }
    println!("  Effective Cost:  {}", format_currency(quote.effective_cost, currency));
    println!("  Sale Price:      {}", format_currency(quote.sale_price, currency));
    println!("  Profit:          {}", format_currency(quote.profit, currency));
    println!("  Profit Margin:   {:.0}%", quote.profit_margin_pct);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{self, tests::write_catalog};

    #[test]
    fn prices_a_catalog_recipe_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = config::load_catalog(&write_catalog(dir.path())).unwrap();
        let settings = Settings::default();

        assert_eq!(run_cost(&catalog, "REC-BROWNIE", &settings).unwrap(), 2850.0);

        let overrides = PriceOverrides {
            margin_pct: Some(35.0),
            rounding_step: Some(500.0),
            ..Default::default()
        };
        let quote = run_price(&catalog, "REC-BROWNIE", &settings, &overrides, None).unwrap();
        assert_eq!(quote.sale_price, 4500.0);
    }

    #[test]
    fn fixed_price_write_back_carries_computed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = config::load_catalog(&write_catalog(dir.path())).unwrap();
        let out = dir.path().join("brownie.yaml");
        let overrides = PriceOverrides {
            fixed_price: Some(5700.0),
            ..Default::default()
        };
        run_price(&catalog, "REC-BROWNIE", &Settings::default(), &overrides, Some(&out)).unwrap();

        let saved: RecipeFile = serde_yaml::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let recipe = &saved.recipes[0];
        assert_eq!(recipe.total_cost, Some(2850.0));
        assert_eq!(recipe.sale_price, Some(5700.0));
        assert_eq!(recipe.profit_margin_pct, Some(50.0));
        assert!(recipe.price_fixed);
    }

    #[test]
    fn empty_recipe_is_not_written_back() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = config::load_catalog(&write_catalog(dir.path())).unwrap();
        let out = dir.path().join("empty.yaml");
        let result = run_price(
            &catalog,
            "REC-EMPTY",
            &Settings::default(),
            &PriceOverrides::default(),
            Some(&out),
        );
        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn session_replays_commands_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = config::load_catalog(&write_catalog(dir.path())).unwrap();
        let session: SessionFile = serde_yaml::from_str(
            r#"
schema_version: "1.0"
recipe_id: REC-BROWNIE
commands:
  - type: remove_line
    index: 1
  - type: fix_sale_price
    price: 1700
  - type: set_profit_margin
    pct: 50
"#,
        )
        .unwrap();
        let quote = run_session(&catalog, &session, &Settings::default(), None).unwrap();
        assert_eq!(quote.total_cost, 850.0);
        assert_eq!(quote.mode, PricingMode::MarginDriven { margin_pct: 50.0 });
        assert_eq!(quote.sale_price, 1700.0);
    }

    #[test]
    fn report_skips_empty_recipes() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = config::load_catalog(&write_catalog(dir.path())).unwrap();
        let output = run_report(&catalog, &Settings::default(), dir.path()).unwrap();

        let saved: RecipeFile = serde_yaml::from_str(
            &fs::read_to_string(output.join("recipes_priced.yaml")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved.recipes.len(), 1);
        assert_eq!(saved.recipes[0].recipe_id, "REC-BROWNIE");

        let report = fs::read_to_string(output.join("pricing_report.md")).unwrap();
        assert!(report.contains("| Brownie | $2,850 |"));
    }

    #[test]
    fn report_skips_recipes_that_cannot_be_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = config::load_catalog(&write_catalog(dir.path())).unwrap();
        let mut broken = catalog.recipe("REC-BROWNIE").unwrap().clone();
        broken.recipe_id = "REC-BROKEN".to_string();
        broken.lines[0].ingredient_ref = "ING-GHOST".to_string();
        catalog.recipes.insert(broken.recipe_id.clone(), broken);

        let output = run_report(&catalog, &Settings::default(), dir.path()).unwrap();
        let saved: RecipeFile = serde_yaml::from_str(
            &fs::read_to_string(output.join("recipes_priced.yaml")).unwrap(),
        )
        .unwrap();
        let ids: Vec<&str> = saved.recipes.iter().map(|r| r.recipe_id.as_str()).collect();
        assert_eq!(ids, ["REC-BROWNIE"]);
    }
}
