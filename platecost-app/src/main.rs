use anyhow::Result;
use clap::{Parser, Subcommand};
use platecost_core::unit_cost::PurchaseRecord;
use std::path::PathBuf;
use tracing::info;

mod config;
mod currency;
mod logging;
mod plotting;
mod workflow;

#[derive(Parser)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION")
)]
struct Args {
    #[arg(long, help = "Catalog directory (1_units/, 2_ingredients/, 3_recipes/).", default_value = "./data/catalog")]
    catalog: PathBuf,

    #[arg(long, help = "(Optional) Settings file. Defaults to settings.yaml in the catalog.")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Cost of using part of a purchase.
    UnitCost {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        use_quantity: f64,
        #[arg(long)]
        use_unit: String,
    },
    /// Bill of materials and total cost of a recipe.
    Cost { recipe_id: String },
    /// Sale price of a recipe from a margin or a fixed price.
    Price {
        recipe_id: String,
        #[arg(long, conflicts_with = "price")]
        margin: Option<f64>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, help = "Round margin-driven prices up to a multiple of this step.")]
        rounding: Option<f64>,
        #[arg(long, help = "Safety margin (Factor Q) in percent.")]
        safety: Option<f64>,
        #[arg(long, help = "(Optional) Write the finalized recipe to this YAML file.")]
        save: Option<PathBuf>,
    },
    /// Replay a scripted pricing session.
    Session {
        file: PathBuf,
        #[arg(long, help = "(Optional) Write the finalized recipe to this YAML file.")]
        save: Option<PathBuf>,
    },
    /// Price every recipe into a timestamped report directory.
    Report {
        #[arg(long, default_value = "./data/runs")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let catalog = config::load_catalog(&args.catalog)?;
    let settings = config::load_settings(args.settings.as_deref(), &args.catalog)?;

    match args.command {
        Action::UnitCost {
            price,
            quantity,
            unit,
            use_quantity,
            use_unit,
        } => {
            let purchase = PurchaseRecord::new(price, quantity, unit);
            workflow::run_unit_cost(&catalog, &purchase, use_quantity, &use_unit, &settings.currency)?;
        }
        Action::Cost { recipe_id } => {
            workflow::run_cost(&catalog, &recipe_id, &settings)?;
        }
        Action::Price {
            recipe_id,
            margin,
            price,
            rounding,
            safety,
            save,
        } => {
            let overrides = workflow::PriceOverrides {
                margin_pct: margin,
                fixed_price: price,
                rounding_step: rounding,
                safety_margin_pct: safety,
            };
            workflow::run_price(&catalog, &recipe_id, &settings, &overrides, save.as_deref())?;
        }
        Action::Session { file, save } => {
            let session = config::load_session(&file)?;
            workflow::run_session(&catalog, &session, &settings, save.as_deref())?;
        }
        Action::Report { output } => {
            let dir = workflow::run_report(&catalog, &settings, &output)?;
            info!(dir = %dir.display(), "report complete");
        }
    }

    Ok(())
}
