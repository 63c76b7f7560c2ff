//! Cost breakdown charts rendered from a ledger CSV.

use anyhow::{Context, Result};
use plotters::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct LedgerRow {
    recipe_id: String,
    row_kind: String,
    ingredient_ref: String,
    line_cost: f64,
}

/// Line costs per recipe, in ledger order.
fn parse_ledger(ledger_path: &Path) -> Result<BTreeMap<String, Vec<(String, f64)>>> {
    let mut reader = csv::Reader::from_path(ledger_path)
        .with_context(|| format!("Failed to open ledger {:?}", ledger_path))?;
    let mut lines: BTreeMap<String, Vec<(String, f64)>> = BTreeMap::new();
    for result in reader.deserialize() {
        let row: LedgerRow = result?;
        if row.row_kind == "line" {
            lines
                .entry(row.recipe_id)
                .or_default()
                .push((row.ingredient_ref, row.line_cost));
        }
    }
    Ok(lines)
}

/// Writes one `<recipe_id>_costs.png` bar chart per recipe in the ledger.
pub fn plot_cost_breakdowns(output_dir: &Path, ledger_path: &Path) -> Result<()> {
    let recipes = parse_ledger(ledger_path)?;
    if recipes.is_empty() {
        warn!("no costed lines to plot");
        return Ok(());
    }
    for (recipe_id, lines) in &recipes {
        plot_cost_breakdown(output_dir, recipe_id, lines)?;
    }
    info!(charts = recipes.len(), dir = %output_dir.display(), "cost charts saved");
    Ok(())
}

fn plot_cost_breakdown(output_dir: &Path, recipe_id: &str, lines: &[(String, f64)]) -> Result<()> {
    let path = output_dir.join(format!("{}_costs.png", recipe_id));
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_cost = lines.iter().map(|(_, cost)| *cost).fold(0.0, f64::max).max(1.0);
    let labels: Vec<String> = lines.iter().map(|(name, _)| name.clone()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Cost breakdown: {}", recipe_id), ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..lines.len() as f64, 0f64..max_cost * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(lines.len())
        .x_label_formatter(&|x| {
            let index = x.floor() as usize;
            labels.get(index).cloned().unwrap_or_default()
        })
        .y_desc("Cost")
        .draw()?;

    chart.draw_series(lines.iter().enumerate().map(|(i, (_, cost))| {
        let x = i as f64;
        Rectangle::new([(x + 0.15, 0.0), (x + 0.85, *cost)], BLUE.filled())
    }))?;

    root.present()?;
    Ok(())
}
