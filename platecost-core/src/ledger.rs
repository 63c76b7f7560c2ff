use crate::{bom::BillOfMaterials, error::CostingError, pricing::PriceQuote};
use csv::Writer;
use platecost_schemas::file_formats::RecipeFile;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct LedgerEntry<'a> {
    recipe_id: &'a str,
    row_kind: &'a str,
    ingredient_ref: &'a str,
    usage_json: String,
    line_cost: f64,
    total_cost: f64,
    effective_cost: f64,
    sale_price: f64,
    profit: f64,
    profit_margin_pct: f64,
    pricing_mode_json: String,
}

/// Writes costed recipes to CSV: one `line` row per ingredient followed by a
/// `summary` row carrying the pricing decision.
pub struct CostLedger {
    path: String,
    writer: Writer<fs::File>,
}

impl CostLedger {
    pub fn create(path: &str) -> Result<Self, CostingError> {
        let writer =
            Writer::from_path(path).map_err(|e| CostingError::CsvError(path.to_string(), e))?;
        Ok(Self {
            path: path.to_string(),
            writer,
        })
    }

    pub fn record(
        &mut self,
        recipe_id: &str,
        bom: &BillOfMaterials,
        quote: &PriceQuote,
    ) -> Result<(), CostingError> {
        let pricing_mode_json = serde_json::to_string(&quote.mode)?;

        for costed in bom.lines() {
            let entry = LedgerEntry {
                recipe_id,
                row_kind: "line",
                ingredient_ref: &costed.line.ingredient_ref,
                usage_json: serde_json::to_string(&costed.line.usage)?,
                line_cost: costed.line_cost,
                total_cost: quote.total_cost,
                effective_cost: quote.effective_cost,
                sale_price: quote.sale_price,
                profit: quote.profit,
                profit_margin_pct: quote.profit_margin_pct,
                pricing_mode_json: pricing_mode_json.clone(),
            };
            self.write(entry)?;
        }

        let summary = LedgerEntry {
            recipe_id,
            row_kind: "summary",
            ingredient_ref: "",
            usage_json: String::new(),
            line_cost: 0.0,
            total_cost: quote.total_cost,
            effective_cost: quote.effective_cost,
            sale_price: quote.sale_price,
            profit: quote.profit,
            profit_margin_pct: quote.profit_margin_pct,
            pricing_mode_json,
        };
        self.write(summary)?;
        self.writer
            .flush()
            .map_err(|e| CostingError::FileIO(self.path.clone(), e))
    }

    fn write(&mut self, entry: LedgerEntry<'_>) -> Result<(), CostingError> {
        self.writer
            .serialize(entry)
            .map_err(|e| CostingError::CsvError(self.path.clone(), e))
    }
}

/// Writes finalized recipes back as a versioned recipe file.
pub fn write_recipe_file(path: &Path, file: &RecipeFile) -> Result<(), CostingError> {
    let display = path.display().to_string();
    let yaml = serde_yaml::to_string(file).map_err(|e| CostingError::YamlParsing(display.clone(), e))?;
    fs::write(path, yaml).map_err(|e| CostingError::FileIO(display, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bom::UsageLine,
        pricing::{PricingConfig, PricingSession},
        unit_cost::PurchaseRecord,
        units::UnitTable,
    };

    #[test]
    fn ledger_has_a_row_per_line_plus_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let table = UnitTable::standard();

        let mut bom = BillOfMaterials::new("Cake");
        bom.add_line(
            UsageLine::measured("ING-FLOUR", 250.0, "g", PurchaseRecord::new(3000.0, 1.0, "kg")),
            &table,
        );
        let quote = PricingSession::new(PricingConfig::default(), bom.total_cost()).quote();

        let mut ledger = CostLedger::create(path.to_str().unwrap()).unwrap();
        ledger.record("REC-CAKE", &bom, &quote).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "line");
        assert_eq!(&rows[0][2], "ING-FLOUR");
        assert_eq!(&rows[0][4], "750.0");
        assert_eq!(&rows[1][1], "summary");
    }
}
