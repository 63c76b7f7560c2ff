use crate::{
    bom::{BillOfMaterials, UsageLine},
    catalog::Catalog,
    error::CostingError,
    pricing::{PriceQuote, PricingConfig, PricingMode, PricingSession},
};
use platecost_schemas::{command::Command, recipe::Recipe};
use std::collections::HashMap;
use tracing::{debug, info};

/// A recipe open for editing: its bill of materials and the pricing session
/// that follows it.
///
/// The pricing session's total cost is resynchronized after every command
/// that touches the line list.
pub struct CostingWorksheet<'a> {
    catalog: &'a Catalog,
    record: Recipe,
    bom: BillOfMaterials,
    pricing: PricingSession,
}

impl<'a> CostingWorksheet<'a> {
    /// Opens a stored recipe. A stored fixed price is pinned again; otherwise
    /// a stored margin, when present, replaces the configured default.
    pub fn open(
        catalog: &'a Catalog,
        recipe_id: &str,
        config: PricingConfig,
    ) -> Result<Self, CostingError> {
        let record = catalog.recipe(recipe_id)?.clone();
        let bom = BillOfMaterials::from_recipe(&record, &catalog.ingredients, &catalog.units)?;
        let mut pricing = PricingSession::new(config, bom.total_cost());
        match (record.price_fixed, record.sale_price, record.profit_margin_pct) {
            (true, Some(price), _) => pricing.fix_price(price),
            (_, _, Some(margin_pct)) => pricing.set_margin(margin_pct),
            _ => {}
        }
        info!(recipe = %record.recipe_id, lines = bom.len(), total_cost = bom.total_cost(), "worksheet opened");
        Ok(Self {
            catalog,
            record,
            bom,
            pricing,
        })
    }

    /// Starts a worksheet for a recipe that does not exist in the catalog yet.
    pub fn blank(
        catalog: &'a Catalog,
        recipe_id: &str,
        recipe_name: &str,
        config: PricingConfig,
    ) -> Self {
        let record = Recipe {
            recipe_id: recipe_id.to_string(),
            recipe_name: recipe_name.to_string(),
            lines: Vec::new(),
            total_cost: None,
            sale_price: None,
            profit_margin_pct: None,
            price_fixed: false,
            attributes: HashMap::new(),
        };
        Self {
            catalog,
            bom: BillOfMaterials::new(recipe_name),
            pricing: PricingSession::new(config, 0.0),
            record,
        }
    }

    pub fn bom(&self) -> &BillOfMaterials {
        &self.bom
    }

    pub fn pricing(&self) -> &PricingSession {
        &self.pricing
    }

    pub fn recipe_id(&self) -> &str {
        &self.record.recipe_id
    }

    pub fn quote(&self) -> PriceQuote {
        self.pricing.quote()
    }

    pub fn apply(&mut self, command: &Command) -> Result<(), CostingError> {
        debug!(recipe = %self.record.recipe_id, ?command, "applying command");
        match command {
            Command::AddLine { line } => {
                let ingredient = self.catalog.ingredient(&line.ingredient_ref)?;
                let usage_line = UsageLine::resolve(line, ingredient)?;
                self.bom.add_line(usage_line, &self.catalog.units);
                self.sync_total();
            }
            Command::RemoveLine { index } => {
                self.bom.remove_line(*index)?;
                self.sync_total();
            }
            Command::SetProfitMargin { pct } => self.pricing.set_margin(*pct),
            Command::FixSalePrice { price } => self.pricing.fix_price(*price),
            Command::SetRoundingStep { step } => self.pricing.set_rounding_step(*step),
            Command::SetSafetyMargin { pct } => self.pricing.set_safety_margin(*pct),
            Command::SetLaborCost { amount } => self.pricing.set_labor_cost(*amount),
        }
        Ok(())
    }

    pub fn apply_all<'c>(
        &mut self,
        commands: impl IntoIterator<Item = &'c Command>,
    ) -> Result<(), CostingError> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(())
    }

    /// The recipe record with computed fields filled in, ready for the record
    /// store. Recipes without ingredients are refused.
    pub fn finalize(&self) -> Result<Recipe, CostingError> {
        self.bom.ensure_finalizable()?;
        let quote = self.pricing.quote();
        let mut record = self.record.clone();
        record.lines = self.bom.to_recipe_lines();
        record.total_cost = Some(quote.total_cost);
        record.sale_price = Some(quote.sale_price);
        record.profit_margin_pct = Some(quote.profit_margin_pct);
        record.price_fixed = matches!(quote.mode, PricingMode::PriceDriven { .. });
        Ok(record)
    }

    fn sync_total(&mut self) {
        self.pricing.set_total_cost(self.bom.total_cost());
    }
}
