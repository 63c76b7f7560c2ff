use serde::{Deserialize, Serialize};

/// Business-wide pricing defaults, read once from `settings.yaml` and handed
/// to the pricing inverter explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// "Factor Q": a uniform buffer applied on top of ingredient cost.
    pub safety_margin_pct: f64,
    /// Flat labor cost added to every recipe's effective cost.
    pub labor_cost: f64,
    pub default_profit_margin_pct: f64,
    /// Sale prices are rounded up to a multiple of this step. Zero disables rounding.
    pub rounding_step: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            safety_margin_pct: 0.0,
            labor_cost: 0.0,
            default_profit_margin_pct: 30.0,
            rounding_step: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimal_places: usize,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            decimal_places: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pricing: PricingSettings,
    pub currency: CurrencyFormat,
}
