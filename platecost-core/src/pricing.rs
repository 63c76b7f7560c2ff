//! Converts between cost, target margin and sale price.
//!
//! A [`PricingSession`] is pinned either to a margin (the price follows) or to
//! a fixed sale price (the margin follows). Whatever is not pinned is derived
//! on every read.

use platecost_schemas::pricing::PricingSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest margin fraction used when inverting a margin into a price.
pub const MAX_MARGIN_FRACTION: f64 = 0.99;
/// Highest margin, in percent, accepted from the margin control.
pub const MAX_MARGIN_PCT: f64 = 99.0;
/// Highest margin, in percent, derived back from a fixed price.
pub const MAX_DERIVED_MARGIN_PCT: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub safety_margin_pct: f64,
    pub labor_cost: f64,
    pub default_profit_margin_pct: f64,
    pub rounding_step: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self::from(&PricingSettings::default())
    }
}

impl From<&PricingSettings> for PricingConfig {
    fn from(settings: &PricingSettings) -> Self {
        Self {
            safety_margin_pct: non_negative(settings.safety_margin_pct),
            labor_cost: non_negative(settings.labor_cost),
            default_profit_margin_pct: clamp_margin(settings.default_profit_margin_pct),
            rounding_step: non_negative(settings.rounding_step),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PricingMode {
    MarginDriven { margin_pct: f64 },
    PriceDriven { price: f64 },
}

/// Everything a caller needs to display or persist a pricing decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub mode: PricingMode,
    pub total_cost: f64,
    pub effective_cost: f64,
    pub raw_sale_price: f64,
    pub sale_price: f64,
    pub profit: f64,
    pub profit_margin_pct: f64,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn clamp_margin(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, MAX_MARGIN_PCT)
}

/// Ingredient cost with the safety buffer and labor added.
pub fn effective_cost(total_cost: f64, safety_margin_pct: f64, labor_cost: f64) -> f64 {
    total_cost * (1.0 + safety_margin_pct / 100.0) + labor_cost
}

pub fn raw_sale_price(effective_cost: f64, profit_margin_pct: f64) -> f64 {
    let fraction = (profit_margin_pct / 100.0).min(MAX_MARGIN_FRACTION);
    effective_cost / (1.0 - fraction)
}

/// Rounds `price` up to the next multiple of `step`. A step of zero leaves
/// the price untouched.
///
/// Quotients within 1e-9 of a whole number count as that number, so a price
/// that is already a multiple of the step stays put. The result is never
/// below `price`.
pub fn round_up(price: f64, step: f64) -> f64 {
    if !(step.is_finite() && step > 0.0) {
        return price;
    }
    let quotient = price / step;
    let nearest = quotient.round();
    if (quotient - nearest).abs() < 1e-9 && nearest * step >= price {
        return nearest * step;
    }
    quotient.ceil() * step
}

/// Margin implied by selling at `price`, in whole percent within [0, 95].
pub fn derive_margin(price: f64, effective_cost: f64) -> f64 {
    if !(price.is_finite() && price > 0.0) || price <= effective_cost {
        return 0.0;
    }
    (((price - effective_cost) / price) * 100.0)
        .round()
        .clamp(0.0, MAX_DERIVED_MARGIN_PCT)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricingSession {
    config: PricingConfig,
    total_cost: f64,
    mode: PricingMode,
    rounding_step: f64,
}

impl PricingSession {
    /// Starts margin-driven at the configured default margin and rounding.
    pub fn new(config: PricingConfig, total_cost: f64) -> Self {
        Self {
            mode: PricingMode::MarginDriven {
                margin_pct: config.default_profit_margin_pct,
            },
            rounding_step: config.rounding_step,
            total_cost: non_negative(total_cost),
            config,
        }
    }

    pub fn mode(&self) -> PricingMode {
        self.mode
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn rounding_step(&self) -> f64 {
        self.rounding_step
    }

    pub fn set_total_cost(&mut self, total_cost: f64) {
        self.total_cost = non_negative(total_cost);
    }

    pub fn set_safety_margin(&mut self, pct: f64) {
        self.config.safety_margin_pct = non_negative(pct);
    }

    pub fn set_labor_cost(&mut self, amount: f64) {
        self.config.labor_cost = non_negative(amount);
    }

    /// Only affects margin-driven prices; a fixed price is never rounded.
    pub fn set_rounding_step(&mut self, step: f64) {
        self.rounding_step = non_negative(step);
    }

    /// Moves the margin control: releases any fixed price.
    pub fn set_margin(&mut self, pct: f64) {
        let margin_pct = clamp_margin(pct);
        if margin_pct != pct {
            debug!(requested = pct, applied = margin_pct, "margin clamped");
        }
        if let PricingMode::PriceDriven { price } = self.mode {
            debug!(price, margin_pct, "releasing fixed price");
        }
        self.mode = PricingMode::MarginDriven { margin_pct };
    }

    /// Pins an explicit sale price. Rounding is cleared.
    pub fn fix_price(&mut self, price: f64) {
        let price = non_negative(price);
        debug!(price, "pinning sale price");
        self.rounding_step = 0.0;
        self.mode = PricingMode::PriceDriven { price };
    }

    /// Drops a fixed price and keeps pricing from the margin it implied.
    pub fn release_price(&mut self) {
        if let PricingMode::PriceDriven { .. } = self.mode {
            self.mode = PricingMode::MarginDriven {
                margin_pct: self.profit_margin_pct(),
            };
        }
    }

    pub fn effective_cost(&self) -> f64 {
        effective_cost(
            self.total_cost,
            self.config.safety_margin_pct,
            self.config.labor_cost,
        )
    }

    pub fn profit_margin_pct(&self) -> f64 {
        match self.mode {
            PricingMode::MarginDriven { margin_pct } => margin_pct,
            PricingMode::PriceDriven { price } => derive_margin(price, self.effective_cost()),
        }
    }

    pub fn sale_price(&self) -> f64 {
        match self.mode {
            PricingMode::MarginDriven { margin_pct } => {
                round_up(raw_sale_price(self.effective_cost(), margin_pct), self.rounding_step)
            }
            PricingMode::PriceDriven { price } => price,
        }
    }

    pub fn profit(&self) -> f64 {
        self.sale_price() - self.effective_cost()
    }

    pub fn quote(&self) -> PriceQuote {
        let effective_cost = self.effective_cost();
        let raw_sale_price = match self.mode {
            PricingMode::MarginDriven { margin_pct } => raw_sale_price(effective_cost, margin_pct),
            PricingMode::PriceDriven { price } => price,
        };
        let sale_price = self.sale_price();
        PriceQuote {
            mode: self.mode,
            total_cost: self.total_cost,
            effective_cost,
            raw_sale_price,
            sale_price,
            profit: sale_price - effective_cost,
            profit_margin_pct: self.profit_margin_pct(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PricingConfig {
        PricingConfig {
            safety_margin_pct: 0.0,
            labor_cost: 0.0,
            default_profit_margin_pct: 30.0,
            rounding_step: 0.0,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn starts_margin_driven_with_defaults() {
        let session = PricingSession::new(config(), 7000.0);
        assert_eq!(session.mode(), PricingMode::MarginDriven { margin_pct: 30.0 });
        assert_close(session.sale_price(), 10000.0);
        assert_close(session.profit(), 3000.0);
    }

    #[test]
    fn safety_margin_and_labor_raise_effective_cost() {
        let mut session = PricingSession::new(config(), 10000.0);
        session.set_safety_margin(10.0);
        session.set_labor_cost(500.0);
        assert_close(session.effective_cost(), 11500.0);
        session.set_margin(0.0);
        assert_close(session.sale_price(), 11500.0);
        assert_close(session.profit(), 0.0);
    }

    #[test]
    fn margin_is_capped_below_one_hundred_percent() {
        assert_close(raw_sale_price(100.0, 100.0), 10000.0);
        assert_close(raw_sale_price(100.0, 250.0), 10000.0);

        let mut session = PricingSession::new(config(), 100.0);
        session.set_margin(150.0);
        assert_eq!(session.mode(), PricingMode::MarginDriven { margin_pct: 99.0 });
        assert!(session.sale_price().is_finite());
        session.set_margin(-5.0);
        assert_eq!(session.profit_margin_pct(), 0.0);
    }

    #[test]
    fn rounding_goes_up_only() {
        assert_eq!(round_up(15384.62, 500.0), 15500.0);
        assert_eq!(round_up(15001.0, 500.0), 15500.0);
        assert_eq!(round_up(15000.0, 500.0), 15000.0);
        assert_eq!(round_up(15384.62, 0.0), 15384.62);
        assert_close(round_up(0.30000000000000004, 0.1), 0.3);
    }

    #[test]
    fn rounding_never_goes_down_for_large_steps() {
        let price = 1_000_000.0009;
        let rounded = round_up(price, 1_000_000.0);
        assert_eq!(rounded, 2_000_000.0);
        assert!(rounded >= price);
        assert_eq!(round_up(rounded, 1_000_000.0), rounded);
    }

    #[test]
    fn fixing_a_price_clears_rounding_and_derives_margin() {
        let mut session = PricingSession::new(config(), 10000.0);
        session.set_rounding_step(500.0);
        session.fix_price(20000.0);
        assert_eq!(session.rounding_step(), 0.0);
        assert_eq!(session.profit_margin_pct(), 50.0);
        assert_close(session.profit(), 10000.0);
    }

    #[test]
    fn price_below_cost_derives_zero_margin_and_negative_profit() {
        let mut session = PricingSession::new(config(), 10000.0);
        session.fix_price(8000.0);
        assert_eq!(session.profit_margin_pct(), 0.0);
        assert_close(session.profit(), -2000.0);
        session.fix_price(0.0);
        assert_eq!(session.profit_margin_pct(), 0.0);
    }

    #[test]
    fn derived_margin_is_capped_at_ninety_five() {
        assert_eq!(derive_margin(100000.0, 10.0), 95.0);
    }

    #[test]
    fn moving_the_margin_releases_the_fixed_price() {
        let mut session = PricingSession::new(config(), 10000.0);
        session.fix_price(20000.0);
        session.set_margin(35.0);
        session.set_rounding_step(500.0);
        assert_eq!(session.mode(), PricingMode::MarginDriven { margin_pct: 35.0 });
        assert_eq!(session.sale_price(), 15500.0);
    }

    #[test]
    fn releasing_keeps_the_implied_margin() {
        let mut session = PricingSession::new(config(), 10000.0);
        session.fix_price(20000.0);
        session.release_price();
        assert_eq!(session.mode(), PricingMode::MarginDriven { margin_pct: 50.0 });
        assert_close(session.sale_price(), 20000.0);
    }

    #[test]
    fn derived_margin_follows_cost_changes() {
        let mut session = PricingSession::new(config(), 10000.0);
        session.fix_price(20000.0);
        session.set_total_cost(15000.0);
        assert_eq!(session.profit_margin_pct(), 25.0);
        assert_eq!(session.sale_price(), 20000.0);
    }

    #[test]
    fn quote_collects_the_decision() {
        let mut config = config();
        config.rounding_step = 500.0;
        let mut session = PricingSession::new(config, 10000.0);
        session.set_margin(35.0);
        let quote = session.quote();
        assert_close(quote.raw_sale_price, 10000.0 / 0.65);
        assert_eq!(quote.sale_price, 15500.0);
        assert_close(quote.profit, 5500.0);
        assert_eq!(quote.profit_margin_pct, 35.0);
    }

    #[test]
    fn settings_are_sanitized_into_config() {
        let settings = PricingSettings {
            safety_margin_pct: -3.0,
            labor_cost: f64::NAN,
            default_profit_margin_pct: 120.0,
            rounding_step: 100.0,
        };
        let config = PricingConfig::from(&settings);
        assert_eq!(config.safety_margin_pct, 0.0);
        assert_eq!(config.labor_cost, 0.0);
        assert_eq!(config.default_profit_margin_pct, 99.0);
        assert_eq!(config.rounding_step, 100.0);
    }
}
