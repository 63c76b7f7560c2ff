use crate::recipe::RecipeLine;
use serde::{Deserialize, Serialize};

/// An edit applied to a costing worksheet, in the order the user made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    AddLine {
        line: RecipeLine,
    },
    RemoveLine {
        index: usize,
    },
    SetProfitMargin {
        pct: f64,
    },
    FixSalePrice {
        price: f64,
    },
    SetRoundingStep {
        step: f64,
    },
    SetSafetyMargin {
        pct: f64,
    },
    SetLaborCost {
        amount: f64,
    },
}
