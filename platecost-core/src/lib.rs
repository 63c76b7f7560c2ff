//! The costing and pricing engine.
//!
//! Data flows one way: purchases are normalized through the [`units`] table
//! by [`unit_cost`], summed per recipe in [`bom`], and turned into a sale
//! price by [`pricing`]. [`worksheet`] ties the last two together for an
//! interactive editing session.

pub mod bom;
pub mod catalog;
pub mod error;
pub mod ledger;
pub mod pricing;
pub mod unit_cost;
pub mod units;
pub mod worksheet;
