//! Record types exchanged between the costing engine and the record store.
//!
//! Everything here is plain data with serde derives; the catalog on disk is
//! a set of versioned YAML files deserialized through [`file_formats`].

pub mod command;
pub mod file_formats;
pub mod ingredient;
pub mod measurement;
pub mod pricing;
pub mod recipe;
pub mod unit;
