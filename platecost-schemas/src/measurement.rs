use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric amount tagged with the unit symbol it was recorded in.
///
/// The symbol is kept as the record store wrote it ("kg", "ml", "und", ...);
/// interpreting it is the job of the unit table in `platecost-core`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement<T> {
    pub value: T,
    pub unit: String,
}

impl<T> Measurement<T> {
    pub fn new(value: T, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Measurement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
