//! size.rs: human-readable byte sizes ("100KB") to plain byte counts.
//!
//! Two multipliers exist on purpose. The dispatch ceiling is parsed with
//! [`SizeBase::Decimal`] (1 KB = 1000 B) while [`convert_size`] callers
//! default to [`SizeBase::Binary`] (1 KB = 1024 B).

use thiserror::Error;

pub const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBase {
    /// Powers of 1000.
    Decimal,
    /// Powers of 1024.
    #[default]
    Binary,
}

impl SizeBase {
    fn multiplier(self) -> f64 {
        match self {
            SizeBase::Decimal => 1000.0,
            SizeBase::Binary => 1024.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitConversionError {
    #[error("unknown size unit `{unit}` (expected B, KB, MB, GB or TB)")]
    UnknownUnit { unit: String },
    #[error("invalid size `{input}`: missing or malformed number")]
    BadNumber { input: String },
}

fn unit_index(unit: &str) -> Result<i32, UnitConversionError> {
    UNITS
        .iter()
        .position(|u| *u == unit)
        .map(|i| i as i32)
        .ok_or_else(|| UnitConversionError::UnknownUnit {
            unit: unit.to_string(),
        })
}

/// Convert `value` expressed in unit `from` into unit `to`.
pub fn convert_size(
    value: f64,
    from: &str,
    to: &str,
    base: SizeBase,
) -> Result<f64, UnitConversionError> {
    let diff = unit_index(from)? - unit_index(to)?;
    Ok(value * base.multiplier().powi(diff))
}

/// Parse strings like `100KB`, `1.5 mb` or `2048` into bytes.
/// A bare number is taken as bytes; the unit is case-insensitive.
pub fn parse_size(input: &str, base: SizeBase) -> Result<u64, UnitConversionError> {
    let s = input.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (num, unit) = s.split_at(split);
    let value: f64 = num.parse().map_err(|_| UnitConversionError::BadNumber {
        input: input.to_string(),
    })?;
    let unit = unit.trim().to_ascii_uppercase();
    let unit = if unit.is_empty() { "B" } else { unit.as_str() };
    let bytes = convert_size(value, unit, "B", base)?;
    Ok(bytes.floor() as u64)
}

/// Ceiling strings always use the decimal table.
pub fn parse_ceiling(input: &str) -> Result<u64, UnitConversionError> {
    parse_size(input, SizeBase::Decimal)
}
