//! Hormone conversion module
//!
//! Carries the hormone catalog, the conversion engine, and value formatting.

pub mod catalog;
pub mod engine;
pub mod format;

pub use catalog::{
    Hormone, HormoneCatalog, RangeColor, RangeIcon, RangeSource, ReferenceRange, Unit,
    UnitCategory, DEFAULT_HORMONE,
};
pub use engine::{
    are_units_equivalent, convert_range_to_unit, convert_value, default_target_unit,
    equivalent_units, perform_conversion, ConvertError, ConvertedRange,
};
pub use format::{format_range_text, format_value};
