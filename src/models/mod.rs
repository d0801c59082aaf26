//! Data models
//!
//! Rust structs representing database entities.

mod conversion;

pub use conversion::{Conversion, ConversionCreate};
