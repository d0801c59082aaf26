//! HUC Tools module
//!
//! MCP tool implementations for the Hormone Unit Converter.

pub mod convert;
pub mod history;
pub mod hormones;
pub mod reports;
pub mod status;
