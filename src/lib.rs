//! Hormone Unit Converter (HUC) Library
//!
//! Core functionality for hormone lab value conversion.

pub mod build_info;
pub mod conversion;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
