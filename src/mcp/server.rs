//! HUC MCP Server Implementation
//!
//! Implements the MCP server exposing the hormone converter tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::conversion::HormoneCatalog;
use crate::db::Database;
use crate::tools::convert;
use crate::tools::history;
use crate::tools::hormones;
use crate::tools::reports;
use crate::tools::status::{StatusTracker, CONVERTER_INSTRUCTIONS};

/// HUC MCP Service
#[derive(Clone)]
pub struct ConverterService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    catalog: Arc<HormoneCatalog>,
    tool_router: ToolRouter<ConverterService>,
}

impl ConverterService {
    pub fn new(database_path: PathBuf, database: Database, catalog: HormoneCatalog) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            catalog: Arc::new(catalog),
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHormoneParams {
    /// Hormone ID (lowercase, e.g. "estradiol")
    pub hormone: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertValueParams {
    /// Hormone ID (lowercase, e.g. "estradiol")
    pub hormone: String,
    /// Lab value to convert, as the user typed it (e.g. "150" or "10.5")
    pub value: String,
    /// Source unit symbol, case-sensitive (e.g. "pg/mL")
    pub from_unit: String,
    /// Target unit symbol, case-sensitive (e.g. "pmol/L")
    pub to_unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetReferenceRangesParams {
    /// Hormone ID (lowercase, e.g. "estradiol")
    pub hormone: String,
    /// First unit symbol to show ranges in
    pub from_unit: String,
    /// Second unit symbol to show ranges in
    pub to_unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecentConversionsParams {
    /// Filter to one hormone ID (optional)
    pub hormone: Option<String>,
    /// Maximum results (default 20, max 100)
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteConversionParams {
    /// Conversion record ID to delete
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClearConversionHistoryParams {
    /// REQUIRED: Must be true to confirm clearing all history
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportReferencePdfParams {
    /// Hormone ID (lowercase, e.g. "estradiol")
    pub hormone: String,
    /// Full path for the PDF file (e.g. "C:\\Users\\name\\Documents\\e2.pdf")
    pub output_path: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl ConverterService {
    // --- Status ---

    #[tool(description = "Get the current status of the HUC service including build info, catalog summary, database status, and process information")]
    async fn huc_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database, &self.catalog);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for converting hormone lab values. Call this when starting a conversion session or when unsure how to use the converter tools.")]
    fn converter_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            CONVERTER_INSTRUCTIONS,
        )]))
    }

    // --- Catalog ---

    #[tool(description = "List all supported hormones with their unit symbols and reference range counts")]
    fn list_hormones(&self) -> Result<CallToolResult, McpError> {
        let result = hormones::list_hormones(&self.catalog);
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get full details for one hormone: units with multipliers and equivalents, and reference ranges with citations")]
    fn get_hormone(&self, Parameters(p): Parameters<GetHormoneParams>) -> Result<CallToolResult, McpError> {
        let result = hormones::get_hormone(&self.catalog, &p.hormone);
        let json = match result {
            Some(detail) => serde_json::to_string_pretty(&detail),
            None => Ok(format!(
                r#"{{"error": "Hormone not found", "hormone": "{}"}}"#,
                p.hormone
            )),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Conversion ---

    #[tool(description = "Convert a hormone lab value between units. Records the conversion in history and returns the result with the reference ranges it falls inside.")]
    fn convert_value(&self, Parameters(p): Parameters<ConvertValueParams>) -> Result<CallToolResult, McpError> {
        let result = convert::convert_value_tool(
            &self.database,
            &self.catalog,
            &p.hormone,
            &p.value,
            &p.from_unit,
            &p.to_unit,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Ok(response) => serde_json::to_string_pretty(&response),
            Err(rejected) => serde_json::to_string_pretty(&rejected),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a hormone's reference ranges rendered in a pair of units. Equivalent units and unconvertible ranges fall back to the range's own unit.")]
    fn get_reference_ranges(&self, Parameters(p): Parameters<GetReferenceRangesParams>) -> Result<CallToolResult, McpError> {
        let result =
            convert::get_reference_ranges(&self.catalog, &p.hormone, &p.from_unit, &p.to_unit);
        let json = match result {
            Ok(response) => serde_json::to_string_pretty(&response),
            Err(rejected) => serde_json::to_string_pretty(&rejected),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- History ---

    #[tool(description = "List recent conversions, newest first, with optional hormone filter")]
    fn list_recent_conversions(&self, Parameters(p): Parameters<ListRecentConversionsParams>) -> Result<CallToolResult, McpError> {
        let result = history::list_recent_conversions(
            &self.database,
            &self.catalog,
            p.hormone.as_deref(),
            p.limit,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete one conversion record from history")]
    fn delete_conversion(&self, Parameters(p): Parameters<DeleteConversionParams>) -> Result<CallToolResult, McpError> {
        let result = history::delete_conversion(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Clear the entire conversion history. Requires force=true.")]
    fn clear_conversion_history(&self, Parameters(p): Parameters<ClearConversionHistoryParams>) -> Result<CallToolResult, McpError> {
        let result = history::clear_history(&self.database, p.force)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Ok(cleared) => serde_json::to_string_pretty(&cleared),
            Err(blocked) => serde_json::to_string_pretty(&blocked),
        }
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Reports ---

    #[tool(description = "Export a printable PDF reference card for one hormone: unit table, range chart, and reference ranges with sources")]
    fn export_reference_pdf(&self, Parameters(p): Parameters<ExportReferencePdfParams>) -> Result<CallToolResult, McpError> {
        let result = reports::export_reference_card(&self.catalog, &p.hormone, &p.output_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ConverterService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "huc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Hormone Unit Converter".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Hormone Unit Converter (HUC) - converts hormone lab values between units and \
                 compares them against published reference ranges. \
                 IMPORTANT: Call converter_instructions when starting a conversion session. \
                 Catalog: list_hormones, get_hormone. \
                 Conversion: convert_value (records history), get_reference_ranges. \
                 History: list_recent_conversions, delete_conversion, clear_conversion_history \
                 (requires force=true). \
                 Reports: export_reference_pdf. Status: huc_status. \
                 IU-based units (mIU/mL, IU/L, mIU/L) measure biological activity; never convert \
                 them to mass units or across hormones."
                    .into(),
            ),
        }
    }
}
