//! HUC Status Tool
//!
//! Provides runtime status information about the HUC service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::conversion::HormoneCatalog;
use crate::db::Database;
use crate::models::Conversion;

/// Hormone conversion instructions for AI assistants
pub const CONVERTER_INSTRUCTIONS: &str = r#"
# HUC Hormone Conversion Instructions

This guide explains how to convert hormone lab values using the Hormone Unit Converter (HUC) tools.

## Overview

Hormone lab reports use different units depending on the laboratory and country. An estradiol
result may arrive as 150 pg/mL or as 550 pmol/L; both describe the same blood level. HUC converts
between the units defined for each hormone and compares results against published reference ranges.

Supported hormones:

| Hormone | ID | Base Unit | Other Units |
|---------|-----|-----------|-------------|
| Estradiol (E2) | `estradiol` | pg/mL | ng/dL, pmol/L |
| Testosterone (T) | `testosterone` | ng/dL | nmol/L, pg/mL |
| Prolactin (PRL) | `prolactin` | ng/mL | mIU/L, μg/L |
| Progesterone (P4) | `progesterone` | ng/mL | nmol/L, ng/dL |
| Follicle-stimulating hormone (FSH) | `fsh` | mIU/mL | IU/L, mIU/L |
| Luteinizing hormone (LH) | `lh` | mIU/mL | IU/L, mIU/L |

Hormone IDs are lowercase and case-sensitive. Unit symbols are case-sensitive too: `ng/dL` works,
`NG/DL` does not.

---

## Step-by-Step Workflow

1. **Identify the hormone and units.** Call `list_hormones` if unsure which IDs and symbols exist.
2. **Convert the value:**
```
convert_value(
  hormone: "estradiol",
  value: "150",
  from_unit: "pg/mL",
  to_unit: "pmol/L"
)
```
3. **Show reference ranges.** The response already includes the ranges the result falls in. For
   the full list call `get_reference_ranges` with the same units.

The `value` parameter is a string, exactly as the user typed it. Leading and trailing whitespace
is accepted; anything that does not parse as a finite decimal number is rejected with
`invalid_input`. Words like "inf" or "NaN" are rejected even though they are technically parseable.

---

## How Conversion Works

Every unit of a hormone carries a multiplier relative to that hormone's base unit:

```
base_value   = value x from_unit.multiplier
result_value = base_value / to_unit.multiplier
```

**Example - Estradiol:** pmol/L has multiplier 1/3.671, so 150 pg/mL -> 150 / (1/3.671) =
550.65 pmol/L. Converting a value to its own unit returns it unchanged.

### Equivalent Units

Some units are different names for the same scale. For prolactin, ng/mL and μg/L have the same
multiplier, so converting between them never changes the number. The `convert_value` response sets
`units_equivalent: true` in that case, and `get_hormone` lists each unit's equivalents.

### IMPORTANT: International Units

FSH, LH and prolactin use IU-based units (mIU/mL, IU/L, mIU/L). International units measure
biological activity against a reference preparation, not mass. HUC converts between the IU-based
units of one hormone, but there is no universal IU-to-mass conversion - do not invent one, and do
not convert IU values across different hormones.

---

## Reference Ranges

Each hormone ships with published reference ranges. Every range has:

- **label** - e.g. "Male reference range", "GAHT target range"
- **min / max** in the range's own unit; `max` is null for open-ended ranges ("30 or above")
- **color** - severity hint: `info` (neutral reference), `success` (target), `warning` (elevated,
  may warrant attention), `error` (risk level)
- **source** - name and URL of the publication the range is taken from

`get_reference_ranges` converts each range into the units you are working in. When a range cannot
be expressed in those units, or the two units are equivalent, it is shown in its own unit instead.

Ranges are context for interpreting a lab result. They are not medical advice; dosing decisions
belong to the prescribing clinician.

---

## Conversion History

Every successful `convert_value` call is recorded with its inputs, result, and timestamp.

| Task | Tool |
|------|------|
| List recent conversions | `list_recent_conversions` (default 20, max 100, optional hormone filter) |
| Delete one record | `delete_conversion` |
| Clear all history | `clear_conversion_history` (requires `force: true`) |

Failed conversions (bad input, unknown hormone or unit) are never recorded.

## Quick Reference

| Task | Tool |
|------|------|
| Service status | `huc_status` |
| This guide | `converter_instructions` |
| List hormones with units | `list_hormones` |
| Full hormone detail | `get_hormone` |
| Convert a lab value | `convert_value` |
| Ranges in chosen units | `get_reference_ranges` |
| Recent history | `list_recent_conversions` |
| Delete history record | `delete_conversion` |
| Wipe history | `clear_conversion_history` |
| PDF reference card | `export_reference_pdf` |

## Common Scenarios

### Converting a lab result
1. `convert_value(hormone: "estradiol", value: "550", from_unit: "pmol/L", to_unit: "pg/mL")`
2. Report the formatted result and the matching ranges from the response.

### Comparing a result against ranges without converting
`get_reference_ranges(hormone: "testosterone", from_unit: "nmol/L", to_unit: "nmol/L")`

### Producing a printable reference card
`export_reference_pdf(hormone: "estradiol", output_path: "C:\\Users\\name\\Documents\\e2.pdf")`
The PDF contains the unit table, a range chart, and all reference ranges with sources.

## Notes

- Unknown hormone IDs fail with `hormone_not_found`; unknown unit symbols with `unit_not_found`.
- Results are returned both raw (full precision) and formatted. Formatting adapts precision to
  magnitude: 367.1 -> "367", 36.71 -> "36.7", 3.671 -> "3.67".
- Open-ended ranges format as ">= min" rather than an infinite upper bound.
"#;

/// Runtime status of the HUC service
#[derive(Debug, Clone, Serialize)]
pub struct ConverterStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Catalog information
    pub hormones_loaded: usize,
    pub default_hormone: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub conversions_recorded: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database, catalog: &HormoneCatalog) -> ConverterStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // History count; None if the database is unreachable
        let conversions_recorded = db
            .get_conn()
            .ok()
            .and_then(|conn| Conversion::count(&conn).ok());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ConverterStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            hormones_loaded: catalog.hormones().len(),
            default_hormone: crate::conversion::DEFAULT_HORMONE,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            conversions_recorded,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
