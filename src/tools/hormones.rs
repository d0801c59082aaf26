//! Hormone catalog MCP tools
//!
//! Tools for browsing hormones, their units, and reference ranges.

use serde::Serialize;

use crate::conversion::{
    default_target_unit, equivalent_units, format_range_text, Hormone, HormoneCatalog,
    ReferenceRange, Unit,
};

/// Hormone summary for listing
#[derive(Debug, Serialize)]
pub struct HormoneSummary {
    pub id: String,
    pub name: String,
    pub base_unit: String,
    pub units: Vec<String>,
    pub range_count: usize,
}

/// Response for list_hormones
#[derive(Debug, Serialize)]
pub struct ListHormonesResponse {
    pub hormones: Vec<HormoneSummary>,
    pub total: usize,
    pub default_hormone: String,
}

/// Unit detail with conversion metadata
#[derive(Debug, Serialize)]
pub struct UnitDetail {
    pub name: String,
    pub symbol: String,
    /// Factor to the hormone's base unit
    pub multiplier: f64,
    pub category: String,
    /// Units that express the same scale under a different symbol
    pub equivalent_to: Vec<String>,
    /// Unit a converter UI would preselect as the target
    pub suggested_target: Option<String>,
}

/// Reference range detail
#[derive(Debug, Serialize)]
pub struct RangeDetail {
    pub label: String,
    /// Formatted bounds in the range's own unit
    pub text: String,
    pub min: f64,
    /// None for open-ended ranges
    pub max: Option<f64>,
    pub unit: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub source_name: String,
    pub source_url: String,
}

/// Full hormone detail
#[derive(Debug, Serialize)]
pub struct HormoneDetail {
    pub id: String,
    pub name: String,
    pub base_unit: String,
    pub molecular_weight: Option<f64>,
    pub units: Vec<UnitDetail>,
    pub ranges: Vec<RangeDetail>,
}

fn unit_detail(hormone: &Hormone, unit: &Unit) -> UnitDetail {
    UnitDetail {
        name: unit.name.clone(),
        symbol: unit.symbol.clone(),
        multiplier: unit.multiplier,
        category: unit.category.as_str().to_string(),
        equivalent_to: equivalent_units(hormone, &unit.symbol)
            .into_iter()
            .map(String::from)
            .collect(),
        suggested_target: default_target_unit(hormone, &unit.symbol).map(|u| u.symbol.clone()),
    }
}

fn range_detail(range: &ReferenceRange) -> RangeDetail {
    RangeDetail {
        label: range.label.clone(),
        text: format_range_text(range.min, range.max),
        min: range.min,
        max: if range.max.is_finite() {
            Some(range.max)
        } else {
            None
        },
        unit: range.unit.clone(),
        description: range.description.clone(),
        color: range.color.as_str().to_string(),
        icon: range.icon.as_str().to_string(),
        source_name: range.source.name.clone(),
        source_url: range.source.url.clone(),
    }
}

// ============================================================================
// Tool Functions
// ============================================================================

/// List all hormones with their unit symbols
pub fn list_hormones(catalog: &HormoneCatalog) -> ListHormonesResponse {
    let hormones: Vec<HormoneSummary> = catalog
        .hormones()
        .iter()
        .map(|h| HormoneSummary {
            id: h.id.clone(),
            name: h.name.clone(),
            base_unit: h.base_unit.clone(),
            units: h.units.iter().map(|u| u.symbol.clone()).collect(),
            range_count: h.ranges.len(),
        })
        .collect();

    let total = hormones.len();
    ListHormonesResponse {
        hormones,
        total,
        default_hormone: crate::conversion::DEFAULT_HORMONE.to_string(),
    }
}

/// Get full detail for one hormone, or None if the ID is unknown
pub fn get_hormone(catalog: &HormoneCatalog, id: &str) -> Option<HormoneDetail> {
    let hormone = catalog.get(id)?;

    Some(HormoneDetail {
        id: hormone.id.clone(),
        name: hormone.name.clone(),
        base_unit: hormone.base_unit.clone(),
        molecular_weight: hormone.molecular_weight,
        units: hormone
            .units
            .iter()
            .map(|u| unit_detail(hormone, u))
            .collect(),
        ranges: hormone.ranges.iter().map(range_detail).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_covers_whole_catalog() {
        let catalog = HormoneCatalog::builtin();
        let listing = list_hormones(&catalog);

        assert_eq!(listing.total, 6);
        assert_eq!(listing.default_hormone, "estradiol");

        let estradiol = listing
            .hormones
            .iter()
            .find(|h| h.id == "estradiol")
            .unwrap();
        assert_eq!(estradiol.base_unit, "pg/mL");
        assert_eq!(estradiol.units, vec!["pg/mL", "ng/dL", "pmol/L"]);
        assert_eq!(estradiol.range_count, 4);
    }

    #[test]
    fn detail_reports_equivalents_and_targets() {
        let catalog = HormoneCatalog::builtin();
        let detail = get_hormone(&catalog, "prolactin").unwrap();

        let base = detail.units.iter().find(|u| u.symbol == "ng/mL").unwrap();
        assert_eq!(base.equivalent_to, vec!["μg/L"]);
        assert_eq!(base.suggested_target.as_deref(), Some("mIU/L"));

        let miu = detail.units.iter().find(|u| u.symbol == "mIU/L").unwrap();
        assert!(miu.equivalent_to.is_empty());
    }

    #[test]
    fn detail_formats_open_ended_range() {
        let catalog = HormoneCatalog::builtin();
        let detail = get_hormone(&catalog, "estradiol").unwrap();

        let risk = detail
            .ranges
            .iter()
            .find(|r| r.label == "High level risk")
            .unwrap();
        assert_eq!(risk.max, None);
        assert_eq!(risk.text, "≥ 300");
        assert_eq!(risk.color, "error");
    }

    #[test]
    fn unknown_hormone_is_none() {
        let catalog = HormoneCatalog::builtin();
        assert!(get_hormone(&catalog, "cortisol").is_none());
        assert!(get_hormone(&catalog, "Estradiol").is_none());
    }
}
