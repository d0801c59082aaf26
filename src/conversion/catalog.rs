//! Hormone catalog types and built-in reference data
//!
//! Provides the hormone/unit/reference-range data model and the built-in
//! catalog of hormones the converter supports.

use serde::{Deserialize, Serialize};

/// Identifier of the hormone used when a caller does not pick one
pub const DEFAULT_HORMONE: &str = "estradiol";

/// Category of a hormone measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Routinely reported on lab sheets; preferred when picking a default target unit
    Common,
    /// Valid but less frequently reported
    Uncommon,
}

impl UnitCategory {
    /// Get the display string for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitCategory::Common => "common",
            UnitCategory::Uncommon => "uncommon",
        }
    }
}

/// A measurement unit for a hormone
///
/// The multiplier expresses how many base-unit quantities correspond to one
/// unit of this symbol: `base_value = value * multiplier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Human-readable unit name
    pub name: String,
    /// Unit symbol, unique within its owning hormone
    pub symbol: String,
    /// Conversion factor to the hormone's base unit
    pub multiplier: f64,
    /// Category used for default target-unit selection
    pub category: UnitCategory,
}

/// Severity tag attached to a reference range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeColor {
    Info,
    Success,
    Warning,
    Error,
}

impl RangeColor {
    /// Get the display string for this color tag
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeColor::Info => "info",
            RangeColor::Success => "success",
            RangeColor::Warning => "warning",
            RangeColor::Error => "error",
        }
    }

    /// RGB color used when rendering the range in charts and reports
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            RangeColor::Info => (59, 130, 246),
            RangeColor::Success => (34, 197, 94),
            RangeColor::Warning => (245, 158, 11),
            RangeColor::Error => (239, 68, 68),
        }
    }
}

/// Icon classification for a reference range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeIcon {
    Male,
    Female,
    Target,
    Warning,
    Error,
}

impl RangeIcon {
    /// Get the display string for this icon tag
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeIcon::Male => "male",
            RangeIcon::Female => "female",
            RangeIcon::Target => "target",
            RangeIcon::Warning => "warning",
            RangeIcon::Error => "error",
        }
    }
}

/// Citation backing a reference range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSource {
    /// Name of the cited source
    pub name: String,
    /// Link to the cited source
    pub url: String,
}

impl RangeSource {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// A labeled clinical reference interval for a hormone
///
/// An infinite `max` denotes an open upper bound ("300 and above").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRange {
    /// Human-readable label (e.g. "Male reference range")
    pub label: String,
    /// Lower bound in `unit`
    pub min: f64,
    /// Upper bound in `unit`; `f64::INFINITY` means no upper bound
    pub max: f64,
    /// Symbol of the unit the bounds are expressed in
    pub unit: String,
    /// Optional free-text note shown alongside the range
    pub description: Option<String>,
    /// Severity tag for presentation
    pub color: RangeColor,
    /// Icon classification for presentation
    pub icon: RangeIcon,
    /// Citation for the range data
    pub source: RangeSource,
}

/// A hormone with its unit system and clinical reference ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hormone {
    /// Stable identifier (e.g. "estradiol")
    pub id: String,
    /// Display name (e.g. "Estradiol (E2)")
    pub name: String,
    /// Symbol of the base unit all multipliers pivot through
    pub base_unit: String,
    /// Molecular weight in g/mol, informational only
    pub molecular_weight: Option<f64>,
    /// Units this hormone can be expressed in
    pub units: Vec<Unit>,
    /// Clinical reference ranges
    pub ranges: Vec<ReferenceRange>,
}

impl Hormone {
    /// Look up a unit by its symbol
    pub fn find_unit(&self, symbol: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.symbol == symbol)
    }
}

/// Immutable table of supported hormones
///
/// Built once at startup and passed by reference into the conversion engine
/// and the tool layer.
#[derive(Debug, Clone)]
pub struct HormoneCatalog {
    hormones: Vec<Hormone>,
}

impl HormoneCatalog {
    /// Build the catalog of built-in hormones
    pub fn builtin() -> Self {
        Self {
            hormones: vec![
                estradiol(),
                testosterone(),
                prolactin(),
                progesterone(),
                fsh(),
                lh(),
            ],
        }
    }

    /// Look up a hormone by identifier
    pub fn get(&self, id: &str) -> Option<&Hormone> {
        self.hormones.iter().find(|h| h.id == id)
    }

    /// All hormones in catalog order
    pub fn hormones(&self) -> &[Hormone] {
        &self.hormones
    }
}

fn unit(name: &str, symbol: &str, multiplier: f64, category: UnitCategory) -> Unit {
    Unit {
        name: name.to_string(),
        symbol: symbol.to_string(),
        multiplier,
        category,
    }
}

#[allow(clippy::too_many_arguments)]
fn range(
    label: &str,
    min: f64,
    max: f64,
    unit: &str,
    description: Option<&str>,
    color: RangeColor,
    icon: RangeIcon,
    source: &RangeSource,
) -> ReferenceRange {
    ReferenceRange {
        label: label.to_string(),
        min,
        max,
        unit: unit.to_string(),
        description: description.map(|d| d.to_string()),
        color,
        icon,
        source: source.clone(),
    }
}

fn monitoring_source() -> RangeSource {
    RangeSource::new(
        "MtF.wiki hormone monitoring",
        "https://mtf.wiki/zh-cn/docs/medicine/monitoring",
    )
}

fn estradiol() -> Hormone {
    let monitoring = monitoring_source();
    let gaht_guide = RangeSource::new(
        "MtF.wiki GAHT guide",
        "https://mtf.wiki/zh-cn/docs/medicine/hrt",
    );
    let safety_guide = RangeSource::new(
        "MtF.wiki safety guide",
        "https://mtf.wiki/zh-cn/docs/medicine/safety",
    );

    Hormone {
        id: "estradiol".to_string(),
        name: "Estradiol (E2)".to_string(),
        base_unit: "pg/mL".to_string(),
        molecular_weight: Some(272.38),
        units: vec![
            unit("Picograms per milliliter", "pg/mL", 1.0, UnitCategory::Common),
            unit("Nanograms per deciliter", "ng/dL", 10.0, UnitCategory::Uncommon),
            unit("Picomoles per liter", "pmol/L", 1.0 / 3.671, UnitCategory::Common),
        ],
        ranges: vec![
            range(
                "Male reference range",
                8.0,
                35.0,
                "pg/mL",
                None,
                RangeColor::Info,
                RangeIcon::Male,
                &monitoring,
            ),
            range(
                "GAHT target range",
                100.0,
                200.0,
                "pg/mL",
                Some("Recommended range under GAHT"),
                RangeColor::Success,
                RangeIcon::Target,
                &gaht_guide,
            ),
            range(
                "Female follicular phase",
                30.0,
                100.0,
                "pg/mL",
                Some("Follicular phase range for cisgender women"),
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "High level risk",
                300.0,
                f64::INFINITY,
                "pg/mL",
                Some("Possible thrombosis risk"),
                RangeColor::Error,
                RangeIcon::Error,
                &safety_guide,
            ),
        ],
    }
}

fn testosterone() -> Hormone {
    let monitoring = monitoring_source();
    let gaht_guide = RangeSource::new(
        "MtF.wiki GAHT guide",
        "https://mtf.wiki/zh-cn/docs/medicine/hrt",
    );

    Hormone {
        id: "testosterone".to_string(),
        name: "Testosterone (T)".to_string(),
        base_unit: "ng/dL".to_string(),
        molecular_weight: Some(288.43),
        units: vec![
            unit("Nanograms per deciliter", "ng/dL", 1.0, UnitCategory::Common),
            unit("Nanomoles per liter", "nmol/L", 28.84, UnitCategory::Common),
            unit("Picograms per milliliter", "pg/mL", 0.1, UnitCategory::Uncommon),
        ],
        ranges: vec![
            range(
                "Male reference range",
                264.0,
                916.0,
                "ng/dL",
                None,
                RangeColor::Info,
                RangeIcon::Male,
                &monitoring,
            ),
            range(
                "Female reference range",
                10.0,
                55.0,
                "ng/dL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "GAHT target range",
                0.0,
                50.0,
                "ng/dL",
                Some("Recommended range under GAHT"),
                RangeColor::Success,
                RangeIcon::Target,
                &gaht_guide,
            ),
        ],
    }
}

fn prolactin() -> Hormone {
    let monitoring = monitoring_source();
    let clinical = RangeSource::new(
        "Clinical laboratory standard",
        "https://zh.wikipedia.org/wiki/泌乳素",
    );

    Hormone {
        id: "prolactin".to_string(),
        name: "Prolactin (PRL)".to_string(),
        base_unit: "ng/mL".to_string(),
        molecular_weight: None,
        units: vec![
            unit("Nanograms per milliliter", "ng/mL", 1.0, UnitCategory::Common),
            unit("Milli-international units per liter", "mIU/L", 47.17, UnitCategory::Common),
            unit("Micrograms per liter", "μg/L", 1.0, UnitCategory::Uncommon),
        ],
        ranges: vec![
            range(
                "Male reference range",
                2.0,
                18.0,
                "ng/mL",
                None,
                RangeColor::Info,
                RangeIcon::Male,
                &monitoring,
            ),
            range(
                "Female reference range",
                4.79,
                23.3,
                "ng/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "Mild elevation",
                30.0,
                100.0,
                "ng/mL",
                Some("May warrant attention"),
                RangeColor::Warning,
                RangeIcon::Warning,
                &clinical,
            ),
            range(
                "Significant elevation",
                100.0,
                f64::INFINITY,
                "ng/mL",
                Some("Medical evaluation recommended"),
                RangeColor::Error,
                RangeIcon::Error,
                &clinical,
            ),
        ],
    }
}

fn progesterone() -> Hormone {
    let monitoring = monitoring_source();

    Hormone {
        id: "progesterone".to_string(),
        name: "Progesterone (P4)".to_string(),
        base_unit: "ng/mL".to_string(),
        molecular_weight: Some(314.46),
        units: vec![
            unit("Nanograms per milliliter", "ng/mL", 1.0, UnitCategory::Common),
            unit("Nanomoles per liter", "nmol/L", 0.31446, UnitCategory::Common),
            unit("Nanograms per deciliter", "ng/dL", 0.01, UnitCategory::Uncommon),
        ],
        ranges: vec![
            range(
                "Male reference range",
                0.1,
                1.0,
                "ng/mL",
                None,
                RangeColor::Info,
                RangeIcon::Male,
                &monitoring,
            ),
            range(
                "Female follicular phase",
                0.1,
                1.5,
                "ng/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "Female luteal phase",
                2.0,
                25.0,
                "ng/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
        ],
    }
}

fn fsh() -> Hormone {
    let monitoring = monitoring_source();

    Hormone {
        id: "fsh".to_string(),
        name: "Follicle-stimulating hormone (FSH)".to_string(),
        base_unit: "mIU/mL".to_string(),
        molecular_weight: None,
        units: vec![
            unit("Milli-international units per milliliter", "mIU/mL", 1.0, UnitCategory::Common),
            unit("International units per liter", "IU/L", 1000.0, UnitCategory::Uncommon),
            unit("Milli-international units per liter", "mIU/L", 0.001, UnitCategory::Uncommon),
        ],
        ranges: vec![
            range(
                "Male reference range",
                1.8,
                11.2,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Male,
                &monitoring,
            ),
            range(
                "Female follicular phase",
                1.8,
                11.2,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "Postmenopausal",
                30.0,
                120.0,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
        ],
    }
}

fn lh() -> Hormone {
    let monitoring = monitoring_source();

    Hormone {
        id: "lh".to_string(),
        name: "Luteinizing hormone (LH)".to_string(),
        base_unit: "mIU/mL".to_string(),
        molecular_weight: None,
        units: vec![
            unit("Milli-international units per milliliter", "mIU/mL", 1.0, UnitCategory::Common),
            unit("International units per liter", "IU/L", 1000.0, UnitCategory::Uncommon),
            unit("Milli-international units per liter", "mIU/L", 0.001, UnitCategory::Uncommon),
        ],
        ranges: vec![
            range(
                "Male reference range",
                2.0,
                9.0,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Male,
                &monitoring,
            ),
            range(
                "Female follicular phase",
                2.0,
                9.0,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "Female luteal phase",
                2.0,
                11.0,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
            range(
                "Postmenopausal",
                20.0,
                70.0,
                "mIU/mL",
                None,
                RangeColor::Info,
                RangeIcon::Female,
                &monitoring,
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = HormoneCatalog::builtin();
        let ids: Vec<&str> = catalog.hormones().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["estradiol", "testosterone", "prolactin", "progesterone", "fsh", "lh"]
        );
    }

    #[test]
    fn test_get_by_id() {
        let catalog = HormoneCatalog::builtin();
        assert!(catalog.get("estradiol").is_some());
        assert!(catalog.get("cortisol").is_none());
        // Lookup is case-sensitive
        assert!(catalog.get("Estradiol").is_none());
    }

    #[test]
    fn test_default_hormone_exists() {
        let catalog = HormoneCatalog::builtin();
        assert!(catalog.get(DEFAULT_HORMONE).is_some());
    }

    #[test]
    fn test_base_unit_has_identity_multiplier() {
        let catalog = HormoneCatalog::builtin();
        for hormone in catalog.hormones() {
            let base = hormone
                .find_unit(&hormone.base_unit)
                .unwrap_or_else(|| panic!("{}: base unit missing", hormone.id));
            assert_eq!(base.multiplier, 1.0, "{}: base multiplier", hormone.id);
        }
    }

    #[test]
    fn test_all_multipliers_positive() {
        let catalog = HormoneCatalog::builtin();
        for hormone in catalog.hormones() {
            for unit in &hormone.units {
                assert!(
                    unit.multiplier > 0.0,
                    "{} {}: multiplier not positive",
                    hormone.id,
                    unit.symbol
                );
            }
        }
    }

    #[test]
    fn test_unit_symbols_unique_per_hormone() {
        let catalog = HormoneCatalog::builtin();
        for hormone in catalog.hormones() {
            for (i, unit) in hormone.units.iter().enumerate() {
                let duplicates = hormone.units[i + 1..]
                    .iter()
                    .filter(|u| u.symbol == unit.symbol)
                    .count();
                assert_eq!(duplicates, 0, "{} {}: duplicate symbol", hormone.id, unit.symbol);
            }
        }
    }

    #[test]
    fn test_range_units_resolve() {
        let catalog = HormoneCatalog::builtin();
        for hormone in catalog.hormones() {
            for range in &hormone.ranges {
                assert!(
                    hormone.find_unit(&range.unit).is_some(),
                    "{} '{}': range unit {} not in unit list",
                    hormone.id,
                    range.label,
                    range.unit
                );
            }
        }
    }

    #[test]
    fn test_range_bounds_ordered() {
        let catalog = HormoneCatalog::builtin();
        for hormone in catalog.hormones() {
            for range in &hormone.ranges {
                assert!(
                    range.min <= range.max,
                    "{} '{}': min > max",
                    hormone.id,
                    range.label
                );
                assert!(range.min.is_finite(), "{} '{}': min must be finite", hormone.id, range.label);
            }
        }
    }

    #[test]
    fn test_prolactin_has_numerically_identical_pair() {
        let catalog = HormoneCatalog::builtin();
        let prolactin = catalog.get("prolactin").unwrap();
        let ng_ml = prolactin.find_unit("ng/mL").unwrap();
        let ug_l = prolactin.find_unit("μg/L").unwrap();
        assert_eq!(ng_ml.multiplier, ug_l.multiplier);
    }

    #[test]
    fn test_open_ended_ranges() {
        let catalog = HormoneCatalog::builtin();
        let estradiol = catalog.get("estradiol").unwrap();
        let high_risk = estradiol
            .ranges
            .iter()
            .find(|r| r.max.is_infinite())
            .expect("estradiol should carry an open-ended range");
        assert_eq!(high_risk.min, 300.0);
        assert_eq!(high_risk.color, RangeColor::Error);
    }
}
