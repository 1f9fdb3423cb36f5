//! Violation knowledge-base schema shared with the violation screens.
//!
//! Every struct keeps the keys it does not know about in a flattened
//! `extra` map, so a load/save cycle only touches the fields the importer
//! actually owns.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// ── Risk levels ──────────────────────────────────────────────────────────

pub const RISK_HIGH: u8 = 1;
pub const RISK_MODERATE: u8 = 2;
pub const RISK_LOWER: u8 = 3;

// ── Stats ────────────────────────────────────────────────────────────────

/// Per-category counters, derived from the category's items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub high_risk: usize,
    #[serde(default)]
    pub moderate_risk: usize,
    #[serde(default)]
    pub lower_risk: usize,
}

/// Rollup across every category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    #[serde(default)]
    pub total_violations: usize,
    #[serde(default)]
    pub high_risk: usize,
    #[serde(default)]
    pub moderate_risk: usize,
    #[serde(default)]
    pub lower_risk: usize,
}

// ── Regulatory references ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanadaReference {
    #[serde(default)]
    pub authority: String,
    #[serde(default)]
    pub reference: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryCodes {
    /// FMCSA references; never written by the importer.
    #[serde(default)]
    pub usa: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canada: Option<Vec<CanadaReference>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Canadian enforcement block ───────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnforcementDescriptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conviction: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// CVOR point range as printed in the offence table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvorPoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnforcementPoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsc: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvor: Option<CvorPoints>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvorClassification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conviction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_group: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanadaEnforcement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccmta_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<EnforcementDescriptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<EnforcementPoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvor_classification: Option<CvorClassification>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Violation item ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityWeight {
    #[serde(default)]
    pub driver: u32,
    #[serde(default)]
    pub carrier: u32,
}

/// Item fields are optional so that a key absent from the document stays
/// absent when it is written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_weight: Option<SeverityWeight>,
    /// Outer `None`: key absent. `Some(None)`: an explicit `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub crash_likelihood_percent: Option<Option<u32>>,
    /// 1 = high, 2 = moderate, 3 = lower.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_risk_category: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_dsms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_oos: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_codes: Option<RegulatoryCodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canada_enforcement: Option<CanadaEnforcement>,
    /// Provenance tag, e.g. `cvor_bulk_import`.
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A key that is present, even as `null`, deserializes to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ── Category ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationCategory {
    /// Key under `categories`; carried by the ordered map, not the body.
    #[serde(skip)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "_stats", default)]
    pub stats: CategoryStats,
    #[serde(default, deserialize_with = "items_without_nulls")]
    pub items: Vec<ViolationItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ViolationCategory {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: Some(label.to_string()),
            ..Self::default()
        }
    }
}

/// Hand-edited data occasionally leaves `null` holes in an items array.
fn items_without_nulls<'de, D>(deserializer: D) -> Result<Vec<ViolationItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<Option<ViolationItem>> = Vec::deserialize(deserializer)?;
    Ok(items.into_iter().flatten().collect())
}

// ── Whole database ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViolationDatabase {
    /// `chartName`, `schemaVersion`, `riskCategories`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Categories in document order.
    #[serde(default, with = "ordered_categories")]
    pub categories: Vec<ViolationCategory>,
    #[serde(
        rename = "_overallStats",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_stats: Option<OverallStats>,
}

impl ViolationDatabase {
    pub fn category(&self, key: &str) -> Option<&ViolationCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn category_index(&self, key: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.key == key)
    }

    /// Index of the category `key`, appending an empty one if it is missing.
    pub fn ensure_category(&mut self, key: &str, label: &str) -> usize {
        match self.category_index(key) {
            Some(idx) => idx,
            None => {
                self.categories.push(ViolationCategory::new(key, label));
                self.categories.len() - 1
            }
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &ViolationItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.items().any(|item| item.id == id)
    }
}

/// `categories` is a JSON object whose key order is meaningful (matching
/// walks it front to back), so it is held as a `Vec` and mapped by hand.
mod ordered_categories {
    use super::*;

    pub fn serialize<S>(categories: &[ViolationCategory], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(categories.len()))?;
        for category in categories {
            map.serialize_entry(&category.key, category)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<ViolationCategory>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CategoriesVisitor)
    }

    struct CategoriesVisitor;

    impl<'de> Visitor<'de> for CategoriesVisitor {
        type Value = Vec<ViolationCategory>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of category key to category")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut categories = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, mut category)) =
                access.next_entry::<String, ViolationCategory>()?
            {
                category.key = key;
                categories.push(category);
            }
            Ok(categories)
        }
    }
}
