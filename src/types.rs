use serde::{Deserialize, Serialize};

// ── C/D/B column ───────────────────────────────────────────────────

/// Which register the conviction counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassFlag {
    B,
    C,
    D,
}

impl ClassFlag {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }
}

// ── SPD/WT column ──────────────────────────────────────────────────

/// Optional speed / weight qualifier printed before the class flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedWeight {
    #[serde(rename = "SPD")]
    Speed,
    #[serde(rename = "WT1")]
    WeightOne,
    #[serde(rename = "WT2")]
    WeightTwo,
}

impl SpeedWeight {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "SPD" => Some(Self::Speed),
            "WT1" => Some(Self::WeightOne),
            "WT2" => Some(Self::WeightTwo),
            _ => None,
        }
    }
}

// ── One parsed offence line ────────────────────────────────────────

/// An offence-table row split into its code, description and trailing
/// classification columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOffenceRecord {
    /// Act prefix plus section/subsection tokens, e.g. "HTA 107 8 A"
    pub code: String,
    /// Free text, verbatim. May be empty.
    pub description: String,
    /// CVOR points, 0–5
    pub points: u8,
    /// Four digits
    pub ccmta_code: String,
    /// `S` (safety) or `A` (administrative); kept verbatim when the source is noisy
    pub safety_code: String,
    /// Two digits, as is `alternative_group`
    pub conviction_type: String,
    pub alternative_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_weight_qualifier: Option<SpeedWeight>,
    pub class_flag: ClassFlag,
    /// Statute name resolved from the act prefix
    pub act: String,
    pub original_line: String,
}

impl ParsedOffenceRecord {
    /// Enforcement category label derived from the safety code.
    pub fn enforcement_category(&self) -> &'static str {
        if self.safety_code == "S" {
            "Safety"
        } else {
            "Administrative"
        }
    }
}
