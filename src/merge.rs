use tracing::debug;
use violation_types::{
    CanadaEnforcement, CanadaReference, CvorClassification, CvorPoints, EnforcementDescriptions,
    EnforcementPoints, RISK_HIGH, RISK_LOWER, RISK_MODERATE, RegulatoryCodes, SeverityWeight,
    ViolationDatabase, ViolationItem,
};

use crate::acts;
use crate::config::{BULK_IMPORT_SOURCE, ImportConfig};
use crate::matcher::{self, ItemRef};
use crate::stats;
use crate::types::ParsedOffenceRecord;

// ── Risk derived from CVOR points ──────────────────────────────────────

/// Risk classification given to a synthesized item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskProfile {
    pub category: u8,
    pub crash_likelihood: u32,
    /// Used for both driver and carrier weight
    pub severity: u32,
}

pub fn risk_profile(points: u8) -> RiskProfile {
    let (category, crash_likelihood, severity) = match points {
        5.. => (RISK_HIGH, 80, 10),
        3..=4 => (RISK_MODERATE, 40, 5),
        1..=2 => (RISK_LOWER, 15, 3),
        0 => (RISK_LOWER, 5, 1),
    };
    RiskProfile {
        category,
        crash_likelihood,
        severity,
    }
}

// ── Merge outcome ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Existing item enriched in place
    Matched(ItemRef),
    /// New item appended to the catch-all category
    Added(ItemRef),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub matched: usize,
    pub added: usize,
}

// ── Sticky field helpers ───────────────────────────────────────────────
//
// Existing values win unless absent, empty or zero.

fn fill_text(slot: &mut Option<String>, value: &str) {
    if slot.as_deref().is_none_or(str::is_empty) {
        *slot = Some(value.to_string());
    }
}

fn fill_number(slot: &mut Option<u32>, value: u32) {
    if slot.is_none_or(|n| n == 0) {
        *slot = Some(value);
    }
}

/// Merge one record into the database. Statistics are left stale; call
/// `stats::recompute` (or use `merge_all`) afterwards.
pub fn merge_record(
    db: &mut ViolationDatabase,
    record: &ParsedOffenceRecord,
    config: &ImportConfig,
) -> MergeOutcome {
    match matcher::find_match(db, &record.code) {
        Some(at) => {
            let item = &mut db.categories[at.category].items[at.item];
            debug!(code = %record.code, id = %item.id, "matched existing item");
            enrich(item, record);
            MergeOutcome::Matched(at)
        }
        None => {
            let id = unique_id(db, &record.code);
            debug!(code = %record.code, %id, "adding new item");
            let item = synthesize(id, record, config);
            let category = db.ensure_category(&config.catch_all_key, &config.catch_all_label);
            let items = &mut db.categories[category].items;
            items.push(item);
            MergeOutcome::Added(ItemRef {
                category,
                item: items.len() - 1,
            })
        }
    }
}

/// Merge every record in order, then recompute all statistics.
pub fn merge_all(
    db: &mut ViolationDatabase,
    records: &[ParsedOffenceRecord],
    config: &ImportConfig,
) -> MergeSummary {
    let mut summary = MergeSummary::default();
    for record in records {
        match merge_record(db, record, config) {
            MergeOutcome::Matched(_) => summary.matched += 1,
            MergeOutcome::Added(_) => summary.added += 1,
        }
    }
    stats::recompute(db);
    summary
}

fn enrich(item: &mut ViolationItem, record: &ParsedOffenceRecord) {
    let points = u32::from(record.points);
    let ce = item.canada_enforcement.get_or_insert_with(CanadaEnforcement::default);

    fill_text(&mut ce.act, &record.act);
    fill_text(&mut ce.section, &record.code);
    fill_text(&mut ce.ccmta_code, &record.ccmta_code);
    fill_text(&mut ce.category, record.enforcement_category());
    ce.code = Some(record.code.clone());

    let descriptions = ce.descriptions.get_or_insert_with(EnforcementDescriptions::default);
    fill_text(&mut descriptions.full, &record.description);
    descriptions.conviction = Some(record.description.clone());

    let ce_points = ce.points.get_or_insert_with(EnforcementPoints::default);
    fill_number(&mut ce_points.nsc, points);
    let cvor = ce_points.cvor.get_or_insert_with(CvorPoints::default);
    fill_text(&mut cvor.raw, &record.points.to_string());
    fill_number(&mut cvor.min, points);
    fill_number(&mut cvor.max, points);

    let class = ce
        .cvor_classification
        .get_or_insert_with(CvorClassification::default);
    fill_text(&mut class.conviction_type, &record.conviction_type);
    fill_text(&mut class.alternative_group, &record.alternative_group);
}

fn synthesize(id: String, record: &ParsedOffenceRecord, config: &ImportConfig) -> ViolationItem {
    let risk = risk_profile(record.points);
    let points = u32::from(record.points);

    ViolationItem {
        id,
        violation_code: Some(record.code.clone()),
        violation_description: Some(record.description.clone()),
        violation_group: Some(acts::violation_group(&record.act).to_string()),
        severity_weight: Some(SeverityWeight {
            driver: risk.severity,
            carrier: risk.severity,
        }),
        crash_likelihood_percent: Some(Some(risk.crash_likelihood)),
        driver_risk_category: Some(risk.category),
        in_dsms: Some(false),
        is_oos: Some(false),
        regulatory_codes: Some(RegulatoryCodes {
            usa: Vec::new(),
            canada: Some(vec![CanadaReference {
                authority: record.act.clone(),
                reference: vec![record.code.clone()],
                description: record.description.clone(),
                province: Some(vec![config.province.clone()]),
                ..CanadaReference::default()
            }]),
            ..RegulatoryCodes::default()
        }),
        canada_enforcement: Some(CanadaEnforcement {
            act: Some(record.act.clone()),
            section: Some(record.code.clone()),
            code: Some(record.code.clone()),
            ccmta_code: Some(record.ccmta_code.clone()),
            category: Some(record.enforcement_category().to_string()),
            descriptions: Some(EnforcementDescriptions {
                full: Some(record.description.clone()),
                conviction: Some(record.description.clone()),
                ..EnforcementDescriptions::default()
            }),
            points: Some(EnforcementPoints {
                nsc: Some(points),
                cvor: Some(CvorPoints {
                    raw: Some(record.points.to_string()),
                    min: Some(points),
                    max: Some(points),
                    ..CvorPoints::default()
                }),
                ..EnforcementPoints::default()
            }),
            cvor_classification: Some(CvorClassification {
                conviction_type: Some(record.conviction_type.clone()),
                alternative_group: Some(record.alternative_group.clone()),
                ..CvorClassification::default()
            }),
            ..CanadaEnforcement::default()
        }),
        source: Some(BULK_IMPORT_SOURCE.to_string()),
        ..ViolationItem::default()
    }
}

/// `cvor_` + code slug, suffixed `_2`, `_3`, ... until unused.
/// "HTA 107 8 A" → "cvor_hta_107_8_a".
fn unique_id(db: &ViolationDatabase, code: &str) -> String {
    let slug: String = code
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let base = format!("cvor_{slug}");
    let mut id = base.clone();
    let mut n = 1;
    while db.contains_id(&id) {
        n += 1;
        id = format!("{base}_{n}");
    }
    id
}
