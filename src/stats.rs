use violation_types::{
    CategoryStats, OverallStats, RISK_HIGH, RISK_LOWER, RISK_MODERATE, ViolationDatabase,
    ViolationItem,
};

/// Count items by `driverRiskCategory`.
pub fn category_stats(items: &[ViolationItem]) -> CategoryStats {
    let count = |risk: u8| {
        items
            .iter()
            .filter(|item| item.driver_risk_category == Some(risk))
            .count()
    };
    CategoryStats {
        total: items.len(),
        high_risk: count(RISK_HIGH),
        moderate_risk: count(RISK_MODERATE),
        lower_risk: count(RISK_LOWER),
    }
}

/// Recompute every category's `_stats` and the `_overallStats` rollup from
/// scratch. Always a full rescan, so counters cannot drift from the items.
pub fn recompute(db: &mut ViolationDatabase) -> OverallStats {
    let mut overall = OverallStats::default();

    for category in &mut db.categories {
        category.stats = category_stats(&category.items);
        overall.total_violations += category.stats.total;
        overall.high_risk += category.stats.high_risk;
        overall.moderate_risk += category.stats.moderate_risk;
        overall.lower_risk += category.stats.lower_risk;
    }

    db.overall_stats = Some(overall);
    overall
}
