use tracing::info;
use violation_types::{ViolationDatabase, ViolationItem};

use crate::config::BULK_IMPORT_SOURCE;
use crate::stats;

/// An enforcement code longer than this swallowed description text.
pub const MAX_ENFORCEMENT_CODE_LEN: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    /// (category key, items removed) for every category that lost items
    pub removed: Vec<(String, usize)>,
    /// Items whose broken `canadaEnforcement` block was dropped
    pub repaired: usize,
}

impl CleanupSummary {
    pub fn total_removed(&self) -> usize {
        self.removed.iter().map(|(_, n)| n).sum()
    }
}

fn is_bulk_import(item: &ViolationItem) -> bool {
    item.source.as_deref() == Some(BULK_IMPORT_SOURCE)
}

fn has_broken_enforcement_code(item: &ViolationItem) -> bool {
    item.canada_enforcement
        .as_ref()
        .and_then(|ce| ce.code.as_deref())
        .is_some_and(|code| code.chars().count() > MAX_ENFORCEMENT_CODE_LEN)
}

/// Undo previous imports: drop every synthesized item, reset enforcement
/// blocks left by a bad parse so the next merge repopulates them, then
/// recompute statistics.
pub fn purge_bulk_imports(db: &mut ViolationDatabase) -> CleanupSummary {
    let mut summary = CleanupSummary::default();

    for category in &mut db.categories {
        let before = category.items.len();
        category.items.retain(|item| !is_bulk_import(item));
        let removed = before - category.items.len();
        if removed > 0 {
            info!(category = %category.key, removed, "removed bulk-imported items");
            summary.removed.push((category.key.clone(), removed));
        }

        for item in &mut category.items {
            if has_broken_enforcement_code(item) {
                item.canada_enforcement = None;
                summary.repaired += 1;
            }
        }
    }

    stats::recompute(db);
    summary
}
