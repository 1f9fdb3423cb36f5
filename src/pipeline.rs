//! Whole-run drivers over in-memory text. `main` only adds file I/O and
//! reporting on top of these.

use violation_types::{OverallStats, ViolationDatabase};

use crate::cleanup::{self, CleanupSummary};
use crate::config::ImportConfig;
use crate::document::HostDocument;
use crate::error::Result;
use crate::merge::{self, MergeSummary};
use crate::parser::{OffenceParser, ParseReport};

#[derive(Debug)]
pub struct ImportOutcome {
    pub report: ParseReport,
    pub summary: MergeSummary,
    pub overall: OverallStats,
    pub database: ViolationDatabase,
    /// Host document with the updated literal
    pub rendered: String,
}

#[derive(Debug)]
pub struct CleanupOutcome {
    pub summary: CleanupSummary,
    pub overall: OverallStats,
    pub database: ViolationDatabase,
    pub rendered: String,
}

/// Parse `table`, merge it into the database embedded in `document` and
/// render the new document. Nothing is returned unless every step succeeds.
pub fn import_into(document: String, table: &str, config: &ImportConfig) -> Result<ImportOutcome> {
    let doc = HostDocument::locate(document, &config.marker)?;
    let mut database = doc.parse_database()?;

    let report = OffenceParser::with_rule(config.code_rule()).parse_text(table);
    let summary = merge::merge_all(&mut database, &report.records, config);
    let overall = database.overall_stats.unwrap_or_default();
    let rendered = doc.render(&database)?;

    Ok(ImportOutcome {
        report,
        summary,
        overall,
        database,
        rendered,
    })
}

/// Remove earlier bulk imports from the database embedded in `document`.
pub fn cleanup(document: String, marker: &str) -> Result<CleanupOutcome> {
    let doc = HostDocument::locate(document, marker)?;
    let mut database = doc.parse_database()?;

    let summary = cleanup::purge_bulk_imports(&mut database);
    let overall = database.overall_stats.unwrap_or_default();
    let rendered = doc.render(&database)?;

    Ok(CleanupOutcome {
        summary,
        overall,
        database,
        rendered,
    })
}
