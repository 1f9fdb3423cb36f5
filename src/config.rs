use std::env;
use std::path::PathBuf;

use crate::splitter::ShapeRule;

pub const DEFAULT_INPUT: &str = "raw-cvor.txt";
pub const DEFAULT_PARSED_OUTPUT: &str = "parsed-cvor.json";

/// Text preceding the database literal in the host document.
pub const DEFAULT_MARKER: &str = "export const VIOLATION_DATA: ViolationData = {";

/// Category that receives offences with no existing counterpart.
pub const CATCH_ALL_CATEGORY: &str = "canada_provincial";
pub const CATCH_ALL_LABEL: &str = "Canadian Provincial / Criminal Offenses";
pub const DEFAULT_PROVINCE: &str = "Ontario";

/// Single clause letters run `A..=J` in the published table.
pub const DEFAULT_LAST_CLAUSE_LETTER: char = 'J';

/// `_source` tag stamped on every synthesized item.
pub const BULK_IMPORT_SOURCE: &str = "cvor_bulk_import";

pub const DB_PATH_ENV: &str = "CVOR_DB_PATH";
pub const MARKER_ENV: &str = "CVOR_MARKER";

/// Knobs for one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub marker: String,
    pub catch_all_key: String,
    pub catch_all_label: String,
    /// Province listed on the Canadian reference of new items
    pub province: String,
    /// Highest single letter still read as part of an offence code
    pub last_clause_letter: char,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            catch_all_key: CATCH_ALL_CATEGORY.to_string(),
            catch_all_label: CATCH_ALL_LABEL.to_string(),
            province: DEFAULT_PROVINCE.to_string(),
            last_clause_letter: DEFAULT_LAST_CLAUSE_LETTER,
        }
    }
}

impl ImportConfig {
    /// Defaults, with the marker taken from `CVOR_MARKER` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(marker) = env::var(MARKER_ENV) {
            config.marker = marker;
        }
        config
    }

    /// Apply command-line overrides; flags win over the environment.
    pub fn with_overrides(mut self, marker: Option<String>, category: Option<String>) -> Self {
        if let Some(marker) = marker {
            self.marker = marker;
        }
        if let Some(category) = category {
            self.catch_all_key = category;
        }
        self
    }

    pub fn with_last_clause_letter(mut self, letter: Option<char>) -> Self {
        if let Some(letter) = letter {
            self.last_clause_letter = letter.to_ascii_uppercase();
        }
        self
    }

    /// Code/description boundary rule for this run.
    pub fn code_rule(&self) -> ShapeRule {
        ShapeRule::with_clause_letters('A'..=self.last_clause_letter)
    }
}

/// Database path from the `--db` flag, else `CVOR_DB_PATH`.
pub fn db_path(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| env::var(DB_PATH_ENV).ok().map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = ImportConfig::default()
            .with_overrides(Some("const DB = {".into()), Some("ontario".into()));
        assert_eq!(config.marker, "const DB = {");
        assert_eq!(config.catch_all_key, "ontario");
        assert_eq!(config.catch_all_label, CATCH_ALL_LABEL);
    }

    #[test]
    fn test_clause_letter_override() {
        use crate::splitter::CodeTokenRule;

        let rule = ImportConfig::default().code_rule();
        assert!(rule.is_code_token("J"));
        assert!(!rule.is_code_token("K"));

        let rule = ImportConfig::default()
            .with_last_clause_letter(Some('m'))
            .code_rule();
        assert!(rule.is_code_token("K"));
        assert!(rule.is_code_token("M"));
        assert!(!rule.is_code_token("N"));
    }

    #[test]
    fn test_explicit_db_path_wins() {
        let path = db_path(Some(PathBuf::from("violations.data.ts")));
        assert_eq!(path, Some(PathBuf::from("violations.data.ts")));
    }
}
