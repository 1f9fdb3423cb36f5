//! The host document: a source file with the knowledge base embedded as a
//! JSON object literal after a fixed marker.
//!
//! Only the literal is ever rewritten. Everything before its opening brace
//! and after the last closing brace in the file is passed through byte for
//! byte.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use violation_types::ViolationDatabase;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct HostDocument {
    text: String,
    /// Byte range of the literal, braces included
    span: Range<usize>,
}

impl HostDocument {
    /// Find the literal that follows `marker`. The literal opens at the
    /// marker's own trailing `{` (or the first `{` after it) and closes at
    /// the last `}` in the document.
    pub fn locate(text: String, marker: &str) -> Result<Self> {
        let at = text
            .find(marker)
            .ok_or_else(|| Error::MarkerNotFound(marker.to_string()))?;

        let start = match marker.rfind('{') {
            Some(offset) => at + offset,
            None => {
                let after = at + marker.len();
                text[after..]
                    .find('{')
                    .map(|offset| after + offset)
                    .ok_or(Error::UnterminatedLiteral)?
            }
        };

        let end = match text.rfind('}') {
            Some(close) if close > start => close + 1,
            _ => return Err(Error::UnterminatedLiteral),
        };

        Ok(Self {
            text,
            span: start..end,
        })
    }

    pub fn literal(&self) -> &str {
        &self.text[self.span.clone()]
    }

    pub fn parse_database(&self) -> Result<ViolationDatabase> {
        serde_json::from_str(self.literal()).map_err(Error::InvalidDatabase)
    }

    /// The whole document with the literal replaced by `db`, pretty-printed
    /// with two-space indentation.
    pub fn render(&self, db: &ViolationDatabase) -> Result<String> {
        let literal = serde_json::to_string_pretty(db)?;
        let mut out = String::with_capacity(self.text.len() + literal.len() / 8);
        out.push_str(&self.text[..self.span.start]);
        out.push_str(&literal);
        out.push_str(&self.text[self.span.end..]);
        Ok(out)
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a sibling temp file, then rename it over `path`. A failure at
/// any point leaves the original file as it was.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = temp_sibling(path);
    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp, contents).map_err(write_err)?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(source));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MARKER;

    const HOST: &str = "import type { ViolationData } from './types';\n\n\
export const VIOLATION_DATA: ViolationData = {\"chartName\": \"CVOR\", \"categories\": {\"a\": {\"label\": \"A\", \"items\": []}}};\n\
// trailing comment\n";

    #[test]
    fn test_locate_span() {
        let doc = HostDocument::locate(HOST.to_string(), DEFAULT_MARKER).unwrap();
        assert!(doc.literal().starts_with("{\"chartName\""));
        assert!(doc.literal().ends_with("}}}"));
    }

    #[test]
    fn test_render_passes_surroundings_through() {
        let doc = HostDocument::locate(HOST.to_string(), DEFAULT_MARKER).unwrap();
        let db = doc.parse_database().unwrap();
        let out = doc.render(&db).unwrap();

        assert!(out.starts_with(
            "import type { ViolationData } from './types';\n\n\
export const VIOLATION_DATA: ViolationData = {\n  \"chartName\": \"CVOR\","
        ));
        assert!(out.ends_with("\n};\n// trailing comment\n"));

        let again = HostDocument::locate(out, DEFAULT_MARKER).unwrap();
        assert_eq!(again.parse_database().unwrap(), db);
    }

    #[test]
    fn test_marker_without_brace() {
        let text = "const DB =\n  {\"categories\": {}}\n".to_string();
        let doc = HostDocument::locate(text, "const DB =").unwrap();
        assert_eq!(doc.literal(), "{\"categories\": {}}");
    }

    #[test]
    fn test_fatal_document_errors() {
        let missing = HostDocument::locate("const X = {};".into(), DEFAULT_MARKER);
        assert!(matches!(missing, Err(Error::MarkerNotFound(_))));

        let open = format!("{DEFAULT_MARKER} \"a\": 1");
        assert!(matches!(
            HostDocument::locate(open, DEFAULT_MARKER),
            Err(Error::UnterminatedLiteral)
        ));

        let bad = format!("{DEFAULT_MARKER} not json }};");
        let doc = HostDocument::locate(bad, DEFAULT_MARKER).unwrap();
        assert!(matches!(doc.parse_database(), Err(Error::InvalidDatabase(_))));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("violations.data.ts");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().join("nope.ts")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
