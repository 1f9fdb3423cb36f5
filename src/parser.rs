use tracing::{debug, warn};

use crate::acts;
use crate::error::Rejection;
use crate::fields;
use crate::lexer;
use crate::splitter::{self, CodeTokenRule, ShapeRule};
use crate::types::ParsedOffenceRecord;

/// A data line that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based
    pub line_number: usize,
    pub text: String,
    pub reason: Rejection,
}

/// Result of parsing a whole offence table.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Accepted rows, in input order
    pub records: Vec<ParsedOffenceRecord>,
    pub skipped: Vec<SkippedLine>,
    /// Header and blank lines
    pub ignored: usize,
    /// Rows recovered by the missing-ALT re-read
    pub shifted: usize,
    /// Rows whose description came out empty
    pub empty_descriptions: usize,
}

/// One accepted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub record: ParsedOffenceRecord,
    /// Recovered by the missing-ALT re-read
    pub shifted: bool,
}

/// Line → record transform. Stateless apart from the code-token rule.
#[derive(Debug, Clone, Default)]
pub struct OffenceParser<R = ShapeRule> {
    rule: R,
}

impl<R: CodeTokenRule> OffenceParser<R> {
    pub fn with_rule(rule: R) -> Self {
        Self { rule }
    }

    /// Parse one raw line. Header and blank lines are `Rejection::NotData`.
    pub fn parse_line(&self, line: &str) -> Result<ParsedLine, Rejection> {
        if !lexer::is_data_line(line) {
            return Err(Rejection::NotData);
        }

        let tokens = lexer::tokenize(line);
        let extraction = fields::extract(&tokens)?;
        let split = splitter::split(extraction.head, &self.rule)?;
        let f = extraction.fields;

        let record = ParsedOffenceRecord {
            code: split.code,
            description: split.description,
            points: f.points,
            ccmta_code: f.ccmta_code.to_string(),
            safety_code: f.safety_code.to_string(),
            conviction_type: f.conviction_type.to_string(),
            alternative_group: f.alternative_group.to_string(),
            speed_weight_qualifier: f.speed_weight,
            class_flag: f.class_flag,
            act: acts::resolve_act(split.act_prefix).to_string(),
            original_line: line.trim().to_string(),
        };
        Ok(ParsedLine {
            record,
            shifted: extraction.shifted,
        })
    }

    /// Parse every line of an offence table. Bad rows are logged and kept
    /// in the report; they never stop the batch.
    pub fn parse_text(&self, text: &str) -> ParseReport {
        let mut report = ParseReport::default();

        for (idx, line) in text.lines().enumerate() {
            match self.parse_line(line) {
                Ok(ParsedLine { record, shifted }) => {
                    if shifted {
                        debug!(line = idx + 1, code = %record.code, "recovered missing ALT column");
                        report.shifted += 1;
                    }
                    if record.description.is_empty() {
                        debug!(line = idx + 1, code = %record.code, "empty description");
                        report.empty_descriptions += 1;
                    }
                    report.records.push(record);
                }
                Err(Rejection::NotData) => report.ignored += 1,
                Err(reason) => {
                    warn!(line = idx + 1, %reason, "skipped: {}", line.trim());
                    report.skipped.push(SkippedLine {
                        line_number: idx + 1,
                        text: line.trim().to_string(),
                        reason,
                    });
                }
            }
        }

        report
    }
}

/// Parse one line with the default grammar.
#[cfg(test)]
pub fn parse_line(line: &str) -> Option<ParsedOffenceRecord> {
    OffenceParser::<ShapeRule>::default()
        .parse_line(line)
        .map(|parsed| parsed.record)
        .ok()
}
