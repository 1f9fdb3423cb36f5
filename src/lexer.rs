use regex::Regex;
use std::sync::LazyLock;

use crate::acts;

// Pure integer: 530, 5555, 03
static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Column-header words that the table repeats on every page.
const HEADER_WORDS: &[&str] = &[
    "Offence", "Code", "Description", "Points", "CCMTA", "Sfty", "Cde", "Con", "Type", "Alt",
    "Grp", "SPD/", "WT", "Carrier", "Driver", "C/D/B", "CdeOffence", "Long", "Text", "English",
    "CVOR",
];

/// True when `line` looks like an offence row rather than a header or blank.
pub fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || HEADER_WORDS.contains(&trimmed) {
        return false;
    }
    trimmed
        .split_whitespace()
        .next()
        .is_some_and(acts::is_act_prefix)
}

/// Split on whitespace runs; descriptions are sometimes padded with several spaces.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// One or more ASCII digits. Shared by the act-prefix, code-token and
/// column-shape rules.
pub fn is_integer(token: &str) -> bool {
    RE_INTEGER.is_match(token)
}

/// Exactly `width` digits, e.g. a CCMTA code ("1234") or a CON/ALT column ("03").
pub fn is_digits(token: &str, width: usize) -> bool {
    token.len() == width && is_integer(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_header_lines() {
        assert!(!is_data_line(""));
        assert!(!is_data_line("   \t "));
        assert!(!is_data_line("Description"));
        assert!(!is_data_line("  C/D/B  "));
    }

    #[test]
    fn test_first_token_decides() {
        assert!(is_data_line("HTA 107 8 A FAIL TO STOP 4 1234 S 03 01 C"));
        assert!(is_data_line("530 5555 1 EXCEED 0 1234 A 05 01 B"));
        assert!(!is_data_line("Offence Code Description"));
        assert!(!is_data_line("XYZ 1 2 3"));
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(
            tokenize("  HTA  107\t8   A "),
            vec!["HTA", "107", "8", "A"]
        );
    }

    #[test]
    fn test_integer_shapes() {
        assert!(is_integer("530"));
        assert!(is_integer("03"));
        assert!(!is_integer(""));
        assert!(!is_integer("12A"));
        assert!(!is_integer("14.1"));
        assert!(is_digits("1234", 4));
        assert!(!is_digits("123", 4));
        assert!(!is_digits("S", 2));
    }
}
