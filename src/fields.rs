//! Trailing classification columns, read right to left.
//!
//! Row layout:
//!   {ActPrefix} {Code…} {Description…} PTS CCMTA SFTY CON ALT [SPD/WT] C/D/B
//!
//! Real rows:
//!   HTA 107 8 A FAIL TO STOP FOR SCHOOL BUS 4 1234 S 03 01 C
//!   530 5555 1 EXCEED GROSS WEIGHT 0 1234 A 05 01 WT1 B
//!
//! A handful of rows in the published table are missing the ALT column.
//! Read naively, every column then lands one slot to the right: the CCMTA
//! code shows up where the safety code should be and the last description
//! word is taken for points. When the columns do not hold up as read and
//! the SFTY slot holds four digits, the row is re-read once with each column
//! shifted back and ALT defaulted to "01".
//!
//! CCMTA must be four digits, CON and ALT two; SFTY is kept as printed.

use crate::error::Rejection;
use crate::lexer;
use crate::types::{ClassFlag, SpeedWeight};

/// Smallest row: prefix + PTS CCMTA SFTY CON ALT C/D/B.
pub const MIN_TOKENS: usize = 7;
pub const MAX_POINTS: u8 = 5;
/// ALT value assumed for rows printed without one.
pub const DEFAULT_ALTERNATIVE_GROUP: &str = "01";
pub const CCMTA_WIDTH: usize = 4;
/// Width of the CON and ALT columns.
pub const CODE_WIDTH: usize = 2;

/// The trailing columns of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingFields<'a> {
    pub points: u8,
    pub ccmta_code: &'a str,
    pub safety_code: &'a str,
    pub conviction_type: &'a str,
    pub alternative_group: &'a str,
    pub speed_weight: Option<SpeedWeight>,
    pub class_flag: ClassFlag,
}

/// Trailing columns plus the untouched head (act prefix, code, description).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction<'a> {
    pub fields: TrailingFields<'a>,
    pub head: &'a [&'a str],
    /// The row was recovered by the missing-ALT re-read.
    pub shifted: bool,
}

/// Column values as captured, before points are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Captured<'a> {
    class_flag: ClassFlag,
    speed_weight: Option<SpeedWeight>,
    alternative_group: &'a str,
    conviction_type: &'a str,
    safety_code: &'a str,
    ccmta_code: &'a str,
    points: &'a str,
    /// Number of tokens left of the points column.
    head_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Attempt<'a> {
    Fields(Extraction<'a>),
    /// The columns do not hold up as read, but the row has the missing-ALT shape.
    NeedsShift(Captured<'a>),
    Reject(Rejection),
}

/// Strip the trailing columns from a tokenized row.
pub fn extract<'a>(tokens: &'a [&'a str]) -> Result<Extraction<'a>, Rejection> {
    match primary(tokens) {
        Attempt::Fields(extraction) => Ok(extraction),
        Attempt::NeedsShift(captured) => shifted(tokens, captured),
        Attempt::Reject(reason) => Err(reason),
    }
}

fn primary<'a>(tokens: &'a [&'a str]) -> Attempt<'a> {
    if tokens.len() < MIN_TOKENS {
        return Attempt::Reject(Rejection::TooFewTokens(tokens.len()));
    }

    let mut idx = tokens.len() - 1;
    let Some(class_flag) = ClassFlag::from_token(tokens[idx]) else {
        return Attempt::Reject(Rejection::ClassFlag(tokens[idx].to_string()));
    };

    idx -= 1;
    let speed_weight = SpeedWeight::from_token(tokens[idx]);
    if speed_weight.is_some() {
        idx -= 1;
    }

    // MIN_TOKENS guarantees idx >= 4 here
    let captured = Captured {
        class_flag,
        speed_weight,
        alternative_group: tokens[idx],
        conviction_type: tokens[idx - 1],
        safety_code: tokens[idx - 2],
        ccmta_code: tokens[idx - 3],
        points: tokens[idx - 4],
        head_len: idx - 4,
    };

    match finish(tokens, captured, false) {
        Ok(extraction) => Attempt::Fields(extraction),
        Err(_) if lexer::is_digits(captured.safety_code, CCMTA_WIDTH) => {
            Attempt::NeedsShift(captured)
        }
        Err(reason) => Attempt::Reject(reason),
    }
}

/// Re-read a row whose ALT column is missing. Never shifts a second time.
fn shifted<'a>(tokens: &'a [&'a str], captured: Captured<'a>) -> Result<Extraction<'a>, Rejection> {
    let recovered = Captured {
        points: captured.ccmta_code,
        ccmta_code: captured.safety_code,
        safety_code: captured.conviction_type,
        conviction_type: captured.alternative_group,
        alternative_group: DEFAULT_ALTERNATIVE_GROUP,
        // the token taken for points goes back to the description
        head_len: captured.head_len + 1,
        ..captured
    };
    finish(tokens, recovered, true)
}

/// Check every column's shape and build the extraction. The safety code is
/// the one column taken as printed.
fn finish<'a>(
    tokens: &'a [&'a str],
    c: Captured<'a>,
    shifted: bool,
) -> Result<Extraction<'a>, Rejection> {
    let points = read_points(c.points)?;
    check_width("CCMTA", c.ccmta_code, CCMTA_WIDTH)?;
    check_width("CON", c.conviction_type, CODE_WIDTH)?;
    check_width("ALT", c.alternative_group, CODE_WIDTH)?;
    if c.head_len < 1 {
        return Err(Rejection::EmptyHead);
    }

    Ok(Extraction {
        fields: TrailingFields {
            points,
            ccmta_code: c.ccmta_code,
            safety_code: c.safety_code,
            conviction_type: c.conviction_type,
            alternative_group: c.alternative_group,
            speed_weight: c.speed_weight,
            class_flag: c.class_flag,
        },
        head: &tokens[..c.head_len],
        shifted,
    })
}

/// Points are an integer in 0..=5. Any other digit string ("7", "30",
/// "300") is out of range; anything else is not a number at all.
fn read_points(token: &str) -> Result<u8, Rejection> {
    if !lexer::is_integer(token) {
        return Err(Rejection::Points(token.to_string()));
    }
    token
        .parse::<u8>()
        .ok()
        .filter(|points| *points <= MAX_POINTS)
        .ok_or_else(|| Rejection::PointsOutOfRange(token.to_string()))
}

fn check_width(column: &'static str, token: &str, width: usize) -> Result<(), Rejection> {
    if lexer::is_digits(token, width) {
        Ok(())
    } else {
        Err(Rejection::ColumnShape {
            column,
            token: token.to_string(),
            width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_plain_row() {
        let tokens = tokenize("HTA 107 8 A FAIL TO STOP 4 1234 S 03 01 C");
        let ex = extract(&tokens).unwrap();
        assert_eq!(ex.fields.points, 4);
        assert_eq!(ex.fields.ccmta_code, "1234");
        assert_eq!(ex.fields.safety_code, "S");
        assert_eq!(ex.fields.conviction_type, "03");
        assert_eq!(ex.fields.alternative_group, "01");
        assert_eq!(ex.fields.speed_weight, None);
        assert_eq!(ex.fields.class_flag, ClassFlag::C);
        assert_eq!(ex.head, &["HTA", "107", "8", "A", "FAIL", "TO", "STOP"]);
        assert!(!ex.shifted);
    }

    #[test]
    fn test_row_with_qualifier() {
        let tokens = tokenize("530 5555 1 EXCEED WEIGHT 0 1234 A 05 02 WT1 B");
        let ex = extract(&tokens).unwrap();
        assert_eq!(ex.fields.speed_weight, Some(SpeedWeight::WeightOne));
        assert_eq!(ex.fields.alternative_group, "02");
        assert_eq!(ex.fields.conviction_type, "05");
        assert_eq!(ex.fields.points, 0);
        assert_eq!(ex.head, &["530", "5555", "1", "EXCEED", "WEIGHT"]);
    }

    #[test]
    fn test_missing_alt_group_is_recovered() {
        // ALT column absent: PTS=3 CCMTA=1234 SFTY=S CON=03
        let tokens = tokenize("HTA 128 SPEEDING IN ZONE 3 1234 S 03 C");
        let ex = extract(&tokens).unwrap();
        assert!(ex.shifted);
        assert_eq!(ex.fields.points, 3);
        assert_eq!(ex.fields.ccmta_code, "1234");
        assert_eq!(ex.fields.safety_code, "S");
        assert_eq!(ex.fields.conviction_type, "03");
        assert_eq!(ex.fields.alternative_group, DEFAULT_ALTERNATIVE_GROUP);
        assert_eq!(ex.head, &["HTA", "128", "SPEEDING", "IN", "ZONE"]);
    }

    #[test]
    fn test_unparseable_points_without_shift_shape() {
        let tokens = tokenize("HTA 128 SPEEDING IN ZONE X 1234 S 03 01 C");
        assert_eq!(extract(&tokens), Err(Rejection::Points("X".into())));
    }

    #[test]
    fn test_shift_that_still_fails() {
        // SFTY slot holds four digits but the shifted points are not numeric either
        let tokens = tokenize("HTA 128 SPEEDING IN ZONE ABCD 1234 S 03 C");
        assert_eq!(extract(&tokens), Err(Rejection::Points("ABCD".into())));
    }

    #[test]
    fn test_too_few_tokens() {
        let tokens = tokenize("HTA 4 1234 S 03 C");
        assert_eq!(extract(&tokens), Err(Rejection::TooFewTokens(6)));
    }

    #[test]
    fn test_bad_class_flag() {
        let tokens = tokenize("HTA 107 FAIL 4 1234 S 03 01 X");
        assert_eq!(extract(&tokens), Err(Rejection::ClassFlag("X".into())));
    }

    #[test]
    fn test_points_above_five() {
        let tokens = tokenize("HTA 107 FAIL 7 1234 S 03 01 C");
        assert_eq!(extract(&tokens), Err(Rejection::PointsOutOfRange("7".into())));
    }

    #[test]
    fn test_head_must_not_be_empty() {
        // qualifier consumes the slot that would otherwise hold the act prefix
        let tokens = tokenize("4 1234 S 03 01 SPD C");
        assert_eq!(extract(&tokens), Err(Rejection::EmptyHead));
    }

    #[test]
    fn test_prefix_only_head_is_kept() {
        let tokens = tokenize("530 4 1234 S 03 01 C");
        let ex = extract(&tokens).unwrap();
        assert_eq!(ex.head, &["530"]);
    }

    #[test]
    fn test_garbage_columns_are_rejected() {
        let tokens = tokenize("HTA 107 FAIL TO STOP 4 ABCD S XYZ Q C");
        assert_eq!(
            extract(&tokens),
            Err(Rejection::ColumnShape {
                column: "CCMTA",
                token: "ABCD".into(),
                width: CCMTA_WIDTH
            })
        );

        let tokens = tokenize("HTA 107 FAIL TO STOP 4 1234 S XYZ 01 C");
        assert!(matches!(
            extract(&tokens),
            Err(Rejection::ColumnShape { column: "CON", .. })
        ));
    }

    #[test]
    fn test_description_ending_in_a_digit_is_shifted() {
        // ALT absent, description "SPEED ZONE 3": the 3 reads as valid points
        // but leaves "2" in the CCMTA slot
        let tokens = tokenize("HTA 128 SPEED ZONE 3 2 1234 S 03 C");
        let ex = extract(&tokens).unwrap();
        assert!(ex.shifted);
        assert_eq!(ex.fields.points, 2);
        assert_eq!(ex.fields.ccmta_code, "1234");
        assert_eq!(ex.fields.safety_code, "S");
        assert_eq!(ex.fields.conviction_type, "03");
        assert_eq!(ex.fields.alternative_group, DEFAULT_ALTERNATIVE_GROUP);
        assert_eq!(ex.head, &["HTA", "128", "SPEED", "ZONE", "3"]);
    }

    #[test]
    fn test_shifted_columns_are_checked_too() {
        let tokens = tokenize("HTA 128 ZONE 3 2 1234 S XY C");
        assert!(matches!(
            extract(&tokens),
            Err(Rejection::ColumnShape { column: "CON", .. })
        ));
    }

    #[test]
    fn test_out_of_range_points_behave_alike() {
        for big in ["30", "300"] {
            let line = format!("HTA 107 FAIL {big} 1234 S 03 01 C");
            let tokens = tokenize(&line);
            assert_eq!(extract(&tokens), Err(Rejection::PointsOutOfRange(big.into())));

            let line = format!("HTA 128 ZONE {big} 4 1234 S 03 C");
            let tokens = tokenize(&line);
            let ex = extract(&tokens).unwrap();
            assert!(ex.shifted, "{big} should trigger the re-read");
            assert_eq!(ex.fields.points, 4);
            assert_eq!(ex.head, &["HTA", "128", "ZONE", big]);
        }
    }
}
