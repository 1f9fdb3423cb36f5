use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use crate::acts;
use crate::error::Rejection;
use crate::lexer;

// ── Code token shapes ───────────────────────────────────────────────
//
// Pure integers (530, 5555, 1) use `lexer::is_integer`.
//
// Real code runs (description follows):
//   530 5555 1            EXCEED ...
//   HTA 107 8 A           FAIL TO STOP FOR SCHOOL BUS
//   HTA 62 14.1           ...
//   CCC 249 .1 1          ...
//   530 6124 1 D II       SCHOOL ...
//
// The boundary is decided by token shape alone. A description whose words
// all look like code tokens (e.g. a lone "A") is swallowed into the code;
// swap in a stricter `CodeTokenRule` where that matters.

// Decimal section number: 4.13, 249.1
static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").unwrap());

// Continuation decimal: .1, .2
static RE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.[0-9]+$").unwrap());

// Clause letter with roman sub-clause: AI, DII, CIII
static RE_SUBCLAUSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]I{1,3}$").unwrap());

/// Decides whether a token still belongs to the offence code.
pub trait CodeTokenRule {
    fn is_code_token(&self, token: &str) -> bool;
}

/// The offence table's own grammar: numbers, decimals, clause letters and
/// letter + roman sub-clauses.
#[derive(Debug, Clone)]
pub struct ShapeRule {
    /// Letters accepted as a single-letter clause token.
    clause_letters: RangeInclusive<char>,
}

impl ShapeRule {
    pub fn with_clause_letters(clause_letters: RangeInclusive<char>) -> Self {
        Self { clause_letters }
    }

    fn is_clause_letter(&self, token: &str) -> bool {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.clause_letters.contains(&c),
            _ => false,
        }
    }
}

impl Default for ShapeRule {
    fn default() -> Self {
        Self::with_clause_letters('A'..='J')
    }
}

impl CodeTokenRule for ShapeRule {
    fn is_code_token(&self, token: &str) -> bool {
        lexer::is_integer(token)
            || RE_DECIMAL.is_match(token)
            || RE_CONTINUATION.is_match(token)
            || self.is_clause_letter(token)
            || RE_SUBCLAUSE.is_match(token)
    }
}

/// Offence code and description separated from a row head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSplit<'a> {
    pub act_prefix: &'a str,
    pub code: String,
    pub description: String,
}

/// Split a row head (act prefix first) into code and description.
pub fn split<'a, R>(head: &[&'a str], rule: &R) -> Result<CodeSplit<'a>, Rejection>
where
    R: CodeTokenRule + ?Sized,
{
    let Some((&act_prefix, rest)) = head.split_first() else {
        return Err(Rejection::EmptyHead);
    };
    if !acts::is_act_prefix(act_prefix) {
        return Err(Rejection::ActPrefix(act_prefix.to_string()));
    }

    let code_len = rest.iter().take_while(|t| rule.is_code_token(t)).count();

    Ok(CodeSplit {
        act_prefix,
        code: head[..=code_len].join(" "),
        description: rest[code_len..].join(" "),
    })
}
