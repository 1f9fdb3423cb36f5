//! Static tables keyed by the act prefix of an offence code.

use crate::lexer;

/// Alphabetic act prefixes that appear literally in the offence table.
/// Every other act is identified by a bare numeric program code.
pub const ALPHA_ACTS: &[&str] = &["CCC", "HTA", "LLA"];

/// Label used for a numeric prefix missing from [`ACT_NAMES`].
pub const GENERIC_ACT: &str = "CVOR";

/// Act prefix → statute / program name.
pub static ACT_NAMES: &[(&str, &str)] = &[
    ("229", "Traffic Act"),
    ("247", "Airport Traffic Act"),
    ("284", "National Capitale"),
    ("508", "CAIA"),
    ("513", "TDG"),
    ("519", "EPA"),
    ("523", "FTA"),
    ("530", "HTA/Reg"),
    ("573", "PVA"),
    ("597", "TDG-Fed"),
    ("834", "Federal"),
    ("982", "PVA-Reg"),
    ("CCC", "CCC"),
    ("HTA", "HTA"),
    ("LLA", "LLA"),
];

/// Resolved act name → `violationGroup` of a synthesized item.
static VIOLATION_GROUPS: &[(&str, &str)] = &[
    ("HTA", "Provincial Highway Traffic"),
    ("CCC", "Criminal Code"),
    ("CAIA", "Compulsory Automobile Insurance"),
];

const DEFAULT_VIOLATION_GROUP: &str = "General provincial";

/// An act prefix is one of [`ALPHA_ACTS`] or a pure-digit program code.
pub fn is_act_prefix(token: &str) -> bool {
    ALPHA_ACTS.contains(&token) || lexer::is_integer(token)
}

pub fn resolve_act(prefix: &str) -> &'static str {
    ACT_NAMES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, name)| *name)
        .unwrap_or(GENERIC_ACT)
}

pub fn violation_group(act: &str) -> &'static str {
    VIOLATION_GROUPS
        .iter()
        .find(|(a, _)| *a == act)
        .map(|(_, group)| *group)
        .unwrap_or(DEFAULT_VIOLATION_GROUP)
}
