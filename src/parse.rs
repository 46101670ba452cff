//! Type-descriptor string parsing.
//!
//! Descriptor strings are a type name optionally followed by a parenthesized
//! numeric parameter list: `NAME`, `NAME(n)` or `NAME(p,s)`. These are the
//! only shapes this crate ever parses; there is no general SQL parsing.
//!
//! All three extractors fail silently: a descriptor with no parenthetical,
//! unmatched parentheses or junk inside the parentheses yields `None`.
//! Callers must treat `None` as "field absent" — absent and malformed are
//! indistinguishable here.

use regex::Regex;
use std::sync::OnceLock;

fn limit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^()]*)\)").expect("limit pattern"))
}

fn precision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+)(?:,\d+)?\)").expect("precision pattern"))
}

fn single_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+)\)").expect("single-numeric pattern"))
}

fn pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+),(\d+)\)").expect("paired-numeric pattern"))
}

/// Extract a limit from the descriptor: the leading integer of the whole
/// parenthesized token. Used for single-token limits such as varchar length;
/// for `NAME(p,s)` this is `p`.
pub fn extract_limit(descriptor: &str) -> Option<u32> {
    let token = limit_re().captures(descriptor)?.get(1)?.as_str();
    let digits: &str = token.split(|c: char| !c.is_ascii_digit()).next()?;
    digits.parse().ok()
}

/// Extract the precision: the first numeric group of `(p)` or `(p,s)`.
pub fn extract_precision(descriptor: &str) -> Option<u32> {
    precision_re()
        .captures(descriptor)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Extract the scale: `0` for a single numeric group, the second group for a
/// pair, `None` when no parenthetical is present.
pub fn extract_scale(descriptor: &str) -> Option<u32> {
    if single_re().is_match(descriptor) {
        return Some(0);
    }
    pair_re()
        .captures(descriptor)?
        .get(2)?
        .as_str()
        .parse()
        .ok()
}
