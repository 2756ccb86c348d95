//! Identifier and type-name derivation.
//!
//! Both functions are pure and deterministic. Neither detects collisions: `a-b`
//! and `a_b` sanitize to the same identifier, and that is left to the caller.
use once_cell::sync::Lazy;
use regex::Regex;

static NON_IDENT_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"));
static WORD_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static regex"));

/// Map an arbitrary key onto a C identifier.
pub fn sanitize(key: &str) -> String {
    let mut out = NON_IDENT_CHAR.replace_all(key, "_").into_owned();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Pascal-case a hint path: `["Config", "analog_format"]` → `ConfigAnalogFormat`.
pub fn type_name<S: AsRef<str>>(hint: &[S]) -> String {
    let mut out: String = hint
        .iter()
        .flat_map(|segment| WORD_BREAK.split(segment.as_ref()))
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}
