//! SCN-based identifier derivation
//!
//! The controller publishes detector status under an index built from the
//! SCN (site control number) it returns in phase 1. The derivation is pure
//! string concatenation and must stay byte-exact: `.1.<len>.<code>.<code>...`

/// Build the derived suffix for an SCN token
///
/// Length is counted in characters and every character contributes its
/// code point in decimal.
///
/// ```
/// use ug405_decoder::oid::scn_suffix;
///
/// assert_eq!(scn_suffix("CO"), ".1.2.67.79");
/// ```
pub fn scn_suffix(token: &str) -> String {
    let codes: Vec<String> = token.chars().map(|c| (c as u32).to_string()).collect();
    format!(".1.{}.{}", token.chars().count(), codes.join("."))
}

/// Final phase 2 identifier: `status_base + scn_suffix(token)`
pub fn status_oid(status_base: &str, token: &str) -> String {
    format!("{}{}", status_base, scn_suffix(token))
}
