//! Escaping for identifiers and literals interpolated into catalog DDL.
//!
//! `PostgreSQL` does not accept bind parameters in DDL, so every configured
//! value reaches the catalog through these helpers.

/// Returns `true` when `identifier` matches `[a-z_][a-z0-9_]*`.
///
/// Uppercase letters are excluded: `PostgreSQL` folds bare identifiers to
/// lower case, so a bare mixed-case name would no longer match the catalog
/// rows looked up by its exact spelling.
#[must_use]
pub fn is_plain_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let plain = |ch: char| ch.is_ascii_lowercase() || ch == '_';
    plain(first) && chars.all(|ch| plain(ch) || ch.is_ascii_digit())
}

/// Renders `identifier` for interpolation into SQL.
///
/// Plain identifiers are emitted bare; anything else is wrapped in double
/// quotes with embedded double quotes doubled.
#[must_use]
pub fn escape_identifier(identifier: &str) -> String {
    if is_plain_identifier(identifier) {
        return identifier.to_owned();
    }
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Escapes `value` for use inside a single-quoted SQL string literal.
///
/// The caller supplies the surrounding quotes.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}
