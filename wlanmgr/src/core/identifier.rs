//! Network identifier normalization.
//!
//! Raw identifiers are matched verbatim; only the derived key is used as an
//! external element name and therefore has to be display-safe.

/// Derives the element key for a raw network identifier.
///
/// Whitespace, `.`, `-`, `+`, `!`, `?`, `(`, `)` and every character that is
/// not printable ASCII become `_`; ASCII letters are lowercased.
///
/// Returns `None` for an empty identifier, which callers treat as
/// "no network".
pub(crate) fn normalize_identifier(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let key = raw
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '_',
            '.' | '-' | '+' | '!' | '?' | '(' | ')' => '_',
            c if !c.is_ascii_graphic() => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect();

    Some(key)
}
