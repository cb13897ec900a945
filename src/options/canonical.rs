//! Key canonicalization
//!
//! Folds the three spellings an option may arrive in onto lower-camel-case:
//!
//! | input            | canonical      |
//! |------------------|----------------|
//! | `fetchFormat`    | `fetchFormat`  |
//! | `fetch_format`   | `fetchFormat`  |
//! | `fetch-format`   | `fetchFormat`  |
//!
//! A `_` or `-` followed by a lowercase ASCII letter collapses into that
//! letter uppercased. Any other separator (leading, doubled, trailing, or
//! followed by a digit or uppercase letter) is left untouched, which keeps the
//! function idempotent.

use std::borrow::Cow;

fn is_separator(c: char) -> bool {
    c == '_' || c == '-'
}

/// Canonicalize an option key.
///
/// # Examples
///
/// ```
/// use cldctx::options::canonicalize;
///
/// assert_eq!(canonicalize("fetch_format"), "fetchFormat");
/// assert_eq!(canonicalize("fetch-format"), "fetchFormat");
/// assert_eq!(canonicalize("fetchFormat"), "fetchFormat");
/// assert_eq!(canonicalize("aria-live"), "ariaLive");
/// ```
pub fn canonicalize(key: &str) -> Cow<'_, str> {
    if !key.contains(is_separator) {
        return Cow::Borrowed(key);
    }

    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    let mut leading = true;

    while let Some(c) = chars.next() {
        if is_separator(c) {
            if !leading {
                if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        } else {
            leading = false;
        }
        out.push(c);
    }

    Cow::Owned(out)
}

/// True if `key` is already in canonical form.
pub fn is_canonical(key: &str) -> bool {
    canonicalize(key) == key
}
