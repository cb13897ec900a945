//! Public id escaping

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters that stay literal in a public id: alphanumerics plus
/// `_ . - / :`. Everything else is percent-encoded as UTF-8.
const PUBLIC_ID: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-').remove(b'/').remove(b':');

/// Percent-encode a public id while keeping path separators and the
/// characters delivery URLs accept unescaped.
pub fn smart_escape(public_id: &str) -> String {
    utf8_percent_encode(public_id, PUBLIC_ID).to_string()
}

/// True if `public_id` is itself an absolute http(s) URL.
pub fn is_url(public_id: &str) -> bool {
    let lower = public_id.get(..8).unwrap_or(public_id).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
