//! ASCII-safe slugs for output filenames.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Slug used when a title has no usable characters.
const FALLBACK_SLUG: &str = "document";

/// Convert a title to a lowercase ASCII filename stem.
///
/// Accented letters are transliterated by dropping their combining marks,
/// whitespace, dashes and underscores collapse to a single dash, and every
/// other character is removed.
#[must_use]
pub fn file_slug(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut last_was_dash = true; // Prevents leading dash

    for c in title.trim().nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    if result.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        result
    }
}
