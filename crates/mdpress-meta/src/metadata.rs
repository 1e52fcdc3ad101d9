//! Document metadata extraction.
//!
//! Metadata comes from the YAML front matter block. Missing or malformed
//! front matter never fails extraction: every field falls back to a default.

use std::path::Path;

use chrono::{Local, NaiveDate};
use serde_yaml::{Mapping, Value};

use crate::front_matter::split_front_matter;
use crate::slug::file_slug;

/// Title used when neither front matter nor a filename provides one.
pub const UNTITLED: &str = "Untitled Document";

/// Format of the default `date` field ("October 16, 2026").
const DATE_FORMAT: &str = "%B %-d, %Y";

/// Metadata describing a converted document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Document title.
    pub title: String,
    /// Author name; empty when unknown.
    pub author: String,
    /// Display date.
    pub date: String,
}

impl DocumentMetadata {
    /// Output filename for this document with the given extension.
    ///
    /// ```
    /// use mdpress_meta::DocumentMetadata;
    ///
    /// let meta = DocumentMetadata {
    ///     title: "Quarterly Report".to_owned(),
    ///     author: String::new(),
    ///     date: String::new(),
    /// };
    /// assert_eq!(meta.output_filename("pdf"), "quarterly-report.pdf");
    /// ```
    #[must_use]
    pub fn output_filename(&self, extension: &str) -> String {
        format!("{}.{extension}", file_slug(&self.title))
    }
}

/// Extract metadata from raw source text.
///
/// `filename` is the name of the source file, if known. Its stem becomes the
/// title when the front matter has none.
#[must_use]
pub fn extract_metadata(text: &str, filename: Option<&str>) -> DocumentMetadata {
    extract_metadata_on(text, filename, Local::now().date_naive())
}

/// Extract metadata using `today` for the default date.
#[must_use]
pub fn extract_metadata_on(text: &str, filename: Option<&str>, today: NaiveDate) -> DocumentMetadata {
    let fields = split_front_matter(text)
        .and_then(|fm| parse_fields(fm.yaml))
        .unwrap_or_default();

    DocumentMetadata {
        title: fields
            .title
            .unwrap_or_else(|| default_title(filename)),
        author: fields.author.unwrap_or_default(),
        date: fields
            .date
            .unwrap_or_else(|| today.format(DATE_FORMAT).to_string()),
    }
}

/// Fields read from front matter. Empty strings count as absent.
#[derive(Debug, Default)]
struct FrontMatterFields {
    title: Option<String>,
    author: Option<String>,
    date: Option<String>,
}

/// Parse front matter YAML, logging and discarding anything malformed.
fn parse_fields(yaml: &str) -> Option<FrontMatterFields> {
    if yaml.trim().is_empty() {
        return None;
    }

    let value: Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse front matter, using defaults");
            return None;
        }
    };

    let Value::Mapping(map) = value else {
        tracing::warn!("Front matter is not a key/value mapping, using defaults");
        return None;
    };

    Some(FrontMatterFields {
        title: scalar_field(&map, "title"),
        author: scalar_field(&map, "author"),
        date: scalar_field(&map, "date"),
    })
}

/// Read a scalar value as a trimmed, non-empty string.
fn scalar_field(map: &Mapping, key: &str) -> Option<String> {
    let text = match map.get(key)? {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => {
            tracing::warn!(key, value = ?other, "Ignoring non-scalar front matter value");
            return None;
        }
    };
    (!text.is_empty()).then_some(text)
}

/// Title derived from the source filename, or [`UNTITLED`].
fn default_title(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| UNTITLED.to_owned(), str::to_owned)
}
