//! Source document input.

use std::path::Path;

use crate::error::ConvertError;

/// Largest accepted source document, in bytes (10 MiB).
pub const MAX_SOURCE_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted source file extensions, compared case-insensitively.
pub const SOURCE_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "txt"];

/// Raw markdown text with an optional filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    text: String,
    filename: Option<String>,
}

impl SourceDocument {
    /// Wrap in-memory text.
    ///
    /// The size limit is checked before anything else looks at the text.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::OversizeInput`] if `text` exceeds
    /// [`MAX_SOURCE_BYTES`].
    pub fn new(text: impl Into<String>, filename: Option<&str>) -> Result<Self, ConvertError> {
        let text = text.into();
        check_size(text.len() as u64)?;
        Ok(Self {
            text,
            filename: filename.map(str::to_owned),
        })
    }

    /// Read a source document from disk.
    ///
    /// The extension and the file size are checked before the file is read.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnsupportedFormat`] for an unknown extension,
    /// [`ConvertError::OversizeInput`] for a file over the limit and
    /// [`ConvertError::Read`] if the file cannot be read as UTF-8 text.
    pub async fn load(path: &Path) -> Result<Self, ConvertError> {
        check_extension(path)?;

        let read_error = |source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        };
        let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
        check_size(size)?;

        let text = tokio::fs::read_to_string(path).await.map_err(read_error)?;
        let filename = path.file_name().map(|name| name.to_string_lossy());
        Self::new(text, filename.as_deref())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

fn check_size(size: u64) -> Result<(), ConvertError> {
    if size > MAX_SOURCE_BYTES {
        return Err(ConvertError::OversizeInput {
            size,
            limit: MAX_SOURCE_BYTES,
        });
    }
    Ok(())
}

fn check_extension(path: &Path) -> Result<(), ConvertError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if SOURCE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ConvertError::UnsupportedFormat {
            extension,
            expected: SOURCE_EXTENSIONS.join(", "),
        })
    }
}
