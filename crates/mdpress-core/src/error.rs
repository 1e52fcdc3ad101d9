//! Conversion error.

use std::io;
use std::path::PathBuf;

use mdpress_docx::PackagingError;
use mdpress_dom::ParseError;
use mdpress_pdf::PaginatedError;
use mdpress_renderer::RenderError;

/// Markdown, or the HTML rendered from it, that cannot be processed.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error(transparent)]
    Markdown(#[from] RenderError),
    #[error(transparent)]
    Html(#[from] ParseError),
}

/// Error that aborts a conversion.
///
/// Malformed front matter and failed diagrams never produce this error; they
/// are logged and the conversion continues with defaults.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Input file extension is not a markdown variant.
    #[error("unsupported input format '{extension}' (expected one of: {expected})")]
    UnsupportedFormat {
        extension: String,
        expected: String,
    },

    /// Input exceeds the size limit.
    #[error("input is {size} bytes, larger than the {limit} byte limit")]
    OversizeInput { size: u64, limit: u64 },

    /// Source document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Markdown could not be rendered.
    #[error("markdown rendering failed: {0}")]
    GrammarEngine(#[from] GrammarError),

    /// Paginated output could not be produced.
    #[error(transparent)]
    Rasterization(#[from] PaginatedError),

    /// Structural output could not be packaged.
    #[error("document packaging failed: {0}")]
    Packaging(#[from] PackagingError),
}

impl From<RenderError> for ConvertError {
    fn from(e: RenderError) -> Self {
        Self::GrammarEngine(e.into())
    }
}

impl From<ParseError> for ConvertError {
    fn from(e: ParseError) -> Self {
        Self::GrammarEngine(e.into())
    }
}
