//! Markdown to PDF and DOCX conversion.
//!
//! A conversion reads one [`SourceDocument`], runs it through the
//! [`ConversionPipeline`] and hands the result to one output renderer:
//!
//! ```text
//! SourceDocument
//!   → front matter → DocumentMetadata
//!   → markdown body → HTML → diagrams materialized → RenderedContent
//!   → PaginatedRenderer (PDF) | StructuralRenderer (DOCX)
//!   → Artifact { filename, bytes }
//! ```
//!
//! [`Converter`] ties the steps together. Front matter and diagram failures
//! are logged and absorbed; everything else surfaces as a [`ConvertError`]
//! and produces no artifact.

mod error;
mod output;
mod pipeline;
mod source;

pub use error::{ConvertError, GrammarError};
pub use output::{Artifact, Converter, OutputFormat};
pub use pipeline::{Conversion, ConversionPipeline, RenderedContent};
pub use source::{MAX_SOURCE_BYTES, SOURCE_EXTENSIONS, SourceDocument};

pub use mdpress_meta::DocumentMetadata;
pub use mdpress_pdf::PageTheme;
