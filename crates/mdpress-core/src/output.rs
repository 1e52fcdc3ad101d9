//! Output selection and artifact production.

use std::fmt;
use std::str::FromStr;

use mdpress_diagrams::DiagramRenderer;
use mdpress_docx::{DOCX_EXTENSION, StructuralRenderer};
use mdpress_pdf::{PDF_EXTENSION, PageLayout, PageTheme, PaginatedRenderer, Rasterizer};

use crate::error::ConvertError;
use crate::pipeline::ConversionPipeline;
use crate::source::SourceDocument;

/// Requested output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Paginated image-based PDF.
    #[default]
    Pdf,
    /// Structural word-processing document.
    Docx,
}

impl OutputFormat {
    pub const ALL: [Self; 2] = [Self::Pdf, Self::Docx];

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => PDF_EXTENSION,
            Self::Docx => DOCX_EXTENSION,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output format '{s}' (expected pdf or docx)"))
    }
}

/// Produced document, ready to be written by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Slugged title plus the format's extension.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Runs the pipeline and hands its output to exactly one renderer.
pub struct Converter<D, P> {
    pipeline: ConversionPipeline<D>,
    paginated: PaginatedRenderer<P>,
    structural: StructuralRenderer,
}

impl<D: DiagramRenderer, P: Rasterizer> Converter<D, P> {
    pub fn new(pipeline: ConversionPipeline<D>, rasterizer: P) -> Self {
        Self {
            pipeline,
            paginated: PaginatedRenderer::new(rasterizer),
            structural: StructuralRenderer::new(),
        }
    }

    /// Use `layout` for paginated output.
    #[must_use]
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.paginated = self.paginated.with_layout(layout);
        self
    }

    /// Convert `source` into an artifact of the requested format.
    ///
    /// `theme` applies to PDF output only.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if markdown rendering, rasterization or
    /// packaging fails. No artifact is produced in that case.
    pub async fn convert(
        &self,
        source: &SourceDocument,
        format: OutputFormat,
        theme: PageTheme,
    ) -> Result<Artifact, ConvertError> {
        let conversion = self.pipeline.convert(source).await?;
        let metadata = conversion.metadata;
        let content = conversion.content;

        let bytes = match format {
            OutputFormat::Pdf => {
                let document = self
                    .paginated
                    .render(&metadata, content.as_str(), theme)
                    .await?;
                tracing::debug!(pages = document.pages, "Composed PDF");
                document.bytes
            }
            OutputFormat::Docx => {
                self.structural
                    .render(&metadata, content.as_str())
                    .await?
                    .bytes
            }
        };

        let filename = metadata.output_filename(format.extension());
        tracing::info!(filename = %filename, bytes = bytes.len(), %format, "Produced artifact");
        Ok(Artifact { filename, bytes })
    }
}
