//! Paginated image-based PDF rendering.
//!
//! Rendering lays the document out in a styled HTML container, rasterizes
//! it as one tall image, and slices the image into A4 pages:
//!
//! 1. [`Container`] embeds the title block and rendered content.
//! 2. [`apply_theme`] returns a copy with the [`PageTheme`] rules.
//! 3. A [`Rasterizer`] turns the container into an RGB raster.
//! 4. [`PageLayout::page_offsets`] cuts the raster into page bands.
//! 5. The bands are written as PDF pages.
//!
//! Any rasterization or composition failure fails the whole render.

mod compose;
mod container;
mod layout;
mod raster;
mod theme;

pub use compose::{ComposeError, compose_pages};
pub use container::{Container, apply_theme};
pub use layout::{
    A4_HEIGHT_MM, A4_WIDTH_MM, DEFAULT_MARGIN_MM, LAYOUT_WIDTH_PX, PageLayout, RASTER_SCALE,
    mm_to_pt, page_offsets,
};
pub use raster::{
    CommandRasterizer, DEFAULT_RASTERIZER, RasterError, RasterSpec, Rasterizer, decode_raster,
};
pub use theme::{PageTheme, ThemeRules};

use mdpress_meta::DocumentMetadata;

/// File extension of paginated output.
pub const PDF_EXTENSION: &str = "pdf";

/// Paginated rendering error.
#[derive(Debug, thiserror::Error)]
pub enum PaginatedError {
    #[error("rasterization failed: {0}")]
    Rasterize(#[from] RasterError),
    #[error("page composition failed: {0}")]
    Compose(#[from] ComposeError),
    #[error("page composition task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Rendered PDF bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedDocument {
    pub bytes: Vec<u8>,
    /// Number of pages written.
    pub pages: usize,
}

/// Renders metadata and content to a paginated image PDF.
pub struct PaginatedRenderer<R> {
    rasterizer: R,
    layout: PageLayout,
}

impl<R: Rasterizer> PaginatedRenderer<R> {
    /// Create a renderer with the default A4 layout.
    pub fn new(rasterizer: R) -> Self {
        Self {
            rasterizer,
            layout: PageLayout::default(),
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Render `content` under the title block from `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`PaginatedError::Rasterize`] if the container cannot be
    /// rasterized and [`PaginatedError::Compose`] if the PDF cannot be written.
    pub async fn render(
        &self,
        metadata: &DocumentMetadata,
        content: &str,
        theme: PageTheme,
    ) -> Result<PaginatedDocument, PaginatedError> {
        let container = apply_theme(&Container::new(metadata, content), theme);
        let html = container.to_html(self.layout.layout_width_px);

        let spec = RasterSpec {
            width_px: self.layout.layout_width_px,
            scale: self.layout.scale,
        };
        let raster = self.rasterizer.rasterize(&html, spec).await?;
        let offsets = self.layout.page_offsets(raster.width(), raster.height());
        let pages = offsets.len();
        tracing::debug!(
            width = raster.width(),
            height = raster.height(),
            pages,
            %theme,
            "Paginated raster"
        );

        let layout = self.layout;
        let metadata = metadata.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            compose_pages(&raster, &offsets, &layout, &metadata)
        })
        .await??;

        Ok(PaginatedDocument { bytes, pages })
    }
}
