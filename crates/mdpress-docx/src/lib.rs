//! Structural DOCX rendering.
//!
//! The document is a flat sequence of [`Block`]s: a title block built from
//! the metadata, then one block per heading, paragraph, preformatted block
//! or list item of the rendered content. Inline formatting is not carried
//! over.
//!
//! ```
//! use mdpress_docx::{Block, content_blocks};
//!
//! let blocks = content_blocks("<h2>Setup</h2><p>Run <code>make</code>.</p>").unwrap();
//! assert_eq!(
//!     blocks,
//!     vec![
//!         Block::Heading { level: 2, text: "Setup".to_owned() },
//!         Block::Paragraph("Run make.".to_owned()),
//!     ]
//! );
//! ```

mod block;
mod writer;

pub use block::{Block, content_blocks, header_blocks};
pub use writer::{PackagingError, StructuralWriter};

use mdpress_meta::DocumentMetadata;

/// File extension of structural output.
pub const DOCX_EXTENSION: &str = "docx";

/// Rendered DOCX bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralDocument {
    pub bytes: Vec<u8>,
    /// Blocks written, including the title block.
    pub blocks: usize,
}

/// Renders metadata and content to a structural DOCX document.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralRenderer;

impl StructuralRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Blocks for `metadata` and `content` in output order.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError::Content`] if `content` cannot be parsed.
    pub fn blocks(
        &self,
        metadata: &DocumentMetadata,
        content: &str,
    ) -> Result<Vec<Block>, PackagingError> {
        let mut blocks = header_blocks(metadata);
        blocks.extend(content_blocks(content)?);
        Ok(blocks)
    }

    /// Render `content` under the title block from `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagingError`] if the content cannot be mapped or the
    /// package cannot be written.
    pub async fn render(
        &self,
        metadata: &DocumentMetadata,
        content: &str,
    ) -> Result<StructuralDocument, PackagingError> {
        let mut writer = StructuralWriter::new(&metadata.title, &metadata.author);
        for block in self.blocks(metadata, content)? {
            writer.append(block);
        }
        let blocks = writer.blocks().len();
        tracing::debug!(blocks, "Mapped structural blocks");

        let bytes = tokio::task::spawn_blocking(move || writer.serialize())
            .await
            .map_err(|e| PackagingError::Task(e.to_string()))??;

        Ok(StructuralDocument { bytes, blocks })
    }
}
