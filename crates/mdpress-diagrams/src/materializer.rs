//! Diagram block discovery and substitution.

use std::future::Future;

use mdpress_dom::{Element, Fragment, Node};

use crate::hash::content_hash;
use crate::language::DiagramLanguage;

/// A diagram code block found in rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Zero-based position among the document's diagram blocks.
    pub index: usize,
    pub language: DiagramLanguage,
    /// Diagram source text.
    pub source: String,
}

impl DiagramBlock {
    /// Positional identifier, `diagram-{index}`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("diagram-{}", self.index)
    }
}

/// Markup produced for one diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    /// Inline SVG or `<img>` markup.
    pub markup: String,
}

/// Single diagram rendering error.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {kind}")]
pub struct DiagramError {
    pub index: usize,
    pub kind: DiagramErrorKind,
}

/// Kind of diagram rendering error.
#[derive(Debug, thiserror::Error)]
pub enum DiagramErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("render task failed: {0}")]
    Task(String),
}

/// Renders one diagram source to embeddable markup.
pub trait DiagramRenderer: Send + Sync {
    /// Render `block`, identified by `id` (`diagram-{index}`).
    fn render(
        &self,
        id: &str,
        block: &DiagramBlock,
    ) -> impl Future<Output = Result<RenderedDiagram, DiagramError>> + Send;
}

/// Result of [`materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// HTML with rendered diagrams substituted.
    pub html: String,
    /// Number of diagrams replaced.
    pub rendered: usize,
    /// Indices of diagrams left as code blocks.
    pub failed: Vec<usize>,
}

/// Diagram source of a `<pre><code class="language-…">` element.
fn diagram_source(el: &Element) -> Option<(DiagramLanguage, String)> {
    if el.name != "pre" {
        return None;
    }
    let code = el.child_elements().next().filter(|c| c.name == "code")?;
    let language = code
        .attr("class")?
        .split_ascii_whitespace()
        .filter_map(|class| class.strip_prefix("language-"))
        .find_map(DiagramLanguage::parse)?;
    Some((language, code.text_content()))
}

/// Find diagram code blocks in document order.
#[must_use]
pub fn find_diagram_blocks(fragment: &Fragment) -> Vec<DiagramBlock> {
    fragment
        .descendants()
        .filter_map(diagram_source)
        .enumerate()
        .map(|(index, (language, source))| DiagramBlock {
            index,
            language,
            source,
        })
        .collect()
}

fn figure(block: &DiagramBlock, rendered: &RenderedDiagram) -> String {
    format!(
        r#"<figure class="diagram" data-diagram-id="{}" data-diagram-hash="{}">{}</figure>"#,
        block.id(),
        content_hash(block.language, &block.source),
        rendered.markup.trim()
    )
}

/// Render every diagram block in `fragment` and substitute the results.
///
/// Blocks are rendered sequentially in document order, so block `i` is always
/// paired with the `i`-th render call. Failures are logged and leave the
/// original code block in place. `fragment` is not modified; the substituted
/// copy is serialized into [`Materialized::html`].
pub async fn materialize<R: DiagramRenderer>(fragment: &Fragment, renderer: &R) -> Materialized {
    let blocks = find_diagram_blocks(fragment);
    if blocks.is_empty() {
        return Materialized {
            html: fragment.to_html(),
            rendered: 0,
            failed: Vec::new(),
        };
    }

    let mut outputs = Vec::with_capacity(blocks.len());
    let mut failed = Vec::new();
    for block in &blocks {
        let id = block.id();
        match renderer.render(&id, block).await {
            Ok(rendered) => {
                tracing::debug!(id = %id, language = %block.language, "Rendered diagram");
                outputs.push(Some(figure(block, &rendered)));
            }
            Err(e) => {
                tracing::warn!(
                    index = block.index,
                    language = %block.language,
                    error = %e,
                    "Diagram render failed, keeping source block"
                );
                failed.push(block.index);
                outputs.push(None);
            }
        }
    }

    let mut position = 0;
    let substituted = fragment.map_elements(|el| {
        diagram_source(el)?;
        let slot = outputs.get_mut(position).and_then(Option::take);
        position += 1;
        slot.map(Node::Raw)
    });

    Materialized {
        html: substituted.to_html(),
        rendered: blocks.len() - failed.len(),
        failed,
    }
}
