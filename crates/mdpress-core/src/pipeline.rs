//! Markdown to rendered content.

use std::sync::Arc;

use mdpress_diagrams::{DiagramLanguage, DiagramRenderer, materialize};
use mdpress_dom::Fragment;
use mdpress_meta::{DocumentMetadata, extract_metadata, strip_front_matter};
use mdpress_renderer::{CodeHighlighter, HighlightError, MarkdownRenderer};

use crate::error::ConvertError;
use crate::source::SourceDocument;

/// Fully rendered HTML body, diagrams already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent(String);

impl RenderedContent {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Output of [`ConversionPipeline::convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub metadata: DocumentMetadata,
    pub content: RenderedContent,
}

/// Lets one highlighter serve a fresh markdown renderer per conversion.
struct SharedHighlighter(Arc<dyn CodeHighlighter>);

impl CodeHighlighter for SharedHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<Option<String>, HighlightError> {
        self.0.highlight(code, language)
    }
}

/// Front matter, markdown rendering and diagram materialization.
pub struct ConversionPipeline<R> {
    diagrams: Option<R>,
    highlighter: Option<Arc<dyn CodeHighlighter>>,
}

impl<R> Default for ConversionPipeline<R> {
    fn default() -> Self {
        Self {
            diagrams: None,
            highlighter: None,
        }
    }
}

impl<R: DiagramRenderer> ConversionPipeline<R> {
    /// Pipeline without diagram rendering or highlighting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render diagram blocks with `renderer`.
    #[must_use]
    pub fn with_diagrams(mut self, renderer: R) -> Self {
        self.diagrams = Some(renderer);
        self
    }

    /// Highlight fenced code blocks with `highlighter`.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl CodeHighlighter + 'static) -> Self {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    fn markdown_renderer(&self) -> MarkdownRenderer {
        let renderer = MarkdownRenderer::new().with_verbatim_languages(DiagramLanguage::is_diagram);
        match &self.highlighter {
            Some(highlighter) => {
                renderer.with_highlighter(Box::new(SharedHighlighter(Arc::clone(highlighter))))
            }
            None => renderer,
        }
    }

    /// Convert a source document into metadata and rendered HTML.
    ///
    /// Metadata extraction and diagram rendering degrade gracefully; only
    /// markdown rendering can fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::GrammarEngine`] if the markdown cannot be
    /// rendered, or if the rendered HTML (raw HTML blocks included) nests
    /// deeper than [`mdpress_dom::MAX_DEPTH`].
    pub async fn convert(&self, source: &SourceDocument) -> Result<Conversion, ConvertError> {
        let metadata = extract_metadata(source.text(), source.filename());
        let body = strip_front_matter(source.text());

        let rendered = self.markdown_renderer().render_markdown(body)?;
        tracing::debug!(
            title = %metadata.title,
            code_blocks = rendered.code_blocks,
            "Rendered markdown"
        );

        let fragment = Fragment::parse(&rendered.html)?;

        let html = match &self.diagrams {
            Some(renderer) => {
                let result = materialize(&fragment, renderer).await;
                if !result.failed.is_empty() {
                    tracing::warn!(
                        rendered = result.rendered,
                        failed = result.failed.len(),
                        "Some diagrams were left as code blocks"
                    );
                }
                result.html
            }
            None => {
                tracing::info!("Diagram rendering disabled, no Kroki URL configured");
                rendered.html
            }
        };

        Ok(Conversion {
            metadata,
            content: RenderedContent(html),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mdpress_diagrams::{DiagramBlock, DiagramError, DiagramErrorKind, RenderedDiagram};

    use super::*;
    use crate::error::GrammarError;
    use pretty_assertions::assert_eq;

    /// Renders `<svg>` markup; fails for sources containing `fail`.
    #[derive(Default)]
    struct FakeDiagrams {
        calls: Mutex<usize>,
    }

    impl DiagramRenderer for FakeDiagrams {
        async fn render(
            &self,
            _id: &str,
            block: &DiagramBlock,
        ) -> Result<RenderedDiagram, DiagramError> {
            *self.calls.lock().unwrap() += 1;
            if block.source.contains("fail") {
                return Err(DiagramError {
                    index: block.index,
                    kind: DiagramErrorKind::Http("HTTP 400".to_owned()),
                });
            }
            Ok(RenderedDiagram {
                markup: "<svg></svg>".to_owned(),
            })
        }
    }

    struct FailingHighlighter;

    impl CodeHighlighter for FailingHighlighter {
        fn highlight(&self, _code: &str, _language: &str) -> Result<Option<String>, HighlightError> {
            Err(HighlightError::UnknownTheme("broken".to_owned()))
        }
    }

    fn source(text: &str) -> SourceDocument {
        SourceDocument::new(text, Some("notes.md")).unwrap()
    }

    #[tokio::test]
    async fn test_convert_front_matter() {
        let pipeline = ConversionPipeline::<FakeDiagrams>::new();
        let result = pipeline
            .convert(&source("---\ntitle: Plan\nauthor: Ann\n---\n# Goals\n"))
            .await
            .unwrap();

        assert_eq!(result.metadata.title, "Plan");
        assert_eq!(result.metadata.author, "Ann");
        assert_eq!(result.content.as_str(), r#"<h1 id="goals">Goals</h1>"#);
    }

    #[tokio::test]
    async fn test_convert_defaults_without_front_matter() {
        let pipeline = ConversionPipeline::<FakeDiagrams>::new();
        let result = pipeline.convert(&source("Text")).await.unwrap();
        assert_eq!(result.metadata.title, "notes");
        assert_eq!(result.metadata.author, "");
        assert!(!result.metadata.date.is_empty());
    }

    #[tokio::test]
    async fn test_convert_malformed_front_matter_degrades() {
        let pipeline = ConversionPipeline::<FakeDiagrams>::new();
        let result = pipeline
            .convert(&source("---\ntitle: [unclosed\n---\nBody\n"))
            .await
            .unwrap();
        assert_eq!(result.metadata.title, "notes");
        assert_eq!(result.content.as_str(), "<p>Body</p>");
    }

    #[tokio::test]
    async fn test_convert_materializes_diagrams() {
        let pipeline = ConversionPipeline::new().with_diagrams(FakeDiagrams::default());
        let text = "```mermaid\ngraph TD\n```\n\n```mermaid\nfail\n```\n";
        let result = pipeline.convert(&source(text)).await.unwrap();

        let html = result.content.as_str();
        assert!(html.contains(r#"data-diagram-id="diagram-0""#));
        assert!(html.contains(r#"<code class="language-mermaid">fail"#));
        assert_eq!(*pipeline.diagrams.as_ref().unwrap().calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_convert_without_diagram_renderer_keeps_blocks() {
        let pipeline = ConversionPipeline::<FakeDiagrams>::new();
        let result = pipeline
            .convert(&source("```mermaid\ngraph TD\n```\n"))
            .await
            .unwrap();
        assert!(result.content.as_str().contains("language-mermaid"));
        assert!(!result.content.as_str().contains("<figure"));
    }

    #[tokio::test]
    async fn test_highlighter_failure_falls_back() {
        let pipeline = ConversionPipeline::<FakeDiagrams>::new().with_highlighter(FailingHighlighter);
        let result = pipeline
            .convert(&source("```rust\nlet a = 1 < 2;\n```\n"))
            .await
            .unwrap();
        assert!(result.content.as_str().contains("let a = 1 &lt; 2;"));
    }

    #[tokio::test]
    async fn test_nesting_too_deep_is_grammar_error() {
        let pipeline = ConversionPipeline::<FakeDiagrams>::new();
        let text = format!("{} deep", ">".repeat(mdpress_renderer::MAX_NESTING_DEPTH + 10));
        let err = pipeline.convert(&source(&text)).await.unwrap_err();
        assert!(matches!(
            err,
            ConvertError::GrammarEngine(GrammarError::Markdown(_))
        ));
    }

    #[tokio::test]
    async fn test_deep_raw_html_is_grammar_error() {
        let text = format!("{}deep{}", "<div>".repeat(5_000), "</div>".repeat(5_000));

        let err = ConversionPipeline::<FakeDiagrams>::new()
            .convert(&source(&text))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::GrammarEngine(GrammarError::Html(_))));

        let err = ConversionPipeline::new()
            .with_diagrams(FakeDiagrams::default())
            .convert(&source(&format!("```mermaid\nA\n```\n\n{text}")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::GrammarEngine(GrammarError::Html(_))));
    }
}
