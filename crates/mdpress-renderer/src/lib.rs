//! Markdown to HTML rendering.
//!
//! [`MarkdownRenderer`] walks `pulldown-cmark` events and produces an HTML
//! fragment with a fixed set of extensions enabled: tables, strikethrough,
//! task lists and GitHub-style alerts. Headings get unique `id` slugs and raw
//! HTML is passed through.
//!
//! Fenced code blocks go through an optional [`CodeHighlighter`]. Highlighting
//! never fails a render: unknown languages and highlighter errors both fall
//! back to escaped plain text.
//!
//! # Example
//!
//! ```
//! use mdpress_renderer::MarkdownRenderer;
//!
//! let mut renderer = MarkdownRenderer::new();
//! let result = renderer.render_markdown("# Hello\n\nWorld").unwrap();
//! assert_eq!(result.html, r#"<h1 id="hello">Hello</h1><p>World</p>"#);
//! ```

mod highlight;
mod html;
mod renderer;
mod state;

pub use highlight::{CodeHighlighter, HighlightError, SyntectHighlighter};
pub use html::escape_html;
pub use renderer::{MAX_NESTING_DEPTH, MarkdownRenderer, RenderError, RenderResult};
pub use state::slugify;
