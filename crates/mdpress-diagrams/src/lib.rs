//! Diagram materialization for mdpress.
//!
//! Fenced code blocks tagged with a diagram language (`mermaid`, `plantuml`,
//! `kroki-graphviz`, ...) are rendered through a [`DiagramRenderer`] and
//! substituted into the HTML:
//!
//! ```text
//! <pre><code class="language-mermaid">graph TD; A-->B</code></pre>
//!   → <figure class="diagram" data-diagram-id="diagram-0" data-diagram-hash="…"><svg>…</svg></figure>
//! ```
//!
//! Blocks are rendered one at a time in document order. A failed block is
//! logged and left as a code block; it never affects its siblings.
//!
//! [`KrokiRenderer`] is the HTTP implementation backed by a Kroki server.

mod consts;
mod embed;
mod hash;
mod kroki;
mod language;
mod materializer;

pub use consts::{DEFAULT_DPI, DEFAULT_TIMEOUT, STANDARD_DPI};
pub use embed::{scale_svg_dimensions, strip_google_fonts_import};
pub use hash::content_hash;
pub use kroki::KrokiRenderer;
pub use language::{DiagramFormat, DiagramLanguage};
pub use materializer::{
    DiagramBlock, DiagramError, DiagramErrorKind, DiagramRenderer, Materialized, RenderedDiagram,
    find_diagram_blocks, materialize,
};
