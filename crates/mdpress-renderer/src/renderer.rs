//! Event-driven markdown renderer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::highlight::CodeHighlighter;
use crate::html::{self, escape_html};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, fence_language};

/// Deepest allowed nesting of lists and blockquotes.
///
/// Downstream consumers walk the rendered tree recursively, so deeper input is
/// rejected instead of rendered.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Error from rendering markdown.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Lists and blockquotes are nested deeper than [`MAX_NESTING_DEPTH`].
    #[error("markdown nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML fragment.
    pub html: String,
    /// Number of fenced and indented code blocks.
    pub code_blocks: usize,
}

/// Markdown to HTML renderer.
///
/// Tables, strikethrough, task lists and GFM alerts are always enabled. Smart
/// punctuation is not.
pub struct MarkdownRenderer {
    output: String,
    depth: usize,
    code: CodeBlockState,
    code_blocks: usize,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    highlighter: Option<Box<dyn CodeHighlighter>>,
    verbatim: fn(&str) -> bool,
}

impl MarkdownRenderer {
    /// Create a renderer without highlighting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            depth: 0,
            code: CodeBlockState::default(),
            code_blocks: 0,
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            highlighter: None,
            verbatim: |_| false,
        }
    }

    /// Highlight fenced code blocks with `highlighter`.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Box<dyn CodeHighlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Never highlight code blocks whose language matches `is_verbatim`.
    ///
    /// Diagram sources must reach later stages as plain text.
    #[must_use]
    pub fn with_verbatim_languages(mut self, is_verbatim: fn(&str) -> bool) -> Self {
        self.verbatim = is_verbatim;
        self
    }

    /// Parser options used by [`render_markdown`](Self::render_markdown).
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    }

    /// Render markdown text to an HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NestingTooDeep`] if lists and blockquotes nest
    /// deeper than [`MAX_NESTING_DEPTH`].
    pub fn render_markdown(&mut self, markdown: &str) -> Result<RenderResult, RenderError> {
        self.render(Parser::new_ext(markdown, Self::parser_options()))
    }

    /// Render a stream of markdown events.
    ///
    /// # Errors
    ///
    /// See [`render_markdown`](Self::render_markdown).
    pub fn render<'a, I>(&mut self, events: I) -> Result<RenderResult, RenderError>
    where
        I: Iterator<Item = Event<'a>>,
    {
        self.reset();

        for event in events {
            self.process_event(event);
            if self.depth > MAX_NESTING_DEPTH {
                self.reset();
                return Err(RenderError::NestingTooDeep {
                    limit: MAX_NESTING_DEPTH,
                });
            }
        }

        Ok(RenderResult {
            html: std::mem::take(&mut self.output),
            code_blocks: std::mem::take(&mut self.code_blocks),
        })
    }

    fn reset(&mut self) {
        self.output.clear();
        self.depth = 0;
        self.code_blocks = 0;
        self.heading = HeadingState::default();
    }

    /// Push inline markup to the heading buffer or the output.
    ///
    /// Markup inside image alt text is dropped.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => html::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => self.heading.start_heading(heading_level_to_num(level)),
            Tag::BlockQuote(kind) => {
                self.depth += 1;
                match kind {
                    Some(kind) => html::alert_start(kind, &mut self.output),
                    None => self.output.push_str("<blockquote>"),
                }
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => {
                self.depth += 1;
                match start {
                    Some(1) => self.output.push_str("<ol>"),
                    Some(n) => {
                        let _ = write!(self.output, r#"<ol start="{n}">"#);
                    }
                    None => self.output.push_str("<ul>"),
                }
            }
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = self.table.cell_tag();
                let align = self.table.current_alignment_style();
                let _ = write!(self.output, "<{tag}{align}>");
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link { dest_url, .. } => {
                let link = format!(r#"<a href="{}">"#, escape_html(&dest_url));
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(&dest_url, &title),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, inner)) = self.heading.complete_heading() {
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        inner.trim()
                    );
                }
            }
            TagEnd::BlockQuote(_) => {
                self.depth = self.depth.saturating_sub(1);
                self.output.push_str("</blockquote>");
            }
            TagEnd::CodeBlock => {
                let (lang, source) = self.code.end();
                self.code_blocks += 1;
                let body = self.code_body(lang.as_deref(), &source);
                html::code_block(lang.as_deref(), &body, &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.depth = self.depth.saturating_sub(1);
                self.output.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let _ = write!(self.output, "</{}>", self.table.cell_tag());
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                let (src, alt, title) = self.image.end();
                let mut tag = String::new();
                html::image(&src, &alt, &title, &mut tag);
                self.push_inline(&tag);
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    /// Inner HTML of a code block: highlighted when possible, escaped otherwise.
    fn code_body(&self, lang: Option<&str>, source: &str) -> String {
        let (Some(lang), Some(highlighter)) = (lang, self.highlighter.as_deref()) else {
            return escape_html(source);
        };
        if (self.verbatim)(lang) {
            return escape_html(source);
        }

        match highlighter.highlight(source, lang) {
            Ok(Some(highlighted)) => highlighted,
            Ok(None) => escape_html(source),
            Err(e) => {
                tracing::debug!(language = lang, error = %e, "Highlighting failed, using plain text");
                escape_html(source)
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let html = format!("<code>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_str("\n");
        } else if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
