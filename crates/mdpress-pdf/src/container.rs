//! Visual container laid out before rasterization.

use std::fmt::Write;

use mdpress_meta::DocumentMetadata;
use mdpress_renderer::escape_html;

use crate::theme::{PageTheme, ThemeRules};

const BASE_CSS: &str = include_str!("container.css");

/// Title block plus rendered content, styled for rasterization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub title: String,
    pub author: String,
    pub date: String,
    /// Rendered body fragment.
    pub body_html: String,
    pub style: ThemeRules,
}

impl Container {
    /// Build a container with the default theme's rules.
    #[must_use]
    pub fn new(metadata: &DocumentMetadata, body_html: &str) -> Self {
        Self {
            title: metadata.title.clone(),
            author: metadata.author.clone(),
            date: metadata.date.clone(),
            body_html: body_html.to_owned(),
            style: PageTheme::default().rules(),
        }
    }

    /// Full HTML document for a viewport `width_px` pixels wide.
    #[must_use]
    pub fn to_html(&self, width_px: u32) -> String {
        let mut html = String::with_capacity(self.body_html.len() + BASE_CSS.len() + 1024);

        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
{BASE_CSS}
body {{ width: {width_px}px; font-family: {font}; }}
h1, h2, h3, h4, h5, h6 {{ color: {heading}; }}
</style>
</head>
<body>
<div class="mdpress-container">
<header class="doc-header">
<h1 class="doc-title">{title}</h1>
"#,
            title = escape_html(&self.title),
            font = self.style.font_family,
            heading = self.style.heading_color,
        );

        if !self.author.is_empty() {
            let _ = writeln!(html, r#"<p class="doc-author">{}</p>"#, escape_html(&self.author));
        }
        if !self.date.is_empty() {
            let _ = writeln!(html, r#"<p class="doc-date">{}</p>"#, escape_html(&self.date));
        }

        html.push_str("</header>\n<main class=\"doc-content\">\n");
        html.push_str(&self.body_html);
        html.push_str("\n</main>\n</div>\n</body>\n</html>\n");
        html
    }
}

/// Return a copy of `container` styled with `theme`.
///
/// Only presentation rules change; title, byline and content are copied as is.
#[must_use]
pub fn apply_theme(container: &Container, theme: PageTheme) -> Container {
    Container {
        style: theme.rules(),
        ..container.clone()
    }
}
