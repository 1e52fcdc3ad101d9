//! HTML output helpers.

use std::fmt::Write;

use pulldown_cmark::BlockQuoteKind;

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Write a `<pre><code>` block around already escaped or highlighted content.
pub(crate) fn code_block(lang: Option<&str>, body: &str, out: &mut String) {
    match lang {
        Some(lang) => {
            let _ = write!(
                out,
                r#"<pre><code class="language-{}">{body}</code></pre>"#,
                escape_html(lang)
            );
        }
        None => {
            let _ = write!(out, "<pre><code>{body}</code></pre>");
        }
    }
}

/// Open a GitHub-style alert as a classed blockquote with a title line.
pub(crate) fn alert_start(kind: BlockQuoteKind, out: &mut String) {
    let (class, title) = match kind {
        BlockQuoteKind::Note => ("note", "Note"),
        BlockQuoteKind::Tip => ("tip", "Tip"),
        BlockQuoteKind::Important => ("important", "Important"),
        BlockQuoteKind::Warning => ("warning", "Warning"),
        BlockQuoteKind::Caution => ("caution", "Caution"),
    };
    let _ = write!(
        out,
        r#"<blockquote class="alert alert-{class}"><p class="alert-title">{title}</p>"#
    );
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    let _ = write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    );
}

pub(crate) fn task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked disabled> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled> "#);
    }
}
