//! Structural content blocks and their mapping from rendered HTML.

use mdpress_dom::{Element, Fragment, Node, ParseError};
use mdpress_meta::DocumentMetadata;

/// One block of a structural document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Document title, styled `Title`.
    Title(String),
    /// Italic author line.
    Byline(String),
    /// Empty paragraph between the title block and the content.
    Separator,
    Heading {
        /// Heading level, 1 to 6.
        level: u8,
        text: String,
    },
    Paragraph(String),
    /// Preformatted text, styled `Code`.
    Monospace(String),
    /// List item rendered as an indented paragraph.
    ListItem {
        /// Nesting depth, 0 for a top-level list.
        depth: usize,
        /// `•` or the item's ordinal, e.g. `3.`.
        marker: String,
        text: String,
    },
}

/// Title, byline and separator blocks for `metadata`.
#[must_use]
pub fn header_blocks(metadata: &DocumentMetadata) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(3);
    if !metadata.title.is_empty() {
        blocks.push(Block::Title(metadata.title.clone()));
    }
    if !metadata.author.is_empty() {
        blocks.push(Block::Byline(metadata.author.clone()));
    }
    blocks.push(Block::Separator);
    blocks
}

/// Heading level for an `h*` element name.
///
/// Names of the form `h` followed by digits are headings; levels outside
/// 1 to 6 fall back to 1.
fn heading_level(name: &str) -> Option<u8> {
    let digits = name.strip_prefix('h')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => Some(1),
    }
}

fn is_list(el: &Element) -> bool {
    el.name == "ul" || el.name == "ol"
}

/// Map rendered HTML content to blocks in document order.
///
/// Only headings, paragraphs, preformatted blocks and lists produce blocks.
/// Other containers are descended into, except embedded SVG and MathML.
/// Inline formatting is dropped; each block carries its element's plain text.
///
/// # Errors
///
/// Returns [`ParseError`] if `html` nests too deeply to be walked.
pub fn content_blocks(html: &str) -> Result<Vec<Block>, ParseError> {
    let fragment = Fragment::parse(html)?;
    let mut blocks = Vec::new();
    map_nodes(&fragment.nodes, &mut blocks);
    Ok(blocks)
}

fn map_nodes(nodes: &[Node], blocks: &mut Vec<Block>) {
    for el in nodes.iter().filter_map(Node::as_element) {
        map_element(el, blocks);
    }
}

fn map_element(el: &Element, blocks: &mut Vec<Block>) {
    if let Some(level) = heading_level(&el.name) {
        blocks.push(Block::Heading {
            level,
            text: el.text_content().trim().to_owned(),
        });
        return;
    }

    match el.name.as_str() {
        "p" => blocks.push(Block::Paragraph(el.text_content().trim().to_owned())),
        "pre" => {
            let text = el.text_content();
            blocks.push(Block::Monospace(text.trim_end_matches('\n').to_owned()));
        }
        "ul" | "ol" => map_list(el, 0, blocks),
        "svg" | "math" | "script" | "style" => {}
        _ => map_nodes(&el.children, blocks),
    }
}

fn map_list(list: &Element, depth: usize, blocks: &mut Vec<Block>) {
    let ordered = list.name == "ol";
    let mut ordinal = list
        .attr("start")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(1);

    for item in list.child_elements().filter(|el| el.name == "li") {
        let marker = if ordered {
            format!("{ordinal}.")
        } else {
            "\u{2022}".to_owned()
        };
        ordinal = ordinal.saturating_add(1);

        blocks.push(Block::ListItem {
            depth,
            marker,
            text: item_text(item),
        });

        for nested in item.child_elements().filter(|el| is_list(el)) {
            map_list(nested, depth + 1, blocks);
        }
    }
}

/// Text of a list item without its nested lists, whitespace collapsed.
fn item_text(item: &Element) -> String {
    let mut text = String::new();
    for node in &item.children {
        match node {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if is_list(el) => {}
            Node::Element(el) => {
                text.push(' ');
                text.push_str(&el.text_content());
            }
            Node::Comment(_) | Node::Raw(_) => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata(title: &str, author: &str) -> DocumentMetadata {
        DocumentMetadata {
            title: title.to_owned(),
            author: author.to_owned(),
            date: "October 6, 2026".to_owned(),
        }
    }

    #[test]
    fn test_header_blocks() {
        assert_eq!(
            header_blocks(&metadata("Report", "Ann")),
            vec![
                Block::Title("Report".to_owned()),
                Block::Byline("Ann".to_owned()),
                Block::Separator,
            ]
        );
        assert_eq!(
            header_blocks(&metadata("Report", "")),
            vec![Block::Title("Report".to_owned()), Block::Separator]
        );
    }

    #[test]
    fn test_heading_paragraph_code() {
        let html = "<h1 id=\"title\">Title</h1>\n<p>plain paragraph</p>\n<pre><code>code\n</code></pre>\n";
        assert_eq!(
            content_blocks(html).unwrap(),
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_owned()
                },
                Block::Paragraph("plain paragraph".to_owned()),
                Block::Monospace("code".to_owned()),
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h0"), Some(1));
        assert_eq!(heading_level("h7"), Some(1));
        assert_eq!(heading_level("h300"), Some(1));
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("h"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn test_inline_formatting_dropped() {
        let html = r#"<p>Some <em>emphasis</em> and a <a href="/x">link</a>.</p>"#;
        assert_eq!(
            content_blocks(html).unwrap(),
            vec![Block::Paragraph("Some emphasis and a link.".to_owned())]
        );
    }

    #[test]
    fn test_containers_are_descended() {
        let html = r#"<blockquote><p>Quoted</p></blockquote><div><h3>Inner</h3></div><hr>"#;
        assert_eq!(
            content_blocks(html).unwrap(),
            vec![
                Block::Paragraph("Quoted".to_owned()),
                Block::Heading {
                    level: 3,
                    text: "Inner".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_nested_lists() {
        let html = "<ul>\n<li>One\n<ol start=\"3\">\n<li>Three</li>\n<li><p>Four</p></li>\n</ol>\n</li>\n<li>Two</li>\n</ul>";
        assert_eq!(
            content_blocks(html).unwrap(),
            vec![
                Block::ListItem {
                    depth: 0,
                    marker: "\u{2022}".to_owned(),
                    text: "One".to_owned()
                },
                Block::ListItem {
                    depth: 1,
                    marker: "3.".to_owned(),
                    text: "Three".to_owned()
                },
                Block::ListItem {
                    depth: 1,
                    marker: "4.".to_owned(),
                    text: "Four".to_owned()
                },
                Block::ListItem {
                    depth: 0,
                    marker: "\u{2022}".to_owned(),
                    text: "Two".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_list_start_near_integer_limit() {
        let html = r#"<ol start="9223372036854775807"><li>a</li><li>b</li></ol>"#;
        let markers: Vec<_> = content_blocks(html)
            .unwrap()
            .into_iter()
            .map(|block| match block {
                Block::ListItem { marker, .. } => marker,
                other => panic!("unexpected block {other:?}"),
            })
            .collect();
        assert_eq!(markers, vec!["9223372036854775807.", "9223372036854775807."]);
    }

    #[test]
    fn test_list_start_invalid_defaults_to_one() {
        let html = r#"<ol start="many"><li>a</li></ol>"#;
        assert_eq!(
            content_blocks(html).unwrap(),
            vec![Block::ListItem {
                depth: 0,
                marker: "1.".to_owned(),
                text: "a".to_owned()
            }]
        );
    }

    #[test]
    fn test_deeply_nested_html_is_rejected() {
        let depth = mdpress_dom::MAX_DEPTH + 1;
        let html = format!("{}<p>x</p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
        assert!(content_blocks(&html).is_err());
    }

    #[test]
    fn test_diagram_figure_produces_no_blocks() {
        let html = r#"<figure class="diagram" data-diagram-id="diagram-0"><svg><text>A</text></svg></figure><p>After</p>"#;
        assert_eq!(
            content_blocks(html).unwrap(),
            vec![Block::Paragraph("After".to_owned())]
        );
    }
}
