//! HTML parsing with `html5ever`.

use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::node::{Element, Fragment, Node};

/// Deepest element nesting accepted by [`Fragment::parse`].
///
/// Tree walks over a [`Fragment`] recurse once per level, so input beyond
/// this depth is rejected instead of converted.
pub const MAX_DEPTH: usize = 512;

/// HTML that cannot be turned into a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("HTML elements nest deeper than {limit} levels")]
    TooDeep { limit: usize },
}

impl Fragment {
    /// Parse an HTML fragment.
    ///
    /// The input is parsed as a document body with the HTML5 tree builder, so
    /// malformed markup is repaired the way a browser would repair it. Nodes
    /// the parser hoists into `<head>` (a leading `<style>`, for example)
    /// are kept, in front of the body content.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooDeep`] if elements nest deeper than
    /// [`MAX_DEPTH`].
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

        let mut nodes = Vec::new();
        for root in dom.document.children.borrow().iter() {
            if let NodeData::Element { name, .. } = &root.data
                && &*name.local == "html"
            {
                for section in root.children.borrow().iter() {
                    convert_children(section, 1, &mut nodes)?;
                }
            }
        }
        Ok(Self { nodes })
    }
}

fn convert_children(parent: &Handle, depth: usize, out: &mut Vec<Node>) -> Result<(), ParseError> {
    for child in parent.children.borrow().iter() {
        if let Some(node) = convert(child, depth)? {
            out.push(node);
        }
    }
    Ok(())
}

fn convert(handle: &Handle, depth: usize) -> Result<Option<Node>, ParseError> {
    let node = match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            if depth > MAX_DEPTH {
                return Err(ParseError::TooDeep { limit: MAX_DEPTH });
            }
            let mut children = Vec::new();
            convert_children(handle, depth + 1, &mut children)?;
            Node::Element(Element {
                name: name.local.to_string(),
                attrs: attrs.borrow().iter().map(convert_attr).collect(),
                children,
            })
        }
        NodeData::Text { contents } => Node::Text(contents.borrow().to_string()),
        NodeData::Comment { contents } => Node::Comment(contents.to_string()),
        _ => return Ok(None),
    };
    Ok(Some(node))
}

fn convert_attr(attr: &Attribute) -> (String, String) {
    let name = match &attr.name.prefix {
        Some(prefix) => format!("{prefix}:{}", attr.name.local),
        None => attr.name.local.to_string(),
    };
    (name, attr.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_blocks() {
        let fragment = Fragment::parse("<h1 id=\"intro\">Intro</h1>\n<p>Some <em>text</em></p>\n").unwrap();
        let blocks: Vec<_> = fragment.elements().collect();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "h1");
        assert_eq!(blocks[0].attr("id"), Some("intro"));
        assert_eq!(blocks[1].text_content(), "Some text");
    }

    #[test]
    fn test_parse_decodes_entities() {
        let fragment = Fragment::parse("<pre><code>a &lt; b &amp;&amp; c</code></pre>").unwrap();
        let pre = fragment.elements().next().unwrap();
        assert_eq!(pre.text_content(), "a < b && c");
    }

    #[test]
    fn test_parse_repairs_unclosed_tags() {
        let fragment = Fragment::parse("<p>one<p>two").unwrap();
        let texts: Vec<_> = fragment.elements().map(Element::text_content).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_keeps_hoisted_head_content() {
        let fragment = Fragment::parse("<style>p { color: red; }</style><p>Body</p>").unwrap();
        let names: Vec<_> = fragment.elements().map(|el| el.name.as_str()).collect();
        assert_eq!(names, vec!["style", "p"]);
    }

    #[test]
    fn test_parse_svg_attributes() {
        let fragment = Fragment::parse(
            r##"<svg viewBox="0 0 10 10"><use xlink:href="#a"></use></svg>"##,
        )
        .unwrap();
        let svg = fragment.elements().next().unwrap();
        assert_eq!(svg.attr("viewBox"), Some("0 0 10 10"));
        let use_el = svg.child_elements().next().unwrap();
        assert_eq!(use_el.attr("xlink:href"), Some("#a"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(Fragment::parse("").unwrap().nodes.is_empty());
    }

    fn nested_divs(depth: usize) -> String {
        format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth))
    }

    #[test]
    fn test_parse_at_depth_limit() {
        let fragment = Fragment::parse(&nested_divs(MAX_DEPTH)).unwrap();
        assert_eq!(fragment.descendants().count(), MAX_DEPTH);
        assert_eq!(fragment.elements().next().unwrap().text_content(), "x");
    }

    #[test]
    fn test_parse_rejects_deep_nesting() {
        assert_eq!(
            Fragment::parse(&nested_divs(MAX_DEPTH + 1)),
            Err(ParseError::TooDeep { limit: MAX_DEPTH })
        );
        assert_eq!(
            Fragment::parse(&nested_divs(5_000)),
            Err(ParseError::TooDeep { limit: MAX_DEPTH })
        );
    }
}
