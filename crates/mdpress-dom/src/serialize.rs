//! HTML serialization.

use std::fmt::Write;

use crate::node::{Element, Fragment, Node};

impl Fragment {
    /// Serialize the fragment to an HTML string.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, false);
        }
        out
    }
}

impl Element {
    /// Serialize this element and its subtree.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }
}

fn write_node(out: &mut String, node: &Node, raw_text: bool) {
    match node {
        Node::Element(el) => write_element(out, el),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_text(out, text),
        Node::Comment(body) => {
            let _ = write!(out, "<!--{body}-->");
        }
        Node::Raw(markup) => out.push_str(markup),
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }
    out.push('>');

    if is_void_element(&el.name) {
        return;
    }

    let raw_text = is_raw_text_element(&el.name);
    for child in &el.children {
        write_node(out, child, raw_text);
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn escape_text(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Elements without a closing tag.
fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose text children are written without escaping.
fn is_raw_text_element(name: &str) -> bool {
    matches!(name, "script" | "style")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_escapes_text_and_attrs() {
        let el = Element::new("p", vec![Node::text("a < b & \"c\"")])
            .with_attr("title", "say \"hi\" & bye");
        assert_eq!(
            el.to_html(),
            r#"<p title="say &quot;hi&quot; &amp; bye">a &lt; b &amp; "c"</p>"#
        );
    }

    #[test]
    fn test_serialize_void_elements() {
        let fragment = Fragment::new(vec![
            Node::Element(Element::new("img", Vec::new()).with_attr("src", "a.png")),
            Node::Element(Element::new("br", Vec::new())),
        ]);
        assert_eq!(fragment.to_html(), r#"<img src="a.png"><br>"#);
    }

    #[test]
    fn test_serialize_raw_text_and_raw_nodes() {
        let fragment = Fragment::new(vec![
            Node::Element(Element::new("style", vec![Node::text("a > b { }")])),
            Node::raw("<figure>x</figure>"),
            Node::Comment(" note ".to_owned()),
        ]);
        assert_eq!(
            fragment.to_html(),
            "<style>a > b { }</style><figure>x</figure><!-- note -->"
        );
    }

    #[test]
    fn test_parse_serialize_preserves_markup() {
        let html = "<h2 id=\"setup\">Setup</h2>\n<pre><code class=\"language-rust\">fn main() {\n    let x = 1 &lt; 2;\n}\n</code></pre>\n<ul>\n<li>one</li>\n</ul>\n";
        assert_eq!(Fragment::parse(html).unwrap().to_html(), html);
    }
}
