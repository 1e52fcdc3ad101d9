//! Tree types and pure transformations.

use std::slice;

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Decoded character data.
    Text(String),
    /// Comment body, without the `<!--` `-->` markers.
    Comment(String),
    /// Pre-rendered markup emitted verbatim on serialization.
    ///
    /// Raw nodes are opaque: queries such as [`Element::text_content`] and
    /// [`Fragment::descendants`] do not look inside them.
    Raw(String),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Create a raw markup node.
    #[must_use]
    pub fn raw(markup: impl Into<String>) -> Self {
        Self::Raw(markup.into())
    }

    /// The element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An HTML element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Local tag name (`p`, `pre`, `svg`).
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Add an attribute, builder style.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Value of the named attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) | Node::Raw(_) => {}
        }
    }
}

/// A sequence of top-level nodes, as found in a `<body>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Top-level nodes in document order.
    pub nodes: Vec<Node>,
}

impl Fragment {
    /// Create a fragment from nodes.
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// All elements in document order (pre-order, depth first).
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.nodes.iter()],
        }
    }

    /// Top-level elements, skipping whitespace text between blocks.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    /// Build a new tree where elements may be replaced.
    ///
    /// `replace` is called for each element in document order. Returning
    /// `Some(node)` substitutes the element (its subtree is not visited);
    /// returning `None` keeps the element and continues into its children.
    /// `self` is left unchanged.
    #[must_use]
    pub fn map_elements<F>(&self, mut replace: F) -> Fragment
    where
        F: FnMut(&Element) -> Option<Node>,
    {
        Fragment {
            nodes: map_nodes(&self.nodes, &mut replace),
        }
    }
}

fn map_nodes<F>(nodes: &[Node], replace: &mut F) -> Vec<Node>
where
    F: FnMut(&Element) -> Option<Node>,
{
    nodes
        .iter()
        .map(|node| match node {
            Node::Element(el) => replace(el).unwrap_or_else(|| {
                Node::Element(Element {
                    name: el.name.clone(),
                    attrs: el.attrs.clone(),
                    children: map_nodes(&el.children, replace),
                })
            }),
            other => other.clone(),
        })
        .collect()
}

/// Pre-order iterator over the elements of a [`Fragment`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
