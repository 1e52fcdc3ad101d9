//! Immutable HTML document tree.
//!
//! Rendered HTML is parsed once with `html5ever` into a [`Fragment`], an owned
//! tree that is never mutated. Transformations such as
//! [`Fragment::map_elements`] build a new tree and leave the input untouched,
//! so a failed or repeated pass never observes partial edits.
//!
//! Parsing rejects markup nested deeper than [`MAX_DEPTH`], which bounds the
//! recursion of every walk over the tree.
//!
//! ```
//! use mdpress_dom::{Fragment, Node};
//!
//! let fragment = Fragment::parse("<p>Hello</p><pre><code>x</code></pre>").unwrap();
//! let replaced = fragment.map_elements(|el| {
//!     (el.name == "pre").then(|| Node::raw("<figure>done</figure>"))
//! });
//!
//! assert_eq!(fragment.to_html(), "<p>Hello</p><pre><code>x</code></pre>");
//! assert_eq!(replaced.to_html(), "<p>Hello</p><figure>done</figure>");
//! ```

mod node;
mod parse;
mod serialize;

pub use node::{Descendants, Element, Fragment, Node};
pub use parse::{MAX_DEPTH, ParseError};
