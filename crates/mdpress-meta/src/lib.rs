//! Front matter and document metadata for mdpress.
//!
//! - [`extract_metadata`] reads title, author and date from the leading
//!   `---` block, applying defaults for anything missing or malformed.
//! - [`strip_front_matter`] removes the same block, leaving the markdown body.
//!
//! Both use [`split_front_matter`], the single definition of the block syntax.

mod front_matter;
mod metadata;
mod slug;

pub use front_matter::{FrontMatter, split_front_matter, strip_front_matter};
pub use metadata::{DocumentMetadata, UNTITLED, extract_metadata, extract_metadata_on};
pub use slug::file_slug;
