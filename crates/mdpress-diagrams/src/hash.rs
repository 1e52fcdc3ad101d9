//! Content hashes for rendered diagrams.

use sha2::{Digest, Sha256};

use crate::consts::HASH_LEN;
use crate::language::DiagramLanguage;

/// Short content hash of a diagram.
///
/// SHA-256 of `"{endpoint}:{source}"`, truncated to 12 hex characters. Unlike
/// the positional `diagram-{i}` id, the hash survives reordering of blocks.
#[must_use]
pub fn content_hash(language: DiagramLanguage, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(language.kroki_endpoint().as_bytes());
    hasher.update(b":");
    hasher.update(source.as_bytes());
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(HASH_LEN);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_stable() {
        let a = content_hash(DiagramLanguage::Mermaid, "graph TD; A-->B");
        let b = content_hash(DiagramLanguage::Mermaid, "graph TD; A-->B");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_content_hash_language_matters() {
        assert_ne!(
            content_hash(DiagramLanguage::Mermaid, "A"),
            content_hash(DiagramLanguage::PlantUml, "A")
        );
    }

    #[test]
    fn test_content_hash_source_matters() {
        assert_ne!(
            content_hash(DiagramLanguage::Erd, "[a]"),
            content_hash(DiagramLanguage::Erd, "[b]")
        );
    }
}
