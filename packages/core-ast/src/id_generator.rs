use crate::ast::NodeId;
use crc32fast::Hasher;

/// Prefix used by [`IdGenerator::new`]
pub const DEFAULT_PREFIX: &str = "node";

/// Stable prefix for a document path (CRC32 of its `file://` url)
pub fn get_document_id(path: &str) -> String {
    let url = if path.starts_with("file://") {
        path.to_string()
    } else {
        format!("file://{}", path)
    };

    let mut hasher = Hasher::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential identity source. One per document; never shared between trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: String,
    count: u64,
}

impl IdGenerator {
    /// Yields `node-1`, `node-2`, ...
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            count: 0,
        }
    }

    /// Ids seeded from the document path, e.g. `3f2a9c1b-1`
    pub fn for_document(path: &str) -> Self {
        Self::with_prefix(get_document_id(path))
    }

    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId::new(format!("{}-{}", self.prefix, self.count))
    }

    /// Back to the start state; the next id is `<prefix>-1` again.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of ids handed out since creation or the last reset
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_generation() {
        let id1 = get_document_id("/pages/index.html");
        let id2 = get_document_id("file:///pages/index.html");

        assert_eq!(id1, id2);
        assert_ne!(id1, get_document_id("/pages/about.html"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdGenerator::new();

        assert_eq!(ids.new_id().as_str(), "node-1");
        assert_eq!(ids.new_id().as_str(), "node-2");
        assert_eq!(ids.count(), 2);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut ids = IdGenerator::for_document("/a.html");
        let first = ids.new_id();
        ids.new_id();
        ids.reset();

        assert_eq!(ids.new_id(), first);
        assert!(first.as_str().starts_with(ids.prefix()));
    }
}
