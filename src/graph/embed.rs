//! Embedding seam for the external subgraph matcher
//!
//! Finding the occurrences of a pattern in a target graph is the job of an
//! external collaborator. The prediction engine only consumes the resulting
//! node maps, one per occurrence, and never retains them beyond a single
//! rule/graph pairing.

use crate::graph::Graph;

/// One occurrence of a pattern in a target graph.
///
/// `nodes[i]` is the target node the pattern's node `i` is mapped to; the
/// mapping preserves adjacency and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedding {
    pub nodes: Vec<u32>,
}

impl Embedding {
    pub fn new(nodes: Vec<u32>) -> Self {
        Embedding { nodes }
    }
}

/// Subgraph embedding search, supplied by the caller.
///
/// Implementations may cache per-pattern state between calls, hence the
/// `&mut self` receiver.
pub trait EmbeddingSearch {
    /// Return all embeddings of `pattern` in `target`.
    fn embed(&mut self, pattern: &Graph, target: &Graph) -> Vec<Embedding>;
}
