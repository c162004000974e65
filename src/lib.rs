//! edgerule: statistics indexes and rule application for labeled graphs
//!
//! Building blocks of a frequent-subgraph-mining toolchain, on the
//! application side of the pipeline: given already-mined patterns and
//! association rules over labeled graphs, match the rules against target
//! graphs and aggregate weighted edge predictions. Two support indexes
//! used by rule induction and search-space pruning are included.
//!
//! - [`index::EdgePatternIndex`] — max observed support per edge type and
//!   incident node type pair, with wildcard variants.
//! - [`index::ExtensionIndex`] — degree-bounded extension edge templates
//!   per source type, with sorted iteration and type-based trimming.
//! - [`predict::Predictor`] — loads patterns, rules and target graphs,
//!   derives predictions per embedding, aggregates and writes them.
//!   [`predict::spawn`] runs the pass on a cancellable worker thread.
//!
//! Subgraph embedding search is not part of this crate: callers supply an
//! implementation of [`graph::embed::EmbeddingSearch`].

pub mod chain;
pub mod error;
pub mod graph;
pub mod index;
pub mod io;
pub mod predict;

pub use error::{PredictError, Result};
pub use graph::embed::{Embedding, EmbeddingSearch};
pub use graph::{Edge, Graph, NamedGraph, TypeId, TypeRegistry, WILDCARD};
pub use index::{EdgePatternIndex, ExtensionIndex};
pub use predict::{PredictStats, Predictor, PredictorConfig};
