//! Statistics indexes over example substructures

pub mod edge_pattern;
pub mod extension;

pub use edge_pattern::EdgePatternIndex;
pub use extension::ExtensionIndex;
