//! Labeled graph data model
//!
//! Nodes and edges carry integer type codes; the mapping between textual
//! labels and codes lives in a [`TypeRegistry`] shared by all inputs of one
//! run, so pattern graphs and target graphs agree on every code. The special
//! code [`WILDCARD`] stands for "any type" in partial edge patterns.

pub mod embed;

use std::collections::HashMap;

/// Integer code of a node or edge type.
pub type TypeId = i32;

/// Pseudo-type matching any node type (partial edge patterns).
pub const WILDCARD: TypeId = i32::MIN;

/// Interning table mapping type labels to codes and back.
///
/// Node and edge labels are interned separately; codes are dense and start
/// at zero, so they double as array indices in the statistics indexes.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    node_codes: HashMap<String, TypeId>,
    node_labels: Vec<String>,
    edge_codes: HashMap<String, TypeId>,
    edge_labels: Vec<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node label, returning its code.
    pub fn node_type(&mut self, label: &str) -> TypeId {
        if let Some(&code) = self.node_codes.get(label) {
            return code;
        }
        let code = self.node_labels.len() as TypeId;
        self.node_labels.push(label.to_string());
        self.node_codes.insert(label.to_string(), code);
        code
    }

    /// Intern an edge label, returning its code.
    pub fn edge_type(&mut self, label: &str) -> TypeId {
        if let Some(&code) = self.edge_codes.get(label) {
            return code;
        }
        let code = self.edge_labels.len() as TypeId;
        self.edge_labels.push(label.to_string());
        self.edge_codes.insert(label.to_string(), code);
        code
    }

    /// Get the label of a node type code.
    pub fn node_label(&self, code: TypeId) -> Option<&str> {
        self.node_labels.get(code as usize).map(|s| s.as_str())
    }

    /// Get the label of an edge type code.
    pub fn edge_label(&self, code: TypeId) -> Option<&str> {
        self.edge_labels.get(code as usize).map(|s| s.as_str())
    }

    /// Number of distinct node types seen so far.
    pub fn node_type_count(&self) -> usize {
        self.node_labels.len()
    }

    /// Number of distinct edge types seen so far.
    pub fn edge_type_count(&self) -> usize {
        self.edge_labels.len()
    }
}

/// An edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub src: u32,
    pub dst: u32,
    pub ty: TypeId,
}

/// A labeled graph: node type codes plus a flat edge list.
///
/// Node degrees are maintained on insertion (a self-loop counts twice).
#[derive(Debug, Clone, Default)]
pub struct Graph {
    directed: bool,
    types: Vec<TypeId>,
    degs: Vec<u32>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Graph {
            directed,
            ..Default::default()
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Add a node of the given type, returning its index.
    pub fn add_node(&mut self, ty: TypeId) -> usize {
        self.types.push(ty);
        self.degs.push(0);
        self.types.len() - 1
    }

    /// Add an edge between two existing nodes.
    pub fn add_edge(&mut self, src: usize, dst: usize, ty: TypeId) {
        debug_assert!(src < self.types.len() && dst < self.types.len());
        self.edges.push(Edge {
            src: src as u32,
            dst: dst as u32,
            ty,
        });
        self.degs[src] += 1;
        self.degs[dst] += 1;
    }

    pub fn node_count(&self) -> usize {
        self.types.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_type(&self, node: usize) -> TypeId {
        self.types[node]
    }

    /// Number of incident edges of a node.
    pub fn degree(&self, node: usize) -> u32 {
        self.degs[node]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> Edge {
        self.edges[index]
    }

    /// Node indices ordered by node type (ties keep index order).
    ///
    /// The prediction pass binary-searches this order for candidate
    /// destination nodes of a given type.
    pub fn nodes_by_type(&self) -> Vec<u32> {
        let mut order: Vec<u32> = (0..self.types.len() as u32).collect();
        order.sort_by_key(|&i| self.types[i as usize]);
        order
    }
}

/// A graph together with the name it was read under.
#[derive(Debug, Clone)]
pub struct NamedGraph {
    pub name: String,
    pub graph: Graph,
}

impl NamedGraph {
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        NamedGraph {
            name: name.into(),
            graph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_interns_once() {
        let mut reg = TypeRegistry::new();
        let a = reg.node_type("a");
        let b = reg.node_type("b");
        assert_ne!(a, b);
        assert_eq!(reg.node_type("a"), a);
        assert_eq!(reg.node_label(a), Some("a"));
        assert_eq!(reg.node_type_count(), 2);
    }

    #[test]
    fn test_registry_separates_node_and_edge_labels() {
        let mut reg = TypeRegistry::new();
        let n = reg.node_type("x");
        let e = reg.edge_type("x");
        assert_eq!(n, 0);
        assert_eq!(e, 0);
        assert_eq!(reg.edge_label(e), Some("x"));
    }

    #[test]
    fn test_degrees_and_self_loop() {
        let mut g = Graph::new(false);
        let a = g.add_node(0);
        let b = g.add_node(1);
        g.add_edge(a, b, 0);
        g.add_edge(a, a, 1);
        assert_eq!(g.degree(a), 3);
        assert_eq!(g.degree(b), 1);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_nodes_by_type_order() {
        let mut g = Graph::new(false);
        g.add_node(2);
        g.add_node(0);
        g.add_node(1);
        g.add_node(0);
        let order = g.nodes_by_type();
        let types: Vec<TypeId> = order.iter().map(|&i| g.node_type(i as usize)).collect();
        assert_eq!(types, vec![0, 0, 1, 2]);
    }
}
