//! Extension edge candidates for graph-growth search
//!
//! Registers, per observed edge, a degree-bounded extension template
//! (edge code, source type, destination type, maximum source degree).
//! Pattern enumeration walks the templates of a node's type to decide
//! which growth steps can still occur, and prunes by the degree bound.
//!
//! Templates come in forward/backward pairs with swapped endpoints; the
//! pair is linked explicitly so one observed edge updates both degree
//! bounds in a single pass. A self-loop-type edge (equal endpoint types)
//! has a single template whose bound covers both directions.

use std::cmp::Ordering;

use crate::chain::{self, Chain};
use crate::graph::{Graph, TypeId};

/// Default number of hash buckets.
const DEFAULT_BINS: usize = 1023;

/// One extension edge template.
#[derive(Debug)]
struct ExtensionEdge {
    /// edge type, with the direction flag in bit 0 when directed
    code: i32,
    src: TypeId,
    dst: TypeId,
    /// maximum observed source node degree
    deg: u32,
    /// successor in the hash bucket chain
    next: Option<u32>,
    /// successor in the per-source-type candidate list
    succ: Option<u32>,
    /// reverse-direction twin (None for self-loop-type templates)
    twin: Option<u32>,
    /// unlinked by [`ExtensionIndex::trim`]; stays out of rebuilt buckets
    dead: bool,
}

impl Chain for ExtensionEdge {
    fn succ(&self) -> Option<u32> {
        self.succ
    }
    fn set_succ(&mut self, succ: Option<u32>) {
        self.succ = succ;
    }
}

fn hash(code: i32, src: TypeId, dst: TypeId) -> u32 {
    let h = src
        .wrapping_add(1)
        .wrapping_mul(dst.wrapping_add(1))
        .wrapping_add(code);
    (h & i32::MAX) as u32
}

/// Growable hash index plus per-source-type lists of extension templates.
///
/// Iteration uses a single internal cursor ([`ExtensionIndex::first`] /
/// [`ExtensionIndex::next`]); interleaving two traversals corrupts the
/// cursor position, not the index itself.
#[derive(Debug)]
pub struct ExtensionIndex {
    directed: bool,
    /// candidate list heads, indexed by source node type
    exts: Vec<Option<u32>>,
    bins: Vec<Option<u32>>,
    entries: Vec<ExtensionEdge>,
    /// number of templates reachable from the index (trim lowers this)
    count: usize,
    cursor: Option<u32>,
}

impl ExtensionIndex {
    /// Create an index for `node_types` distinct node types.
    pub fn new(directed: bool, node_types: usize) -> Self {
        Self::with_capacity(directed, node_types, DEFAULT_BINS)
    }

    /// Create an index with an explicit initial bucket count.
    pub fn with_capacity(directed: bool, node_types: usize, bins: usize) -> Self {
        ExtensionIndex {
            directed,
            exts: vec![None; node_types],
            bins: vec![None; bins.max(1)],
            entries: Vec::new(),
            count: 0,
            cursor: None,
        }
    }

    /// Number of templates in the index (reverse twins included).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn rehash(&mut self) {
        let size = (self.bins.len() << 1) + 1;
        self.bins = vec![None; size];
        for i in 0..self.entries.len() {
            let e = &self.entries[i];
            if e.dead {
                continue;
            }
            let k = hash(e.code, e.src, e.dst) as usize % size;
            self.entries[i].next = self.bins[k];
            self.bins[k] = Some(i as u32);
        }
    }

    fn push(&mut self, entry: ExtensionEdge) -> u32 {
        let k = hash(entry.code, entry.src, entry.dst) as usize % self.bins.len();
        let index = self.entries.len() as u32;
        self.entries.push(ExtensionEdge {
            next: self.bins[k],
            ..entry
        });
        self.bins[k] = Some(index);
        self.count += 1;
        if self.entries.len() > self.bins.len() {
            self.rehash();
        }
        let src = self.entries[index as usize].src as usize;
        if src >= self.exts.len() {
            self.exts.resize(src + 1, None);
        }
        self.entries[index as usize].succ = self.exts[src];
        self.exts[src] = Some(index);
        index
    }

    /// Register an edge of an example graph as an extension template.
    ///
    /// The canonical direction puts the lower-valued node type first. An
    /// existing template and its twin get their degree bounds raised in
    /// one pass; otherwise the forward template and (unless the endpoint
    /// types are equal) its reverse twin are created and linked.
    pub fn add(&mut self, graph: &Graph, edge_index: usize) {
        let e = graph.edge(edge_index);
        let (mut src, mut dst) = (
            graph.node_type(e.src as usize),
            graph.node_type(e.dst as usize),
        );
        let (sdg, ddg);
        let code;
        if src < dst {
            sdg = graph.degree(e.src as usize);
            ddg = graph.degree(e.dst as usize);
            code = if self.directed { e.ty << 1 } else { e.ty };
        } else {
            sdg = graph.degree(e.dst as usize);
            ddg = graph.degree(e.src as usize);
            std::mem::swap(&mut src, &mut dst);
            code = if self.directed { (e.ty << 1) + 1 } else { e.ty };
        }

        let k = hash(code, src, dst) as usize % self.bins.len();
        let mut cur = self.bins[k];
        while let Some(i) = cur {
            let e = &self.entries[i as usize];
            if e.code == code && e.src == src && e.dst == dst {
                let twin = e.twin;
                let e = &mut self.entries[i as usize];
                if sdg > e.deg {
                    e.deg = sdg;
                }
                match twin {
                    Some(t) => {
                        let r = &mut self.entries[t as usize];
                        if ddg > r.deg {
                            r.deg = ddg;
                        }
                    }
                    // self-loop-type: one template bounds both directions
                    None => {
                        let e = &mut self.entries[i as usize];
                        if ddg > e.deg {
                            e.deg = ddg;
                        }
                    }
                }
                return;
            }
            cur = e.next;
        }

        if src == dst {
            self.push(ExtensionEdge {
                code,
                src,
                dst,
                deg: sdg.max(ddg),
                next: None,
                succ: None,
                twin: None,
                dead: false,
            });
            return;
        }
        let fwd = self.push(ExtensionEdge {
            code,
            src,
            dst,
            deg: sdg,
            next: None,
            succ: None,
            twin: None,
            dead: false,
        });
        let rev_code = if self.directed { code ^ 1 } else { code };
        let rev = self.push(ExtensionEdge {
            code: rev_code,
            src: dst,
            dst: src,
            deg: ddg,
            next: None,
            succ: None,
            twin: Some(fwd),
            dead: false,
        });
        self.entries[fwd as usize].twin = Some(rev);
    }

    /// Sort every per-source-type candidate list by (code, src, dst).
    pub fn sort(&mut self) {
        let cmp = |a: &ExtensionEdge, b: &ExtensionEdge| -> Ordering {
            (a.code, a.src, a.dst).cmp(&(b.code, b.src, b.dst))
        };
        for i in 0..self.exts.len() {
            if self.exts[i].is_some() {
                self.exts[i] = chain::sort(&mut self.entries, self.exts[i], &cmp);
            }
        }
        self.cursor = None;
    }

    /// Remove every template referencing an excluded type on either end.
    ///
    /// Trimming twice with the same predicate equals trimming once.
    pub fn trim<F>(&mut self, excluded: F)
    where
        F: Fn(TypeId) -> bool,
    {
        // Pass 1: per-source-type candidate lists.
        for i in 0..self.exts.len() {
            let head = match self.exts[i] {
                Some(h) => h,
                None => continue,
            };
            if excluded(self.entries[head as usize].src) {
                // the whole list shares this source type
                self.exts[i] = None;
                continue;
            }
            let mut cur = head;
            while let Some(nx) = self.entries[cur as usize].succ {
                if excluded(self.entries[nx as usize].dst) {
                    self.entries[cur as usize].succ = self.entries[nx as usize].succ;
                } else {
                    cur = nx;
                }
            }
            if excluded(self.entries[head as usize].dst) {
                self.exts[i] = self.entries[head as usize].succ;
            }
        }
        // Pass 2: hash bucket chains.
        for i in 0..self.bins.len() {
            let head = match self.bins[i] {
                Some(h) => h,
                None => continue,
            };
            let mut cur = head;
            while let Some(nx) = self.entries[cur as usize].next {
                let e = &self.entries[nx as usize];
                if excluded(e.src) || excluded(e.dst) {
                    self.entries[cur as usize].next = self.entries[nx as usize].next;
                    self.entries[nx as usize].dead = true;
                    self.count -= 1;
                } else {
                    cur = nx;
                }
            }
            let e = &self.entries[head as usize];
            if excluded(e.src) || excluded(e.dst) {
                self.bins[i] = self.entries[head as usize].next;
                self.entries[head as usize].dead = true;
                self.count -= 1;
            }
        }
        self.cursor = None;
    }

    /// Position the cursor on the first template for a source node type
    /// and return its edge type, or `None` if there is no template.
    pub fn first(&mut self, src: TypeId) -> Option<TypeId> {
        self.cursor = self.exts.get(src as usize).copied().flatten();
        self.edge_type()
    }

    /// Advance the cursor, returning the next template's edge type.
    pub fn next(&mut self) -> Option<TypeId> {
        if let Some(i) = self.cursor {
            self.cursor = self.entries[i as usize].succ;
        }
        self.edge_type()
    }

    /// Edge type of the current template.
    pub fn edge_type(&self) -> Option<TypeId> {
        self.cursor.map(|i| {
            let code = self.entries[i as usize].code;
            if self.directed {
                code >> 1
            } else {
                code
            }
        })
    }

    /// Whether the current template runs against the edge direction.
    pub fn is_reversed(&self) -> bool {
        match self.cursor {
            Some(i) => self.directed && (self.entries[i as usize].code & 1) != 0,
            None => false,
        }
    }

    /// Source node type of the current template.
    pub fn source(&self) -> Option<TypeId> {
        self.cursor.map(|i| self.entries[i as usize].src)
    }

    /// Destination node type of the current template.
    pub fn dest(&self) -> Option<TypeId> {
        self.cursor.map(|i| self.entries[i as usize].dst)
    }

    /// Maximum source node degree of the current template.
    pub fn degree(&self) -> Option<u32> {
        self.cursor.map(|i| self.entries[i as usize].deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_graph(directed: bool, st: TypeId, dt: TypeId, ty: TypeId) -> Graph {
        let mut g = Graph::new(directed);
        let a = g.add_node(st);
        let b = g.add_node(dt);
        g.add_edge(a, b, ty);
        g
    }

    /// Collect (edge_type, reversed, src, dst, deg) for one source type.
    fn templates(idx: &mut ExtensionIndex, src: TypeId) -> Vec<(TypeId, bool, TypeId, TypeId, u32)> {
        let mut out = Vec::new();
        let mut ty = idx.first(src);
        while ty.is_some() {
            out.push((
                idx.edge_type().unwrap(),
                idx.is_reversed(),
                idx.source().unwrap(),
                idx.dest().unwrap(),
                idx.degree().unwrap(),
            ));
            ty = idx.next();
        }
        out
    }

    #[test]
    fn test_twin_symmetry_undirected() {
        let g = two_node_graph(false, 1, 2, 0);
        let mut idx = ExtensionIndex::new(false, 3);
        idx.add(&g, 0);
        assert_eq!(idx.len(), 2);
        assert_eq!(templates(&mut idx, 1), vec![(0, false, 1, 2, 1)]);
        assert_eq!(templates(&mut idx, 2), vec![(0, false, 2, 1, 1)]);
    }

    #[test]
    fn test_twin_symmetry_directed() {
        // Edge from the higher-valued type: canonical direction is reversed.
        let g = two_node_graph(true, 4, 2, 3);
        let mut idx = ExtensionIndex::new(true, 5);
        idx.add(&g, 0);
        assert_eq!(idx.len(), 2);
        assert_eq!(templates(&mut idx, 2), vec![(3, true, 2, 4, 1)]);
        assert_eq!(templates(&mut idx, 4), vec![(3, false, 4, 2, 1)]);
    }

    #[test]
    fn test_combined_degree_update() {
        let mut g = Graph::new(false);
        let a = g.add_node(1);
        let b = g.add_node(2);
        let c = g.add_node(2);
        g.add_edge(a, b, 0); // deg(a)=1, deg(b)=1
        g.add_edge(a, c, 0); // deg(a)=2, deg(c)=1
        let mut idx = ExtensionIndex::new(false, 3);
        idx.add(&g, 0);
        idx.add(&g, 1);
        // one template pair; both degree bounds raised by the second add
        assert_eq!(idx.len(), 2);
        assert_eq!(templates(&mut idx, 1), vec![(0, false, 1, 2, 2)]);
        assert_eq!(templates(&mut idx, 2), vec![(0, false, 2, 1, 1)]);
    }

    #[test]
    fn test_self_loop_type_single_entry() {
        let mut g = Graph::new(false);
        let a = g.add_node(1);
        let b = g.add_node(1);
        let c = g.add_node(1);
        g.add_edge(a, b, 0);
        g.add_edge(a, c, 0);
        let mut idx = ExtensionIndex::new(false, 2);
        idx.add(&g, 0);
        assert_eq!(idx.len(), 1);
        idx.add(&g, 1);
        assert_eq!(idx.len(), 1);
        // degree bound is the max over both directions: deg(a) = 2
        assert_eq!(templates(&mut idx, 1), vec![(0, false, 1, 1, 2)]);
    }

    #[test]
    fn test_sorted_iteration() {
        let mut idx = ExtensionIndex::new(false, 4);
        idx.add(&two_node_graph(false, 1, 3, 2), 0);
        idx.add(&two_node_graph(false, 1, 2, 2), 0);
        idx.add(&two_node_graph(false, 1, 2, 0), 0);
        idx.sort();
        let got: Vec<(TypeId, TypeId)> = templates(&mut idx, 1)
            .into_iter()
            .map(|(ty, _, _, dst, _)| (ty, dst))
            .collect();
        assert_eq!(got, vec![(0, 2), (2, 2), (2, 3)]);
    }

    #[test]
    fn test_trim_safety_and_idempotence() {
        let mut idx = ExtensionIndex::new(false, 4);
        idx.add(&two_node_graph(false, 1, 2, 0), 0);
        idx.add(&two_node_graph(false, 1, 3, 0), 0);
        idx.add(&two_node_graph(false, 2, 3, 1), 0);
        assert_eq!(idx.len(), 6);

        idx.trim(|t| t == 3);
        assert_eq!(idx.len(), 2);
        for src in 0..4 {
            for t in templates(&mut idx, src) {
                assert_ne!(t.2, 3);
                assert_ne!(t.3, 3);
            }
        }
        assert!(templates(&mut idx, 3).is_empty());

        idx.trim(|t| t == 3);
        assert_eq!(idx.len(), 2);
        assert_eq!(templates(&mut idx, 1), vec![(0, false, 1, 2, 1)]);
        assert_eq!(templates(&mut idx, 2), vec![(0, false, 2, 1, 1)]);
    }

    #[test]
    fn test_trimmed_templates_stay_out_after_rehash() {
        let mut idx = ExtensionIndex::with_capacity(false, 20, 1);
        idx.add(&two_node_graph(false, 1, 2, 0), 0);
        idx.add(&two_node_graph(false, 3, 4, 0), 0);
        idx.trim(|t| t == 2);
        assert_eq!(idx.len(), 2);

        // grow past the bucket count so the table is rebuilt
        for src in 5..9 {
            idx.add(&two_node_graph(false, src, src + 8, 0), 0);
        }
        assert_eq!(idx.len(), 10);
        assert!(templates(&mut idx, 1).is_empty());
        assert!(templates(&mut idx, 2).is_empty());

        // the trimmed pair can be registered afresh
        idx.add(&two_node_graph(false, 1, 2, 0), 0);
        assert_eq!(idx.len(), 12);
        assert_eq!(templates(&mut idx, 1), vec![(0, false, 1, 2, 1)]);
        assert_eq!(templates(&mut idx, 2), vec![(0, false, 2, 1, 1)]);
    }

    #[test]
    fn test_rehash_keeps_templates_reachable() {
        let mut idx = ExtensionIndex::with_capacity(false, 64, 1);
        for src in 0..8 {
            for ty in 0..4 {
                idx.add(&two_node_graph(false, src, src + 8, ty), 0);
            }
        }
        assert_eq!(idx.len(), 8 * 4 * 2);
        for src in 0..8 {
            assert_eq!(templates(&mut idx, src).len(), 4);
            assert_eq!(templates(&mut idx, src + 8).len(), 4);
        }
    }
}
