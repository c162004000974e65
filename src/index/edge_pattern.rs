//! Support statistics for single edge patterns
//!
//! Records, per edge type and incident node type pair observed in example
//! substructures, the maximum support seen, so rule induction can look up
//! background supports cheaply. For partial patterns (one endpoint type
//! unconstrained) the endpoint is stored as [`WILDCARD`].

use crate::graph::{Graph, TypeId, WILDCARD};

/// Default number of hash buckets.
const DEFAULT_BINS: usize = 1023;

/// One (edge type, source type, destination type) -> support entry.
#[derive(Debug)]
struct EdgePattern {
    ty: TypeId,
    src: TypeId,
    dst: TypeId,
    supp: u32,
    /// successor in the hash bucket chain
    next: Option<u32>,
}

fn hash(ty: TypeId, src: TypeId, dst: TypeId) -> u32 {
    let h = src
        .wrapping_add(1)
        .wrapping_mul(dst.wrapping_add(2))
        .wrapping_add(ty);
    (h & i32::MAX) as u32
}

/// Growable hash index of edge pattern supports (full and partial).
///
/// Entries live in an arena and keep their slot across reorganizations;
/// buckets are chained through the entries.
#[derive(Debug)]
pub struct EdgePatternIndex {
    directed: bool,
    bins: Vec<Option<u32>>,
    entries: Vec<EdgePattern>,
    /// per-edge-type maximum support
    supps: Vec<u32>,
    /// base support (largest possible support)
    base: u32,
}

impl EdgePatternIndex {
    /// Create an index for `edge_types` distinct edge types.
    pub fn new(directed: bool, edge_types: usize, base: u32) -> Self {
        Self::with_capacity(directed, edge_types, DEFAULT_BINS, base)
    }

    /// Create an index with an explicit initial bucket count.
    pub fn with_capacity(directed: bool, edge_types: usize, bins: usize, base: u32) -> Self {
        EdgePatternIndex {
            directed,
            bins: vec![None; bins.max(1)],
            entries: Vec::new(),
            supps: vec![0; edge_types],
            base,
        }
    }

    /// Number of stored pattern entries (full and partial).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The base support (largest possible support).
    pub fn base_support(&self) -> u32 {
        self.base
    }

    /// Enlarge the bucket array and relink all entries.
    fn rehash(&mut self) {
        let size = (self.bins.len() << 1) + 1;
        self.bins = vec![None; size];
        for i in 0..self.entries.len() {
            let e = &self.entries[i];
            let k = hash(e.ty, e.src, e.dst) as usize % size;
            self.entries[i].next = self.bins[k];
            self.bins[k] = Some(i as u32);
        }
    }

    /// Insert or upsert-max a single pattern key.
    fn add_one(&mut self, ty: TypeId, src: TypeId, dst: TypeId, supp: u32) {
        let k = hash(ty, src, dst) as usize % self.bins.len();
        let mut cur = self.bins[k];
        while let Some(i) = cur {
            let e = &mut self.entries[i as usize];
            if e.ty == ty && e.src == src && e.dst == dst {
                if supp > e.supp {
                    e.supp = supp;
                }
                return;
            }
            cur = e.next;
        }
        self.entries.push(EdgePattern {
            ty,
            src,
            dst,
            supp,
            next: self.bins[k],
        });
        self.bins[k] = Some((self.entries.len() - 1) as u32);
        if self.entries.len() > self.bins.len() {
            self.rehash();
        }
    }

    /// Add an observed edge pattern and its wildcard-derived variants.
    ///
    /// One directed observation inserts 3 keys (full, dest-only,
    /// source-only); an undirected one with distinct endpoint types
    /// inserts 4, an undirected self-loop type 2. The per-edge-type
    /// maximum is raised as well.
    pub fn add(&mut self, ty: TypeId, src: TypeId, dst: TypeId, supp: u32) {
        let t = ty as usize;
        if t >= self.supps.len() {
            self.supps.resize(t + 1, 0);
        }
        if supp > self.supps[t] {
            self.supps[t] = supp;
        }
        self.add_one(ty, src, dst, supp);
        self.add_one(ty, WILDCARD, dst, supp);
        if self.directed {
            self.add_one(ty, src, WILDCARD, supp);
        } else if src != dst {
            self.add_one(ty, dst, src, supp);
            self.add_one(ty, WILDCARD, src, supp);
        }
    }

    /// Add an edge of an example substructure with the structure's support.
    pub fn observe(&mut self, graph: &Graph, edge_index: usize, supp: u32) {
        let e = graph.edge(edge_index);
        self.add(
            e.ty,
            graph.node_type(e.src as usize),
            graph.node_type(e.dst as usize),
            supp,
        );
    }

    /// Maximum support of an edge type over all incident node type pairs.
    pub fn support(&self, ty: TypeId) -> u32 {
        self.supps.get(ty as usize).copied().unwrap_or(0)
    }

    /// Support of a full or partial pattern key, 0 if absent.
    pub fn support_full(&self, ty: TypeId, src: TypeId, dst: TypeId) -> u32 {
        let k = hash(ty, src, dst) as usize % self.bins.len();
        let mut cur = self.bins[k];
        while let Some(i) = cur {
            let e = &self.entries[i as usize];
            if e.ty == ty && e.src == src && e.dst == dst {
                return e.supp;
            }
            cur = e.next;
        }
        0
    }

    /// Support of an edge with known source type and unknown destination.
    pub fn support_for_source(&self, ty: TypeId, src: TypeId) -> u32 {
        if self.directed {
            self.support_full(ty, src, WILDCARD)
        } else {
            self.support_full(ty, WILDCARD, src)
        }
    }

    /// Support of an edge with known destination type and unknown source.
    pub fn support_for_dest(&self, ty: TypeId, dst: TypeId) -> u32 {
        self.support_full(ty, WILDCARD, dst)
    }
}
