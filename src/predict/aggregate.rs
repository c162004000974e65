//! Aggregation of predicted edges
//!
//! Many rule applications can predict the same edge of the same target
//! graph; the repository merges them into one entry per distinct edge and
//! accumulates weight, confidence and lift. Entries live in an arena and
//! are found through a chained hash table; for output they are threaded
//! into one list and merge sorted into a canonical order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::chain::{self, Chain};

/// Default number of hash buckets.
const DEFAULT_BINS: usize = 1023;

/// One aggregated predicted edge.
///
/// `src` and `dst` are 0-based node indices of the target graph; -1 marks
/// an endpoint that is not in the graph yet (a new node, whose label is
/// then in `node`). The accumulated `conf`, `lift1` and `lift2` are
/// weighted sums, divide by `wgt` for averages.
#[derive(Debug)]
pub struct Prediction {
    pub graph: String,
    pub src: i32,
    pub dst: i32,
    pub edge: String,
    pub node: String,
    pub wgt: f64,
    pub conf: f64,
    pub lift1: f64,
    pub lift2: f64,
    hash: u64,
    /// successor in the hash bucket chain
    next: Option<u32>,
    /// successor in the sorted output list
    succ: Option<u32>,
}

impl Chain for Prediction {
    fn succ(&self) -> Option<u32> {
        self.succ
    }
    fn set_succ(&mut self, succ: Option<u32>) {
        self.succ = succ;
    }
}

fn key_hash(graph: &str, src: i32, dst: i32, edge: &str, node: &str) -> u64 {
    let mut h = DefaultHasher::new();
    graph.hash(&mut h);
    src.hash(&mut h);
    dst.hash(&mut h);
    edge.hash(&mut h);
    node.hash(&mut h);
    h.finish()
}

/// Repository of predicted edges, keyed by (graph, src, dst, edge, node).
#[derive(Debug)]
pub struct PredictionTable {
    directed: bool,
    bins: Vec<Option<u32>>,
    entries: Vec<Prediction>,
}

impl PredictionTable {
    pub fn new(directed: bool) -> Self {
        Self::with_capacity(directed, DEFAULT_BINS)
    }

    pub fn with_capacity(directed: bool, bins: usize) -> Self {
        PredictionTable {
            directed,
            bins: vec![None; bins.max(1)],
            entries: Vec::new(),
        }
    }

    /// Number of distinct predicted edges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: u32) -> &Prediction {
        &self.entries[index as usize]
    }

    /// Enlarge the bucket array and relink all entries.
    fn rehash(&mut self) {
        let size = (self.bins.len() << 1) + 1;
        self.bins = vec![None; size];
        for i in 0..self.entries.len() {
            let k = (self.entries[i].hash % size as u64) as usize;
            self.entries[i].next = self.bins[k];
            self.bins[k] = Some(i as u32);
        }
    }

    /// Store one rule application for a predicted edge.
    ///
    /// For undirected prediction the endpoints are put into a fixed order
    /// (a new node always becomes the destination), so applications that
    /// predict the same undirected edge land on the same entry. Returns 1
    /// if the edge is new to the repository, 0 if it was merged.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        graph: &str,
        mut src: i32,
        mut dst: i32,
        edge: &str,
        node: &str,
        wgt: f64,
        conf: f64,
        lift1: f64,
        lift2: f64,
    ) -> usize {
        if !self.directed && (src < 0 || (dst >= 0 && src > dst)) {
            std::mem::swap(&mut src, &mut dst);
        }
        let hash = key_hash(graph, src, dst, edge, node);
        let k = (hash % self.bins.len() as u64) as usize;
        let mut cur = self.bins[k];
        while let Some(i) = cur {
            let e = &mut self.entries[i as usize];
            if e.hash == hash
                && e.src == src
                && e.dst == dst
                && e.graph == graph
                && e.edge == edge
                && e.node == node
            {
                e.wgt += wgt;
                e.conf += wgt * conf;
                e.lift1 += wgt * lift1;
                e.lift2 += wgt * lift2;
                return 0;
            }
            cur = e.next;
        }
        self.entries.push(Prediction {
            graph: graph.to_string(),
            src,
            dst,
            edge: edge.to_string(),
            node: node.to_string(),
            wgt,
            conf: wgt * conf,
            lift1: wgt * lift1,
            lift2: wgt * lift2,
            hash,
            next: self.bins[k],
            succ: None,
        });
        self.bins[k] = Some((self.entries.len() - 1) as u32);
        if self.entries.len() > self.bins.len() {
            self.rehash();
        }
        1
    }

    /// Thread all entries into one list, sort it, and return the order.
    ///
    /// Sorted by graph name, then source and destination index, then edge
    /// and node label, matching the output file order.
    pub fn sorted(&mut self) -> Vec<u32> {
        let mut head = None;
        for i in (0..self.entries.len()).rev() {
            self.entries[i].succ = head;
            head = Some(i as u32);
        }
        head = chain::sort(&mut self.entries, head, &|a: &Prediction, b: &Prediction| {
            a.graph
                .cmp(&b.graph)
                .then(a.src.cmp(&b.src))
                .then(a.dst.cmp(&b.dst))
                .then(a.edge.cmp(&b.edge))
                .then(a.node.cmp(&b.node))
        });
        let mut order = Vec::with_capacity(self.entries.len());
        let mut cur = head;
        while let Some(i) = cur {
            order.push(i);
            cur = self.entries[i as usize].succ;
        }
        order
    }
}
