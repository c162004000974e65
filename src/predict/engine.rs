//! Rule application engine
//!
//! Drives a whole prediction run: load patterns, rules and target graphs,
//! match every qualifying rule body against every target graph through the
//! caller-supplied embedding search, derive predicted edges per embedding
//! under the configured weighting policy, and aggregate them in a
//! [`PredictionTable`]. All input is slurped during the load phase; the
//! prediction pass itself does no I/O.
//!
//! The load methods are fail-fast: any malformed or unresolved input
//! aborts with an error carrying the offending record, and a failed load
//! leaves the predictor unfit for `predict`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{PredictError, Result};
use crate::graph::embed::EmbeddingSearch;
use crate::graph::{Graph, NamedGraph, TypeId, TypeRegistry};
use crate::io::{GraphSource, TableReader, TableWriter};
use crate::predict::aggregate::PredictionTable;
use crate::predict::config::PredictorConfig;
use crate::predict::rules::{self, GraphRule};

/// Progress callback, invoked with the current item count of a phase.
pub type ProgressFn = Box<dyn FnMut(usize) + Send>;

/// Counters of a finished prediction run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictStats {
    pub patterns: usize,
    pub rules: usize,
    pub graphs: usize,
    /// distinct predicted edges
    pub predictions: usize,
    /// whether the run was cut short by the stop flag
    pub aborted: bool,
}

/// The edge predictor.
pub struct Predictor {
    config: PredictorConfig,
    types: TypeRegistry,
    patterns: Vec<NamedGraph>,
    pattern_names: HashMap<String, usize>,
    rules: Vec<GraphRule>,
    graphs: Vec<NamedGraph>,
    table: PredictionTable,
    stop: Arc<AtomicBool>,
    progress: Option<ProgressFn>,
}

/// Insertion position after the last node of `ty` in a type-sorted order.
fn bisect(order: &[u32], graph: &Graph, ty: TypeId) -> usize {
    let mut l = 0;
    let mut r = order.len();
    while l < r {
        let mut m = (l + r) / 2;
        let t = graph.node_type(order[m] as usize);
        if ty > t {
            l = m + 1;
        } else if ty < t {
            r = m;
        } else {
            m += 1;
            while m < r && graph.node_type(order[m] as usize) == ty {
                m += 1;
            }
            return m;
        }
    }
    l
}

impl Predictor {
    pub fn new(config: PredictorConfig) -> Self {
        let directed = config.directed;
        Predictor {
            config,
            types: TypeRegistry::new(),
            patterns: Vec::new(),
            pattern_names: HashMap::new(),
            rules: Vec::new(),
            graphs: Vec::new(),
            table: PredictionTable::new(directed),
            stop: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn table(&self) -> &PredictionTable {
        &self.table
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Shared flag that aborts the prediction pass when set.
    ///
    /// Checked once per rule and target graph pairing; the embeddings of
    /// the current pairing are still processed. [`Predictor::predict`]
    /// clears the flag on entry, so a request made between runs is void.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Install a progress callback, invoked every 256 items per phase.
    pub fn set_progress(&mut self, progress: ProgressFn) {
        self.progress = Some(progress);
    }

    fn report(&mut self, count: usize) {
        if let Some(cb) = self.progress.as_mut() {
            cb(count);
        }
    }

    /// Load the graph patterns the rules refer to.
    ///
    /// Unnamed patterns get their 1-based sequence number as name; a
    /// duplicate name makes the later pattern win the name lookup.
    pub fn load_patterns(&mut self, src: &mut dyn GraphSource) -> Result<usize> {
        let t = Instant::now();
        let before = self.patterns.len();
        while src.read_graph(&mut self.types)? {
            let name = match src.name() {
                Some(n) => n.to_string(),
                None => (self.patterns.len() + 1).to_string(),
            };
            self.pattern_names.insert(name.clone(), self.patterns.len());
            self.patterns.push(NamedGraph::new(name, src.graph().clone()));
            if self.patterns.len() & 0xff == 0 {
                let n = self.patterns.len();
                self.report(n);
            }
        }
        let count = self.patterns.len() - before;
        if self.patterns.is_empty() {
            return Err(PredictError::EmptyInput("patterns"));
        }
        tracing::info!(
            patterns = count,
            elapsed_ms = t.elapsed().as_millis() as u64,
            "patterns loaded"
        );
        Ok(count)
    }

    /// Load the graph rules; requires the patterns to be loaded first.
    pub fn load_rules(&mut self, rdr: &mut TableReader) -> Result<usize> {
        let t = Instant::now();
        self.rules = rules::load_rules(rdr, &self.patterns, &self.pattern_names)?;
        tracing::info!(
            rules = self.rules.len(),
            elapsed_ms = t.elapsed().as_millis() as u64,
            "rules loaded"
        );
        Ok(self.rules.len())
    }

    /// Load the target graphs to predict edges for.
    ///
    /// Unnamed graphs get their 1-based sequence number as name.
    pub fn load_graphs(&mut self, src: &mut dyn GraphSource) -> Result<usize> {
        let t = Instant::now();
        let before = self.graphs.len();
        while src.read_graph(&mut self.types)? {
            let name = match src.name() {
                Some(n) => n.to_string(),
                None => (self.graphs.len() + 1).to_string(),
            };
            self.graphs.push(NamedGraph::new(name, src.graph().clone()));
            if self.graphs.len() & 0xff == 0 {
                let n = self.graphs.len();
                self.report(n);
            }
        }
        let count = self.graphs.len() - before;
        if self.graphs.is_empty() {
            return Err(PredictError::EmptyInput("target graphs"));
        }
        tracing::info!(
            graphs = count,
            elapsed_ms = t.elapsed().as_millis() as u64,
            "target graphs loaded"
        );
        Ok(count)
    }

    /// Run the prediction pass over all loaded rules and graphs.
    pub fn predict(&mut self, search: &mut dyn EmbeddingSearch) -> Result<PredictStats> {
        let t = Instant::now();
        // a stop request only applies to the run it was made during
        self.stop.store(false, Ordering::Relaxed);
        self.table = PredictionTable::new(self.config.directed);
        let min_body = self.config.min_body;
        let max_body = self.config.max_body_limit();
        let supp_frac = self.config.supp_fraction();
        let supp_floor = self.config.supp_floor();
        let mut progress = self.progress.take();
        let mut count = 0usize;
        let mut aborted = false;

        'graphs: for graph in &self.graphs {
            // target nodes ordered by type, for candidate bisection
            let order = graph.graph.nodes_by_type();
            let mut used = vec![false; graph.graph.node_count()];
            let mut cur_body: Option<usize> = None;
            let mut embs = Vec::new();

            for rule in &self.rules {
                if self.stop.load(Ordering::Relaxed) {
                    aborted = true;
                    break 'graphs;
                }
                let body = &self.patterns[rule.part].graph;
                let body_nodes = body.node_count();
                if body_nodes < min_body
                    || body_nodes > max_body
                    || (rule.supp as i64) < (supp_frac * rule.base as f64) as i64
                    || rule.supp < supp_floor
                    || rule.conf < self.config.min_conf
                {
                    continue;
                }
                // rules are grouped by body, so one search serves a group
                if cur_body != Some(rule.part) {
                    cur_body = Some(rule.part);
                    embs = search.embed(body, &graph.graph);
                }

                let full = &self.patterns[rule.full].graph;
                let edge_label = self.types.edge_label(full.edge(rule.edge).ty).unwrap_or("");
                let node_label = if rule.node >= 0 {
                    self.types
                        .node_label(full.node_type(rule.node as usize))
                        .unwrap_or("")
                } else {
                    ""
                };

                for emb in &embs {
                    let stg = if rule.src < 0 {
                        -1
                    } else {
                        emb.nodes[rule.src as usize] as i32
                    };
                    let dtg = if rule.dst < 0 {
                        -1
                    } else {
                        emb.nodes[rule.dst as usize] as i32
                    };
                    let mut n = 0;
                    if stg >= 0 && dtg >= 0 {
                        // (a) both endpoints matched in the body
                        if !self.config.body_node {
                            continue;
                        }
                        n += self.table.store(
                            &graph.name, stg, dtg, edge_label, "", 1.0, rule.conf, rule.lift1,
                            rule.lift2,
                        );
                    } else {
                        // (b) exactly one endpoint matched
                        if !self.config.new_node {
                            continue;
                        }
                        let mut wgt = 0.0;
                        if self.config.xst_weight != 0.0 {
                            // distribute over existing nodes of the
                            // consequent's type not used by this embedding
                            let node_ty = full.node_type(rule.node as usize);
                            for &m in &emb.nodes {
                                used[m as usize] = true;
                            }
                            let r = bisect(&order, &graph.graph, node_ty);
                            if self.config.xst_weight < 0.0 {
                                wgt = -self.config.xst_weight;
                            } else {
                                let mut cand = 0usize;
                                for i in (0..r).rev() {
                                    let v = order[i] as usize;
                                    if graph.graph.node_type(v) < node_ty {
                                        break;
                                    }
                                    if !used[v] {
                                        cand += 1;
                                    }
                                }
                                let base = if self.config.new_weight > 0.0 {
                                    self.config.new_weight
                                } else {
                                    0.0
                                };
                                wgt = if cand > 0 {
                                    self.config.xst_weight / (base + cand as f64)
                                } else {
                                    0.0
                                };
                            }
                            for i in (0..r).rev() {
                                let v = order[i] as usize;
                                if graph.graph.node_type(v) < node_ty {
                                    break;
                                }
                                if used[v] {
                                    continue;
                                }
                                let c = v as i32;
                                let (s, d) = if stg < 0 { (c, dtg) } else { (stg, c) };
                                n += self.table.store(
                                    &graph.name, s, d, edge_label, "", wgt, rule.conf,
                                    rule.lift1, rule.lift2,
                                );
                            }
                            for &m in &emb.nodes {
                                used[m as usize] = false;
                            }
                        }
                        if self.config.new_weight != 0.0 {
                            wgt = if self.config.new_weight < 0.0 {
                                -self.config.new_weight
                            } else if self.config.xst_weight != 0.0 {
                                wgt * self.config.new_weight
                            } else {
                                self.config.new_weight
                            };
                            n += self.table.store(
                                &graph.name, stg, dtg, edge_label, node_label, wgt, rule.conf,
                                rule.lift1, rule.lift2,
                            );
                        }
                    }
                    count += n;
                    if (count - n) & !0xff != count & !0xff {
                        if let Some(cb) = progress.as_mut() {
                            cb(count);
                        }
                    }
                }
            }
        }

        self.progress = progress;
        tracing::info!(
            predictions = count,
            aborted,
            elapsed_ms = t.elapsed().as_millis() as u64,
            "edge prediction done"
        );
        Ok(PredictStats {
            patterns: self.patterns.len(),
            rules: self.rules.len(),
            graphs: self.graphs.len(),
            predictions: count,
            aborted,
        })
    }

    /// Write the aggregated predictions, sorted, with a header record.
    ///
    /// Node indices are re-offset to 1-based; 0 marks a new node, whose
    /// label is then in the `node` column.
    pub fn write_predictions<W: std::io::Write>(
        &mut self,
        out: &mut TableWriter<W>,
    ) -> Result<()> {
        let t = Instant::now();
        out.record(&[
            "graph", "src", "dst", "edge", "node", "wgt", "conf", "lift1", "lift2",
        ])?;
        let order = self.table.sorted();
        for &i in &order {
            let p = self.table.entry(i);
            out.record(&[
                p.graph.clone(),
                (p.src + 1).to_string(),
                (p.dst + 1).to_string(),
                p.edge.clone(),
                p.node.clone(),
                p.wgt.to_string(),
                p.conf.to_string(),
                p.lift1.to_string(),
                p.lift2.to_string(),
            ])?;
        }
        out.flush()?;
        tracing::info!(
            predictions = order.len(),
            elapsed_ms = t.elapsed().as_millis() as u64,
            "predictions written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bisect_after_last_equal() {
        let mut g = Graph::new(false);
        for ty in [0, 1, 1, 1, 3, 3] {
            g.add_node(ty);
        }
        let order = g.nodes_by_type();
        assert_eq!(bisect(&order, &g, 0), 1);
        assert_eq!(bisect(&order, &g, 1), 4);
        assert_eq!(bisect(&order, &g, 2), 4);
        assert_eq!(bisect(&order, &g, 3), 6);
        assert_eq!(bisect(&order, &g, 4), 6);
    }

    #[test]
    fn test_bisect_empty() {
        let g = Graph::new(false);
        assert_eq!(bisect(&[], &g, 5), 0);
    }
}
