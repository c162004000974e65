//! Node/edge list graph input
//!
//! Implements the [`GraphSource`] surface for the simple `nel` list
//! format used by the mining toolchain:
//!
//! ```text
//! n 1 a          node 1 with label "a"  (label optional, `v` is an alias)
//! n 2 b
//! e 1 2 x        edge between nodes 1 and 2 with label "x" (`d` alias)
//! g name         ends the graph and names it
//! x 0            value line (target graphs)
//! s 2 1 10 0.1 12 0.12   support info (pattern files)
//! ```
//!
//! Graphs are separated by blank lines; `#` starts a comment line.
//! Declared node/edge counts in `s` records are cross-checked against the
//! parsed graph; a mismatch is logged and ignored, it only affects a
//! diagnostic.

use std::io::Read;

use crate::error::{PredictError, Result};
use crate::graph::{Graph, TypeRegistry};

/// What a graph file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// target graphs (optional `x` value records)
    Graphs,
    /// pattern substructures (optional `s` support records)
    Patterns,
}

/// Support information of a pattern substructure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportInfo {
    pub abs: u32,
    pub rel: f64,
    pub comp_abs: u32,
    pub comp_rel: f64,
}

/// A source of graphs, one at a time.
///
/// Labels are interned into the registry passed to `read_graph`, so all
/// sources of one run share type codes.
pub trait GraphSource {
    /// Read the next graph; `Ok(false)` at end of input.
    fn read_graph(&mut self, types: &mut TypeRegistry) -> Result<bool>;
    /// The graph read last.
    fn graph(&self) -> &Graph;
    /// Its name, if the input named it.
    fn name(&self) -> Option<&str>;
    fn node_count(&self) -> usize;
    fn edge_count(&self) -> usize;
    /// Associated value (`x` record), if present.
    fn value(&self) -> Option<f64>;
    /// Support information (`s` record), if present.
    fn support(&self) -> Option<SupportInfo>;
}

/// Reader for the node/edge list format.
pub struct NelReader {
    lines: Vec<String>,
    pos: usize,
    mode: ReadMode,
    directed: bool,
    graph: Graph,
    name: Option<String>,
    value: Option<f64>,
    support: Option<SupportInfo>,
}

impl NelReader {
    /// Slurp the input and set up the reader.
    pub fn new(mut reader: impl Read, mode: ReadMode, directed: bool) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::from_string(text, mode, directed))
    }

    pub fn from_string(text: String, mode: ReadMode, directed: bool) -> Self {
        NelReader {
            lines: text.lines().map(|l| l.to_string()).collect(),
            pos: 0,
            mode,
            directed,
            graph: Graph::new(directed),
            name: None,
            value: None,
            support: None,
        }
    }

    fn fail(&self, msg: impl Into<String>) -> PredictError {
        PredictError::GraphFormat {
            line: self.pos, // pos already advanced past the offending line
            msg: msg.into(),
        }
    }

    fn parse_index(&self, token: Option<&str>, what: &str) -> Result<usize> {
        let tok = token.ok_or_else(|| self.fail(format!("missing {what} index")))?;
        let idx: usize = tok
            .parse()
            .map_err(|_| self.fail(format!("invalid {what} index '{tok}'")))?;
        if idx == 0 {
            return Err(self.fail(format!("{what} index must be positive")));
        }
        Ok(idx - 1)
    }

    fn parse_num<T: std::str::FromStr>(&self, token: Option<&str>, what: &str) -> Result<T> {
        let tok = token.ok_or_else(|| self.fail(format!("missing {what}")))?;
        tok.parse()
            .map_err(|_| self.fail(format!("invalid {what} '{tok}'")))
    }

    /// Parse the record lines following `g` (value or support info).
    fn read_trailer(&mut self) -> Result<()> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos].trim().to_string();
            if line.is_empty() {
                self.pos += 1;
                break;
            }
            self.pos += 1;
            let mut tok = line.split_whitespace();
            match tok.next() {
                Some("x") if self.mode == ReadMode::Graphs => {
                    self.value = Some(self.parse_num(tok.next(), "graph value")?);
                }
                Some("s") if self.mode == ReadMode::Patterns => {
                    let nodes: usize = self.parse_num(tok.next(), "node count")?;
                    let edges: usize = self.parse_num(tok.next(), "edge count")?;
                    if nodes != self.graph.node_count() || edges != self.graph.edge_count() {
                        tracing::warn!(
                            line = self.pos,
                            declared_nodes = nodes,
                            declared_edges = edges,
                            parsed_nodes = self.graph.node_count(),
                            parsed_edges = self.graph.edge_count(),
                            "node/edge count mismatch in support record"
                        );
                    }
                    self.support = Some(SupportInfo {
                        abs: self.parse_num(tok.next(), "absolute support")?,
                        rel: self.parse_num(tok.next(), "relative support")?,
                        comp_abs: self.parse_num(tok.next(), "complement support")?,
                        comp_rel: self.parse_num(tok.next(), "complement support")?,
                    });
                }
                Some(other) => {
                    return Err(self.fail(format!("unexpected record '{other}' after graph")));
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl GraphSource for NelReader {
    fn read_graph(&mut self, types: &mut TypeRegistry) -> Result<bool> {
        self.graph = Graph::new(self.directed);
        self.name = None;
        self.value = None;
        self.support = None;

        let mut seen_any = false;
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos].trim().to_string();
            self.pos += 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tok = line.split_whitespace();
            match tok.next() {
                Some("n") | Some("v") => {
                    seen_any = true;
                    let idx = self.parse_index(tok.next(), "node")?;
                    if idx != self.graph.node_count() {
                        return Err(self.fail(format!(
                            "node index {} out of order (expected {})",
                            idx + 1,
                            self.graph.node_count() + 1
                        )));
                    }
                    let ty = types.node_type(tok.next().unwrap_or(""));
                    self.graph.add_node(ty);
                }
                Some("e") | Some("d") => {
                    seen_any = true;
                    let src = self.parse_index(tok.next(), "source node")?;
                    let dst = self.parse_index(tok.next(), "destination node")?;
                    if src >= self.graph.node_count() || dst >= self.graph.node_count() {
                        return Err(self.fail(format!(
                            "edge endpoint out of range ({} {})",
                            src + 1,
                            dst + 1
                        )));
                    }
                    let ty = types.edge_type(tok.next().unwrap_or(""));
                    self.graph.add_edge(src, dst, ty);
                }
                Some("g") => {
                    let rest = line[1..].trim();
                    if !rest.is_empty() {
                        self.name = Some(rest.to_string());
                    }
                    self.read_trailer()?;
                    return Ok(true);
                }
                Some(other) => {
                    return Err(self.fail(format!("unknown record '{other}'")));
                }
                None => {}
            }
        }
        if seen_any {
            return Err(self.fail("unterminated graph (missing 'g' record)"));
        }
        Ok(false)
    }

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn value(&self) -> Option<f64> {
        self.value
    }

    fn support(&self) -> Option<SupportInfo> {
        self.support
    }
}

/// Create a graph source for a format configuration string.
///
/// Knows the node/edge list format under its usual aliases; anything else
/// is an error.
pub fn open_source(
    format: &str,
    reader: impl Read + 'static,
    mode: ReadMode,
    directed: bool,
) -> Result<Box<dyn GraphSource>> {
    match format {
        "nel" | "nelist" | "list" => Ok(Box::new(NelReader::new(reader, mode, directed)?)),
        other => Err(PredictError::UnknownFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERNS: &str = "\
n 1 a
n 2 b
e 1 2 x
g p1
s 2 1 10 0.1 12 0.12

n 1 a
g p2
s 1 0 4 0.04 5 0.05
";

    #[test]
    fn test_read_patterns() {
        let mut types = TypeRegistry::new();
        let mut rdr = NelReader::from_string(PATTERNS.into(), ReadMode::Patterns, false);

        assert!(rdr.read_graph(&mut types).unwrap());
        assert_eq!(rdr.name(), Some("p1"));
        assert_eq!(rdr.node_count(), 2);
        assert_eq!(rdr.edge_count(), 1);
        let sup = rdr.support().unwrap();
        assert_eq!(sup.abs, 10);
        assert_eq!(sup.comp_abs, 12);

        assert!(rdr.read_graph(&mut types).unwrap());
        assert_eq!(rdr.name(), Some("p2"));
        assert_eq!(rdr.support().unwrap().abs, 4);

        assert!(!rdr.read_graph(&mut types).unwrap());
        assert_eq!(types.node_type_count(), 2);
        assert_eq!(types.edge_type_count(), 1);
    }

    #[test]
    fn test_read_targets_with_value() {
        let text = "v 1\nv 2\ne 1 2\ng t1\nx 0.5\n";
        let mut types = TypeRegistry::new();
        let mut rdr = NelReader::from_string(text.into(), ReadMode::Graphs, false);
        assert!(rdr.read_graph(&mut types).unwrap());
        assert_eq!(rdr.name(), Some("t1"));
        assert_eq!(rdr.value(), Some(0.5));
        assert!(rdr.support().is_none());
    }

    #[test]
    fn test_shared_registry_codes_agree() {
        let mut types = TypeRegistry::new();
        let mut pats = NelReader::from_string("n 1 a\ng p\n".into(), ReadMode::Patterns, false);
        let mut trgs = NelReader::from_string("n 1 a\ng t\n".into(), ReadMode::Graphs, false);
        pats.read_graph(&mut types).unwrap();
        trgs.read_graph(&mut types).unwrap();
        assert_eq!(pats.graph().node_type(0), trgs.graph().node_type(0));
    }

    #[test]
    fn test_bad_edge_endpoint() {
        let mut types = TypeRegistry::new();
        let mut rdr = NelReader::from_string("n 1 a\ne 1 3 x\ng p\n".into(), ReadMode::Patterns, false);
        let err = rdr.read_graph(&mut types).unwrap_err();
        assert!(matches!(err, PredictError::GraphFormat { line: 2, .. }));
    }

    #[test]
    fn test_unterminated_graph() {
        let mut types = TypeRegistry::new();
        let mut rdr = NelReader::from_string("n 1 a\n".into(), ReadMode::Patterns, false);
        assert!(rdr.read_graph(&mut types).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let res = open_source("sdf", std::io::empty(), ReadMode::Graphs, false);
        assert!(matches!(res.err(), Some(PredictError::UnknownFormat(f)) if f == "sdf"));
    }

    #[test]
    fn test_open_source_by_alias() {
        for f in ["nel", "nelist", "list"] {
            assert!(open_source(f, std::io::empty(), ReadMode::Graphs, false).is_ok());
        }
    }
}
