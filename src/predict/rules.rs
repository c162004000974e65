//! Graph rule table loading
//!
//! A graph rule says: where the body pattern occurs, the full pattern's
//! extra edge is likely too. Rules arrive as a tab/comma separated table
//! with a fixed 14 column header; node and edge indices in the file are
//! 1-based, with 0 standing for "not in the body" (a new node). Internally
//! indices are 0-based and -1 is the sentinel for a new node.
//!
//! Confidence and lift are recomputed from the support columns; the
//! trailing conf/lift1/lift2 columns are read only to validate the record
//! shape.

use std::collections::HashMap;

use crate::error::{PredictError, Result};
use crate::graph::NamedGraph;
use crate::io::{Delim, TableReader};

/// One loaded graph rule, referring to patterns by index.
#[derive(Debug, Clone)]
pub struct GraphRule {
    /// body pattern index
    pub part: usize,
    /// full pattern index (body plus consequent edge)
    pub full: usize,
    /// source node index in the body, -1 if new
    pub src: i32,
    /// destination node index in the body, -1 if new
    pub dst: i32,
    /// consequent edge index in the full pattern
    pub edge: usize,
    /// consequent node index in the full pattern, -1 if none
    pub node: i32,
    /// base support (largest possible support)
    pub base: u32,
    /// support of the body
    pub body: u32,
    /// support of the full pattern
    pub supp: u32,
    /// head support, version 1
    pub head1: u32,
    /// head support, version 2
    pub head2: u32,
    pub conf: f64,
    pub lift1: f64,
    pub lift2: f64,
}

const HEADER: [&str; 14] = [
    "part", "full", "src", "dst", "edge", "node", "base", "body", "supp", "head1", "head2",
    "conf", "lift1", "lift2",
];

fn pattern_index(
    rdr: &mut TableReader,
    names: &HashMap<String, usize>,
) -> Result<usize> {
    let name = rdr.next_str(Delim::Field)?;
    names.get(&name).copied().ok_or(PredictError::UnknownPattern {
        record: rdr.record(),
        name,
    })
}

fn node_index(rdr: &mut TableReader, what: &'static str, limit: usize) -> Result<i32> {
    let v = rdr.next_int(Delim::Field)?;
    if v < 0 || v > limit as i64 {
        return Err(PredictError::IndexRange {
            record: rdr.record(),
            what,
            value: v,
        });
    }
    Ok(v as i32 - 1)
}

fn support(rdr: &mut TableReader, what: &'static str) -> Result<u32> {
    let v = rdr.next_int(Delim::Field)?;
    if v <= 0 {
        return Err(PredictError::SupportRange {
            record: rdr.record(),
            what,
            value: v,
        });
    }
    Ok(v as u32)
}

/// Load all rules from a table, validating them against the patterns.
///
/// `names` maps pattern names to indices into `patterns`. The returned
/// rules are ordered by body pattern, so consecutive rules with the same
/// body can share one embedding computation; within one body the file
/// order is kept.
pub fn load_rules(
    rdr: &mut TableReader,
    patterns: &[NamedGraph],
    names: &HashMap<String, usize>,
) -> Result<Vec<GraphRule>> {
    if rdr.eof() {
        return Err(PredictError::EmptyInput("rules"));
    }
    for (i, name) in HEADER.iter().enumerate() {
        let want = if i + 1 < HEADER.len() {
            Delim::Field
        } else {
            Delim::Record
        };
        rdr.expect(name, want)?;
    }

    let mut rules = Vec::new();
    while !rdr.eof() {
        let part = pattern_index(rdr, names)?;
        let full = pattern_index(rdr, names)?;
        let body_nodes = patterns[part].graph.node_count();
        let full_graph = &patterns[full].graph;

        let src = node_index(rdr, "source node", body_nodes)?;
        let dst = node_index(rdr, "destination node", body_nodes)?;
        let edge = rdr.next_int(Delim::Field)?;
        if edge <= 0 || edge > full_graph.edge_count() as i64 {
            return Err(PredictError::IndexRange {
                record: rdr.record(),
                what: "edge",
                value: edge,
            });
        }
        let node = rdr.next_int_or_zero(Delim::Field)?;
        if node < 0 || node > full_graph.node_count() as i64 {
            return Err(PredictError::IndexRange {
                record: rdr.record(),
                what: "node",
                value: node,
            });
        }
        // a new endpoint needs the consequent node to be identified
        if (src < 0 || dst < 0) && node == 0 {
            return Err(PredictError::IndexRange {
                record: rdr.record(),
                what: "node",
                value: node,
            });
        }
        let base = support(rdr, "base")?;
        let body = support(rdr, "body")?;
        let supp = support(rdr, "pattern")?;
        let head1 = support(rdr, "head1")?;
        let head2 = support(rdr, "head2")?;
        rdr.next_f64(Delim::Field)?; // confidence (recomputed)
        rdr.next_f64(Delim::Field)?; // lift value 1 (recomputed)
        rdr.next_f64(Delim::Record)?; // lift value 2 (recomputed)

        let conf = supp as f64 / body as f64;
        let lift1 = conf / (head1 as f64 / base as f64);
        let lift2 = conf / (head2 as f64 / base as f64);
        rules.push(GraphRule {
            part,
            full,
            src,
            dst,
            edge: edge as usize - 1,
            node: node as i32 - 1,
            base,
            body,
            supp,
            head1,
            head2,
            conf,
            lift1,
            lift2,
        });
    }
    if rules.is_empty() {
        return Err(PredictError::EmptyInput("rules"));
    }
    rules.sort_by_key(|r| r.part);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, TypeRegistry};

    fn patterns() -> (Vec<NamedGraph>, HashMap<String, usize>) {
        let mut types = TypeRegistry::new();
        let a = types.node_type("a");
        let b = types.node_type("b");
        let x = types.edge_type("x");

        let mut body = Graph::new(false);
        body.add_node(a);

        let mut full = Graph::new(false);
        let n0 = full.add_node(a);
        let n1 = full.add_node(b);
        full.add_edge(n0, n1, x);

        let pats = vec![
            NamedGraph::new("p1", body),
            NamedGraph::new("p2", full),
        ];
        let names = pats
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        (pats, names)
    }

    const HEAD: &str =
        "part\tfull\tsrc\tdst\tedge\tnode\tbase\tbody\tsupp\thead1\thead2\tconf\tlift1\tlift2\n";

    fn load(rows: &str) -> Result<Vec<GraphRule>> {
        let (pats, names) = patterns();
        let mut rdr = TableReader::from_string(format!("{HEAD}{rows}"));
        load_rules(&mut rdr, &pats, &names)
    }

    #[test]
    fn test_load_and_recompute() {
        let rules =
            load("p1\tp2\t1\t0\t1\t2\t100\t40\t10\t20\t30\t0.9\t9.9\t9.9\n").unwrap();
        assert_eq!(rules.len(), 1);
        let r = &rules[0];
        assert_eq!((r.part, r.full), (0, 1));
        assert_eq!((r.src, r.dst), (0, -1));
        assert_eq!((r.edge, r.node), (0, 1));
        // derived values ignore the ones in the file
        assert_eq!(r.conf, 0.25);
        assert_eq!(r.lift1, 1.25);
        assert!((r.lift2 - 0.25 / 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_pattern() {
        let err = load("p9\tp2\t1\t0\t1\t2\t100\t40\t10\t20\t30\t0\t0\t0\n").unwrap_err();
        assert!(matches!(err, PredictError::UnknownPattern { name, .. } if name == "p9"));
    }

    #[test]
    fn test_node_index_out_of_range() {
        // body has one node, src index 2 is out of range
        let err = load("p1\tp2\t2\t0\t1\t2\t100\t40\t10\t20\t30\t0\t0\t0\n").unwrap_err();
        assert!(matches!(
            err,
            PredictError::IndexRange {
                what: "source node",
                value: 2,
                record: 2,
            }
        ));
    }

    #[test]
    fn test_empty_node_column() {
        // both endpoints in the body, node column left blank
        let rules = load("p1\tp2\t1\t1\t1\t\t100\t40\t10\t20\t30\t0\t0\t0\n").unwrap();
        assert_eq!((rules[0].src, rules[0].dst), (0, 0));
        assert_eq!(rules[0].node, -1);
    }

    #[test]
    fn test_new_endpoint_needs_node() {
        let err = load("p1\tp2\t1\t0\t1\t0\t100\t40\t10\t20\t30\t0\t0\t0\n").unwrap_err();
        assert!(matches!(err, PredictError::IndexRange { what: "node", .. }));
    }

    #[test]
    fn test_nonpositive_support() {
        let err = load("p1\tp2\t1\t0\t1\t2\t100\t0\t10\t20\t30\t0\t0\t0\n").unwrap_err();
        assert!(matches!(
            err,
            PredictError::SupportRange {
                what: "body",
                value: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_header() {
        let (pats, names) = patterns();
        let mut rdr =
            TableReader::from_string("part\tfull\tsource\tdst\tedge\tnode\n".into());
        let err = load_rules(&mut rdr, &pats, &names).unwrap_err();
        assert!(matches!(
            err,
            PredictError::HeaderField { expect: "src", .. }
        ));
    }

    #[test]
    fn test_truncated_header() {
        let (pats, names) = patterns();
        let mut rdr = TableReader::from_string("part\tfull\tsrc\n".into());
        let err = load_rules(&mut rdr, &pats, &names).unwrap_err();
        assert!(matches!(err, PredictError::FieldCount { .. }));
    }

    #[test]
    fn test_empty_input() {
        let (pats, names) = patterns();
        let mut rdr = TableReader::from_string(String::new());
        let err = load_rules(&mut rdr, &pats, &names).unwrap_err();
        assert!(matches!(err, PredictError::EmptyInput("rules")));
    }

    #[test]
    fn test_rules_grouped_by_body() {
        let rows = "\
p2\tp2\t1\t2\t1\t0\t100\t40\t10\t20\t30\t0\t0\t0
p1\tp2\t1\t0\t1\t2\t100\t40\t10\t20\t30\t0\t0\t0
p2\tp2\t2\t1\t1\t0\t100\t40\t10\t20\t30\t0\t0\t0
p1\tp2\t0\t1\t1\t1\t100\t40\t10\t20\t30\t0\t0\t0
";
        let rules = load(rows).unwrap();
        let parts: Vec<usize> = rules.iter().map(|r| r.part).collect();
        assert_eq!(parts, vec![0, 0, 1, 1]);
        // file order preserved within one body
        assert_eq!((rules[0].src, rules[0].dst), (0, -1));
        assert_eq!((rules[1].src, rules[1].dst), (-1, 0));
    }
}
