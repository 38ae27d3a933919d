//! Derivation history of synthesized shapes.

use std::collections::VecDeque;
use std::fmt::Write as _;

use hashbrown::HashSet;

use crate::error::{Result, SynthesisError};
use crate::ledger::{SynthesisKind, SynthesisLedger, SynthesisRecord};

/// Breadth-first walk from `index` back to the trained codes.
///
/// Records are returned in discovery order. A record reachable along
/// several paths appears once per visit.
///
/// # Errors
///
/// Returns [`SynthesisError::IndexOutOfRange`] if `index` or any parent is
/// not in the ledger.
///
/// # Example
///
/// ```
/// use sdf_synthesis::{LatentCode, SynthesisKind, SynthesisLedger, trace_to_origin};
///
/// let mut ledger = SynthesisLedger::seed(vec![LatentCode::zeros(2); 2]);
/// ledger.append("0__1__0-5.obj", SynthesisKind::Interpolation, vec![0, 1], LatentCode::zeros(2)).unwrap();
/// let trace: Vec<usize> = trace_to_origin(&ledger, 2).unwrap().iter().map(|r| r.index).collect();
/// assert_eq!(trace, vec![2, 0, 1]);
/// ```
pub fn trace_to_origin(ledger: &SynthesisLedger, index: usize) -> Result<Vec<&SynthesisRecord>> {
    let lookup = |i: usize| {
        ledger.get(i).ok_or(SynthesisError::IndexOutOfRange {
            index: i,
            len: ledger.len(),
        })
    };
    let mut queue = VecDeque::from([index]);
    let mut traced = Vec::new();
    while let Some(current) = queue.pop_front() {
        let record = lookup(current)?;
        traced.push(record);
        if record.synthesis_type != SynthesisKind::Initial {
            queue.extend(record.parents.iter().copied());
        }
    }
    Ok(traced)
}

/// Directed parent-to-child graph over a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<(usize, usize)>,
    highlight: usize,
}

/// A node of a [`DerivationGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Ledger index.
    pub index: usize,
    /// Record name.
    pub name: String,
    /// How the record was made.
    pub kind: SynthesisKind,
}

impl DerivationGraph {
    /// Build the graph of `traced` records, marking `highlight`.
    ///
    /// Nodes keep first-discovery order. Edges run from parent to child and
    /// are kept once even if the trace visits them repeatedly. Parents that
    /// are not among `traced` get no edge.
    #[must_use]
    pub fn build(traced: &[&SynthesisRecord], highlight: usize) -> Self {
        let mut seen = HashSet::new();
        let nodes: Vec<GraphNode> = traced
            .iter()
            .filter(|r| seen.insert(r.index))
            .map(|r| GraphNode {
                index: r.index,
                name: r.name.clone(),
                kind: r.synthesis_type,
            })
            .collect();

        let mut edge_set = HashSet::new();
        let mut edges = Vec::new();
        for record in traced {
            for &parent in &record.parents {
                if seen.contains(&parent) && edge_set.insert((parent, record.index)) {
                    edges.push((parent, record.index));
                }
            }
        }
        Self {
            nodes,
            edges,
            highlight,
        }
    }

    /// Trace `index` and build its graph in one call.
    ///
    /// # Errors
    ///
    /// See [`trace_to_origin`].
    pub fn for_record(ledger: &SynthesisLedger, index: usize) -> Result<Self> {
        Ok(Self::build(&trace_to_origin(ledger, index)?, index))
    }

    /// Nodes in discovery order.
    #[must_use]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// `(parent, child)` edges in discovery order.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// The highlighted index.
    #[must_use]
    pub const fn highlight(&self) -> usize {
        self.highlight
    }

    /// Render as Graphviz DOT.
    ///
    /// The highlighted node is red and twice the size of the gray others.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph derivation {\n");
        for node in &self.nodes {
            let (color, size) = if node.index == self.highlight {
                ("red", 1.0)
            } else {
                ("gray", 0.5)
            };
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "    {} [label=\"{}\", tooltip=\"{}\", style=filled, fillcolor={color}, width={size}, height={size}];",
                node.index, node.index, node.kind
            );
        }
        for (parent, child) in &self.edges {
            let _ = writeln!(out, "    {parent} -> {child};");
        }
        out.push_str("}\n");
        out
    }
}
