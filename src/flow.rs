use std::collections::HashMap;
use std::fmt;

use log::warn;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use super::records::FlowRow;


#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowError {
	InvalidWeight{row_index: usize, weight: f64},
}

impl fmt::Display for FlowError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::InvalidWeight{row_index, weight} => write!(f, "flow row {} has invalid weight {}", row_index, weight),
		}
	}
}

impl std::error::Error for FlowError {}


#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowEdge {
	pub source_index: usize,
	pub target_index: usize,
	pub total_weight: f64,
}

/// An input row left out of the graph because of its weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectedRow {
	pub row_index: usize,
	pub weight: f64,
}

impl From<RejectedRow> for FlowError {
	fn from(other: RejectedRow) -> Self {
		Self::InvalidWeight{row_index: other.row_index, weight: other.weight}
	}
}


#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
	pub nodes: Vec<SmartString>,
	pub edges: Vec<FlowEdge>,
	pub rejected: Vec<RejectedRow>,
}

impl FlowGraph {
	pub fn node(&self, index: usize) -> Option<&str> {
		self.nodes.get(index).map(|s| &**s)
	}

	pub fn total_weight(&self) -> f64 {
		self.edges.iter().map(|e| e.total_weight).sum()
	}

	/// Fail on the first rejected input row instead of skipping it.
	pub fn validate(&self) -> Result<(), FlowError> {
		match self.rejected.first() {
			Some(row) => Err((*row).into()),
			None => Ok(()),
		}
	}

	/// Edges with their node labels resolved.
	pub fn labelled_edges(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
		self.edges.iter().map(move |e| {
			(&*self.nodes[e.source_index], &*self.nodes[e.target_index], e.total_weight)
		})
	}
}


fn valid_weight(w: f64) -> bool {
	w.is_finite() && w >= 0.0
}


/// Build the node and edge lists of a flow diagram.
///
/// Nodes are numbered in order of first appearance, all sources in row order
/// first, then all targets. Rows sharing a (source, target) pair are merged
/// into one edge carrying the summed weight; edges keep the order in which
/// their pair first appeared. Rows with a negative, infinite or NaN weight
/// are skipped and listed in `rejected`.
pub fn build_flow(rows: &[FlowRow]) -> FlowGraph {
	let mut rejected = Vec::new();
	let mut accepted = Vec::with_capacity(rows.len());
	for (row_index, row) in rows.iter().enumerate() {
		if valid_weight(row.weight) {
			accepted.push(row);
		} else {
			warn!("skipping flow row {} ({} -> {}) with weight {}", row_index, row.source, row.target, row.weight);
			rejected.push(RejectedRow{row_index, weight: row.weight});
		}
	}

	let mut node_index: HashMap<&str, usize> = HashMap::new();
	let mut nodes: Vec<SmartString> = Vec::new();
	let sources = accepted.iter().map(|row| &row.source);
	let targets = accepted.iter().map(|row| &row.target);
	for label in sources.chain(targets) {
		if !node_index.contains_key(&**label) {
			node_index.insert(&**label, nodes.len());
			nodes.push(label.clone());
		}
	}

	let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
	let mut edges: Vec<FlowEdge> = Vec::new();
	for row in accepted.iter() {
		let pair = (node_index[&*row.source], node_index[&*row.target]);
		match edge_index.get(&pair) {
			Some(i) => edges[*i].total_weight += row.weight,
			None => {
				edge_index.insert(pair, edges.len());
				edges.push(FlowEdge{
					source_index: pair.0,
					target_index: pair.1,
					total_weight: row.weight,
				});
			},
		}
	}

	FlowGraph{
		nodes,
		edges,
		rejected,
	}
}
