//! Network module
//!
//! The `Network` is the pristine contact network that simulations run on. It
//! is built once and never mutated afterwards; every run receives a working
//! copy of its nodes through `Network::reset_copy`.
//!

use derive_more::Deref;

use super::node::Node;
use crate::errors::{Result, SirError};

#[derive(Clone, Debug, Default, PartialEq, Deref)]
pub struct Network {
    nodes: Vec<Node>,
}

impl Network {
    /// Build a network from adjacency lists, where entry `k` lists the neighbors of node `k`.
    ///
    /// Every neighbor has to refer to an existing node; `MalformedInput` carries the
    /// (one-based) line of the offending entry.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>) -> Result<Self> {
        let n_nodes = adjacency.len();
        let nodes = adjacency
            .iter()
            .enumerate()
            .map(|(id, neighbors)| {
                match neighbors.iter().find(|&&neighbor| neighbor >= n_nodes) {
                    Some(neighbor) => Err(SirError::MalformedInput {
                        line: id + 1,
                        message: format!(
                            "neighbor {neighbor} does not exist in a network of {n_nodes} nodes"
                        ),
                    }),
                    None => Ok(Node::new(id, neighbors)),
                }
            })
            .collect::<Result<Vec<Node>>>()?;
        Ok(Self { nodes })
    }

    /// Build from adjacency lists whose neighbors are known to be in range.
    pub(super) fn from_valid_adjacency(adjacency: Vec<Vec<usize>>) -> Self {
        let nodes = adjacency
            .iter()
            .enumerate()
            .map(|(id, neighbors)| Node::new(id, neighbors))
            .collect();
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of directed edge views, i.e. the sum of all degrees.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(Node::degree).sum()
    }

    /// Return a working copy with identical topology and all nodes reset.
    pub fn reset_copy(&self) -> Vec<Node> {
        let mut nodes = self.nodes.clone();
        nodes.iter_mut().for_each(Node::reset);
        nodes
    }

    /// Reset an existing working copy in place, reusing its allocation.
    pub fn reset_into(&self, working: &mut Vec<Node>) {
        if working.len() != self.nodes.len() {
            *working = self.reset_copy();
            return;
        }
        working.iter_mut().for_each(Node::reset);
    }
}
