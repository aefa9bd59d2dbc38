//! Random contact networks.
//!
//! Generated networks are cleaned the same way before use: self-loops are
//! dropped and only the largest connected component is kept, relabelled so
//! that node ids stay contiguous.

use rand_distr::Bernoulli;
use std::collections::VecDeque;

use super::network::Network;
use super::rng::RandomSource;
use crate::errors::{Result, SirError};

impl Network {
    /// Sample an Erdős–Rényi graph on `n_nodes` nodes with the given expected degree and
    /// restrict it to its largest connected component.
    ///
    /// Every unordered pair is connected independently with probability
    /// `mean_degree / (n_nodes - 1)`. If no edge is drawn at all, the result is a single
    /// isolated node, which the neighbor-list format cannot represent.
    pub fn erdos_renyi(
        n_nodes: usize,
        mean_degree: f64,
        rng: &mut RandomSource,
    ) -> Result<Self> {
        if n_nodes == 0 {
            return Err(SirError::EmptyNetwork);
        }
        let probability = match n_nodes {
            1 => 0.,
            _ => mean_degree / (n_nodes - 1) as f64,
        };
        let coin = Bernoulli::new(probability).map_err(|err| {
            SirError::InvalidParameter(format!(
                "mean degree {mean_degree} is not attainable with {n_nodes} nodes: {err}"
            ))
        })?;

        let mut adjacency = vec![Vec::new(); n_nodes];
        for source in 0..n_nodes {
            for target in (source + 1)..n_nodes {
                if rng.sample(&coin) {
                    adjacency[source].push(target);
                    adjacency[target].push(source);
                }
            }
        }
        let network = Self::from_adjacency(adjacency)?.without_self_loops();
        log::debug!(
            "Sampled G({n_nodes}, {probability:.6}) with {} directed edges.",
            network.edge_count()
        );
        Ok(network.largest_component())
    }

    /// Copy of the network with every edge from a node to itself removed.
    pub fn without_self_loops(&self) -> Self {
        let adjacency = self
            .iter()
            .map(|node| {
                node.neighbors()
                    .filter(|&neighbor| neighbor != node.id())
                    .collect()
            })
            .collect();
        Self::from_valid_adjacency(adjacency)
    }

    /// Label of the connected component of every node, numbered in order of first appearance.
    pub fn components(&self) -> Vec<usize> {
        let mut labels = vec![usize::MAX; self.len()];
        let mut next_label = 0;
        for start in 0..self.len() {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = next_label;
            let mut queue = VecDeque::from([start]);
            while let Some(id) = queue.pop_front() {
                for neighbor in self[id].neighbors() {
                    if labels[neighbor] == usize::MAX {
                        labels[neighbor] = next_label;
                        queue.push_back(neighbor);
                    }
                }
            }
            next_label += 1;
        }
        labels
    }

    /// Restrict the network to its largest connected component.
    ///
    /// Surviving nodes keep their relative order and are renumbered from zero. On ties the
    /// component containing the lowest node id wins.
    pub fn largest_component(&self) -> Self {
        let labels = self.components();
        let mut sizes = Vec::new();
        for &label in &labels {
            if label >= sizes.len() {
                sizes.resize(label + 1, 0usize);
            }
            sizes[label] += 1;
        }
        // max_by_key keeps the last maximum, so walk the labels backwards
        let Some(largest) = (0..sizes.len()).rev().max_by_key(|&label| sizes[label]) else {
            return Self::default();
        };

        let mut relabel = vec![usize::MAX; self.len()];
        let mut kept = 0;
        for (id, &label) in labels.iter().enumerate() {
            if label == largest {
                relabel[id] = kept;
                kept += 1;
            }
        }
        let adjacency = self
            .iter()
            .filter(|node| labels[node.id()] == largest)
            .map(|node| {
                node.neighbors()
                    .map(|neighbor| relabel[neighbor])
                    .collect()
            })
            .collect();
        Self::from_valid_adjacency(adjacency)
    }
}
