use itertools::Itertools;
use std::collections::BTreeMap;

use crate::core::{Network, Node};

/// Fraction of nodes per observed degree, ordered by degree.
pub type DegreeDistribution = BTreeMap<usize, f64>;

/// Trait extension to compute degree statistics of a collection of nodes
pub trait DegreeStatistics {
    fn degree_distribution(&self) -> DegreeDistribution;

    /// Average degree, weighting each degree by its probability.
    fn average_degree(&self) -> f64 {
        average_degree(&self.degree_distribution())
    }
}

impl DegreeStatistics for [Node] {
    /// Compute the fraction of nodes having each observed degree.
    ///
    /// The distribution of an empty node set is empty.
    fn degree_distribution(&self) -> DegreeDistribution {
        let n_nodes = self.len() as f64;
        self.iter()
            .map(Node::degree)
            .counts()
            .into_iter()
            .map(|(degree, count)| (degree, count as f64 / n_nodes))
            .collect()
    }
}

impl DegreeStatistics for Network {
    fn degree_distribution(&self) -> DegreeDistribution {
        self.nodes().degree_distribution()
    }
}

/// Weighted sum of degree times probability.
pub fn average_degree(distribution: &DegreeDistribution) -> f64 {
    distribution
        .iter()
        .map(|(&degree, &probability)| degree as f64 * probability)
        .sum()
}
