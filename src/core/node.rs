//! Nodes and edges of a contact network.

use std::fmt;

/// Epidemiological status of a node.
///
/// Transitions are one-way: `Susceptible -> Infected -> Recovered`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    #[default]
    Susceptible,
    Infected,
    Recovered,
}

/// One directed view `(source, neighbor)` of an undirected contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub neighbor: usize,
}

impl Edge {
    pub fn new(source: usize, neighbor: usize) -> Self {
        Self { source, neighbor }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.source, self.neighbor)
    }
}

/// A node in the contact network.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: usize,
    edges: Vec<Edge>,
    status: Status,
    /// Earliest time at which an infection of this node is currently scheduled.
    ///
    /// Only lowered by the infection handler during a run; starts at infinity.
    predicted_infection_time: f64,
}

impl Node {
    /// Create a susceptible node with the given neighbors.
    ///
    /// Self-loops and duplicate neighbors are kept as given.
    pub fn new(id: usize, neighbors: &[usize]) -> Self {
        Self {
            id,
            edges: neighbors
                .iter()
                .map(|&neighbor| Edge::new(id, neighbor))
                .collect(),
            status: Status::Susceptible,
            predicted_infection_time: f64::INFINITY,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn neighbors(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().map(|edge| edge.neighbor)
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_susceptible(&self) -> bool {
        self.status == Status::Susceptible
    }

    pub fn predicted_infection_time(&self) -> f64 {
        self.predicted_infection_time
    }

    /// Restore the pristine epidemiological state, keeping the topology.
    pub fn reset(&mut self) {
        self.status = Status::Susceptible;
        self.predicted_infection_time = f64::INFINITY;
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        debug_assert!(status >= self.status, "status may only advance");
        self.status = status;
    }

    pub(crate) fn set_predicted_infection_time(&mut self, time: f64) {
        debug_assert!(time <= self.predicted_infection_time);
        self.predicted_infection_time = time;
    }
}
