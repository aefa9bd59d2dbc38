//! Event-driven SIR simulation on a contact network.
//!
//! A `SirSimulation` runs one epidemic at a time on a working copy of a
//! pristine `Network`:
//!
//! 1. `setup`: reset the working copy and the event queue, pick a root and
//!    schedule its infection at time zero.
//! 2. `step`: process the earliest pending event until no events are left.
//! 3. `teardown`: tally the final compartments and return to idle.
//!
//! Races between several infected neighbors of the same susceptible node are
//! resolved through the node's predicted infection time: a new infection
//! attempt is only scheduled when it precedes every attempt already pending
//! for that node. Superseded attempts stay in the queue and are skipped once
//! the node is no longer susceptible.

use crate::config::Parameters;
use crate::core::{Effect, Event, EventQueue, Network, Node, RandomSource, Status};
use crate::errors::{Result, SirError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Final tally of a single run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    pub transmission_rate: f64,
    pub recovery_rate: f64,
    pub root: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    /// Number of events popped from the queue, including stale ones.
    pub events: usize,
    /// Simulation time of the last processed event.
    pub duration: f64,
}

impl Outcome {
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.recovered
    }

    pub fn recovered_fraction(&self) -> f64 {
        match self.total() {
            0 => 0.,
            total => self.recovered as f64 / total as f64,
        }
    }
}

pub struct SirSimulation<'a> {
    network: &'a Network,
    nodes: Vec<Node>,
    queue: EventQueue,
    rng: RandomSource,
    parameters: Parameters,
    phase: Phase,
    clock: f64,
    root: usize,
    infected: usize,
    recovered: usize,
    events: usize,
}

impl<'a> SirSimulation<'a> {
    pub fn new(network: &'a Network, rng: RandomSource) -> Self {
        Self {
            network,
            nodes: network.reset_copy(),
            queue: EventQueue::new(),
            rng,
            parameters: Parameters::new(0., 1.),
            phase: Phase::Idle,
            clock: 0.,
            root: 0,
            infected: 0,
            recovered: 0,
            events: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn susceptible(&self) -> usize {
        self.nodes.len() - self.infected - self.recovered
    }

    pub fn infected(&self) -> usize {
        self.infected
    }

    pub fn recovered(&self) -> usize {
        self.recovered
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Prepare a run with a uniformly drawn root node.
    pub fn setup(&mut self, parameters: Parameters) -> Result<()> {
        parameters.validate()?;
        if self.network.is_empty() {
            return Err(SirError::EmptyNetwork);
        }
        let root = self.rng.uniform_integer(0, self.network.len() - 1)?;
        self.setup_with_root(parameters, root)
    }

    /// Prepare a run with a given root node.
    pub fn setup_with_root(&mut self, parameters: Parameters, root: usize) -> Result<()> {
        parameters.validate()?;
        if self.network.is_empty() {
            return Err(SirError::EmptyNetwork);
        }
        if root >= self.network.len() {
            return Err(SirError::InvalidParameter(format!(
                "root {root} does not exist in a network of {} nodes",
                self.network.len()
            )));
        }

        self.network.reset_into(&mut self.nodes);
        self.queue.clear();
        self.parameters = parameters;
        self.clock = 0.;
        self.root = root;
        self.infected = 0;
        self.recovered = 0;
        self.events = 0;

        self.queue.push(Event::infect(0., root));
        self.phase = Phase::Running;
        log::trace!("Setup run with {parameters} and root {root}.");
        Ok(())
    }

    /// Process the earliest pending event.
    ///
    /// Returns the processed event, or `None` once the queue is exhausted, in which case the
    /// simulation is finished.
    pub fn step(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }

        let Some(event) = self.queue.pop_earliest() else {
            self.phase = Phase::Finished;
            return None;
        };

        debug_assert!(event.time >= self.clock, "events must not precede the clock");
        self.clock = self.clock.max(event.time);
        self.events += 1;

        match event.effect {
            Effect::Infect => self.infect(event.node),
            Effect::Recover => self.recover(event.node),
        }
        Some(event)
    }

    /// Run a full epidemic and return its outcome.
    pub fn run(&mut self, parameters: Parameters) -> Result<Outcome> {
        self.setup(parameters)?;
        while self.step().is_some() {}
        Ok(self.teardown())
    }

    /// Run a full epidemic from a given root and return its outcome.
    pub fn run_from(&mut self, parameters: Parameters, root: usize) -> Result<Outcome> {
        self.setup_with_root(parameters, root)?;
        while self.step().is_some() {}
        Ok(self.teardown())
    }

    /// Tally the compartments and return to idle.
    pub fn teardown(&mut self) -> Outcome {
        let (susceptible, infected, recovered) =
            self.nodes
                .iter()
                .fold((0, 0, 0), |(s, i, r), node| match node.status() {
                    Status::Susceptible => (s + 1, i, r),
                    Status::Infected => (s, i + 1, r),
                    Status::Recovered => (s, i, r + 1),
                });
        debug_assert_eq!(infected, self.infected);
        debug_assert_eq!(recovered, self.recovered);

        let outcome = Outcome {
            transmission_rate: self.parameters.transmission_rate,
            recovery_rate: self.parameters.recovery_rate,
            root: self.root,
            susceptible,
            infected,
            recovered,
            events: self.events,
            duration: self.clock,
        };
        if self.phase == Phase::Running {
            log::warn!(
                "Teardown of unfinished run with {} pending events.",
                self.queue.len()
            );
        }
        log::debug!(
            "Finished run with {}: S={susceptible} I={infected} R={recovered} after {} events.",
            self.parameters,
            self.events
        );

        self.queue.clear();
        self.phase = Phase::Idle;
        outcome
    }

    fn infect(&mut self, id: usize) {
        if !self.nodes[id].is_susceptible() {
            return;
        }

        self.nodes[id].set_status(Status::Infected);
        self.infected += 1;

        let recovery_time = self.clock + self.rng.waiting_time(self.parameters.recovery_rate);
        self.queue.push(Event::recover(recovery_time, id));

        for edge_idx in 0..self.nodes[id].degree() {
            let neighbor = self.nodes[id].edges()[edge_idx].neighbor;
            if !self.nodes[neighbor].is_susceptible() {
                continue;
            }

            let infection_time =
                self.clock + self.rng.waiting_time(self.parameters.transmission_rate);
            if infection_time < recovery_time
                && infection_time < self.nodes[neighbor].predicted_infection_time()
            {
                self.queue.push(Event::infect(infection_time, neighbor));
                self.nodes[neighbor].set_predicted_infection_time(infection_time);
            }
        }
    }

    fn recover(&mut self, id: usize) {
        if self.nodes[id].status() != Status::Infected {
            return;
        }

        self.nodes[id].set_status(Status::Recovered);
        self.infected -= 1;
        self.recovered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    fn ring() -> Network {
        Network::from_adjacency(vec![vec![1, 3], vec![0, 2], vec![1, 3], vec![2, 0]]).unwrap()
    }

    fn random_network(n_nodes: usize, n_edges: usize, seed: u64) -> Network {
        let mut rng = RandomSource::from_seed(seed);
        let mut adjacency = vec![Vec::new(); n_nodes];
        for _ in 0..n_edges {
            let a = rng.uniform_integer(0, n_nodes - 1).unwrap();
            let b = rng.uniform_integer(0, n_nodes - 1).unwrap();
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        Network::from_adjacency(adjacency).unwrap()
    }

    fn reachable_from(network: &Network, root: usize) -> HashSet<usize> {
        let mut seen = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            for neighbor in network[id].neighbors() {
                if seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        seen
    }

    #[test]
    fn isolated_node() {
        let network = Network::from_adjacency(vec![vec![]]).unwrap();
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(1));
        simulation.setup(Parameters::new(0.5, 0.1)).unwrap();
        assert_eq!(simulation.phase(), Phase::Running);

        let first = simulation.step().unwrap();
        assert_eq!(first.effect, Effect::Infect);
        assert_eq!(first.time, 0.);
        let second = simulation.step().unwrap();
        assert_eq!(second.effect, Effect::Recover);
        assert!(simulation.step().is_none());
        assert_eq!(simulation.phase(), Phase::Finished);

        let outcome = simulation.teardown();
        assert_eq!(simulation.phase(), Phase::Idle);
        assert_eq!(outcome.recovered, 1);
        assert_eq!(outcome.susceptible, 0);
        assert_eq!(outcome.infected, 0);
        assert_eq!(outcome.events, 2);
        assert_eq!(outcome.recovered_fraction(), 1.);
    }

    #[test]
    fn zero_transmission_only_root_recovers() {
        let network = random_network(200, 600, 11);
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(5));
        for _ in 0..20 {
            simulation.setup(Parameters::new(0., 0.1)).unwrap();
            let mut infections = 0;
            while let Some(event) = simulation.step() {
                if event.effect == Effect::Infect {
                    infections += 1;
                }
            }
            let outcome = simulation.teardown();
            assert_eq!(infections, 1);
            assert_eq!(outcome.recovered, 1);
            assert_eq!(outcome.infected, 0);
            assert_eq!(outcome.susceptible, 199);
        }
    }

    #[test]
    fn ring_from_node_zero() {
        let network = ring();
        let reachable = reachable_from(&network, 0);
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(99));
        for _ in 0..50 {
            let outcome = simulation.run_from(Parameters::new(1.0, 0.1), 0).unwrap();
            assert_eq!(outcome.root, 0);
            assert_eq!(outcome.infected, 0);
            assert_eq!(outcome.susceptible + outcome.recovered, 4);
            assert!(outcome.recovered >= 1);
            for node in simulation.nodes() {
                if node.status() == Status::Recovered {
                    assert!(reachable.contains(&node.id()));
                }
            }
            assert_eq!(simulation.nodes()[0].status(), Status::Recovered);
        }
    }

    #[test]
    fn recovered_nodes_stay_in_component_of_root() {
        // two disconnected triangles
        let network = Network::from_adjacency(vec![
            vec![1, 2],
            vec![0, 2],
            vec![0, 1],
            vec![4, 5],
            vec![3, 5],
            vec![3, 4],
        ])
        .unwrap();
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(4));
        for _ in 0..50 {
            let outcome = simulation.run(Parameters::new(5.0, 0.1)).unwrap();
            let component = reachable_from(&network, outcome.root);
            for node in simulation.nodes() {
                if node.status() == Status::Recovered {
                    assert!(component.contains(&node.id()));
                }
            }
        }
    }

    #[test]
    fn population_is_conserved() {
        let network = random_network(500, 1250, 21);
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(8));
        for beta in [0., 0.05, 0.1, 0.3, 1.0] {
            let outcome = simulation.run(Parameters::new(beta, 0.1)).unwrap();
            assert_eq!(outcome.total(), network.len());
            assert_eq!(outcome.infected, 0);
            assert!(outcome.recovered >= 1);
        }
    }

    #[test]
    fn clock_and_statuses_are_monotone() {
        let network = random_network(300, 900, 2);
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(13));
        simulation.setup(Parameters::new(0.4, 0.2)).unwrap();

        let mut previous_clock = simulation.clock();
        let mut previous_statuses: Vec<Status> =
            simulation.nodes().iter().map(Node::status).collect();
        while let Some(event) = simulation.step() {
            assert!(simulation.clock() >= previous_clock);
            assert_eq!(simulation.clock(), event.time);
            previous_clock = simulation.clock();

            for (node, previous) in simulation.nodes().iter().zip(previous_statuses.iter_mut()) {
                assert!(node.status() >= *previous);
                *previous = node.status();
            }
            assert_eq!(
                simulation.susceptible() + simulation.infected() + simulation.recovered(),
                network.len()
            );
        }
        assert!(!simulation.is_running());
    }

    #[test]
    fn predicted_infection_times_only_decrease() {
        let network = random_network(200, 800, 3);
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(17));
        simulation.setup(Parameters::new(0.8, 0.1)).unwrap();

        let mut previous: Vec<f64> = simulation
            .nodes()
            .iter()
            .map(Node::predicted_infection_time)
            .collect();
        while simulation.step().is_some() {
            for (node, time) in simulation.nodes().iter().zip(previous.iter_mut()) {
                assert!(node.predicted_infection_time() <= *time);
                *time = node.predicted_infection_time();
            }
        }
    }

    #[test]
    fn fixed_seed_reproduces_run() {
        let network = random_network(300, 900, 31);
        let parameters = Parameters::new(0.3, 0.1);

        let trace = |seed: u64| {
            let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(seed));
            simulation.setup(parameters).unwrap();
            let events: Vec<(f64, Effect, usize)> = std::iter::from_fn(|| simulation.step())
                .map(|event| (event.time, event.effect, event.node))
                .collect();
            (events, simulation.teardown())
        };

        let (events_a, outcome_a) = trace(1234);
        let (events_b, outcome_b) = trace(1234);
        assert_eq!(events_a, events_b);
        assert_eq!(outcome_a, outcome_b);
    }

    #[test]
    fn repeated_runs_start_from_pristine_network() {
        let network = ring();
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(6));
        simulation.run(Parameters::new(2.0, 0.1)).unwrap();
        simulation.setup_with_root(Parameters::new(2.0, 0.1), 2).unwrap();
        assert_eq!(simulation.clock(), 0.);
        assert_eq!(simulation.pending_events(), 1);
        assert_eq!(simulation.infected(), 0);
        assert_eq!(simulation.recovered(), 0);
        assert!(simulation.nodes().iter().all(|node| node.is_susceptible()
            && node.predicted_infection_time().is_infinite()));
    }

    #[test]
    fn invalid_setup_is_rejected() {
        let network = ring();
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(6));
        assert!(matches!(
            simulation.setup(Parameters::new(0.5, 0.)),
            Err(SirError::InvalidParameter(_))
        ));
        assert!(matches!(
            simulation.setup(Parameters::new(-0.5, 0.1)),
            Err(SirError::InvalidParameter(_))
        ));
        assert!(matches!(
            simulation.setup_with_root(Parameters::new(0.5, 0.1), 4),
            Err(SirError::InvalidParameter(_))
        ));
        assert_eq!(simulation.phase(), Phase::Idle);
        assert!(simulation.step().is_none());

        let empty = Network::default();
        let mut simulation = SirSimulation::new(&empty, RandomSource::from_seed(6));
        assert_eq!(
            simulation.setup(Parameters::new(0.5, 0.1)),
            Err(SirError::EmptyNetwork)
        );
    }

    #[test]
    fn self_loops_and_duplicate_edges_are_harmless() {
        let network = Network::from_adjacency(vec![vec![0, 1, 1], vec![0, 0, 1]]).unwrap();
        let mut simulation = SirSimulation::new(&network, RandomSource::from_seed(10));
        for _ in 0..20 {
            let outcome = simulation.run(Parameters::new(3.0, 0.5)).unwrap();
            assert_eq!(outcome.total(), 2);
            assert_eq!(outcome.infected, 0);
        }
    }
}
