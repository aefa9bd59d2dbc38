//! Event scheduling for the event-driven simulation.
//!
//! Events are kept in a binary heap ordered by firing time, earliest first.
//! Events with equal firing times have no defined order among each other.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

/// What happens to the target node when an event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    Infect,
    Recover,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Infect => write!(f, "infect"),
            Effect::Recover => write!(f, "recover"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Event {
    pub time: f64,
    pub effect: Effect,
    pub node: usize,
}

impl Event {
    pub fn new(time: f64, effect: Effect, node: usize) -> Self {
        Self { time, effect, node }
    }

    pub fn infect(time: f64, node: usize) -> Self {
        Self::new(time, Effect::Infect, node)
    }

    pub fn recover(time: f64, node: usize) -> Self {
        Self::new(time, Effect::Recover, node)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

// Events compare by firing time only.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time.total_cmp(&other.time)
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) at t={}", self.effect, self.node, self.time)
    }
}

/// Min-time priority queue of pending events.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.heap.push(Reverse(event));
    }

    /// Remove and return the earliest event, or `None` if nothing is pending.
    pub fn pop_earliest(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
