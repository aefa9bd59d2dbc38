//! This module contains the core datatypes of the library.

pub mod events;
pub mod generate;
pub mod network;
pub mod node;
pub mod rng;

pub use events::{Effect, Event, EventQueue};
pub use network::Network;
pub use node::{Edge, Node, Status};
pub use rng::RandomSource;
