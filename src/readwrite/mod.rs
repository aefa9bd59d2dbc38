//! IO traits for reading and writing networks and simulation results.

mod network;
mod results;

pub use network::NetworkIO;
pub use results::{CsvResultWriter, ResultWriter, RunRecord, TextResultWriter};
