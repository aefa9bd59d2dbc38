use serde::Serialize;
use std::fs;
use std::io::{self, Write};

use crate::errors::{Result, SirError};
use crate::simulation::Outcome;

/// One row of sweep output.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunRecord {
    pub beta: f64,
    pub gamma: f64,
    pub replicate: usize,
    pub seed: u64,
    pub root: usize,
    pub susceptible: usize,
    pub infected: usize,
    pub recovered: usize,
    pub recovered_fraction: f64,
    pub events: usize,
    pub duration: f64,
}

impl RunRecord {
    pub fn new(outcome: &Outcome, replicate: usize, seed: u64) -> Self {
        Self {
            beta: outcome.transmission_rate,
            gamma: outcome.recovery_rate,
            replicate,
            seed,
            root: outcome.root,
            susceptible: outcome.susceptible,
            infected: outcome.infected,
            recovered: outcome.recovered,
            recovered_fraction: outcome.recovered_fraction(),
            events: outcome.events,
            duration: outcome.duration,
        }
    }
}

pub trait ResultWriter {
    fn write(&mut self, records: &[RunRecord]) -> Result<()>;
}

/// Writes records as CSV with a header row.
pub struct CsvResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvResultWriter<fs::File> {
    pub fn from_path(path: &str) -> Result<Self> {
        let writer = csv::WriterBuilder::new()
            .from_path(path)
            .map_err(|err| SirError::Output(format!("Unable to create {path}: {err}")))?;
        Ok(Self { writer })
    }
}

impl<W: Write> CsvResultWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| SirError::Output(format!("Unable to flush results: {err}")))
    }
}

impl<W: Write> ResultWriter for CsvResultWriter<W> {
    fn write(&mut self, records: &[RunRecord]) -> Result<()> {
        log::info!("Writing {} records as csv.", records.len());
        for record in records {
            self.writer
                .serialize(record)
                .map_err(|err| SirError::Output(format!("Unable to write record: {err}")))?;
        }
        self.writer
            .flush()
            .map_err(|err| SirError::Output(format!("Unable to flush results: {err}")))
    }
}

/// Writes `beta recovered_fraction` lines.
pub struct TextResultWriter<W: Write> {
    writer: W,
}

impl TextResultWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> TextResultWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultWriter for TextResultWriter<W> {
    fn write(&mut self, records: &[RunRecord]) -> Result<()> {
        let to_error = |err: io::Error| SirError::Output(format!("Unable to write results: {err}"));
        for record in records {
            writeln!(self.writer, "{} {}", record.beta, record.recovered_fraction)
                .map_err(to_error)?;
        }
        self.writer.flush().map_err(to_error)
    }
}
