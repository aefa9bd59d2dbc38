use std::fs;
use std::io::{self, BufRead, Write};

use crate::core::Network;
use crate::errors::{Result, SirError};

/// Neighbor-list format: line `k` lists the whitespace-separated neighbors of node `k`.
///
/// Input ends at the end of the stream or at the first blank line.
pub trait NetworkIO: Sized {
    fn read(path: &str) -> Result<Self>;
    fn read_from(reader: &mut dyn BufRead) -> Result<Self>;
    fn write(&self, path: &str) -> Result<()>;
    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()>;
}

impl NetworkIO for Network {
    fn read(path: &str) -> Result<Network> {
        let file = fs::File::open(path)
            .map_err(|err| SirError::NetworkUnavailable(format!("Failed to open {path}: {err}")))?;
        let mut reader = io::BufReader::new(file);
        Self::read_from(&mut reader)
    }

    fn read_from(reader: &mut dyn BufRead) -> Result<Network> {
        let mut adjacency: Vec<Vec<usize>> = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| {
                SirError::NetworkUnavailable(format!("Failed to read line {}: {err}", idx + 1))
            })?;
            if line.trim().is_empty() {
                break;
            }
            adjacency.push(parse_neighbors(&line, idx + 1)?);
        }
        Network::from_adjacency(adjacency)
    }

    fn write(&self, path: &str) -> Result<()> {
        let file = fs::File::create(path)
            .map_err(|err| SirError::Output(format!("Failed to create {path}: {err}")))?;
        let mut writer = io::BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|err| SirError::Output(format!("Failed to write {path}: {err}")))
    }

    fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        for node in self.iter() {
            let line = node.neighbors().map(|id| id.to_string()).collect::<Vec<_>>();
            writeln!(writer, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

fn parse_neighbors(line: &str, line_number: usize) -> Result<Vec<usize>> {
    line.split_whitespace()
        .map(|token| {
            token.parse::<usize>().map_err(|err| SirError::MalformedInput {
                line: line_number,
                message: format!("cannot parse {token:?} as node id: {err}"),
            })
        })
        .collect()
}
