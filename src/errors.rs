//! All errors that can occur in the sirnet library.

use std::fmt;

pub type Result<T> = std::result::Result<T, SirError>;

#[derive(Clone, Debug, PartialEq)]
pub enum SirError {
    /// The network source is missing or cannot be read.
    NetworkUnavailable(String),
    /// A line of the network source is not a sequence of valid node identities.
    MalformedInput { line: usize, message: String },
    /// Rates or sampling bounds outside of their admissible range.
    InvalidParameter(String),
    /// A simulation was requested on a network without nodes.
    EmptyNetwork,
    /// Results could not be written.
    Output(String),
}

impl fmt::Display for SirError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SirError::NetworkUnavailable(message) => {
                write!(f, "NetworkUnavailableError: {}", message)
            }
            SirError::MalformedInput { line, message } => {
                write!(f, "MalformedInputError: line {}: {}", line, message)
            }
            SirError::InvalidParameter(message) => {
                write!(f, "InvalidParameterError: {}", message)
            }
            SirError::EmptyNetwork => {
                write!(f, "EmptyNetworkError: network has no nodes")
            }
            SirError::Output(message) => {
                write!(f, "OutputError: {}", message)
            }
        }
    }
}

impl std::error::Error for SirError {}
