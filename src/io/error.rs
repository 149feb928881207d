use super::Format;
use crate::model::types::AtomId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("atom {atom} has type {ty}, but only {available} element(s) were given by type")]
    UnknownAtomType {
        atom: AtomId,
        ty: usize,
        available: usize,
    },

    #[error("template atom {0} is not present in the molecule data")]
    MissingAtom(AtomId),
}

impl Error {
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}
