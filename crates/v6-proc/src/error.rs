use thiserror::Error;

/// Failure to decode a serialized kernel record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{record} record is {found} bytes (expected {expected})")]
    Length {
        record: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Failure to build or mutate the in-core tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SystemError {
    #[error("process table full ({max} slots)")]
    ProcTableFull { max: usize },

    #[error("terminal table full ({max} slots)")]
    TtyTableFull { max: usize },

    #[error("no process at index {0}")]
    NoSuchProc(usize),

    #[error("no terminal at index {0}")]
    NoSuchTty(usize),

    #[error("argument vector needs {needed} bytes but the image is {available} bytes")]
    ArgsTooLarge { needed: usize, available: usize },
}
