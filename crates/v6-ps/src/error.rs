use thiserror::Error;
use v6_abi::Errno;
use v6_proc::RecordError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PsError {
    #[error("kernel memory {op} failed: {errno}")]
    Device { op: &'static str, errno: Errno },

    #[error("swap device probe returned {found} bytes, expected 2")]
    SwapProbe { found: usize },

    #[error(transparent)]
    Record(#[from] RecordError),
}
