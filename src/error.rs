//! Fatal error kinds for the genefind pipeline.
//!
//! Most error conditions the original design distinguishes are locally
//! handled and never reach here (a malformed FASTA record is silently
//! skipped; a too-short sequence is silently rejected by the predicate).
//! The kinds below are the ones a caller must be able to match on.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenefindError {
    #[error("invalid frame {0}: frame must be one of -3,-2,-1,1,2,3")]
    InvalidFrame(i8),

    #[error("failed to open input file {path}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open output file {path}")]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dispatcher transfer mismatch: expected {expected} ranges from rank {peer}, got {actual}")]
    TransferMismatch {
        peer: usize,
        expected: usize,
        actual: usize,
    },

    #[error("write failed mid-record")]
    WriteFailure(#[source] std::io::Error),
}
