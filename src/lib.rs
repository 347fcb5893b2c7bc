//! genefind - Six-frame ORF gene finder with CpG-island filtering.
//!
//! This library extracts open reading frames from a nucleotide sequence
//! across all six reading frames, filters them with a pluggable gene
//! predicate (the CpG-island heuristic by default), and dispatches the
//! work across a configurable number of simulated ranks that rebalance
//! candidate ranges between themselves before filtering.
//!
//! # Example
//!
//! ```ignore
//! use genefind::config::Config;
//! use genefind::dispatch::run_distributed;
//! use genefind::fasta::FastaReader;
//! use genefind::predicate;
//! use std::path::Path;
//!
//! let config = Config::default();
//! let predicate = predicate::make();
//! let mut reader = genefind::fasta::FastaReader::open(Path::new("input.fasta"))?;
//! let seq = reader.next_sequence();
//! if seq.valid {
//!     let genes = run_distributed(&seq, &config, predicate.as_ref(), config.workers)?;
//!     // Process genes...
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod fasta;
pub mod filter;
pub mod orf;
pub mod predicate;
pub mod types;

pub use config::Config;
pub use error::GenefindError;
pub use types::{GeneRange, Sequence};
