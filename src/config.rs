//! Configuration and defaults for genefind.
//!
//! This module contains the configuration structure and default values
//! that control the CpG-island predicate and the output emitter.

/// Default output label pattern: parent label, frame, start, end.
pub const DEFAULT_PATTERN: &str = "%s | gene | frame=%d | LOC=[%d,%d]";

/// Configuration for the gene-finding pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// CpG-island sliding-window size in bases.
    pub window_size: u64,
    /// Observed/expected CpG ratio threshold.
    pub t_ratio: f64,
    /// GC-content threshold.
    pub t_gc: f64,
    /// Minimum accepted ORF length in bases.
    pub min_orf_len: u64,
    /// Upstream search span, in bases, ending before the ORF's one-third point.
    pub upstream_span: u64,
    /// Output label pattern.
    pub pattern: String,
    /// Output FASTA wrap column.
    pub output_line_width: usize,
    /// Number of simulated dispatcher ranks.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_size: 200,
            t_ratio: 0.6,
            t_gc: 0.5,
            min_orf_len: 96,
            upstream_span: 200,
            pattern: DEFAULT_PATTERN.to_string(),
            output_line_width: 70,
            workers: 1,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of simulated ranks, clamped to at least one.
    pub fn set_workers(&mut self, workers: usize) {
        self.workers = workers.max(1);
    }

    /// Set the output FASTA wrap column, clamped to at least one.
    pub fn set_output_line_width(&mut self, width: usize) {
        self.output_line_width = width.max(1);
    }
}
