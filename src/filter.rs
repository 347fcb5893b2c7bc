//! Parallel gene filter.
//!
//! Applies a [`GenePredicate`] across a slice of candidate ORFs and
//! compacts the survivors, grounded on the original `get_gene` routine:
//! a pre-sized output buffer, an atomic fetch-add index claimed by
//! whichever worker accepts next, and a final truncation to the
//! survivor count.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::config::Config;
use crate::predicate::{GenePredicate, Verdict};
use crate::types::{GeneRange, Sequence};

/// Judge every range in `orfs[start..end]` against `predicate`, returning
/// the accepted subset. Order among survivors is not preserved.
pub fn filter(
    orfs: &[GeneRange],
    start: usize,
    end: usize,
    seq: &Sequence,
    config: &Config,
    predicate: &dyn GenePredicate,
) -> Vec<GeneRange> {
    let span = end - start;
    let mut result = vec![GeneRange::invalid(); span];
    let result_index = AtomicUsize::new(0);

    orfs[start..end].par_iter().for_each(|&range| {
        if let Verdict::Accepted(accepted) = predicate.judge(range, seq, config) {
            let slot = result_index.fetch_add(1, Ordering::Relaxed);
            result[slot] = accepted;
        }
    });

    let survivors = result_index.load(Ordering::Relaxed);
    result.truncate(survivors);
    result
}
