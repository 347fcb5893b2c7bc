//! The gene predicate boundary: decide whether a candidate ORF is a gene.
//!
//! Three implementations exist (the CpG-island heuristic, "accept all",
//! "reject all"); exactly one is selected at compile time via a Cargo
//! feature, mirroring the original design's dynamically-linked, swap-and-
//! rebuild predicate library. `Verdict` is the explicit sum type
//! `spec.md` §9 recommends over a raw sentinel `GeneRange` at this
//! boundary; the sentinel still exists (`GeneRange::invalid`) for the wire
//! representation used once ranges are compacted by the filter.

use rayon::prelude::*;

use crate::config::Config;
use crate::types::{GeneRange, Sequence};

#[cfg(all(feature = "predicate-cpg", feature = "predicate-accept-all"))]
compile_error!(
    "at most one predicate-* feature may be enabled; build with \
     --no-default-features --features predicate-accept-all"
);
#[cfg(all(feature = "predicate-cpg", feature = "predicate-reject-all"))]
compile_error!(
    "at most one predicate-* feature may be enabled; build with \
     --no-default-features --features predicate-reject-all"
);
#[cfg(all(feature = "predicate-accept-all", feature = "predicate-reject-all"))]
compile_error!("at most one predicate-* feature may be enabled");

/// The outcome of judging one candidate ORF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(GeneRange),
    Rejected,
}

impl Verdict {
    /// Collapse to the wire representation used by the filter stage.
    pub fn into_range_or_sentinel(self) -> GeneRange {
        match self {
            Verdict::Accepted(r) => r,
            Verdict::Rejected => GeneRange::invalid(),
        }
    }
}

/// A pure, reentrant predicate: `(GeneRange, Sequence) -> Verdict`.
pub trait GenePredicate: Sync + Send {
    fn judge(&self, range: GeneRange, seq: &Sequence, config: &Config) -> Verdict;
}

/// The CpG-island heuristic (`spec.md` §4.2).
pub struct CpgIslandPredicate;

impl GenePredicate for CpgIslandPredicate {
    fn judge(&self, range: GeneRange, seq: &Sequence, config: &Config) -> Verdict {
        if !range.is_valid() {
            return Verdict::Rejected;
        }
        if range.length() < config.min_orf_len {
            return Verdict::Rejected;
        }

        let abs_start = range.abs_start();
        let anchor_end = abs_start + range.length() / 3;
        // Reach back `upstream_span` bases from the anchor, but never
        // past the ORF's own start (only ORFs of >= 3 * upstream_span
        // bases hit that clamp).
        let anchor_start = anchor_end.saturating_sub(config.upstream_span).min(abs_start);

        let len = seq.len() as u64;
        let n = config.window_size;
        if len < n || anchor_start >= len - n || anchor_end > len - n {
            return Verdict::Rejected;
        }

        let accepted = (anchor_start..anchor_end).into_par_iter().any(|i| {
            let (n_c, n_g, n_cpg) = count_window(&seq.bases, i, n, len);
            let oe = if n_c * n_g == 0 {
                f64::INFINITY
            } else {
                (n_cpg as f64) / ((n_c * n_g) as f64) * (n as f64)
            };
            let gc = (n_c + n_g) as f64 / (n as f64);
            oe > config.t_ratio && gc > config.t_gc
        });

        if accepted {
            Verdict::Accepted(range)
        } else {
            Verdict::Rejected
        }
    }
}

/// Count C, G, and C-followed-by-G pairs in the window `[origin, origin+n)`.
fn count_window(bases: &[u8], origin: u64, n: u64, len: u64) -> (u64, u64, u64) {
    let mut n_c = 0u64;
    let mut n_g = 0u64;
    let mut n_cpg = 0u64;
    for j in origin..origin + n {
        match bases[j as usize] {
            b'C' => {
                n_c += 1;
                let next = j + 1;
                if next < len && bases[next as usize] == b'G' {
                    n_cpg += 1;
                }
            }
            b'G' => n_g += 1,
            _ => {}
        }
    }
    (n_c, n_g, n_cpg)
}

/// Always accepts a valid range untouched; used in tests and the
/// `predicate-accept-all` build.
pub struct AcceptAll;

impl GenePredicate for AcceptAll {
    fn judge(&self, range: GeneRange, _seq: &Sequence, _config: &Config) -> Verdict {
        if range.is_valid() {
            Verdict::Accepted(range)
        } else {
            Verdict::Rejected
        }
    }
}

/// Always rejects; used in tests and the `predicate-reject-all` build.
pub struct RejectAll;

impl GenePredicate for RejectAll {
    fn judge(&self, _range: GeneRange, _seq: &Sequence, _config: &Config) -> Verdict {
        Verdict::Rejected
    }
}

#[cfg(feature = "predicate-reject-all")]
pub fn make() -> Box<dyn GenePredicate> {
    Box::new(RejectAll)
}

#[cfg(feature = "predicate-accept-all")]
pub fn make() -> Box<dyn GenePredicate> {
    Box::new(AcceptAll)
}

#[cfg(feature = "predicate-cpg")]
pub fn make() -> Box<dyn GenePredicate> {
    Box::new(CpgIslandPredicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpg_rich_prefix(len: usize) -> Vec<u8> {
        b"CG".iter().cycle().take(len).copied().collect()
    }

    #[test]
    fn rejects_orfs_shorter_than_minimum() {
        let config = Config::default();
        let bases = cpg_rich_prefix(300);
        let seq = Sequence::new("s".to_string(), bases);
        let range = GeneRange::new(100, 190, 1); // length 91 < 96
        assert_eq!(
            CpgIslandPredicate.judge(range, &seq, &config),
            Verdict::Rejected
        );
    }

    #[test]
    fn rejects_sequence_shorter_than_window() {
        let config = Config::default();
        let seq = Sequence::new("s".to_string(), b"ATGAAATAA".to_vec());
        let range = GeneRange::new(0, 95, 1);
        assert_eq!(
            CpgIslandPredicate.judge(range, &seq, &config),
            Verdict::Rejected
        );
    }

    #[test]
    fn accepts_when_upstream_window_is_cpg_rich() {
        // 100 bases of alternating CG (CpG-island-like prefix), then an
        // ORF (ATG + 95 in-frame codons + TAA), then enough trailing
        // filler that the ORF's one-third anchor stays >= window_size
        // bases away from the end of the whole sequence.
        let config = Config::default();
        let prefix = cpg_rich_prefix(100);

        let mut orf = Vec::new();
        orf.extend_from_slice(b"ATG");
        orf.extend(std::iter::repeat(b'A').take(3 * 95));
        orf.extend_from_slice(b"TAA");

        let mut bases = prefix;
        bases.extend_from_slice(&orf);
        bases.extend(std::iter::repeat(b'A').take(300));
        let seq = Sequence::new("s".to_string(), bases);

        let start = 100u64;
        let end = start + orf.len() as u64 - 1;
        let range = GeneRange::new(start, end, 1);
        assert!(range.length() >= 96);

        let verdict = CpgIslandPredicate.judge(range, &seq, &config);
        assert_eq!(verdict, Verdict::Accepted(range));
    }

    #[test]
    fn accept_all_passes_through_valid_ranges() {
        let config = Config::default();
        let seq = Sequence::new("s".to_string(), vec![b'A'; 10]);
        let range = GeneRange::new(0, 5, 1);
        assert_eq!(AcceptAll.judge(range, &seq, &config), Verdict::Accepted(range));
        assert_eq!(
            AcceptAll.judge(GeneRange::invalid(), &seq, &config),
            Verdict::Rejected
        );
    }

    #[test]
    fn reject_all_never_accepts() {
        let config = Config::default();
        let seq = Sequence::new("s".to_string(), vec![b'A'; 10]);
        let range = GeneRange::new(0, 5, 1);
        assert_eq!(RejectAll.judge(range, &seq, &config), Verdict::Rejected);
    }
}
