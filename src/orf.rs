//! Open reading frame extraction.
//!
//! Given a sequence, a signed reading frame, and a half-open index
//! sub-window, enumerates every ORF whose start codon lies in that window:
//! normalize to RNA, project the strand (reverse + complement for negative
//! frames), then scan codons for `AUG ... {UAA,UAG,UGA}` pairs.

use rayon::prelude::*;

use crate::error::GenefindError;
use crate::types::{GeneRange, Sequence};

const START_CODON: &[u8; 3] = b"AUG";
const STOP_CODONS: [&[u8; 3]; 3] = [b"UAA", b"UAG", b"UGA"];

/// Extract all ORFs on `frame` whose start codon lies in `[lo, hi)`.
///
/// Returns an unordered multiset; order among the returned ranges is not
/// specified. Fails with [`GenefindError::InvalidFrame`] if `frame` is not
/// one of `-3,-2,-1,1,2,3`.
pub fn extract(
    seq: &Sequence,
    frame: i8,
    lo: usize,
    hi: usize,
) -> Result<Vec<GeneRange>, GenefindError> {
    if frame == 0 || frame.unsigned_abs() > 3 {
        return Err(GenefindError::InvalidFrame(frame));
    }

    let mut w = seq.bases.clone();
    if w.par_iter().any(|&b| b == b'T') {
        to_rna(&mut w);
    }

    let len = w.len();
    let (shift, eff_lo, eff_hi) = if frame > 0 {
        ((frame - 1) as usize, lo, hi)
    } else {
        reverse_complement(&mut w);
        let shift = (-frame - 1) as usize;
        let eff_lo = len.saturating_sub(hi);
        let eff_hi = len.saturating_sub(lo + 1);
        (shift, eff_lo, eff_hi)
    };

    if len < 3 || eff_hi <= eff_lo {
        return Ok(Vec::new());
    }

    let scan_end = eff_hi + shift;
    let start_positions: Vec<usize> = (eff_lo + shift..scan_end)
        .step_by(3)
        .take_while(|&i| i + 3 <= len)
        .collect();

    let ranges: Vec<GeneRange> = start_positions
        .into_par_iter()
        .filter_map(|i| scan_from_start(&w, i, len, frame))
        .collect();

    Ok(ranges)
}

/// Try to grow an ORF from a candidate start-codon position `i`.
fn scan_from_start(w: &[u8], i: usize, len: usize, frame: i8) -> Option<GeneRange> {
    if &w[i..i + 3] != START_CODON {
        return None;
    }
    let mut j = i + 3;
    while j + 3 <= len {
        let codon = &w[j..j + 3];
        if STOP_CODONS.iter().any(|stop| codon == *stop) {
            let (start, end) = if frame < 0 {
                (map_reverse_index(i, len), map_reverse_index(j + 2, len))
            } else {
                (i as u64, (j + 2) as u64)
            };
            return Some(GeneRange::new(start, end, frame));
        }
        j += 3;
    }
    None
}

/// Map an index in the reversed-coordinate working copy back to the
/// parent sequence's original coordinates.
fn map_reverse_index(x: usize, len: usize) -> u64 {
    let mapped = len - x - 1;
    debug_assert!(mapped < len, "reverse-coordinate mapping out of bounds");
    mapped as u64
}

fn to_rna(w: &mut [u8]) {
    w.par_iter_mut().for_each(|b| {
        if *b == b'T' {
            *b = b'U';
        }
    });
}

/// Reverse `w` in place, then complement each base (A<->U, C<->G; the gap
/// character and anything else is left unchanged).
fn reverse_complement(w: &mut [u8]) {
    w.reverse();
    w.par_iter_mut().for_each(|b| {
        *b = match *b {
            b'A' => b'U',
            b'U' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            other => other,
        };
    });
}
