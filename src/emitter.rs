//! Output emitter.
//!
//! Turns a surviving [`GeneRange`] plus its parent [`Sequence`] into a new
//! labeled `Sequence`, ready for the FASTA writer. Grounded on
//! `main_mpi.cpp::findingGene`'s inner loop, which builds the output
//! label with `string_format(print_pattern, label, start, end)` and
//! slices the gene's bases with `substr(abs_start, length)`.

use crate::types::{GeneRange, Sequence};

/// Build the output `Sequence` for one surviving range.
///
/// The label is `pattern` with positional substitutions for
/// `(parent_label, frame, start, end)` — `range.start`/`range.end`, not
/// the absolute projections, so a reverse-frame range still prints its
/// 5'-to-3' read direction (`start > end`).
pub fn materialize(range: GeneRange, parent: &Sequence, pattern: &str) -> Sequence {
    let label = format_label(
        pattern,
        &parent.label,
        range.frame,
        range.start,
        range.end,
    );
    let start = range.abs_start() as usize;
    let len = range.length() as usize;
    let bases = parent.bases[start..start + len].to_vec();
    Sequence::new(label, bases)
}

/// A small `sprintf`-subset formatter: `%s` consumes `label`, and each
/// `%d` (in order) consumes `frame`, then `start`, then `end`. Any other
/// `%`-escape or literal text is copied through unchanged.
fn format_label(pattern: &str, label: &str, frame: i8, start: u64, end: u64) -> String {
    let mut out = String::with_capacity(pattern.len() + label.len());
    let mut ints = [frame as i64, start as i64, end as i64].into_iter();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(label);
            }
            Some('d') => {
                chars.next();
                if let Some(n) = ints.next() {
                    out.push_str(&n.to_string());
                }
            }
            Some(&other) => {
                chars.next();
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    out
}
