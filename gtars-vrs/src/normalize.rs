//! Fully-justified allele normalization.
//!
//! An allele is first reduced to its minimal representation by dropping the
//! bases it shares with the reference at either end, then widened over any
//! repeat it sits in by rolling the remaining bases left and right through the
//! reference. The result is the unique, maximally expanded interval and state
//! used when computing VRS identifiers.

use thiserror::Error;

/// A normalized allele: the interbase interval it spans and its state.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAllele {
    pub start: u64,
    pub end: u64,
    pub allele: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("start position {start} exceeds sequence length {seq_len}")]
    StartOutOfBounds { start: u64, seq_len: usize },

    #[error("ref allele (start={start}, len={ref_len}) extends past sequence length {seq_len}")]
    RefAllelePastEnd {
        start: usize,
        ref_len: usize,
        seq_len: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

/// Number of leading and trailing bases shared by `a` and `b`.
///
/// The prefix is taken first; the suffix is measured on what remains, so the
/// two never overlap.
fn trim_shared(a: &[u8], b: &[u8]) -> (usize, usize) {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    (prefix, suffix)
}

/// How many reference bases the alleles can be shifted past in `direction`,
/// starting from the boundary `pos`.
///
/// Each non-empty allele is read cyclically: leftwards from its last base,
/// rightwards from its first.
fn roll(sequence: &[u8], alleles: [&[u8]; 2], pos: usize, direction: Direction) -> usize {
    let alleles: Vec<&[u8]> = alleles.into_iter().filter(|a| !a.is_empty()).collect();
    if alleles.is_empty() {
        return 0;
    }
    let limit = match direction {
        Direction::Left => pos,
        Direction::Right => sequence.len().saturating_sub(pos),
    };

    (0..limit)
        .take_while(|&d| {
            let base = match direction {
                Direction::Left => sequence[pos - 1 - d],
                Direction::Right => sequence[pos + d],
            };
            alleles.iter().all(|allele| {
                let n = allele.len();
                let i = match direction {
                    Direction::Left => n - 1 - d % n,
                    Direction::Right => d % n,
                };
                allele[i] == base
            })
        })
        .count()
}

/// Normalize the replacement of `ref_allele` at 0-based `start` of `sequence`
/// with `alt_allele`.
///
/// Alleles identical to the reference collapse to an empty interval.
pub fn normalize(
    sequence: &[u8],
    start: u64,
    ref_allele: &[u8],
    alt_allele: &[u8],
) -> Result<NormalizedAllele, NormalizeError> {
    let seq_len = sequence.len();
    let begin = usize::try_from(start)
        .ok()
        .filter(|&s| s <= seq_len)
        .ok_or(NormalizeError::StartOutOfBounds { start, seq_len })?;
    if begin + ref_allele.len() > seq_len {
        return Err(NormalizeError::RefAllelePastEnd {
            start: begin,
            ref_len: ref_allele.len(),
            seq_len,
        });
    }

    let (prefix, suffix) = trim_shared(ref_allele, alt_allele);
    let core_ref = &ref_allele[prefix..ref_allele.len() - suffix];
    let core_alt = &alt_allele[prefix..alt_allele.len() - suffix];
    let left = begin + prefix;
    let right = left + core_ref.len();

    let shift_left = roll(sequence, [core_ref, core_alt], left, Direction::Left);
    let shift_right = roll(sequence, [core_ref, core_alt], right, Direction::Right);
    let (new_left, new_right) = (left - shift_left, right + shift_right);

    let allele = [
        &sequence[new_left..left],
        core_alt,
        &sequence[right..new_right],
    ]
    .concat();

    Ok(NormalizedAllele {
        start: new_left as u64,
        end: new_right as u64,
        allele,
    })
}
