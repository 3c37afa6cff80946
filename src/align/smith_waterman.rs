//! Default local aligner: Smith-Waterman with linear gap scores

use log::debug;

use super::result::{AlignmentResult, EditOp};
use super::traceback::{alignment_from_traceback, TracebackDir, TracebackMatrix};
use crate::config::AlignerConfig;
use crate::error::SearchError;

/// Local alignment of two decoded symbol windows.
pub trait LocalAligner: Send + Sync {
    /// `None` when no positive-scoring local alignment exists.
    fn align(&self, query: &[u8], target: &[u8]) -> Result<Option<AlignmentResult>, SearchError>;
}

/// Banded DP with full traceback.
///
/// Windows come from ungapped segments, so the DP only covers the diagonals
/// between the two window corners plus [`BAND_PADDING`] on either side.
#[derive(Debug, Clone, Copy)]
pub struct SmithWaterman {
    config: AlignerConfig,
}

/// Diagonals explored beyond the corner-to-corner span of a window.
pub const BAND_PADDING: usize = 32;

/// Band cells above which the window is scored without gaps.
const MAX_CELLS: usize = 1 << 26;

impl SmithWaterman {
    pub fn new(config: AlignerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    #[inline]
    fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.config.match_score
        } else {
            self.config.mismatch_score
        }
    }

    /// Best-scoring ungapped run on the main diagonal of the window.
    fn align_ungapped(&self, query: &[u8], target: &[u8]) -> Option<AlignmentResult> {
        let (mut run, mut run_begin) = (0i32, 0usize);
        let (mut best, mut best_begin, mut best_end) = (0i32, 0usize, 0usize);
        for (i, (&a, &b)) in query.iter().zip(target).enumerate() {
            if run <= 0 {
                run = 0;
                run_begin = i;
            }
            run += self.substitution(a, b);
            if run > best {
                best = run;
                best_begin = run_begin;
                best_end = i + 1;
            }
        }
        if best == 0 {
            return None;
        }
        let edit_script = query[best_begin..best_end]
            .iter()
            .zip(&target[best_begin..best_end])
            .map(|(a, b)| if a == b { EditOp::Match } else { EditOp::Mismatch })
            .collect();
        Some(AlignmentResult::from_edit_script(best_begin, best_begin, best, edit_script))
    }
}

impl LocalAligner for SmithWaterman {
    fn align(&self, query: &[u8], target: &[u8]) -> Result<Option<AlignmentResult>, SearchError> {
        if query.is_empty() || target.is_empty() {
            return Ok(None);
        }
        let rows = query.len() + 1;
        let cols = target.len() + 1;
        let corner = target.len() as isize - query.len() as isize;
        let lo = corner.min(0) - BAND_PADDING as isize;
        let hi = corner.max(0) + BAND_PADDING as isize;
        let width = (hi - lo + 1) as usize;
        if rows.saturating_mul(width) > MAX_CELLS {
            debug!(
                "{}x{} window too wide for the band, scoring it ungapped",
                query.len(),
                target.len()
            );
            return Ok(self.align_ungapped(query, target));
        }

        let gap = self.config.gap_score;
        let mut matrix = TracebackMatrix::banded(rows, lo, hi);
        let mut prev = vec![0i32; cols];
        let mut curr = vec![0i32; cols];
        let (mut best, mut best_row, mut best_col) = (0i32, 0usize, 0usize);

        for i in 1..rows {
            let first = (i as isize + lo).max(1) as usize;
            let last = (i as isize + hi).min(cols as isize - 1);
            if last < first as isize {
                std::mem::swap(&mut prev, &mut curr);
                continue;
            }
            let last = last as usize;
            // the left neighbour of the band start lies outside the band
            curr[first - 1] = 0;
            for j in first..=last {
                let diag = prev[j - 1] + self.substitution(query[i - 1], target[j - 1]);
                let up = prev[j] + gap;
                let left = curr[j - 1] + gap;

                let (score, dir) = if diag >= up && diag >= left && diag > 0 {
                    (diag, TracebackDir::Diag)
                } else if up >= left && up > 0 {
                    (up, TracebackDir::Up)
                } else if left > 0 {
                    (left, TracebackDir::Left)
                } else {
                    (0, TracebackDir::Stop)
                };
                curr[j] = score;
                matrix.set(i, j, dir);
                if score > best {
                    best = score;
                    best_row = i;
                    best_col = j;
                }
            }
            // the next row reads this cell as its band-end "up" neighbour
            if last + 1 < cols {
                curr[last + 1] = 0;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        if best == 0 {
            return Ok(None);
        }
        Ok(Some(alignment_from_traceback(
            &matrix, best_row, best_col, query, target, best,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligner() -> SmithWaterman {
        SmithWaterman::new(AlignerConfig::default())
    }

    #[test]
    fn identical_core_is_found_inside_noise() {
        let result = aligner()
            .align(b"TTTTACGTACGTGG", b"CCACGTACGTCC")
            .unwrap()
            .unwrap();
        assert_eq!(result.score, 8);
        assert_eq!((result.query_begin, result.query_end), (4, 12));
        assert_eq!((result.target_begin, result.target_end), (2, 10));
        assert_eq!(result.identity(), 100.0);
    }

    #[test]
    fn gap_is_opened_when_it_pays() {
        let config = AlignerConfig {
            match_score: 2,
            mismatch_score: -3,
            gap_score: -2,
        };
        let result = SmithWaterman::new(config)
            .align(b"AAAAACCCCC", b"AAAAAGCCCCC")
            .unwrap()
            .unwrap();
        assert_eq!(result.score, 18);
        assert_eq!(result.gap_opens, 1);
        assert!(result.edit_script.contains(&EditOp::Del));
    }

    #[test]
    fn nothing_in_common_gives_none() {
        assert_eq!(aligner().align(b"AAAA", b"CCCC").unwrap(), None);
        assert_eq!(aligner().align(b"", b"CCCC").unwrap(), None);
    }

    #[test]
    fn long_identical_window_stays_inside_the_band() {
        let seq: Vec<u8> = (0..17_000u32).map(|i| b"ACGT"[((i * 7 + i / 3) % 4) as usize]).collect();
        let result = aligner().align(&seq, &seq).unwrap().unwrap();
        assert_eq!(result.score, 17_000);
        assert_eq!((result.query_begin, result.query_end), (0, 17_000));
        assert_eq!((result.target_begin, result.target_end), (0, 17_000));
        assert_eq!(result.gap_opens, 0);
    }

    #[test]
    fn gap_inside_the_window_is_found() {
        let query = b"ACGTACGTTTGGCCAAGGTTCCAAGGTT";
        let mut target = query[..14].to_vec();
        target.extend_from_slice(b"GG");
        target.extend_from_slice(&query[14..]);
        let result = aligner().align(query, &target).unwrap().unwrap();
        assert_eq!(result.gap_opens, 1);
        assert_eq!(result.mismatches, 0);
    }

    #[test]
    fn oversized_window_falls_back_to_ungapped_scoring() {
        let aligner = aligner();
        let result = aligner.align_ungapped(b"TTACGTACGA", b"GGACGTACGC").unwrap();
        assert_eq!(result.score, 7);
        assert_eq!((result.query_begin, result.query_end), (2, 9));
        assert_eq!(result.mismatches, 0);
    }
}
