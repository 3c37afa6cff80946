use super::result::{AlignmentResult, EditOp};

/// Direction for traceback in the DP matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackDir {
    /// Diagonal (match/mismatch)
    Diag,
    /// Up (query symbol against a target gap)
    Up,
    /// Left (target symbol against a query gap)
    Left,
    /// Local alignment start
    Stop,
}

/// Traceback directions for the cells of a diagonal band.
///
/// Row `i` stores the cells `j` with `lo <= j - i <= hi`; every cell outside
/// the band reads as `Stop`.
pub struct TracebackMatrix {
    data: Vec<TracebackDir>,
    lo: isize,
    hi: isize,
}

impl TracebackMatrix {
    /// Every cell of a `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::banded(rows, -(rows as isize), cols as isize)
    }

    /// Cells on diagonals `lo..=hi` (diagonal = column - row).
    pub fn banded(rows: usize, lo: isize, hi: isize) -> Self {
        let width = (hi - lo + 1).max(0) as usize;
        Self {
            data: vec![TracebackDir::Stop; rows * width],
            lo,
            hi,
        }
    }

    #[inline]
    fn width(&self) -> usize {
        (self.hi - self.lo + 1) as usize
    }

    #[inline]
    fn slot(&self, row: usize, col: usize) -> Option<usize> {
        let diagonal = col as isize - row as isize;
        if diagonal < self.lo || diagonal > self.hi {
            return None;
        }
        Some(row * self.width() + (diagonal - self.lo) as usize)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> TracebackDir {
        self.slot(row, col)
            .and_then(|i| self.data.get(i).copied())
            .unwrap_or(TracebackDir::Stop)
    }

    /// Cells outside the band are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, dir: TracebackDir) {
        if let Some(cell) = self.slot(row, col).and_then(|i| self.data.get_mut(i)) {
            *cell = dir;
        }
    }
}

/// Walk back from `(end_row, end_col)` to the first `Stop`.
///
/// Returns the edit script in forward order and the 0-based start
/// positions `(query_begin, target_begin)`.
pub fn traceback(
    matrix: &TracebackMatrix,
    end_row: usize,
    end_col: usize,
    query: &[u8],
    target: &[u8],
) -> (Vec<EditOp>, usize, usize) {
    let mut edit_script = Vec::new();
    let (mut row, mut col) = (end_row, end_col);

    while row > 0 || col > 0 {
        match matrix.get(row, col) {
            TracebackDir::Diag if row > 0 && col > 0 => {
                edit_script.push(if query[row - 1] == target[col - 1] {
                    EditOp::Match
                } else {
                    EditOp::Mismatch
                });
                row -= 1;
                col -= 1;
            }
            TracebackDir::Up if row > 0 => {
                edit_script.push(EditOp::Ins);
                row -= 1;
            }
            TracebackDir::Left if col > 0 => {
                edit_script.push(EditOp::Del);
                col -= 1;
            }
            _ => break,
        }
    }

    edit_script.reverse();
    (edit_script, row, col)
}

pub fn alignment_from_traceback(
    matrix: &TracebackMatrix,
    end_row: usize,
    end_col: usize,
    query: &[u8],
    target: &[u8],
    score: i32,
) -> AlignmentResult {
    let (edit_script, query_begin, target_begin) = traceback(matrix, end_row, end_col, query, target);
    AlignmentResult::from_edit_script(query_begin, target_begin, score, edit_script)
}
