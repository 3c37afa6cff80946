/// Edit operation of an alignment column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Identical symbols
    Match,
    Mismatch,
    /// Query symbol against a gap in the target
    Ins,
    /// Target symbol against a gap in the query
    Del,
}

/// Local alignment of two symbol slices.
///
/// Coordinates are 0-based, half-open, relative to the slices handed to the
/// aligner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub query_begin: usize,
    pub query_end: usize,
    pub target_begin: usize,
    pub target_end: usize,
    pub score: i32,
    pub matches: usize,
    pub mismatches: usize,
    pub gap_opens: usize,
    /// Columns, gaps included.
    pub alignment_len: usize,
    pub edit_script: Vec<EditOp>,
}

impl AlignmentResult {
    pub fn from_edit_script(
        query_begin: usize,
        target_begin: usize,
        score: i32,
        edit_script: Vec<EditOp>,
    ) -> Self {
        let stats = EditStats::of(&edit_script);
        Self {
            query_begin,
            query_end: query_begin + stats.query_span,
            target_begin,
            target_end: target_begin + stats.target_span,
            score,
            matches: stats.matches,
            mismatches: stats.mismatches,
            gap_opens: stats.gap_opens,
            alignment_len: edit_script.len(),
            edit_script,
        }
    }

    /// Percent identity over alignment columns.
    pub fn identity(&self) -> f64 {
        if self.alignment_len == 0 {
            return 0.0;
        }
        100.0 * (self.matches as f64) / (self.alignment_len as f64)
    }

    /// Gap columns (not gap openings).
    pub fn gaps(&self) -> usize {
        self.alignment_len
            .saturating_sub(self.matches + self.mismatches)
    }

    /// Gapped text of both sides, `-` for gaps.
    pub fn aligned_strings(&self, query: &[u8], target: &[u8]) -> (String, String) {
        let mut q_text = String::with_capacity(self.alignment_len);
        let mut t_text = String::with_capacity(self.alignment_len);
        let (mut q, mut t) = (self.query_begin, self.target_begin);
        for op in &self.edit_script {
            match op {
                EditOp::Match | EditOp::Mismatch => {
                    q_text.push(query[q] as char);
                    t_text.push(target[t] as char);
                    q += 1;
                    t += 1;
                }
                EditOp::Ins => {
                    q_text.push(query[q] as char);
                    t_text.push('-');
                    q += 1;
                }
                EditOp::Del => {
                    q_text.push('-');
                    t_text.push(target[t] as char);
                    t += 1;
                }
            }
        }
        (q_text, t_text)
    }
}

struct EditStats {
    matches: usize,
    mismatches: usize,
    gap_opens: usize,
    query_span: usize,
    target_span: usize,
}

impl EditStats {
    fn of(edit_script: &[EditOp]) -> Self {
        let mut stats = EditStats {
            matches: 0,
            mismatches: 0,
            gap_opens: 0,
            query_span: 0,
            target_span: 0,
        };
        let mut prev: Option<EditOp> = None;
        for &op in edit_script {
            match op {
                EditOp::Match => stats.matches += 1,
                EditOp::Mismatch => stats.mismatches += 1,
                EditOp::Ins | EditOp::Del => {
                    if prev != Some(op) {
                        stats.gap_opens += 1;
                    }
                }
            }
            if op != EditOp::Del {
                stats.query_span += 1;
            }
            if op != EditOp::Ins {
                stats.target_span += 1;
            }
            prev = Some(op);
        }
        stats
    }
}
