use std::cmp::Ordering;

use crate::algorithm::orientation::Orientation;

/// One scored, aligned segment.
///
/// Coordinates are 1-based and inclusive. `query_from > query_to` when the
/// orientation reads the query backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Hsp {
    pub orientation: Orientation,
    pub query_from: usize,
    pub query_to: usize,
    pub target_from: usize,
    pub target_to: usize,
    /// Raw alignment score
    pub score: i32,
    /// Bit score
    pub normalized_score: f64,
    pub evalue: f64,
    pub identity: f64,
    pub alignment_len: usize,
    pub mismatches: usize,
    pub gap_opens: usize,
    pub query_aligned: String,
    pub target_aligned: String,
}

/// All HSPs of one target sequence, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub databank: String,
    pub target_id: u32,
    pub target_name: String,
    pub target_description: Option<String>,
    pub target_length: usize,
    pub hsps: Vec<Hsp>,
}

impl Hit {
    pub fn best_evalue(&self) -> f64 {
        self.hsps
            .iter()
            .map(|h| h.evalue)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn best_score(&self) -> i32 {
        self.hsps.iter().map(|h| h.score).max().unwrap_or(i32::MIN)
    }

    /// Sort HSPs with [`score_compare_hsps`].
    pub fn sort_hsps(&mut self) {
        self.hsps.sort_by(score_compare_hsps);
    }
}

/// E-values this close to zero compare equal.
#[inline]
fn evalue_comp(evalue1: f64, evalue2: f64) -> Ordering {
    const EPSILON: f64 = 1.0e-180;
    if evalue1 < EPSILON && evalue2 < EPSILON {
        Ordering::Equal
    } else {
        evalue1.partial_cmp(&evalue2).unwrap_or(Ordering::Equal)
    }
}

/// Order within a target: score DESC, target start ASC, target end DESC,
/// query start ASC, query end DESC.
///
/// Starts and ends are taken on the forward axis so reversed HSPs sort by
/// where they actually sit.
pub fn score_compare_hsps(a: &Hsp, b: &Hsp) -> Ordering {
    let span = |from: usize, to: usize| (from.min(to), from.max(to));
    let (a_qs, a_qe) = span(a.query_from, a.query_to);
    let (b_qs, b_qe) = span(b.query_from, b.query_to);
    b.score
        .cmp(&a.score)
        .then(a.target_from.cmp(&b.target_from))
        .then(b.target_to.cmp(&a.target_to))
        .then(a_qs.cmp(&b_qs))
        .then(b_qe.cmp(&a_qe))
        .then(a.orientation.cmp(&b.orientation))
}

/// Order of hits: best e-value ASC, best score DESC, then databank and
/// target id ASC.
pub fn compare_hits(a: &Hit, b: &Hit) -> Ordering {
    match (a.hsps.is_empty(), b.hsps.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    evalue_comp(a.best_evalue(), b.best_evalue())
        .then(b.best_score().cmp(&a.best_score()))
        .then_with(|| a.databank.cmp(&b.databank))
        .then(a.target_id.cmp(&b.target_id))
}
