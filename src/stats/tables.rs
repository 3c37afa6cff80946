/// Karlin-Altschul statistical parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KarlinParams {
    /// Scale of the score distribution, used for bit scores
    pub lambda: f64,
    /// Search-space scale, used for e-values
    pub k: f64,
    /// Relative entropy per aligned pair
    pub h: f64,
}

impl KarlinParams {
    pub const fn new(lambda: f64, k: f64, h: f64) -> Self {
        Self { lambda, k, h }
    }
}

// Ungapped nucleotide parameters at uniform base composition, keyed by
// (reward, |penalty|).
const UNGAPPED_NUCLEOTIDE: &[(i32, i32, KarlinParams)] = &[
    (1, 5, KarlinParams::new(1.39, 0.747, 1.38)),
    (1, 4, KarlinParams::new(1.383, 0.738, 1.36)),
    (2, 7, KarlinParams::new(0.69, 0.73, 1.34)),
    (1, 3, KarlinParams::new(1.374, 0.711, 1.31)),
    (2, 5, KarlinParams::new(0.675, 0.65, 1.1)),
    (1, 2, KarlinParams::new(1.28, 0.46, 0.85)),
    (2, 3, KarlinParams::new(0.55, 0.21, 0.46)),
    (4, 5, KarlinParams::new(0.22, 0.061, 0.22)),
];

/// Tabulated ungapped parameters for `reward`/`penalty`, if any.
///
/// `penalty` may be given with either sign.
pub fn ungapped_nucleotide_params(reward: i32, penalty: i32) -> Option<KarlinParams> {
    let penalty = penalty.abs();
    UNGAPPED_NUCLEOTIDE
        .iter()
        .find(|(r, p, _)| *r == reward && *p == penalty)
        .map(|(_, _, params)| *params)
}
