use super::tables::KarlinParams;

/// Bit score: `(lambda * S - ln(K)) / ln(2)`
pub fn bit_score(raw_score: i32, params: &KarlinParams) -> f64 {
    (params.lambda * (raw_score as f64) - params.k.ln()) / std::f64::consts::LN_2
}

/// E-value over a `search_space` of query x databank symbols:
/// `m * n * 2^(-bits)`
pub fn evalue(bit_score: f64, search_space: f64) -> f64 {
    search_space * 2.0_f64.powf(-bit_score)
}
