//! Karlin-Altschul parameters from a score distribution
//!
//! Used when the scoring system has no tabulated parameters (non-standard
//! reward/penalty, protein or reduced alphabets). The score distribution is
//! derived from the databank composition.

use crate::error::ConfigError;

use super::tables::KarlinParams;

const LAMBDA_ACCURACY: f64 = 1.0e-5;
const LAMBDA_MAX_ITER: usize = 60;
const K_SUMLIMIT: f64 = 0.0001;
const K_MAX_ITER: usize = 100;

/// Probability of every integer score in `[low, high]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreProfile {
    low: i32,
    high: i32,
    probs: Vec<f64>,
}

impl ScoreProfile {
    /// Match/mismatch profile where both sequences follow `frequencies`.
    pub fn match_mismatch(match_score: i32, mismatch_score: i32, frequencies: &[f64]) -> Result<Self, ConfigError> {
        if match_score <= 0 || mismatch_score >= 0 {
            return Err(ConfigError::Statistics(format!(
                "scores {}/{} do not have a positive and a negative side",
                match_score, mismatch_score
            )));
        }
        let total: f64 = frequencies.iter().sum();
        if total <= 0.0 {
            return Err(ConfigError::Statistics("empty composition".to_string()));
        }
        let p_match: f64 = frequencies.iter().map(|f| (f / total) * (f / total)).sum();

        let low = mismatch_score;
        let high = match_score;
        let mut probs = vec![0.0; (high - low + 1) as usize];
        probs[0] = 1.0 - p_match;
        probs[(high - low) as usize] = p_match;
        Ok(Self { low, high, probs })
    }

    #[inline]
    pub fn prob(&self, score: i32) -> f64 {
        if score < self.low || score > self.high {
            return 0.0;
        }
        self.probs[(score - self.low) as usize]
    }

    pub fn average(&self) -> f64 {
        (self.low..=self.high).map(|s| s as f64 * self.prob(s)).sum()
    }

    /// Greatest common divisor of all scores with non-zero probability.
    fn divisor(&self) -> i32 {
        (self.low..=self.high)
            .filter(|&s| s != 0 && self.prob(s) > 0.0)
            .fold(0, |d, s| gcd(d, s.abs()))
            .max(1)
    }

    /// `sum_s p(s) e^(lambda s)`
    fn moment(&self, lambda: f64) -> f64 {
        (self.low..=self.high)
            .map(|s| self.prob(s) * (lambda * s as f64).exp())
            .sum()
    }
}

fn gcd(a: i32, b: i32) -> i32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn check_profile(profile: &ScoreProfile) -> Result<(), ConfigError> {
    if profile.prob(profile.high) <= 0.0 {
        return Err(ConfigError::Statistics(
            "positive scores have zero probability".to_string(),
        ));
    }
    if profile.average() >= 0.0 {
        return Err(ConfigError::Statistics(format!(
            "expected score {:.4} must be negative",
            profile.average()
        )));
    }
    Ok(())
}

/// Unique positive root of `sum_s p(s) e^(lambda s) = 1`, by bisection.
pub fn compute_lambda(profile: &ScoreProfile) -> Result<f64, ConfigError> {
    check_profile(profile)?;
    let mut hi = 0.5;
    while profile.moment(hi) <= 1.0 {
        hi *= 2.0;
        if hi > 1.0e3 {
            return Err(ConfigError::Statistics("lambda does not converge".to_string()));
        }
    }
    let mut lo = 0.0;
    for _ in 0..LAMBDA_MAX_ITER {
        let mid = (lo + hi) / 2.0;
        if profile.moment(mid) > 1.0 {
            hi = mid;
        } else {
            lo = mid;
        }
        if hi - lo < LAMBDA_ACCURACY * hi {
            break;
        }
    }
    Ok((lo + hi) / 2.0)
}

/// Relative entropy `lambda * sum_s s p(s) e^(lambda s)`.
pub fn compute_h(profile: &ScoreProfile, lambda: f64) -> f64 {
    lambda
        * (profile.low..=profile.high)
            .map(|s| s as f64 * profile.prob(s) * (lambda * s as f64).exp())
            .sum::<f64>()
}

/// K from lambda and H.
///
/// Scores are first reduced by their common divisor. Lattices with a unit
/// step on either side have closed forms; others fall back to the series
/// over n-step score sums.
pub fn compute_k(profile: &ScoreProfile, lambda: f64, h: f64) -> Result<f64, ConfigError> {
    if lambda <= 0.0 || h <= 0.0 {
        return Err(ConfigError::Statistics("lambda and H must be positive".to_string()));
    }
    let d = profile.divisor();
    let low = profile.low / d;
    let high = profile.high / d;
    let lambda = lambda * d as f64;
    let first_term = h / lambda;
    let one_minus_exp = -(-lambda).exp_m1();

    if low == -1 && high == 1 {
        let p_low = profile.prob(profile.low);
        let p_high = profile.prob(profile.high);
        return Ok((p_low - p_high) * (p_low - p_high) / p_low);
    }
    if high == 1 {
        return Ok(first_term * one_minus_exp);
    }
    if low == -1 {
        let avg = profile.average() / d as f64;
        return Ok(avg * avg / first_term * one_minus_exp);
    }

    // reduced step distribution over [low, high]
    let range = (high - low) as usize;
    let step: Vec<f64> = (low..=high).map(|s| profile.prob(s * d)).collect();
    let exp_minus_lambda = (-lambda).exp();

    let mut dist = vec![1.0];
    let mut dist_low = 0i32;
    let mut sigma = 0.0;
    for n in 1..=K_MAX_ITER {
        let mut next = vec![0.0; dist.len() + range];
        for (i, &p) in dist.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for (j, &q) in step.iter().enumerate() {
                next[i + j] += p * q;
            }
        }
        dist = next;
        dist_low += low;

        let term: f64 = dist
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let score = dist_low + i as i32;
                if score < 0 {
                    p * exp_minus_lambda.powi(-score)
                } else {
                    p
                }
            })
            .sum::<f64>()
            / n as f64;
        sigma += term;
        if term <= K_SUMLIMIT {
            break;
        }
    }

    let k = (-2.0 * sigma).exp() / (first_term * one_minus_exp);
    if k <= 0.0 || !k.is_finite() {
        return Err(ConfigError::Statistics("computed K is not positive".to_string()));
    }
    Ok(k)
}

pub fn compute_karlin_params(profile: &ScoreProfile) -> Result<KarlinParams, ConfigError> {
    let lambda = compute_lambda(profile)?;
    let h = compute_h(profile, lambda);
    let k = compute_k(profile, lambda, h)?;
    Ok(KarlinParams { lambda, k, h })
}
