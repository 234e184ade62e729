//! Historical value-at-risk.

/// Historical VaR: the `(1 - confidence)` percentile of `returns`.
///
/// Uses linear interpolation between closest ranks. Returns `None` for an
/// empty sample or a confidence outside `(0, 1)`.
pub fn historical_var(returns: &[f64], confidence: f64) -> Option<f64> {
    if returns.is_empty() || !(confidence > 0.0 && confidence < 1.0) {
        return None;
    }

    let mut sorted: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (1.0 - confidence) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
