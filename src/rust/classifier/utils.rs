use ndarray::Array1;

/// Scales non-negative weights so they sum to one. Returns `None` when the
/// weights cannot form a distribution.
pub(crate) fn normalize_distribution(weights: &[f64]) -> Option<Vec<f64>> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if total > 1e-12 {
        Some(weights.iter().map(|w| w / total).collect())
    } else {
        None
    }
}

/// Index and value of the largest entry; the first (lowest) index wins ties.
pub(crate) fn argmax(values: &Array1<f64>) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// Probability as a percentage rounded to two decimals.
pub(crate) fn to_percent(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}
