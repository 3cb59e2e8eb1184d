/// Standard normal cumulative distribution at `a`.
pub fn normal_probability(a: f64) -> f64 {
    0.5 * (1.0 + libm::erf(a / std::f64::consts::SQRT_2))
}

/// Hoeffding bound `sqrt(R^2 ln(1/delta) / 2n)`.
pub fn hoeffding_bound(range: f64, confidence: f64, n: f64) -> f64 {
    ((range * range * (1.0 / confidence).ln()) / (2.0 * n)).sqrt()
}
