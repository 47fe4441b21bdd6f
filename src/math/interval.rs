//! Binomial proportion confidence intervals.

/// z-score for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Wilson score interval for `successes / total`.
///
/// ```text
/// p      = successes / total
/// center = p + z²/(2n)
/// spread = z * sqrt((p(1-p) + z²/(4n)) / n)
/// denom  = 1 + z²/n
/// [(center - spread) / denom, (center + spread) / denom]
/// ```
///
/// The result is clamped to `[0, 1]` and always brackets the observed rate.
/// `total == 0` yields `[0, 0]`.
pub fn wilson_interval(successes: usize, total: usize, z: f64) -> [f64; 2] {
    if total == 0 {
        return [0.0, 0.0];
    }
    let n = total as f64;
    let p = (successes.min(total)) as f64 / n;
    let z2 = z * z;

    let center = p + z2 / (2.0 * n);
    let spread = z * ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();
    let denom = 1.0 + z2 / n;

    let low = ((center - spread) / denom).clamp(0.0, 1.0);
    let high = ((center + spread) / denom).clamp(0.0, 1.0);
    // Rounding at p = 0 or p = 1 can leave the bound a hair past p.
    [low.min(p), high.max(p)]
}
