//! Knee detection on a convex, decreasing curve (the Kneedle method).
//!
//! Satopää et al., "Finding a 'Kneedle' in a Haystack", 2011.

/// Sensitivity `S`: how many mean x-steps the difference curve has to drop
/// below a local maximum before that maximum counts as the knee.
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return None;
    }
    Some(values.iter().map(|v| (v - min) / range).collect())
}

/// Indices `i` where `cmp(d[i], d[i-1]) && cmp(d[i], d[i+1])`, with the
/// neighbours clipped at both ends.
fn relative_extrema(d: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    let last = d.len() - 1;
    (0..d.len())
        .filter(|&i| cmp(d[i], d[i.saturating_sub(1)]) && cmp(d[i], d[(i + 1).min(last)]))
        .collect()
}

/// Find the knee of `(x, y)` points, `x` strictly increasing and `y`
/// decreasing and convex.
///
/// Returns the `x` of the first knee, or `None` when the curve has fewer
/// than three points, is flat, or never drops off after its maximum.
pub fn find_knee(points: &[(f64, f64)], sensitivity: f64) -> Option<f64> {
    if points.len() < 3 {
        return None;
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();

    let x_norm = normalize(&xs)?;
    // Flip so a convex decreasing curve becomes concave increasing.
    let y_norm: Vec<f64> = normalize(&ys)?.into_iter().map(|y| 1.0 - y).collect();
    let diff: Vec<f64> = y_norm.iter().zip(&x_norm).map(|(y, x)| y - x).collect();

    let maxima = relative_extrema(&diff, |a, b| a >= b);
    let minima = relative_extrema(&diff, |a, b| a <= b);
    let first_max = *maxima.first()?;

    let mean_step = x_norm.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (x_norm.len() - 1) as f64;
    let thresholds: Vec<f64> = maxima
        .iter()
        .map(|&i| diff[i] - sensitivity * mean_step.abs())
        .collect();

    let mut next_max = 0;
    let mut threshold = 0.0;
    let mut threshold_index = first_max;
    for i in first_max..diff.len() - 1 {
        if maxima.contains(&i) {
            threshold = thresholds[next_max];
            threshold_index = i;
            next_max += 1;
        }
        if minima.contains(&i) {
            threshold = 0.0;
        }
        if diff[i + 1] < threshold {
            return Some(xs[threshold_index]);
        }
    }
    None
}
