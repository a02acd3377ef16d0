//! Agreement between estimated scores and known latent values.

/// Pearson correlation, or `None` for fewer than two points or a constant series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let len = xs.len().min(ys.len());
    if len < 2 {
        return None;
    }
    let mean_x = xs[..len].iter().sum::<f64>() / len as f64;
    let mean_y = ys[..len].iter().sum::<f64>() / len as f64;
    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }
    if denom_x == 0.0 || denom_y == 0.0 {
        return None;
    }
    Some(num / (denom_x.sqrt() * denom_y.sqrt()))
}

/// Spearman rank correlation with average ranks for ties.
pub fn spearman(xs: &[f64], ys: &[f64]) -> Option<f64> {
    pearson(&rank(xs), &rank(ys))
}

/// One-based ranks; tied values share the mean of their positions.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut idx = 0;
    while idx < order.len() {
        let start = idx;
        let value = values[order[idx]];
        while idx < order.len() && values[order[idx]] == value {
            idx += 1;
        }
        let shared = (start + idx - 1) as f64 / 2.0 + 1.0;
        for &original in &order[start..idx] {
            ranks[original] = shared;
        }
    }
    ranks
}

/// Drops positions where either series is not finite.
pub fn finite_pairs(xs: &[f64], ys: &[f64]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .unzip()
}
