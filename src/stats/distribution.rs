//! Duration statistics

use super::types::DurationStats;

impl DurationStats {
    /// Summarize `durations`; `None` when empty.
    pub fn from_durations(durations: &[i64]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }
        let mut sorted = durations.to_vec();
        sorted.sort_unstable();

        let sum: f64 = sorted.iter().map(|&d| d as f64).sum();
        Some(DurationStats {
            count: sorted.len(),
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            mean_ms: sum / sorted.len() as f64,
            median_ms: percentile(&sorted, 0.5),
            p95_ms: percentile(&sorted, 0.95),
        })
    }
}

/// Linear-interpolation percentile over sorted values, `p` in `[0, 1]`.
pub fn percentile(sorted: &[i64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0] as f64,
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] as f64 + (sorted[upper] - sorted[lower]) as f64 * weight
        }
    }
}
