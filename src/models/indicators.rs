//! Technical indicator calculations for the feature-engineering stage
//!
//! All functions operate on `Option<f64>` slices: an undefined input cell
//! stays out of the window arithmetic the same way pandas skips NaN, and
//! warm-up rows come back as `None` rather than a backward-filled value.

/// Rolling mean over the trailing `window` values. A result is produced
/// once at least `min_periods` defined values are in the window.
pub fn rolling_mean(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let valid: Vec<f64> = values[start..=i].iter().filter_map(|v| *v).collect();
        if valid.len() >= min_periods && !valid.is_empty() {
            out[i] = Some(valid.iter().sum::<f64>() / valid.len() as f64);
        }
    }

    out
}

/// Rolling sample standard deviation (ddof = 1) over the trailing
/// `window` values. Needs at least two defined values regardless of
/// `min_periods`.
pub fn rolling_std(values: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let valid: Vec<f64> = values[start..=i].iter().filter_map(|v| *v).collect();
        if valid.len() >= min_periods && valid.len() >= 2 {
            let mean = valid.iter().sum::<f64>() / valid.len() as f64;
            let var = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (valid.len() - 1) as f64;
            out[i] = Some(var.sqrt());
        }
    }

    out
}

/// Percentage change against the value `periods` rows earlier.
pub fn pct_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if periods == 0 {
        return out;
    }

    for i in periods..values.len() {
        if let (Some(curr), Some(prev)) = (values[i], values[i - periods]) {
            if prev != 0.0 {
                out[i] = Some(curr / prev - 1.0);
            }
        }
    }

    out
}

/// Exponential moving average with span-based smoothing
/// (alpha = 2 / (span + 1), recursive form). Undefined inputs carry the
/// previous EMA value forward.
pub fn ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if span == 0 {
        return out;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;

    for (i, value) in values.iter().enumerate() {
        if let Some(v) = value {
            state = Some(match state {
                Some(prev) => alpha * v + (1.0 - alpha) * prev,
                None => *v,
            });
        }
        out[i] = state;
    }

    out
}

/// Relative Strength Index over rolling-mean gains and losses.
///
/// The first row has no price change and contributes zero gain and zero
/// loss; with both averages at zero the ratio is undefined and the RSI
/// stays `None`. A window with losses but no gains reads 0, the converse
/// reads 100.
pub fn rsi(closes: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut gains = vec![Some(0.0); n];
    let mut losses = vec![Some(0.0); n];

    for i in 1..n {
        if let (Some(curr), Some(prev)) = (closes[i], closes[i - 1]) {
            let delta = curr - prev;
            if delta > 0.0 {
                gains[i] = Some(delta);
            } else if delta < 0.0 {
                losses[i] = Some(-delta);
            }
        }
    }

    let avg_gain = rolling_mean(&gains, window, 1);
    let avg_loss = rolling_mean(&losses, window, 1);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(gain, loss)| match (gain, loss) {
            (Some(g), Some(l)) => {
                if *l == 0.0 {
                    if *g == 0.0 {
                        None
                    } else {
                        Some(100.0)
                    }
                } else {
                    Some(100.0 - 100.0 / (1.0 + g / l))
                }
            }
            _ => None,
        })
        .collect()
}

/// On-balance volume: cumulative volume signed by the close-to-close
/// direction. Rows without a defined price change contribute zero.
pub fn obv(closes: &[Option<f64>], volumes: &[u64]) -> Vec<f64> {
    let mut out = vec![0.0; closes.len()];
    let mut running = 0.0;

    for i in 0..closes.len() {
        if i > 0 {
            if let (Some(curr), Some(prev)) = (closes[i], closes[i - 1]) {
                let sign = if curr > prev {
                    1.0
                } else if curr < prev {
                    -1.0
                } else {
                    0.0
                };
                running += sign * volumes[i] as f64;
            }
        }
        out[i] = running;
    }

    out
}

/// Rolling Pearson correlation over the trailing `window` rows. Requires
/// a full window of defined pairs.
pub fn rolling_corr(a: &[Option<f64>], b: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = a.len().min(b.len());
    let mut out = vec![None; n];
    if window < 2 {
        return out;
    }

    for i in 0..n {
        if i + 1 < window {
            continue;
        }
        let start = i + 1 - window;
        let pairs: Vec<(f64, f64)> = (start..=i)
            .filter_map(|j| match (a[j], b[j]) {
                (Some(x), Some(y)) => Some((x, y)),
                _ => None,
            })
            .collect();
        if pairs.len() < window {
            continue;
        }

        let count = pairs.len() as f64;
        let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / count;
        let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / count;
        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (x, y) in &pairs {
            cov += (x - mean_a) * (y - mean_b);
            var_a += (x - mean_a).powi(2);
            var_b += (y - mean_b).powi(2);
        }
        if var_a > 0.0 && var_b > 0.0 {
            out[i] = Some(cov / (var_a.sqrt() * var_b.sqrt()));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    #[test]
    fn test_rolling_mean_min_periods_one() {
        let values = some(&[10.0, 11.0, 12.0, 13.0]);
        let ma = rolling_mean(&values, 3, 1);

        assert_eq!(ma[0], Some(10.0));
        assert_eq!(ma[1], Some(10.5));
        assert_eq!(ma[2], Some(11.0)); // (10+11+12)/3
        assert_eq!(ma[3], Some(12.0)); // (11+12+13)/3
    }

    #[test]
    fn test_rolling_mean_skips_undefined() {
        let values = vec![Some(10.0), None, Some(14.0)];
        let ma = rolling_mean(&values, 2, 1);

        assert_eq!(ma[1], Some(10.0)); // only the defined value in window
        assert_eq!(ma[2], Some(14.0));
    }

    #[test]
    fn test_rolling_std_needs_two_values() {
        let values = some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let std = rolling_std(&values, 8, 1);

        assert_eq!(std[0], None);
        // full window: classic example, sample std = sqrt(32/7)
        let expected = (32.0f64 / 7.0).sqrt();
        assert!((std[7].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_pct_change() {
        let values = some(&[100.0, 110.0, 99.0]);
        let returns = pct_change(&values, 1);

        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() - 0.10).abs() < 1e-12);
        assert!((returns[2].unwrap() - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn test_ema_recursive_form() {
        let values = some(&[10.0, 20.0]);
        let out = ema(&values, 3); // alpha = 0.5

        assert_eq!(out[0], Some(10.0));
        assert_eq!(out[1], Some(15.0));
    }

    #[test]
    fn test_rsi_all_gains_reads_100() {
        let closes = some(&[1.0, 2.0, 3.0, 4.0]);
        let out = rsi(&closes, 14);

        assert_eq!(out[0], None); // zero gain, zero loss
        assert_eq!(out[3], Some(100.0));
    }

    #[test]
    fn test_rsi_balanced_window() {
        // gains [0, 1, 0], losses [0, 0, 1] -> avg gain == avg loss -> RSI 50
        let closes = some(&[10.0, 11.0, 10.0]);
        let out = rsi(&closes, 14);

        assert!((out[2].unwrap() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_obv_accumulates_signed_volume() {
        let closes = some(&[10.0, 11.0, 10.5, 10.5]);
        let volumes = vec![100, 200, 300, 400];
        let out = obv(&closes, &volumes);

        assert_eq!(out, vec![0.0, 200.0, -100.0, -100.0]);
    }

    #[test]
    fn test_rolling_corr_perfect_positive() {
        let a = some(&[1.0, 2.0, 3.0, 4.0]);
        let b = some(&[2.0, 4.0, 6.0, 8.0]);
        let out = rolling_corr(&a, &b, 3);

        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 1.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_corr_negative() {
        let a = some(&[1.0, 2.0, 3.0]);
        let b = some(&[6.0, 4.0, 2.0]);
        let out = rolling_corr(&a, &b, 3);

        assert!((out[2].unwrap() + 1.0).abs() < 1e-12);
    }
}
