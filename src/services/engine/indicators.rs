// src/services/engine/indicators.rs
//! Stateless numeric primitives over candle/close slices. No I/O, no state;
//! every function degrades to a documented neutral value on short input
//! instead of failing the pipeline.

use crate::services::engine::types::Candle;

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. The band-width and realized-vol contracts
/// pin this exact formula, so it stays hand-rolled rather than sampled.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values, smoothing factor `2/(period+1)`.
///
/// With fewer than `period` values this is not a true EMA: it returns the
/// last element unchanged.
pub fn ema(series: &[f64], period: usize) -> f64 {
    let Some(&last) = series.last() else {
        return 0.0;
    };
    if period == 0 || series.len() < period {
        return last;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut val = mean(&series[..period]);
    for &p in &series[period..] {
        val = p * k + val * (1.0 - k);
    }
    val
}

/// Single fixed-window RSI over the first `period` deltas only (no Wilder
/// smoothing over the rest of the series). 50 on insufficient data, 100 when
/// every sampled delta is non-negative.
pub fn rsi(series: &[f64], period: usize) -> f64 {
    if period == 0 || series.len() < period + 1 {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let diff = series[i] - series[i - 1];
        if diff >= 0.0 {
            gains += diff;
        } else {
            losses += -diff;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Simplified ADX: single-window +DM / -DM / true-range accumulation over
/// `min(period+1, n)` candles, no recursive smoothing. A degenerate
/// denominator (`+DI + -DI == 0`, or zero true range) reads as 0.
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let n = highs.len().min(lows.len()).min(closes.len());
    if n < 2 {
        return 0.0;
    }

    let mut plus_dm = 0.0;
    let mut minus_dm = 0.0;
    let mut tr = 0.0;
    for i in 1..(period + 1).min(n) {
        let up = highs[i] - highs[i - 1];
        let down = lows[i - 1] - lows[i];
        if up > down && up > 0.0 {
            plus_dm += up;
        }
        if down > up && down > 0.0 {
            minus_dm += down;
        }
        tr += (highs[i] - lows[i])
            .max((highs[i] - closes[i - 1]).abs())
            .max((lows[i] - closes[i - 1]).abs());
    }

    if tr == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_dm / tr;
    let minus_di = 100.0 * minus_dm / tr;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    (plus_di - minus_di).abs() / di_sum * 100.0
}

/// `4 × stdDev` of the last `period` closes. 0 on insufficient data.
pub fn bollinger_band_width(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period {
        return 0.0;
    }
    4.0 * std_dev(&closes[closes.len() - period..])
}

/// Mean true range over the last `period` candles. The first candle of the
/// window falls back to `high - low` when no previous close exists.
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if candles.is_empty() || period == 0 {
        return 0.0;
    }
    let start = candles.len().saturating_sub(period);
    let mut trs = Vec::with_capacity(candles.len() - start);
    for i in start..candles.len() {
        let c = &candles[i];
        let tr = if i == 0 {
            c.high - c.low
        } else {
            let pc = candles[i - 1].close;
            (c.high - c.low)
                .max((c.high - pc).abs())
                .max((c.low - pc).abs())
        };
        trs.push(tr);
    }
    mean(&trs)
}

fn typical_price(c: &Candle) -> f64 {
    (c.high + c.low + c.close) / 3.0
}

/// Volume-weighted mean of typical price `(high+low+close)/3`. Falls back to
/// the unweighted mean when total volume is zero.
pub fn vwap(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    let total_vol: f64 = candles.iter().map(|c| c.volume).sum();
    if total_vol == 0.0 {
        let tps: Vec<f64> = candles.iter().map(typical_price).collect();
        return mean(&tps);
    }
    candles
        .iter()
        .map(|c| typical_price(c) * c.volume)
        .sum::<f64>()
        / total_vol
}

/// Volume-weighted standard deviation of typical price around the VWAP.
pub fn vwap_std_dev(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }
    let v = vwap(candles);
    let total_vol: f64 = candles.iter().map(|c| c.volume).sum();
    if total_vol == 0.0 {
        let tps: Vec<f64> = candles.iter().map(typical_price).collect();
        return std_dev(&tps);
    }
    let var = candles
        .iter()
        .map(|c| c.volume * (typical_price(c) - v).powi(2))
        .sum::<f64>()
        / total_vol;
    var.sqrt()
}

/// Standard deviation of log returns over the last `lookback` candles,
/// annualized by `√bars_per_year`. 0 when fewer than two closes exist.
pub fn realized_volatility(candles: &[Candle], lookback: usize, bars_per_year: f64) -> f64 {
    if candles.len() < 2 {
        return 0.0;
    }
    let n = lookback.min(candles.len() - 1);
    let mut returns = Vec::with_capacity(n);
    for i in candles.len() - n..candles.len() {
        let prev = candles[i - 1].close;
        if prev > 0.0 && candles[i].close > 0.0 {
            returns.push((candles[i].close / prev).ln());
        }
    }
    std_dev(&returns) * bars_per_year.sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingKind {
    High,
    Low,
}

/// Values at indices where the center of a `2×lookback+1` window is the
/// strict extremum of that window, in time order.
pub fn swing_points(series: &[f64], kind: SwingKind, lookback: usize) -> Vec<f64> {
    let mut points = Vec::new();
    if series.len() < 2 * lookback + 1 {
        return points;
    }
    for i in lookback..series.len() - lookback {
        let center = series[i];
        let window = &series[i - lookback..=i + lookback];
        let qualifies = match kind {
            SwingKind::High => window
                .iter()
                .enumerate()
                .all(|(j, &v)| j == lookback || v < center),
            SwingKind::Low => window
                .iter()
                .enumerate()
                .all(|(j, &v)| j == lookback || v > center),
        };
        if qualifies {
            points.push(center);
        }
    }
    points
}

// =======================================================================
// UNIT TESTS
// =======================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candles(closes: &[f64], vol: f64) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &p)| Candle {
                ts: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                open: p,
                high: p + 1.0,
                low: p - 1.0,
                close: p,
                volume: vol,
            })
            .collect()
    }

    fn flat_candles(price: f64, n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                ts: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn ema_short_series_returns_last_element() {
        let s = [10.0, 11.0, 12.0];
        assert_eq!(ema(&s, 20), 12.0);
        assert_eq!(ema(&[], 20), 0.0);
    }

    #[test]
    fn ema_constant_series_is_the_constant() {
        let s = [5.0; 40];
        assert!((ema(&s, 20) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn ema_tracks_rising_series() {
        let s: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let e20 = ema(&s, 20);
        let e50 = ema(&s, 50);
        assert!(e20 > e50, "faster EMA should lead on a rising series");
        assert!(e20 < *s.last().unwrap());
    }

    #[test]
    fn rsi_insufficient_data_is_50() {
        assert_eq!(rsi(&[1.0, 2.0], 14), 50.0);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let s: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&s, 14), 100.0);
    }

    #[test]
    fn rsi_always_in_bounds() {
        let mixed: Vec<f64> = (0..30)
            .map(|i| 100.0 + if i % 2 == 0 { 3.0 } else { -2.0 } * i as f64)
            .collect();
        let r = rsi(&mixed, 14);
        assert!((0.0..=100.0).contains(&r), "rsi out of bounds: {r}");

        let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_eq!(rsi(&falling, 14), 0.0);
    }

    #[test]
    fn adx_degenerate_window_is_zero() {
        // flat series: zero true range, zero directional movement
        let flat = [100.0; 20];
        assert_eq!(adx(&flat, &flat, &flat, 14), 0.0);
        assert_eq!(adx(&[1.0], &[1.0], &[1.0], 14), 0.0);
    }

    #[test]
    fn adx_saturates_on_one_way_movement() {
        let highs: Vec<f64> = (0..20).map(|i| 101.0 + i as f64 * 2.0).collect();
        let lows: Vec<f64> = (0..20).map(|i| 99.0 + i as f64 * 2.0).collect();
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 2.0).collect();
        let a = adx(&highs, &lows, &closes, 14);
        assert!(a > 25.0, "monotone march should read as a strong trend: {a}");
        assert!(a <= 100.0);
    }

    #[test]
    fn bollinger_width_zero_when_short_or_flat() {
        assert_eq!(bollinger_band_width(&[1.0; 10], 20), 0.0);
        assert_eq!(bollinger_band_width(&[100.0; 25], 20), 0.0);
    }

    #[test]
    fn bollinger_width_is_four_sigma() {
        let closes = [98.0, 102.0, 98.0, 102.0, 98.0, 102.0];
        let w = bollinger_band_width(&closes, 6);
        assert!((w - 8.0).abs() < 1e-9); // σ = 2
    }

    #[test]
    fn atr_flat_candles_is_zero() {
        assert_eq!(atr(&flat_candles(100.0, 20), 10), 0.0);
        assert_eq!(atr(&[], 10), 0.0);
    }

    #[test]
    fn atr_counts_gaps_via_previous_close() {
        let mut c = candles(&[100.0, 100.0, 100.0], 1.0);
        c[2].high = 110.0; // gap candle: TR = max(110-99, |110-100|, |99-100|)
        let a = atr(&c, 1);
        assert!((a - 11.0).abs() < 1e-9);
    }

    #[test]
    fn vwap_weighted_toward_heavy_candles() {
        let mut c = candles(&[100.0, 200.0], 1.0);
        c[1].volume = 3.0;
        let v = vwap(&c);
        assert!((v - 175.0).abs() < 1e-9);
    }

    #[test]
    fn vwap_zero_volume_falls_back_to_mean() {
        let c = candles(&[100.0, 200.0], 0.0);
        assert!((vwap(&c) - 150.0).abs() < 1e-9);
        assert!(vwap_std_dev(&c) > 0.0);
    }

    #[test]
    fn realized_vol_zero_on_flat_series() {
        let c = flat_candles(100.0, 48);
        assert_eq!(realized_volatility(&c, 24, 8760.0), 0.0);
    }

    #[test]
    fn realized_vol_positive_on_noise_and_scales_with_bars() {
        let closes: Vec<f64> = (0..48)
            .map(|i| 100.0 * (1.0 + 0.01 * ((i % 3) as f64 - 1.0)))
            .collect();
        let c = candles(&closes, 1.0);
        let hourly = realized_volatility(&c, 24, 8760.0);
        let four_hourly = realized_volatility(&c, 24, 2190.0);
        assert!(hourly > 0.0);
        assert!((hourly / four_hourly - 2.0).abs() < 1e-9);
    }

    #[test]
    fn swing_points_find_strict_extrema_in_order() {
        let mut s = vec![100.0; 30];
        s[7] = 110.0;
        s[20] = 120.0;
        let highs = swing_points(&s, SwingKind::High, 5);
        assert_eq!(highs, vec![110.0, 120.0]);

        // plateau is not a strict extremum
        let mut p = vec![100.0; 30];
        p[10] = 110.0;
        p[11] = 110.0;
        assert!(swing_points(&p, SwingKind::High, 5).is_empty());
    }

    #[test]
    fn swing_points_short_series_is_empty() {
        assert!(swing_points(&[1.0, 2.0, 3.0], SwingKind::Low, 5).is_empty());
    }
}
