//! Synthetic candle-history generation.
//!
//! The engine needs an ordered OHLCV window ending at the live price; where
//! that window comes from is its own concern. This generator runs a
//! zero-drift log random walk backwards from the quote so the last close
//! lands on the live price exactly, with the OHLC invariant
//! (`low <= min(open, close)`, `high >= max(open, close)`) enforced on
//! every candle.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::services::engine::Candle;

/// Per-step volatility of the walk (log-return sigma, ~0.5%/candle).
const STEP_SIGMA: f64 = 0.005;
/// Wick extension as a fraction of the candle body range.
const MAX_WICK: f64 = 0.004;
const BASE_VOLUME: f64 = 1_200.0;

pub fn synthetic_window(price: f64, len: usize, interval_hours: f64) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let step_minutes = (interval_hours * 60.0).round().max(1.0) as i64;
    let now = Utc::now();

    // closes first: walk backwards from the live price
    let mut closes = vec![price; len];
    for i in (0..len.saturating_sub(1)).rev() {
        // uniform noise is fine here; the engine never assumes normality
        let ret = STEP_SIGMA * (rng.gen::<f64>() * 2.0 - 1.0);
        closes[i] = closes[i + 1] * (-ret).exp();
    }

    (0..len)
        .map(|i| {
            let close = closes[i];
            let open = if i == 0 {
                close * (1.0 + STEP_SIGMA * (rng.gen::<f64>() * 2.0 - 1.0))
            } else {
                closes[i - 1]
            };
            let body_high = open.max(close);
            let body_low = open.min(close);
            let high = body_high * (1.0 + MAX_WICK * rng.gen::<f64>());
            let low = body_low * (1.0 - MAX_WICK * rng.gen::<f64>());
            let volume = BASE_VOLUME * rng.gen_range(0.4..1.6);
            Candle {
                ts: now - Duration::minutes(step_minutes * (len - 1 - i) as i64),
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}
