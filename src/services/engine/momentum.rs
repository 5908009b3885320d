// src/services/engine/momentum.rs
//! ATR-normalized slope of recent closes, clamped to [-1, 1].

use crate::services::engine::indicators;
use crate::services::engine::types::Candle;

pub const MOMENTUM_PERIODS: usize = 10;

/// Slope of the last `periods` closes divided by ATR over the same span.
/// Neutral (0) on short windows and on a zero ATR.
pub fn score(candles: &[Candle], periods: usize) -> f64 {
    if periods == 0 || candles.len() < periods + 1 {
        return 0.0;
    }

    let last = candles[candles.len() - 1].close;
    let past = candles[candles.len() - 1 - periods].close;
    let slope = (last - past) / periods as f64;

    let atr = indicators::atr(&candles[candles.len() - periods..], periods);
    if atr == 0.0 {
        return 0.0;
    }

    (slope / atr).clamp(-1.0, 1.0)
}
