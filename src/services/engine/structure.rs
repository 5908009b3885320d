// src/services/engine/structure.rs
//! Session extremes, swing points and VWAP bands from a candle window.
//! The "session" is the last 24 candles; swings come off the full window
//! and keep only the 3 most recent on each side.

use crate::services::engine::indicators::{self, SwingKind};
use crate::services::engine::types::{Candle, MarketStructure};

const SESSION_LEN: usize = 24;
const SWING_LOOKBACK: usize = 5;
const MAX_SWINGS: usize = 3;

pub fn find(candles: &[Candle]) -> MarketStructure {
    let session = &candles[candles.len().saturating_sub(SESSION_LEN)..];

    let session_high = session.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let session_low = session.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let (session_high, session_low) = if session.is_empty() {
        (0.0, 0.0)
    } else {
        (session_high, session_low)
    };

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let mut swing_highs = indicators::swing_points(&highs, SwingKind::High, SWING_LOOKBACK);
    let mut swing_lows = indicators::swing_points(&lows, SwingKind::Low, SWING_LOOKBACK);
    if swing_highs.len() > MAX_SWINGS {
        swing_highs.drain(..swing_highs.len() - MAX_SWINGS);
    }
    if swing_lows.len() > MAX_SWINGS {
        swing_lows.drain(..swing_lows.len() - MAX_SWINGS);
    }

    let vwap = indicators::vwap(session);
    let sd = indicators::vwap_std_dev(session);

    MarketStructure {
        session_high,
        session_low,
        swing_highs,
        swing_lows,
        vwap,
        vwap_upper_1: vwap + sd,
        vwap_upper_2: vwap + 2.0 * sd,
        vwap_lower_1: vwap - sd,
        vwap_lower_2: vwap - 2.0 * sd,
    }
}
