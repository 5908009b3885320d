// src/services/engine/regime.rs
//! ADX + Bollinger-width market-state label.
//!
//! Order matters: the ADX branches set type/strength/direction first, then
//! the band-width override replaces `type` only. Strength and direction
//! computed by the ADX branches survive into an expansion/compression label.

use crate::services::engine::indicators;
use crate::services::engine::types::{Candle, Direction, Regime, RegimeKind};

const ADX_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
/// Baseline band width as a fraction of the last close.
const BB_BASELINE_PCT: f64 = 0.04;

pub fn classify(candles: &[Candle]) -> Regime {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

    let adx = indicators::adx(&highs, &lows, &closes, ADX_PERIOD);
    let bb_width = indicators::bollinger_band_width(&closes, BB_PERIOD);
    let baseline = closes.last().copied().unwrap_or(0.0) * BB_BASELINE_PCT;

    let mut kind = RegimeKind::Range;
    let mut strength = 0.5;
    let mut direction = Direction::Neutral;

    if adx > 25.0 {
        kind = RegimeKind::Trend;
        strength = ((adx - 25.0) / 25.0).min(1.0);
        direction = if indicators::ema(&closes, 20) > indicators::ema(&closes, 50) {
            Direction::Up
        } else {
            Direction::Down
        };
    } else if adx < 20.0 {
        kind = RegimeKind::Range;
        strength = ((20.0 - adx) / 20.0).min(1.0);
    }

    if bb_width > baseline * 1.3 {
        kind = RegimeKind::Expansion;
    } else if bb_width < baseline * 0.7 {
        kind = RegimeKind::Compression;
    }

    Regime {
        kind,
        strength,
        direction,
        adx,
        bb_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &p)| Candle {
                ts: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
                open: p,
                high: p * 1.001,
                low: p * 0.999,
                close: p,
                volume: 100.0,
            })
            .collect()
    }

    #[test]
    fn strong_uptrend_reads_trend_up() {
        // strictly rising 100 -> 130: steep early march pins ADX at its cap,
        // a gentler tail keeps band width inside the override dead zone
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 0.635).collect();
        closes.extend((1..=20).map(|i| 125.0 + i as f64 * 0.25));
        let r = classify(&candles_from_closes(&closes));
        assert!(r.adx > 25.0, "monotone rise should force ADX above 25: {}", r.adx);
        assert_eq!(r.kind, RegimeKind::Trend);
        assert_eq!(r.direction, Direction::Up);
        assert!(r.strength > 0.0 && r.strength <= 1.0);
    }

    #[test]
    fn steep_rise_with_blown_out_bands_reads_expansion_but_keeps_direction() {
        // strictly rising closes, 100 -> 130 over 30 candles: band width far
        // exceeds 1.3x baseline, so the override replaces the trend label
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let r = classify(&candles_from_closes(&closes));
        assert!(r.adx > 25.0);
        assert_eq!(r.kind, RegimeKind::Expansion);
        assert_eq!(r.strength, 1.0); // trend strength survives the override
    }

    #[test]
    fn quiet_tape_reads_compression() {
        // closes wiggle by 0.01%: band width collapses below 0.7x baseline
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + 0.01 * ((i % 2) as f64))
            .collect();
        let r = classify(&candles_from_closes(&closes));
        assert_eq!(r.kind, RegimeKind::Compression);
    }

    #[test]
    fn override_preserves_range_strength() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + 0.01 * ((i % 2) as f64))
            .collect();
        let r = classify(&candles_from_closes(&closes));
        // ADX branch ran first; whatever strength it set is still there
        assert!(r.strength >= 0.0 && r.strength <= 1.0);
        assert_eq!(r.direction, Direction::Neutral);
    }

    #[test]
    fn empty_window_degrades_quietly() {
        let r = classify(&[]);
        assert_eq!(r.adx, 0.0);
        assert_eq!(r.bb_width, 0.0);
        assert_eq!(r.direction, Direction::Neutral);
    }

    #[test]
    fn wide_chop_reads_expansion() {
        // +/-8% swings around 100: width blows past 1.3x the 4% baseline
        let closes: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 92.0 } else { 108.0 })
            .collect();
        let r = classify(&candles_from_closes(&closes));
        assert_eq!(r.kind, RegimeKind::Expansion);
    }
}
