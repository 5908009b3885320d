// src/services/engine/orchestrator.rs
//! Runs the range projector across every requested horizon against the same
//! candle window, then derives the trading zones and the window-level
//! market assessment.

use crate::services::engine::indicators;
use crate::services::engine::momentum::{self, MOMENTUM_PERIODS};
use crate::services::engine::projector;
use crate::services::engine::regime;
use crate::services::engine::structure;
use crate::services::engine::types::{
    round2, Analysis, Candle, EngineConfig, MarketAssessment, MarketSnapshot, PriceRange,
    RangePrediction, Tone, TradingZones, VwapPosition, Zone,
};
use crate::utils::errors::EngineError;

pub const DEFAULT_HORIZONS: [u32; 6] = [1, 2, 4, 6, 12, 24];

/// Zone boundaries as cumulative fractions of the range width.
const ZONE_FRACTIONS: [f64; 6] = [0.0, 0.15, 0.35, 0.65, 0.85, 1.0];

const ASSESSMENT_TONE_THRESHOLD: f64 = 0.1;

/// One full engine run. Pure: same window + snapshot + horizons in, same
/// analysis out. Only truly malformed input fails; short windows degrade
/// indicator by indicator instead.
pub fn run(
    candles: &[Candle],
    snapshot: &MarketSnapshot,
    horizons: &[u32],
    cfg: &EngineConfig,
) -> Result<Analysis, EngineError> {
    validate_window(candles)?;
    if !(snapshot.price > 0.0) {
        return Err(EngineError::InvalidSnapshotPrice(snapshot.price));
    }
    if horizons.is_empty() {
        return Err(EngineError::NoHorizons);
    }

    let price = snapshot.price;
    let predictions: Vec<RangePrediction> = horizons
        .iter()
        .map(|&h| projector::project(candles, price, h, cfg))
        .collect();

    let assessment = assess(candles, price, cfg);

    // zones come off the 2nd requested horizon, or the only one
    let zone_source = predictions.get(1).unwrap_or(&predictions[0]);
    let zones = trading_zones(&zone_source.range, price);

    Ok(Analysis {
        predictions,
        assessment,
        zones,
    })
}

/// Hard-failure gate: non-monotonic timestamps and non-positive prices are
/// the only inputs the engine refuses outright.
pub fn validate_window(candles: &[Candle]) -> Result<(), EngineError> {
    if candles.is_empty() {
        return Err(EngineError::EmptyWindow);
    }
    for (i, c) in candles.iter().enumerate() {
        if !(c.open > 0.0 && c.high > 0.0 && c.low > 0.0 && c.close > 0.0) {
            return Err(EngineError::NonPositivePrice(i));
        }
        if i > 0 && c.ts <= candles[i - 1].ts {
            return Err(EngineError::NonMonotonicTimestamps(i));
        }
    }
    Ok(())
}

fn assess(candles: &[Candle], price: f64, cfg: &EngineConfig) -> MarketAssessment {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let regime = regime::classify(candles);
    let realized = indicators::realized_volatility(candles, 24, cfg.bars_per_year());
    let vol_state = projector::classify_volatility(candles, realized, cfg);
    let m = momentum::score(candles, MOMENTUM_PERIODS);

    let momentum_tone = if m > ASSESSMENT_TONE_THRESHOLD {
        Tone::Bullish
    } else if m < -ASSESSMENT_TONE_THRESHOLD {
        Tone::Bearish
    } else {
        Tone::Neutral
    };

    let levels = structure::find(candles);
    let price_vs_vwap = if price > levels.vwap {
        VwapPosition::Above
    } else if price < levels.vwap {
        VwapPosition::Below
    } else {
        VwapPosition::At
    };

    MarketAssessment {
        regime,
        realized_vol: realized,
        vol_state,
        momentum: m,
        momentum_tone,
        rsi: indicators::rsi(&closes, 14),
        ema20: round2(indicators::ema(&closes, 20)),
        ema50: round2(indicators::ema(&closes, 50)),
        vwap: round2(levels.vwap),
        price_vs_vwap,
    }
}

/// Partition one range into five contiguous bands (15/20/30/20/15% of the
/// width). Band edges are shared, so the union is exactly [low, high].
fn trading_zones(range: &PriceRange, price: f64) -> TradingZones {
    let width = range.high - range.low;

    let mut bounds = [0.0; 6];
    bounds[0] = range.low;
    bounds[5] = range.high;
    for i in 1..5 {
        bounds[i] = round2(range.low + width * ZONE_FRACTIONS[i]);
    }

    let position = if width > 0.0 {
        (price - range.low) / width
    } else {
        0.0
    };

    TradingZones {
        strong_buy_zone: Zone { low: bounds[0], high: bounds[1] },
        buy_zone: Zone { low: bounds[1], high: bounds[2] },
        neutral_zone: Zone { low: bounds[2], high: bounds[3] },
        sell_zone: Zone { low: bounds[3], high: bounds[4] },
        strong_sell_zone: Zone { low: bounds[4], high: bounds[5] },
        current_zone: determine_current_zone(position).to_string(),
    }
}

/// Saturating band lookup: positions below 0 still read as the strong-buy
/// band and above 1 as the strong-sell band.
fn determine_current_zone(position: f64) -> &'static str {
    if position < 0.15 {
        "Strong Buy Zone"
    } else if position < 0.35 {
        "Buy Zone"
    } else if position < 0.65 {
        "Neutral Zone"
    } else if position < 0.85 {
        "Sell Zone"
    } else {
        "Strong Sell Zone"
    }
}
