// src/services/engine/projector.rs
//! The central algorithm: regime, projected volatility, momentum skew and
//! structure anchoring combine into one anchored price range per horizon,
//! with a confidence score and advisory invalidation conditions.

use statrs::statistics::{Data as StatsData, Distribution};

use crate::services::engine::indicators;
use crate::services::engine::momentum::{self, MOMENTUM_PERIODS};
use crate::services::engine::regime;
use crate::services::engine::structure;
use crate::services::engine::types::{
    round1, round2, Candle, EngineConfig, Invalidations, MarketStructure, MomentumBias,
    MomentumInfo, PriceRange, RangePrediction, Regime, RegimeKind, VolState, VolatilityInfo,
};

/// One-sided z-score for ~90% two-sided coverage.
const Z_90: f64 = 1.65;
/// Momentum shifts the range center by at most +/-12%.
const MOMENTUM_SKEW: f64 = 0.12;
/// A structure level qualifies as an anchor within this fraction of the width.
const ANCHOR_BAND: f64 = 0.25;
const BIAS_THRESHOLD: f64 = 0.25;
const VOL_LOOKBACK: usize = 24;

fn regime_vol_multiplier(kind: RegimeKind) -> f64 {
    match kind {
        RegimeKind::Trend => 1.2,
        RegimeKind::Range => 0.85,
        RegimeKind::Expansion => 1.4,
        RegimeKind::Compression => 0.7,
    }
}

fn regime_width_multiplier(kind: RegimeKind) -> f64 {
    match kind {
        RegimeKind::Expansion => 1.35,
        RegimeKind::Compression => 0.75,
        RegimeKind::Trend => 1.15,
        RegimeKind::Range => 0.9,
    }
}

pub fn project(
    candles: &[Candle],
    price: f64,
    horizon_hours: u32,
    cfg: &EngineConfig,
) -> RangePrediction {
    let regime = regime::classify(candles);
    let realized = indicators::realized_volatility(candles, VOL_LOOKBACK, cfg.bars_per_year());
    let projected =
        realized * (horizon_hours as f64 / 24.0).sqrt() * regime_vol_multiplier(regime.kind);

    let base_width = price * projected * Z_90;
    let momentum = momentum::score(candles, MOMENTUM_PERIODS);
    let center = price * (1.0 + momentum * MOMENTUM_SKEW);
    let adjusted_width = base_width * regime_width_multiplier(regime.kind);

    let mut range_low = center - adjusted_width / 2.0;
    let mut range_high = center + adjusted_width / 2.0;

    let levels = structure::find(candles);
    range_low = anchor_low(range_low, center, adjusted_width, &support_levels(&levels));
    range_high = anchor_high(
        range_high,
        center,
        adjusted_width,
        &resistance_levels(&levels),
    );

    let confidence = confidence_score(candles, &levels, &regime, price, cfg);
    let vol_state = classify_volatility(candles, realized, cfg);

    let bias = if momentum > BIAS_THRESHOLD {
        MomentumBias::SlightBullish
    } else if momentum < -BIAS_THRESHOLD {
        MomentumBias::SlightBearish
    } else {
        MomentumBias::Neutral
    };

    let invalidations = invalidation_conditions(range_low, range_high, realized, horizon_hours, &regime);

    let width = range_high - range_low;
    RangePrediction {
        horizon_hours,
        range: PriceRange {
            low: round2(range_low),
            high: round2(range_high),
            center: round2(center),
            width: round2(width),
            width_percent: if price > 0.0 { round2(width / price * 100.0) } else { 0.0 },
        },
        confidence: round1(confidence * 100.0),
        volatility: VolatilityInfo {
            state: vol_state,
            realized,
            projected,
        },
        regime,
        momentum: MomentumInfo {
            value: momentum,
            bias,
        },
        invalidations,
    }
}

fn support_levels(s: &MarketStructure) -> Vec<f64> {
    let mut levels = vec![s.session_low];
    levels.extend(&s.swing_lows);
    levels.push(s.vwap_lower_1);
    levels.push(s.vwap_lower_2);
    levels
}

fn resistance_levels(s: &MarketStructure) -> Vec<f64> {
    let mut levels = vec![s.session_high];
    levels.extend(&s.swing_highs);
    levels.push(s.vwap_upper_1);
    levels.push(s.vwap_upper_2);
    levels
}

/// Snap the low bound up to the highest support inside the anchor band.
/// Anchoring moves bounds inward only: the result always stays within the
/// pre-anchoring range and never crosses the center.
fn anchor_low(range_low: f64, center: f64, width: f64, supports: &[f64]) -> f64 {
    supports
        .iter()
        .copied()
        .filter(|&s| s > range_low && s < center && s - range_low <= width * ANCHOR_BAND)
        .fold(None::<f64>, |best, s| Some(best.map_or(s, |b| b.max(s))))
        .unwrap_or(range_low)
}

/// Mirror of [`anchor_low`] for the high bound.
fn anchor_high(range_high: f64, center: f64, width: f64, resistances: &[f64]) -> f64 {
    resistances
        .iter()
        .copied()
        .filter(|&r| r < range_high && r > center && range_high - r <= width * ANCHOR_BAND)
        .fold(None::<f64>, |best, r| Some(best.map_or(r, |b| b.min(r))))
        .unwrap_or(range_high)
}

/// Base 0.70, adjusted by volatility stability (+/-0.15), regime clarity
/// (+/-0.10), swing proximity (+0.10) and volume quality (+/-0.05), clamped
/// to [0.40, 0.95]. Degenerate denominators contribute 0.
fn confidence_score(
    candles: &[Candle],
    levels: &MarketStructure,
    regime: &Regime,
    price: f64,
    cfg: &EngineConfig,
) -> f64 {
    let mut conf = 0.70;
    let n = candles.len();

    if n >= 24 {
        let recent = indicators::realized_volatility(&candles[n - 12..], 12, cfg.bars_per_year());
        let older =
            indicators::realized_volatility(&candles[n - 24..n - 12], 12, cfg.bars_per_year());
        if older > 0.0 {
            let term = ((1.0 - (recent - older).abs() / older) - 0.5) * 0.3;
            conf += term.clamp(-0.15, 0.15);
        }
    }

    conf += (regime.strength - 0.5) * 0.2;

    if price > 0.0 {
        let near_swing = levels
            .swing_highs
            .iter()
            .chain(levels.swing_lows.iter())
            .any(|&s| (price - s).abs() / price <= 0.02);
        if near_swing {
            conf += 0.10;
        }
    }

    if n >= 6 {
        let vols: Vec<f64> = candles[n.saturating_sub(24)..].iter().map(|c| c.volume).collect();
        let recent_vols: Vec<f64> = candles[n - 6..].iter().map(|c| c.volume).collect();
        let avg24 = StatsData::new(vols).mean().unwrap_or(0.0);
        let avg6 = StatsData::new(recent_vols).mean().unwrap_or(0.0);
        if avg24 > 0.0 {
            let ratio = avg6 / avg24;
            if ratio >= 1.2 {
                conf += 0.05;
            } else if ratio <= 0.8 {
                conf -= 0.05;
            }
        }
    }

    conf.clamp(0.40, 0.95)
}

/// Percentile rank of the current realized vol within the trailing-window
/// history across the whole candle window.
pub(crate) fn classify_volatility(candles: &[Candle], current: f64, cfg: &EngineConfig) -> VolState {
    if candles.len() <= VOL_LOOKBACK {
        return VolState::Normal;
    }
    let mut history = Vec::with_capacity(candles.len() - VOL_LOOKBACK + 1);
    for end in VOL_LOOKBACK..=candles.len() {
        history.push(indicators::realized_volatility(
            &candles[..end],
            VOL_LOOKBACK,
            cfg.bars_per_year(),
        ));
    }
    let rank = history.iter().filter(|&&v| v < current).count() as f64 / history.len() as f64;
    if rank < 0.33 {
        VolState::Low
    } else if rank > 0.67 {
        VolState::High
    } else {
        VolState::Normal
    }
}

fn invalidation_conditions(
    range_low: f64,
    range_high: f64,
    realized: f64,
    horizon_hours: u32,
    regime: &Regime,
) -> Invalidations {
    Invalidations {
        hard: vec![
            format!(
                "Price closes below ${:.2} (3% beyond the range low)",
                range_low * 0.97
            ),
            format!(
                "Price closes above ${:.2} (3% beyond the range high)",
                range_high * 1.03
            ),
            format!(
                "Realized volatility doubles past {:.1}%",
                realized * 2.0 * 100.0
            ),
            "Volume reaches 5x the 24-candle average".to_string(),
        ],
        soft: vec![
            format!(
                "More than {}h elapsed since the forecast (2x horizon)",
                horizon_hours * 2
            ),
            "A new swing high or low forms outside the range".to_string(),
            format!("Market regime shifts away from {}", regime.kind),
        ],
    }
}
