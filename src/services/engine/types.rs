// src/services/engine/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle shape (hourly by default)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Candle {
    pub ts:     DateTime<Utc>,
    pub open:   f64,
    pub high:   f64,
    pub low:    f64,
    pub close:  f64,
    pub volume: f64,
}

/// Point-in-time quote, produced once per engine run by the fetch layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub source: String,
}

/// Candle-interval knob; everything else in the engine derives from it.
/// The annualization factor assumes hourly candles unless told otherwise.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub interval_hours: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { interval_hours: 1.0 }
    }
}

impl EngineConfig {
    pub fn bars_per_year(&self) -> f64 {
        365.0 * 24.0 / self.interval_hours
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeKind {
    Trend,
    Range,
    Expansion,
    Compression,
}

impl std::fmt::Display for RegimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RegimeKind::Trend => "trend",
            RegimeKind::Range => "range",
            RegimeKind::Expansion => "expansion",
            RegimeKind::Compression => "compression",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Regime {
    #[serde(rename = "type")]
    pub kind: RegimeKind,
    pub strength: f64,
    pub direction: Direction,
    pub adx: f64,
    pub bb_width: f64,
}

/// Session extremes, capped swing lists and VWAP bands, all derived from
/// the last 24 candles (swings from the full window).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStructure {
    pub session_high: f64,
    pub session_low: f64,
    pub swing_highs: Vec<f64>,
    pub swing_lows: Vec<f64>,
    pub vwap: f64,
    pub vwap_upper_1: f64,
    pub vwap_upper_2: f64,
    pub vwap_lower_1: f64,
    pub vwap_lower_2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolState {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MomentumBias {
    #[serde(rename = "slight bullish")]
    SlightBullish,
    #[serde(rename = "slight bearish")]
    SlightBearish,
    #[serde(rename = "neutral")]
    Neutral,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
    pub center: f64,
    pub width: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityInfo {
    pub state: VolState,
    pub realized: f64,
    pub projected: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumInfo {
    pub value: f64,
    pub bias: MomentumBias,
}

/// Advisory only; downstream consumers decide when a live condition counts
/// as triggered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invalidations {
    pub hard: Vec<String>,
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangePrediction {
    pub horizon_hours: u32,
    pub range: PriceRange,
    /// Percentage in [40, 95]
    pub confidence: f64,
    pub volatility: VolatilityInfo,
    pub regime: Regime,
    pub momentum: MomentumInfo,
    pub invalidations: Invalidations,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub low: f64,
    pub high: f64,
}

/// Five contiguous sub-bands of one prediction's range (15/20/30/20/15%).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingZones {
    pub strong_buy_zone: Zone,
    pub buy_zone: Zone,
    pub neutral_zone: Zone,
    pub sell_zone: Zone,
    pub strong_sell_zone: Zone,
    pub current_zone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VwapPosition {
    Above,
    Below,
    At,
}

/// Window-level read, computed independently of any single horizon.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAssessment {
    pub regime: Regime,
    pub realized_vol: f64,
    pub vol_state: VolState,
    pub momentum: f64,
    pub momentum_tone: Tone,
    pub rsi: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub vwap: f64,
    pub price_vs_vwap: VwapPosition,
}

/// One engine run: one prediction per horizon plus the derived aggregates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub predictions: Vec<RangePrediction>,
    pub assessment: MarketAssessment,
    pub zones: TradingZones,
}

/// Round to 2 decimals; applied to monetary figures at the boundary only.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Round to 1 decimal; used for percentage-style outputs.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
