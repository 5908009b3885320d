use dotenv::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_port: u16,
    pub symbol: String,
    pub candle_window: usize,
    pub candle_interval_hours: f64,
    pub horizons: Vec<u32>,
    pub quote_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv().ok(); // loads `.env` file automatically

        let server_port = env::var("SERVER_PORT")
            .map_err(|_| "SERVER_PORT missing from env")?
            .parse::<u16>()
            .map_err(|_| "SERVER_PORT must be a valid u16")?;

        let symbol = env::var("SYMBOL").unwrap_or_else(|_| "BTCUSDT".into());

        let candle_window = env::var("CANDLE_WINDOW")
            .unwrap_or_else(|_| "168".into())
            .parse::<usize>()
            .map_err(|_| "CANDLE_WINDOW must be a positive integer")?;

        let candle_interval_hours = env::var("CANDLE_INTERVAL_HOURS")
            .unwrap_or_else(|_| "1".into())
            .parse::<f64>()
            .map_err(|_| "CANDLE_INTERVAL_HOURS must be numeric")?;
        if candle_interval_hours <= 0.0 {
            return Err("CANDLE_INTERVAL_HOURS must be positive".into());
        }

        let horizons = parse_horizons(
            &env::var("HORIZONS").unwrap_or_else(|_| "1,2,4,6,12,24".into()),
        )
        .ok_or("HORIZONS must be a comma-separated list of positive hours")?;

        let quote_timeout_secs = env::var("QUOTE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse::<u64>()
            .map_err(|_| "QUOTE_TIMEOUT_SECS must be a positive integer")?;

        Ok(Self {
            server_port,
            symbol,
            candle_window,
            candle_interval_hours,
            horizons,
            quote_timeout_secs,
        })
    }
}

/// "1,2,4" -> [1, 2, 4]; None on anything empty, zero or non-numeric.
pub fn parse_horizons(raw: &str) -> Option<Vec<u32>> {
    let hours: Vec<u32> = raw
        .split(',')
        .map(|s| s.trim().parse::<u32>().ok().filter(|&h| h > 0))
        .collect::<Option<Vec<u32>>>()?;
    if hours.is_empty() {
        None
    } else {
        Some(hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_horizons_accepts_spaced_lists() {
        assert_eq!(parse_horizons("1, 4,24"), Some(vec![1, 4, 24]));
    }

    #[test]
    fn parse_horizons_rejects_junk() {
        assert_eq!(parse_horizons(""), None);
        assert_eq!(parse_horizons("1,0,4"), None);
        assert_eq!(parse_horizons("1,abc"), None);
    }
}
