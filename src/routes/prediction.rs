// src/routes/prediction.rs

use actix_web::dev::HttpServiceFactory;
use actix_web::{get, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::settings::{parse_horizons, Settings};
use crate::middleware::path_logger::PathLogger;
use crate::services::candles;
use crate::services::engine::orchestrator;
use crate::services::engine::types::{MarketAssessment, RangePrediction, TradingZones};
use crate::services::engine::{EngineConfig, MarketSnapshot};
use crate::services::quotes;
use crate::utils::types::ApiResponse;

/// Everything the dashboard needs from one poll.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPayload {
    pub snapshot: MarketSnapshot,
    pub predictions: Vec<RangePrediction>,
    pub assessment: MarketAssessment,
    pub zones: TradingZones,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    /// Optional comma-separated horizon override, e.g. "1,4,24"
    pub horizons: Option<String>,
}

#[get("/prediction")]
pub async fn prediction(
    query: web::Query<PredictionQuery>,
    settings: web::Data<Settings>,
    client: web::Data<Client>,
) -> impl Responder {
    let horizons = match &query.horizons {
        Some(raw) => match parse_horizons(raw) {
            Some(h) => h,
            None => {
                return HttpResponse::BadRequest().json(ApiResponse::<()>::err(
                    "horizons must be a comma-separated list of positive hours",
                ))
            }
        },
        None => settings.horizons.clone(),
    };

    let snapshot = match quotes::fetch_snapshot(&client, &settings).await {
        Ok(s) => s,
        Err(e) => {
            log::error!("prediction: quote fetch failed: {e}");
            return HttpResponse::BadGateway()
                .json(ApiResponse::<()>::err(format!("quote fetch failed: {e}")));
        }
    };

    let window = candles::synthetic_window(
        snapshot.price,
        settings.candle_window,
        settings.candle_interval_hours,
    );
    let cfg = EngineConfig {
        interval_hours: settings.candle_interval_hours,
    };

    match orchestrator::run(&window, &snapshot, &horizons, &cfg) {
        Ok(analysis) => {
            log::info!(
                "forecast for {} @ {:.2}: {} horizons, regime {}",
                settings.symbol,
                snapshot.price,
                analysis.predictions.len(),
                analysis.assessment.regime.kind,
            );
            HttpResponse::Ok().json(ApiResponse::ok(ForecastPayload {
                snapshot,
                predictions: analysis.predictions,
                assessment: analysis.assessment,
                zones: analysis.zones,
                generated_at: Utc::now(),
            }))
        }
        Err(e) => {
            log::error!("prediction: engine rejected input: {e}");
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::err(format!("engine error: {e}")))
        }
    }
}

#[get("/price")]
pub async fn price(
    settings: web::Data<Settings>,
    client: web::Data<Client>,
) -> impl Responder {
    match quotes::fetch_snapshot(&client, &settings).await {
        Ok(snap) => HttpResponse::Ok().json(ApiResponse::ok(snap)),
        Err(e) => HttpResponse::BadGateway()
            .json(ApiResponse::<()>::err(format!("quote fetch failed: {e}"))),
    }
}

#[get("/test")]
pub async fn test_prediction_api() -> impl Responder {
    HttpResponse::Ok().body("Prediction scope is active.")
}

#[get("/routes")]
pub async fn list_routes() -> impl Responder {
    let routes = vec![
        "/health",
        "/api/prediction",
        "/api/price",
        "/api/test",
    ];

    HttpResponse::Ok().json(routes)
}

pub fn prediction_scope() -> impl HttpServiceFactory {
    web::scope("/api")
        .wrap(PathLogger)
        .service(test_prediction_api)
        .service(price)
        .service(prediction)
        .service(list_routes)
}
