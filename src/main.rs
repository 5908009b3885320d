
use actix_web::{middleware::Logger, web, App, HttpServer};

use rangecast_backend::{
    config::settings::Settings,
    routes::{health::health_scope, prediction::prediction_scope},
};

fn init_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();
    println!("Starting rangecast backend…");

    let settings = Settings::new().unwrap_or_else(|e| {
        eprintln!("Failed to load settings: {e}");
        std::process::exit(1);
    });

    let port = settings.server_port;
    log::info!(
        "serving {} forecasts on port {port} (window {} x {}h)",
        settings.symbol,
        settings.candle_window,
        settings.candle_interval_hours
    );

    // one HTTP client shared across quote sources
    let client = reqwest::Client::builder()
        .user_agent("rangecast-backend/0.1")
        .build()
        .expect("reqwest client");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(client.clone()))

            //scope
            .service(health_scope())
            .service(prediction_scope())
    })
        .bind(("0.0.0.0", port))?
        .run()
        .await
}
