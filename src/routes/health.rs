use actix_web::{get, web, HttpResponse, Scope};
use serde_json::json;

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "service": "rangecast-backend" }))
}

pub fn health_scope() -> Scope {
    web::scope("")
        .service(health_check)
}
