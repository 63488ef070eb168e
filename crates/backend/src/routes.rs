use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers;
use crate::shared::config::get_config;
use crate::system;

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
}

/// Загрузки CSV: тело целиком в памяти, лимит из `[upload]`
fn upload_routes(max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/upload", post(handlers::uploads::upload_auto))
        .route("/api/upload/sales", post(handlers::uploads::upload_sales))
        .route(
            "/api/upload/customers",
            post(handlers::uploads::upload_customers),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D400 BUSINESS INTELLIGENCE
        // ========================================
        .route(
            "/api/d400/profitability",
            get(handlers::d400_business_intelligence::get_profitability),
        )
        .route(
            "/api/d400/weather",
            get(handlers::d400_business_intelligence::get_weather_impact),
        )
        .route(
            "/api/d400/campaigns/:id/roi",
            get(handlers::d400_business_intelligence::get_campaign_roi),
        )
        .route(
            "/api/d400/growth",
            get(handlers::d400_business_intelligence::get_growth_trend),
        )
        .route(
            "/api/d400/health",
            get(handlers::d400_business_intelligence::get_health_score),
        )
        .route(
            "/api/d400/operations",
            get(handlers::d400_business_intelligence::get_operations_summary),
        )
        .route(
            "/api/d400/segments",
            get(handlers::d400_business_intelligence::get_segment_summary),
        )
        // Indicators
        .route(
            "/api/indicators/compute",
            post(handlers::indicators::compute_indicators),
        )
        .route(
            "/api/indicators/meta",
            get(handlers::indicators::get_indicator_catalog),
        )
        // Customers
        .route("/api/customers", get(handlers::customers::list_profiles))
        .route(
            "/api/customers/metrics",
            get(handlers::customers::get_metrics),
        )
        // Campaigns
        .route("/api/campaigns", get(handlers::campaigns::list_all))
        .route("/api/campaigns/:id/send", post(handlers::campaigns::send))
        // Communications
        .route(
            "/api/communications",
            post(handlers::communications::create),
        )
        .route(
            "/api/communications/:phone",
            get(handlers::communications::history),
        )
        .route(
            "/api/communications/:phone/contacts",
            get(handlers::communications::contacts),
        )
        // Blacklist
        .route("/api/blacklist", get(handlers::blacklist::list_all))
        // Messaging provider webhook
        .route(
            "/api/webhook/messaging",
            post(handlers::messaging_webhook::receive),
        )
        // Logs
        .route(
            "/api/logs",
            get(handlers::logs::list_all)
                .post(handlers::logs::create)
                .delete(handlers::logs::clear_all),
        )
        .merge(upload_routes(get_config().upload.max_body_bytes()))
        .layer(middleware::from_fn(system::middleware::request_logger))
        .layer(cors())
}
