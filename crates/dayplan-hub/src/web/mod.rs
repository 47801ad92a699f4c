pub mod routes;

use std::sync::Arc;

use axum::Router;
use chrono_tz::Tz;
use tower_http::cors::CorsLayer;

use crate::calendar::CalendarService;
use crate::notifications::mailer::Mailer;
use crate::store::TaskStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub calendar: Arc<CalendarService>,
    pub mailer: Arc<Mailer>,
    pub timezone: Tz,
    pub cors_origins: Vec<String>,
}

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    use tower_http::cors::AllowOrigin;

    let cors_origins = &state.cors_origins;
    let allow_origin = if cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<axum::http::HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_origin(allow_origin);

    let api_routes = routes::api_router().layer(cors);

    Router::new().nest("/api", api_routes).with_state(state)
}
