use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use persistence::PersistenceGateway;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{attendance, classes, health, refresh, reports, students};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<PersistenceGateway>,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, gateway: Arc<PersistenceGateway>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        gateway,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.server.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        // Classes
        .route(
            "/api/v1/classes",
            get(classes::list_classes).post(classes::create_class),
        )
        .route(
            "/api/v1/classes/:id",
            put(classes::update_class).delete(classes::delete_class),
        )
        // Students
        .route(
            "/api/v1/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/api/v1/students/:id",
            put(students::update_student).delete(students::delete_student),
        )
        // Attendance
        .route(
            "/api/v1/attendance",
            get(attendance::get_attendance_sheet).put(attendance::set_attendance_status),
        )
        .route(
            "/api/v1/reports/attendance",
            get(reports::get_attendance_report),
        )
        .route("/api/v1/refresh", post(refresh::refresh_collections));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(api_routes)
        .merge(public_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
