/// HTTP handlers for image-service
///
/// This module contains handlers for:
/// - Images: originals and `?size=` thumbnails
/// - Health: liveness and readiness checks
pub mod health;
pub mod images;
pub mod response;

use actix_web::web;

use crate::error::AppError;

pub use health::{health, ready};
pub use images::{serve_image, size_param};
pub use response::{file_response, http_date};

/// Register every route; image paths live under `path_prefix`.
///
/// Health routes and metrics are registered first so they win over the catch-all
/// image route when no prefix is configured. Path extraction failures are
/// rendered through [`AppError`] like every other error.
pub fn configure_routes(cfg: &mut web::ServiceConfig, path_prefix: &str) {
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health))
    .route("/health/live", web::get().to(health))
    .route("/health/ready", web::get().to(ready))
    .route("/metrics", web::get().to(crate::metrics::serve_metrics))
    .route(
        &format!("{}/{{path:.*}}", path_prefix),
        web::get().to(serve_image),
    );
}
