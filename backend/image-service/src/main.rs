/// Image Service - HTTP Server
///
/// Serves original images and generate-once thumbnails with cache-control headers.
use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use image_service::handlers;
use image_service::middleware::MetricsMiddleware;
use image_service::services::thumbnail::ThumbnailConfig;
use image_service::services::{build_sink, ThumbnailProcessor, ThumbnailResolver};
use image_service::storage::LocalFileStore;
use image_service::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,image_service=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_address = config.bind_address();

    tracing::info!(
        source_root = %config.storage.source_root.display(),
        thumbs_root = %config.storage.thumbs_root.display(),
        path_prefix = %config.app.path_prefix,
        "Starting image-service"
    );

    std::fs::create_dir_all(&config.storage.thumbs_root).with_context(|| {
        format!(
            "Failed to create thumbnail directory: {}",
            config.storage.thumbs_root.display()
        )
    })?;

    let processor = Arc::new(ThumbnailProcessor::new(ThumbnailConfig {
        jpeg_quality: config.thumbnail.jpeg_quality,
        max_dimension: config.thumbnail.max_dimension,
    }));

    let resolver = web::Data::new(ThumbnailResolver::new(
        Arc::new(LocalFileStore::new(&config.storage.source_root)),
        Arc::new(LocalFileStore::new(&config.storage.thumbs_root)),
        processor,
        build_sink(config.diagnostics.log_path.clone()),
    ));

    let path_prefix = config.app.path_prefix.clone();
    let app_config = web::Data::new(config);

    tracing::info!("HTTP server listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_config.clone())
            .app_data(resolver.clone())
            .wrap(MetricsMiddleware)
            .wrap(actix_middleware::Logger::default())
            .configure(|cfg| handlers::configure_routes(cfg, &path_prefix))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("Image-service shutting down");
    Ok(())
}
