/// Image handlers - HTTP endpoint for originals and thumbnails
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;

use super::response::file_response;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::ThumbnailResolver;

/// Query parameter carrying `<width>,<height>`, either side optional
const SIZE_PARAM: &str = "size";

/// Serve an image, or its thumbnail when a non-empty `size` is given
pub async fn serve_image(
    req: HttpRequest,
    resolver: web::Data<ThumbnailResolver>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let path = path.into_inner();
    let size = size_param(req.query_string())?;

    let file = match size.as_deref() {
        Some(size) if !size.is_empty() => resolver.resolve_thumbnail(&path, size).await?,
        _ => resolver.resolve_original(&path).await?,
    };

    tracing::debug!(
        file = %file.file_name(),
        mime_type = %file.mime_type,
        size = file.size,
        "Serving file"
    );

    Ok(file_response(&file, config.cache.max_age_secs, Utc::now()))
}

/// Last `size` value in the query string; repeated keys do not fail the request.
pub fn size_param(query: &str) -> Result<Option<String>> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(query)
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .into_inner();

    Ok(pairs
        .into_iter()
        .filter(|(key, _)| key == SIZE_PARAM)
        .map(|(_, value)| value)
        .last())
}
