/// Response assembly - maps a resolved file onto cache-control headers
///
/// Errors are rendered by [`AppError`](crate::error::AppError)'s
/// `ResponseError` impl; this module only handles the success path.
use actix_web::http::header;
use actix_web::HttpResponse;
use chrono::{DateTime, Duration, Utc};

use crate::models::StoredFile;

/// Upper bound for the `Expires` horizon (ten years)
const MAX_EXPIRES_SECS: u64 = 10 * 365 * 86_400;

/// RFC 1123 date, always in GMT
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// 200 response carrying `file` with public caching for `max_age_secs`
pub fn file_response(file: &StoredFile, max_age_secs: u64, now: DateTime<Utc>) -> HttpResponse {
    let horizon = Duration::seconds(max_age_secs.min(MAX_EXPIRES_SECS) as i64);
    let expires = now.checked_add_signed(horizon).unwrap_or(now);

    HttpResponse::Ok()
        .insert_header((header::LAST_MODIFIED, http_date(file.last_modified)))
        .insert_header((header::ETAG, file.etag()))
        .insert_header((header::PRAGMA, "public"))
        .insert_header((
            header::CACHE_CONTROL,
            format!("public, max-age={}", max_age_secs),
        ))
        .insert_header((header::EXPIRES, http_date(expires)))
        .insert_header((header::CONTENT_TYPE, file.mime_type.as_str()))
        .body(file.content.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::TimeZone;

    fn sample_file() -> StoredFile {
        StoredFile {
            path: "photo_200.jpg".to_string(),
            content: Bytes::from_static(b"jpegbytes"),
            mime_type: "image/jpeg".to_string(),
            size: 9,
            last_modified: Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap(),
        }
    }

    fn header_str<'a>(res: &'a HttpResponse, name: header::HeaderName) -> &'a str {
        res.headers().get(name).unwrap().to_str().unwrap()
    }

    #[test]
    fn test_http_date_format() {
        let at = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(at), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_cache_headers() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        let res = file_response(&sample_file(), 86_400, now);

        assert_eq!(res.status(), actix_web::http::StatusCode::OK);
        assert_eq!(header_str(&res, header::LAST_MODIFIED), "Tue, 05 Mar 2024 07:08:09 GMT");
        assert_eq!(header_str(&res, header::EXPIRES), "Mon, 11 Mar 2024 00:00:00 GMT");
        assert_eq!(header_str(&res, header::CACHE_CONTROL), "public, max-age=86400");
        assert_eq!(header_str(&res, header::PRAGMA), "public");
        assert_eq!(header_str(&res, header::CONTENT_TYPE), "image/jpeg");
        assert_eq!(
            header_str(&res, header::ETAG),
            format!("\"{:x}\"", md5::compute(b"photo_200.jpg"))
        );
    }
}
