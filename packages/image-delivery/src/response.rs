use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use image_core::{
    CACHE_CONTROL_FALLBACK, CACHE_CONTROL_OPTIMIZED, FALLBACK_MARKER, SourceObject,
    TransformDirective, TransformedImage, VARY_NEGOTIATED,
};

pub const X_IMAGE_OPTIMIZED: HeaderName = HeaderName::from_static("x-image-optimized");
pub const X_TRANSFORM_OPTIONS: HeaderName = HeaderName::from_static("x-transform-options");
pub const X_FALLBACK: HeaderName = HeaderName::from_static("x-fallback");

/// 変換済み画像のレスポンス
pub fn optimized_response(image: TransformedImage, directive: &TransformDirective) -> Response {
    let options = serde_json::to_string(directive).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize transform options");
        "{}".to_string()
    });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.content_type().to_string()),
            (header::CACHE_CONTROL, CACHE_CONTROL_OPTIMIZED.to_string()),
            (X_IMAGE_OPTIMIZED, "true".to_string()),
            (X_TRANSFORM_OPTIONS, options),
            (header::VARY, VARY_NEGOTIATED.to_string()),
        ],
        image.bytes,
    )
        .into_response()
}

/// 元画像をそのまま返すレスポンス
pub fn fallback_response(source: SourceObject) -> Response {
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, source.content_type().to_string()),
            (header::CACHE_CONTROL, CACHE_CONTROL_FALLBACK.to_string()),
            (X_FALLBACK, FALLBACK_MARKER.to_string()),
        ],
        source.body,
    )
        .into_response();

    let headers = response.headers_mut();
    if let Some(etag) = source.metadata.etag.as_deref()
        && let Ok(value) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, value);
    }
    if let Some(uploaded) = source.metadata.uploaded
        && let Ok(value) = HeaderValue::from_str(&http_date(uploaded))
    {
        headers.insert(header::LAST_MODIFIED, value);
    }
    response
}

/// RFC 7231 の HTTP-date
fn http_date(dt: DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
