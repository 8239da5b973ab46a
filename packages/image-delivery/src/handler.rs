use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::delivery::{DeliveryOutcome, DeliveryRequest, deliver};
use crate::response::{fallback_response, optimized_response};
use crate::{AppState, SERVICE_NAME};
use image_core::{
    DESKTOP_WIDTH, MOBILE_WIDTH, ObjectMetadata, StorageError, TABLET_WIDTH, validate_key,
};

const TRANSFORM_PREFIX: &str = "/cdn-cgi/image/";

/// /health で公開する機能一覧
const CAPABILITIES: [&str; 8] = [
    "resize",
    "fit",
    "blur",
    "brightness",
    "contrast",
    "gamma",
    "sharpen",
    "format-negotiation",
];

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "backend": state.bucket.backend_tag(),
        "capabilities": CAPABILITIES,
    }))
}

/// `/cdn-cgi/image/{options}/{*key}`
///
/// パスが UTF-8 としてデコードできない場合も 400 にはしない。
/// オプションは損失ありでデコードして解析し、キーがデコードできなければ 404 とする。
pub async fn transform(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    Query(query): Query<Vec<(String, String)>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let (options, key) = match path {
        Ok(Path(segments)) => segments,
        Err(rejection) => {
            tracing::debug!(path = %uri.path(), error = %rejection, "decoding transform path leniently");
            let (options, key) = split_transform_path(uri.path());
            let key = key.ok_or_else(|| {
                AppError::NotFound(format!("undecodable key in {}", uri.path()))
            })?;
            (options, key)
        }
    };

    let request = DeliveryRequest {
        key,
        options,
        query,
        accept: header_string(&headers, header::ACCEPT),
        user_agent: header_string(&headers, header::USER_AGENT),
    };

    match deliver(state.bucket.as_ref(), &request).await {
        DeliveryOutcome::Optimized { image, directive } => {
            Ok(optimized_response(image, &directive))
        }
        DeliveryOutcome::Fallback(source) => Ok(fallback_response(source)),
        DeliveryOutcome::NotFound => Err(AppError::NotFound("object not found".to_string())),
        DeliveryOutcome::Failed => Err(AppError::Internal(format!(
            "no image could be served for {}",
            request.key
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct OptimizedUrls {
    pub small: String,
    pub medium: String,
    pub large: String,
    pub webp: String,
    pub avif: String,
}

impl OptimizedUrls {
    fn new(base_url: &str, key: &str) -> Self {
        let url = |options: &str| format!("{base_url}/cdn-cgi/image/{options}/{key}");
        Self {
            small: url(&format!("width={MOBILE_WIDTH}")),
            medium: url(&format!("width={TABLET_WIDTH}")),
            large: url(&format!("width={DESKTOP_WIDTH}")),
            webp: url("format=webp"),
            avif: url("format=avif"),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub key: String,
    #[serde(flatten)]
    pub metadata: ObjectMetadata,
    pub optimized_urls: OptimizedUrls,
}

/// `/info/{*key}` 元画像のメタデータと変換済み URL の例
pub async fn info(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    uri: Uri,
) -> Result<Json<InfoResponse>, AppError> {
    let key = match path {
        Ok(Path(key)) => key,
        Err(rejection) => {
            tracing::debug!(path = %uri.path(), error = %rejection, "undecodable info key");
            return Err(AppError::NotFound(format!("undecodable key in {}", uri.path())));
        }
    };
    validate_key(&key).map_err(|_| AppError::NotFound(format!("invalid key: {key}")))?;

    let source = state.bucket.get(&key).await?;

    Ok(Json(InfoResponse {
        optimized_urls: OptimizedUrls::new(&state.public_base_url, &key),
        metadata: source.metadata,
        key,
    }))
}

/// `/cdn-cgi/image/{options}/{*key}` を生のパスから分解してデコードする
///
/// オプションは不正なバイト列を U+FFFD に置き換える。
/// キーは UTF-8 として正しくデコードできた場合のみ返す。
fn split_transform_path(path: &str) -> (String, Option<String>) {
    let rest = path.strip_prefix(TRANSFORM_PREFIX).unwrap_or(path);
    let (raw_options, raw_key) = rest.split_once('/').unwrap_or((rest, ""));

    let options = String::from_utf8_lossy(&urlencoding::decode_binary(raw_options.as_bytes()))
        .into_owned();
    let key = String::from_utf8(urlencoding::decode_binary(raw_key.as_bytes()).into_owned()).ok();

    (options, key)
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { key } => {
                AppError::NotFound(format!("object not found: {key}"))
            }
            StorageError::Forbidden => {
                AppError::Internal("access denied by Storage Proxy (check CF Access credentials)".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => {
                tracing::warn!(error = %msg, "not found");
                (StatusCode::NOT_FOUND, "object not found".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
