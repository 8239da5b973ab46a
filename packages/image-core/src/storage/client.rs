use crate::constants::MAX_INPUT_SIZE;
use crate::errors::StorageError;
use crate::storage::{ObjectBucket, ObjectMetadata, SourceObject};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, HeaderMap, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::fmt;

/// カスタムメタデータのヘッダー接頭辞（S3 互換 API）
const CUSTOM_METADATA_PREFIX: &str = "x-amz-meta-";

/// Cloudflare Access のサービストークン
#[derive(Clone)]
pub struct AccessCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for AccessCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Storage Proxy クライアント
///
/// HTTP でオブジェクトストアのプロキシにリクエストを送信して
/// 元画像とメタデータを取得する
#[derive(Clone)]
pub struct StorageProxyClient {
    client: Client,
    base_url: String,
    credentials: Option<AccessCredentials>,
}

impl StorageProxyClient {
    /// 新しい StorageProxyClient を作成する
    pub fn new(base_url: &str, credentials: Option<AccessCredentials>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// キーの各セグメントをパーセントエンコードする。`/` は区切りとして残す
    fn object_url(&self, key: &str) -> String {
        let path = key
            .split('/')
            .map(urlencoding::encode)
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl ObjectBucket for StorageProxyClient {
    fn backend_tag(&self) -> &'static str {
        "proxy"
    }

    /// キーを指定して Storage Proxy からオブジェクトを取得する
    async fn get(&self, key: &str) -> Result<SourceObject, StorageError> {
        let mut request = self.client.get(self.object_url(key));
        if let Some(creds) = &self.credentials {
            request = request
                .header("CF-Access-Client-Id", &creds.client_id)
                .header("CF-Access-Client-Secret", &creds.client_secret);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(StorageError::NotFound {
                    key: key.to_string(),
                });
            }
            StatusCode::FORBIDDEN => {
                tracing::error!(key = %key, "access denied by Storage Proxy");
                return Err(StorageError::Forbidden);
            }
            status => {
                tracing::error!(key = %key, status = %status, "unexpected response from Storage Proxy");
                return Err(StorageError::Internal(format!(
                    "unexpected status: {status}"
                )));
            }
        }

        // Content-Length で事前にサイズを確認
        if let Some(size) = header_str(response.headers(), CONTENT_LENGTH.as_str())
            .and_then(|v| v.parse::<u64>().ok())
            && size > MAX_INPUT_SIZE
        {
            return Err(StorageError::TooLarge {
                size,
                max: MAX_INPUT_SIZE,
            });
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        // 読み込み後にもサイズを確認
        let actual_size = body.len() as u64;
        if actual_size > MAX_INPUT_SIZE {
            return Err(StorageError::TooLarge {
                size: actual_size,
                max: MAX_INPUT_SIZE,
            });
        }

        Ok(SourceObject {
            key: key.to_string(),
            metadata: metadata_from_headers(&headers, actual_size),
            body,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// レスポンスヘッダーからメタデータを組み立てる
fn metadata_from_headers(headers: &HeaderMap, size: u64) -> ObjectMetadata {
    let uploaded = header_str(headers, LAST_MODIFIED.as_str())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let custom: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(CUSTOM_METADATA_PREFIX)?;
            Some((key.to_string(), value.to_str().ok()?.to_string()))
        })
        .collect();

    ObjectMetadata {
        size,
        content_type: header_str(headers, CONTENT_TYPE.as_str()).map(str::to_string),
        etag: header_str(headers, ETAG.as_str()).map(str::to_string),
        uploaded,
        custom,
    }
}
