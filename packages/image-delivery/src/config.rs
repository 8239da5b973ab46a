use std::path::PathBuf;
use std::sync::Arc;

use image_core::{AccessCredentials, LocalDirBucket, ObjectBucket, StorageProxyClient};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("unsupported BUCKET_BACKEND: {0} (expected proxy or local)")]
    UnknownBackend(String),

    #[error("CF_ACCESS_CLIENT_ID and CF_ACCESS_CLIENT_SECRET must be set together")]
    PartialCredentials,
}

/// 元画像の取得先
#[derive(Debug)]
pub enum BucketBackend {
    Proxy {
        base_url: String,
        credentials: Option<AccessCredentials>,
    },
    Local {
        root: PathBuf,
    },
}

/// 起動時に一度だけ読む設定
#[derive(Debug)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub backend: BucketBackend,
    pub public_base_url: String,
}

impl GatewayConfig {
    /// 環境変数から設定を読み込む
    ///
    /// - BIND_ADDR（デフォルト 0.0.0.0:8080）
    /// - BUCKET_BACKEND: proxy（デフォルト）| local
    /// - STORAGE_PROXY_URL（proxy のとき必須）
    /// - CF_ACCESS_CLIENT_ID / CF_ACCESS_CLIENT_SECRET（任意、両方セットで指定）
    /// - LOCAL_BUCKET_ROOT（local のとき必須）
    /// - PUBLIC_BASE_URL（/info の URL の接頭辞、デフォルトは空）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空文字は未設定扱い
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match get("BUCKET_BACKEND").as_deref().map(str::trim) {
            None | Some("proxy") => {
                let base_url =
                    get("STORAGE_PROXY_URL").ok_or(ConfigError::Missing("STORAGE_PROXY_URL"))?;
                let credentials =
                    match (get("CF_ACCESS_CLIENT_ID"), get("CF_ACCESS_CLIENT_SECRET")) {
                        (Some(client_id), Some(client_secret)) => Some(AccessCredentials {
                            client_id,
                            client_secret,
                        }),
                        (None, None) => None,
                        _ => return Err(ConfigError::PartialCredentials),
                    };
                BucketBackend::Proxy {
                    base_url,
                    credentials,
                }
            }
            Some("local") => BucketBackend::Local {
                root: get("LOCAL_BUCKET_ROOT")
                    .map(PathBuf::from)
                    .ok_or(ConfigError::Missing("LOCAL_BUCKET_ROOT"))?,
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            backend,
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or_default(),
        })
    }

    /// 設定に応じたバケットを作る
    pub fn build_bucket(&self) -> Arc<dyn ObjectBucket> {
        match &self.backend {
            BucketBackend::Proxy {
                base_url,
                credentials,
            } => Arc::new(StorageProxyClient::new(base_url, credentials.clone())),
            BucketBackend::Local { root } => Arc::new(LocalDirBucket::new(root.clone())),
        }
    }
}

/// bool 値の環境変数。解釈できない値はデフォルトに倒す
pub fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_proxy_defaults() {
        let config =
            GatewayConfig::from_lookup(lookup(&[("STORAGE_PROXY_URL", "https://proxy.example")]))
                .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.public_base_url, "");
        match &config.backend {
            BucketBackend::Proxy {
                base_url,
                credentials,
            } => {
                assert_eq!(base_url, "https://proxy.example");
                assert!(credentials.is_none());
            }
            other => panic!("unexpected backend: {other:?}"),
        }
        assert_eq!(config.build_bucket().backend_tag(), "proxy");
    }

    #[test]
    fn test_proxy_with_credentials() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("STORAGE_PROXY_URL", "https://proxy.example"),
            ("CF_ACCESS_CLIENT_ID", "id"),
            ("CF_ACCESS_CLIENT_SECRET", "secret"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("PUBLIC_BASE_URL", "https://img.example"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.public_base_url, "https://img.example");
        let BucketBackend::Proxy { credentials, .. } = config.backend else {
            panic!("expected proxy backend");
        };
        let credentials = credentials.unwrap();
        assert_eq!(credentials.client_id, "id");
        assert_eq!(credentials.client_secret, "secret");
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let result = GatewayConfig::from_lookup(lookup(&[
            ("STORAGE_PROXY_URL", "https://proxy.example"),
            ("CF_ACCESS_CLIENT_ID", "id"),
        ]));
        assert!(matches!(result, Err(ConfigError::PartialCredentials)));
    }

    #[test]
    fn test_missing_proxy_url() {
        let result = GatewayConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::Missing("STORAGE_PROXY_URL"))));
    }

    #[test]
    fn test_local_backend() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("BUCKET_BACKEND", "local"),
            ("LOCAL_BUCKET_ROOT", "/srv/artwork"),
        ]))
        .unwrap();

        assert!(matches!(
            &config.backend,
            BucketBackend::Local { root } if root == &PathBuf::from("/srv/artwork")
        ));
        assert_eq!(config.build_bucket().backend_tag(), "local");

        let result = GatewayConfig::from_lookup(lookup(&[("BUCKET_BACKEND", "local")]));
        assert!(matches!(result, Err(ConfigError::Missing("LOCAL_BUCKET_ROOT"))));
    }

    #[test]
    fn test_unknown_backend() {
        let result = GatewayConfig::from_lookup(lookup(&[("BUCKET_BACKEND", "s3")]));
        assert!(matches!(result, Err(ConfigError::UnknownBackend(b)) if b == "s3"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
