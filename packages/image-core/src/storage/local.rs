use crate::errors::StorageError;
use crate::storage::{ObjectBucket, ObjectMetadata, SourceObject};
use crate::validation::validate_key;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// カスタムメタデータを置くサイドカーファイルの拡張子
const SIDECAR_SUFFIX: &str = ".meta.json";

/// ローカルディレクトリをバケットとして扱う（開発用）
///
/// `<key>.meta.json` があれば文字列の key/value をカスタムメタデータとして読む。
#[derive(Debug, Clone)]
pub struct LocalDirBucket {
    root: PathBuf,
}

impl LocalDirBucket {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectBucket for LocalDirBucket {
    fn backend_tag(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &str) -> Result<SourceObject, StorageError> {
        let not_found = || StorageError::NotFound {
            key: key.to_string(),
        };

        // ルート外を参照するキーは存在しないものとして扱う
        validate_key(key).map_err(|_| not_found())?;
        let path = self.object_path(key);

        let file_meta = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(StorageError::Internal(e.to_string())),
        };

        let body = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let uploaded: Option<DateTime<Utc>> = file_meta.modified().ok().map(DateTime::from);
        let size = body.len() as u64;

        Ok(SourceObject {
            key: key.to_string(),
            metadata: ObjectMetadata {
                size,
                content_type: guess_content_type(&path),
                etag: uploaded.map(|dt| format!("\"{:x}-{:x}\"", size, dt.timestamp())),
                uploaded,
                custom: read_sidecar(&path).await,
            },
            body: Bytes::from(body),
        })
    }
}

fn guess_content_type(path: &Path) -> Option<String> {
    ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

async fn read_sidecar(path: &Path) -> BTreeMap<String, String> {
    let mut sidecar = path.as_os_str().to_owned();
    sidecar.push(SIDECAR_SUFFIX);

    let Ok(raw) = tokio::fs::read(PathBuf::from(sidecar)).await else {
        return BTreeMap::new();
    };
    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring malformed metadata sidecar");
        BTreeMap::new()
    })
}
