pub mod client;
pub mod local;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub use client::StorageProxyClient;
pub use local::LocalDirBucket;
pub use memory::MemoryBucket;
// StorageError は errors モジュールで定義済み
pub use crate::errors::StorageError;

/// バケットに保存されたオブジェクトのメタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub uploaded: Option<DateTime<Utc>>,
    #[serde(rename = "customMetadata")]
    pub custom: BTreeMap<String, String>,
}

/// バケットから取得した元画像。リクエストの間だけ保持する
#[derive(Debug, Clone)]
pub struct SourceObject {
    pub key: String,
    pub body: Bytes,
    pub metadata: ObjectMetadata,
}

impl SourceObject {
    /// 保存時の Content-Type（不明なら application/octet-stream）
    pub fn content_type(&self) -> &str {
        self.metadata
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// 読み取り専用のオブジェクトストア
///
/// `get` は副作用を持たず、同じリクエスト内で再度呼ばれても安全であること。
/// オブジェクトが存在しない場合は `StorageError::NotFound` を返す。
#[async_trait]
pub trait ObjectBucket: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<SourceObject, StorageError>;
}
