use crate::errors::StorageError;
use crate::storage::{ObjectBucket, ObjectMetadata, SourceObject};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// メモリ上のバケット（テスト・デモ用）
///
/// 構築時にオブジェクトを登録し、以降は読み取り専用。
#[derive(Debug, Default)]
pub struct MemoryBucket {
    objects: HashMap<String, SourceObject>,
    fetch_calls: AtomicU64,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// オブジェクトを登録する
    pub fn with_object(
        mut self,
        key: &str,
        body: impl Into<Bytes>,
        content_type: &str,
    ) -> Self {
        self.insert(key, body.into(), content_type, BTreeMap::new());
        self
    }

    /// カスタムメタデータ付きでオブジェクトを登録する
    pub fn insert(
        &mut self,
        key: &str,
        body: Bytes,
        content_type: &str,
        custom: BTreeMap<String, String>,
    ) {
        let metadata = ObjectMetadata {
            size: body.len() as u64,
            content_type: Some(content_type.to_string()),
            etag: Some(format!("\"{:x}-{}\"", body.len(), self.objects.len())),
            uploaded: Some(Utc::now()),
            custom,
        };
        self.objects.insert(
            key.to_string(),
            SourceObject {
                key: key.to_string(),
                body,
                metadata,
            },
        );
    }

    /// get が呼ばれた回数
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectBucket for MemoryBucket {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<SourceObject, StorageError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_bucket() {
        let bucket = MemoryBucket::new().with_object("a.jpg", &b"abc"[..], "image/jpeg");

        let object = bucket.get("a.jpg").await.unwrap();
        assert_eq!(object.body.as_ref(), b"abc");
        assert_eq!(object.metadata.size, 3);
        assert_eq!(object.content_type(), "image/jpeg");

        assert!(bucket.get("b.jpg").await.unwrap_err().is_not_found());
        assert_eq!(bucket.fetch_calls(), 2);
    }
}
