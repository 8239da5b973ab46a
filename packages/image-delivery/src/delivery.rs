use image_core::{
    AcceptSet, ObjectBucket, SourceObject, TransformDirective, TransformedImage, negotiate_format,
    parse_directive, resolve_auto_width, validate_key,
};

use crate::transform::transform_blocking;

/// 変換リクエスト 1 件分の入力
#[derive(Debug, Clone, Default)]
pub struct DeliveryRequest {
    pub key: String,
    pub options: String,
    pub query: Vec<(String, String)>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
}

/// 配信の終端状態
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// 変換済み画像。`directive` は幅・フォーマットまで確定した指定
    Optimized {
        image: TransformedImage,
        directive: TransformDirective,
    },
    /// 変換に失敗し、元画像をそのまま返す
    Fallback(SourceObject),
    NotFound,
    /// 元画像の再取得にも失敗した
    Failed,
}

/// パスとクエリから指定を作り、width=auto を User-Agent で解決する
pub fn resolve_directive(request: &DeliveryRequest) -> TransformDirective {
    let query = request.query.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    let directive = parse_directive(&request.options, query);

    if directive.wants_auto_width() {
        directive.with_width(resolve_auto_width(request.user_agent.as_deref()))
    } else {
        directive
    }
}

/// 1 リクエストを処理して終端状態を返す
///
/// 優先順位は NotFound > Optimized > Fallback > Failed。
/// NotFound 以外の失敗はすべて元画像の再取得に回す。
pub async fn deliver(bucket: &dyn ObjectBucket, request: &DeliveryRequest) -> DeliveryOutcome {
    let key = request.key.as_str();

    if let Err(e) = validate_key(key) {
        tracing::warn!(key = %key, error = %e, "rejecting invalid key");
        return DeliveryOutcome::NotFound;
    }

    let directive = resolve_directive(request);

    let source = match bucket.get(key).await {
        Ok(source) => source,
        Err(e) if e.is_not_found() => {
            tracing::info!(key = %key, "object not found");
            return DeliveryOutcome::NotFound;
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "primary fetch failed, serving original");
            return fallback(bucket, key).await;
        }
    };

    let accept = AcceptSet::parse(request.accept.as_deref());
    let output = negotiate_format(directive.format, &accept);

    tracing::info!(
        key = %key,
        options = %directive,
        output = output.content_type(),
        "transforming image"
    );

    match transform_blocking(source.body, directive.clone(), output).await {
        Ok(image) => DeliveryOutcome::Optimized {
            directive: directive.with_output_format(output),
            image,
        },
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "transform failed, serving original");
            fallback(bucket, key).await
        }
    }
}

/// 元画像を取り直す。最初の取得結果は使い回さない
async fn fallback(bucket: &dyn ObjectBucket, key: &str) -> DeliveryOutcome {
    match bucket.get(key).await {
        Ok(source) => DeliveryOutcome::Fallback(source),
        Err(e) => {
            tracing::error!(key = %key, error = %e, "fallback fetch failed");
            DeliveryOutcome::Failed
        }
    }
}
