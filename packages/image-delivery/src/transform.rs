use bytes::Bytes;

use image_core::{
    OutputFormat, TransformDirective, TransformError, TransformedImage, apply_pipeline,
    decode_image, encode_image, validate_directive,
};

/// 変換指定に従って画像バイト列を変換する。
///
/// メタデータ (EXIF/XMP) はデコード・エンコードサイクルで削除される。
/// 出力フォーマットはネゴシエーション済みのものを受け取る。
pub fn transform(
    input: &[u8],
    directive: &TransformDirective,
    output: OutputFormat,
) -> Result<TransformedImage, TransformError> {
    validate_directive(directive)?;

    let (img, source_format) = decode_image(input)?;
    tracing::debug!(
        source_format = ?source_format,
        width = img.width(),
        height = img.height(),
        "decoded source image"
    );

    let img = apply_pipeline(img, directive)?;
    encode_image(&img, output, directive.quality)
}

/// `transform` をブロッキングスレッドで実行する
pub async fn transform_blocking(
    input: Bytes,
    directive: TransformDirective,
    output: OutputFormat,
) -> Result<TransformedImage, TransformError> {
    tokio::task::spawn_blocking(move || transform(&input, &directive, output))
        .await
        .map_err(|e| TransformError::ProcessingFailed(format!("transform task failed: {e}")))?
}
