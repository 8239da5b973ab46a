use crate::constants::MAX_PIXELS;
use crate::errors::TransformError;
use image::metadata::Orientation;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

/// デコード時に確保を許すメモリ上限（RGBA8 で MAX_PIXELS 相当まで）
const MAX_DECODE_ALLOC: u64 = MAX_PIXELS * 4;

/// 画像バイト列をデコードし、EXIF Orientation を適用する
///
/// 戻り値の 2 番目は推測された元画像のフォーマット。
pub fn decode_image(input: &[u8]) -> Result<(DynamicImage, Option<ImageFormat>), TransformError> {
    let mut reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to guess format: {e}")))?;

    let mut limits = Limits::default();
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    let source_format = reader.format();
    if source_format.is_none() {
        return Err(TransformError::ProcessingFailed(
            "unrecognized image format".to_string(),
        ));
    }

    let mut img = reader
        .decode()
        .map_err(|e| TransformError::ProcessingFailed(format!("decode failed: {e}")))?;

    validate_source_dimensions(img.width(), img.height())?;

    if let Some(orientation) = read_orientation(input) {
        img.apply_orientation(orientation);
    }

    Ok((img, source_format))
}

/// バイト列から EXIF Orientation タグを読み取る
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    let mut cursor = Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;

    Orientation::from_exif(u8::try_from(value).ok()?)
}

/// ソース画像の総ピクセル数を検証し、メモリ枯渇を防ぐ
fn validate_source_dimensions(width: u32, height: u32) -> Result<(), TransformError> {
    let total_pixels = width as u64 * height as u64;
    if total_pixels > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge { width, height });
    }
    Ok(())
}
