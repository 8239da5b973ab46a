use crate::errors::TransformError;
use crate::transform::format::{OutputFormat, TransformedImage};
use bytes::Bytes;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use std::io::Cursor;

/// AVIF エンコード速度（1-10、大きいほど速く圧縮率は低い）
const AVIF_SPEED: u8 = 6;

/// 画像をエンコードする
pub fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<TransformedImage, TransformError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
            flatten_alpha(img)
                .to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Png => {
            img.write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| TransformError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
        }
        OutputFormat::WebP => {
            // image クレートの WebP エンコーダはロスレスのみ対応（quality は無視）
            let encoder = WebPEncoder::new_lossless(&mut buf);
            to_8bit(img)
                .write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("WebP encode failed: {e}")))?;
        }
        OutputFormat::Avif => {
            let encoder = AvifEncoder::new_with_speed_quality(&mut buf, AVIF_SPEED, quality);
            to_8bit(img)
                .write_with_encoder(encoder)
                .map_err(|e| TransformError::ProcessingFailed(format!("AVIF encode failed: {e}")))?;
        }
    }

    Ok(TransformedImage {
        bytes: Bytes::from(buf.into_inner()),
        format,
        width: img.width(),
        height: img.height(),
    })
}

/// JPEG はアルファを持てないため白背景に合成する
fn flatten_alpha(img: &DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img.clone();
    }
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas)
}

/// WebP / AVIF エンコーダは 8bit RGB(A) のみ受け付ける
fn to_8bit(img: &DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img.clone(),
        _ if img.color().has_alpha() => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg() {
        let img = DynamicImage::new_rgb8(10, 10);
        let encoded = encode_image(&img, OutputFormat::Jpeg, 80).unwrap();

        assert_eq!(encoded.content_type(), "image/jpeg");
        // JPEG マジックナンバー確認
        assert_eq!(&encoded.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_png() {
        let img = DynamicImage::new_rgba8(10, 10);
        let encoded = encode_image(&img, OutputFormat::Png, 80).unwrap();

        // PNG マジックナンバー確認
        assert_eq!(&encoded.bytes[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!((encoded.width, encoded.height), (10, 10));
    }

    #[test]
    fn test_encode_webp() {
        let img = DynamicImage::new_rgb8(10, 10);
        let encoded = encode_image(&img, OutputFormat::WebP, 80).unwrap();

        // WebP は RIFF コンテナ
        assert_eq!(&encoded.bytes[0..4], b"RIFF");
    }

    #[test]
    fn test_encode_avif() {
        let img = DynamicImage::new_rgb8(10, 10);
        let encoded = encode_image(&img, OutputFormat::Avif, 80).unwrap();

        // ISOBMFF の ftyp ボックス
        assert_eq!(&encoded.bytes[4..8], b"ftyp");
    }

    #[test]
    fn test_flatten_alpha_uses_white() {
        let img = DynamicImage::new_rgba8(2, 2);
        let flat = flatten_alpha(&img).to_rgb8();
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_to_8bit() {
        let img = DynamicImage::new_luma16(2, 2);
        assert!(matches!(to_8bit(&img), DynamicImage::ImageRgb8(_)));
    }
}
