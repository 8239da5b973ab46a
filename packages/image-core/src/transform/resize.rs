use crate::constants::MAX_PIXELS;
use crate::errors::TransformError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, RgbImage, RgbaImage};

/// 画像をリサイズする
///
/// fast_image_resize を使用して高品質なリサイズを行う
/// Lanczos3 フィルタを使用。アルファチャンネルがあれば保持する
pub fn resize_image(
    img: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage, TransformError> {
    // ピクセル数チェック
    let total_pixels = target_w as u64 * target_h as u64;
    if total_pixels > MAX_PIXELS {
        return Err(TransformError::ResolutionTooLarge {
            width: target_w,
            height: target_h,
        });
    }

    if img.width() == target_w && img.height() == target_h {
        return Ok(img.clone());
    }

    let has_alpha = img.color().has_alpha();
    let (raw, pixel_type) = if has_alpha {
        (img.to_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (img.to_rgb8().into_raw(), PixelType::U8x3)
    };

    let src_image = Image::from_vec_u8(img.width(), img.height(), raw, pixel_type)
        .map_err(|e| TransformError::ProcessingFailed(format!("failed to create source image: {e}")))?;

    let mut dst_image = Image::new(target_w, target_h, pixel_type);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )
        .map_err(|e| TransformError::ProcessingFailed(format!("resize failed: {e}")))?;

    let buffer = dst_image.into_vec();
    let resized = if has_alpha {
        RgbaImage::from_raw(target_w, target_h, buffer).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(target_w, target_h, buffer).map(DynamicImage::ImageRgb8)
    };

    resized.ok_or_else(|| {
        TransformError::ProcessingFailed("failed to convert resized image".to_string())
    })
}
