//! 色調・ぼかし・シャープのフィルタ
//!
//! いずれも入力画像を変更せず新しい画像を返す。
//! 強度が恒等値（blur=0, brightness=1 など）の場合は複製を返す。

use image::DynamicImage;

/// ぼかし。半径 r をガウシアンの sigma = r / 2 として扱う
pub fn blur(img: &DynamicImage, radius: f32) -> DynamicImage {
    if radius <= 0.0 {
        return img.clone();
    }
    img.blur(radius / 2.0)
}

/// 明るさ。各チャンネルに係数を掛ける（1.0 で変化なし）
pub fn brightness(img: &DynamicImage, factor: f32) -> DynamicImage {
    if factor == 1.0 {
        return img.clone();
    }
    map_color_channels(img, &build_lut(|c| c * factor))
}

/// コントラスト。中間値 128 を中心に係数倍する（1.0 で変化なし）
pub fn contrast(img: &DynamicImage, factor: f32) -> DynamicImage {
    if factor == 1.0 {
        return img.clone();
    }
    map_color_channels(img, &build_lut(|c| (c - 128.0) * factor + 128.0))
}

/// ガンマ補正。1.0 より大きいと明るくなる
pub fn gamma(img: &DynamicImage, gamma: f32) -> DynamicImage {
    if gamma == 1.0 {
        return img.clone();
    }
    let exponent = 1.0 / gamma;
    map_color_channels(img, &build_lut(|c| 255.0 * (c / 255.0).powf(exponent)))
}

/// シャープ。強度 0-10 をアンシャープマスクの sigma に換算する
pub fn sharpen(img: &DynamicImage, strength: f32) -> DynamicImage {
    if strength <= 0.0 {
        return img.clone();
    }
    img.unsharpen(0.5 + strength * 0.5, 1)
}

fn build_lut(f: impl Fn(f32) -> f32) -> [u8; 256] {
    std::array::from_fn(|i| f(i as f32).round().clamp(0.0, 255.0) as u8)
}

/// RGB チャンネルにのみ LUT を適用する（アルファは保持）
fn map_color_channels(img: &DynamicImage, lut: &[u8; 256]) -> DynamicImage {
    if img.color().has_alpha() {
        let mut buf = img.to_rgba8();
        for pixel in buf.pixels_mut() {
            for c in &mut pixel.0[..3] {
                *c = lut[*c as usize];
            }
        }
        DynamicImage::ImageRgba8(buf)
    } else {
        let mut buf = img.to_rgb8();
        for pixel in buf.pixels_mut() {
            for c in &mut pixel.0 {
                *c = lut[*c as usize];
            }
        }
        DynamicImage::ImageRgb8(buf)
    }
}
