use crate::constants::MAX_DIMENSION;
use crate::directive::TransformDirective;
use crate::errors::TransformError;
use crate::transform::dimensions::{GeometryPlan, plan_geometry};
use crate::transform::filters;
use crate::transform::resize::resize_image;
use image::{DynamicImage, Rgba, RgbaImage, imageops};

/// pad の背景色が未指定の場合は不透明な白
const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// デコード済み画像に変換指定を適用する
///
/// 適用順は固定: リサイズ（fit）→ blur → brightness → contrast → gamma → sharpen。
/// 先に寸法を確定させ、フィルタは最終サイズの画素にだけ掛ける。
pub fn apply_pipeline(
    img: DynamicImage,
    directive: &TransformDirective,
) -> Result<DynamicImage, TransformError> {
    let mut img = match plan_geometry(
        img.width(),
        img.height(),
        directive.width,
        directive.height,
        directive.fit,
        directive.gravity,
    ) {
        Some(plan) => apply_geometry(&img, &plan, directive.background.as_deref())?,
        None => img,
    };

    if let Some(radius) = directive.blur {
        img = filters::blur(&img, radius);
    }
    if let Some(factor) = directive.brightness {
        img = filters::brightness(&img, factor);
    }
    if let Some(factor) = directive.contrast {
        img = filters::contrast(&img, factor);
    }
    if let Some(gamma) = directive.gamma {
        img = filters::gamma(&img, gamma);
    }
    if let Some(strength) = directive.sharpen {
        img = filters::sharpen(&img, strength);
    }

    Ok(img)
}

fn apply_geometry(
    img: &DynamicImage,
    plan: &GeometryPlan,
    background: Option<&str>,
) -> Result<DynamicImage, TransformError> {
    let (w, h) = plan.resize;
    // 拡大を伴う fit では元画像の縦横比次第で極端な寸法になりうる
    if w > MAX_DIMENSION || h > MAX_DIMENSION {
        return Err(TransformError::ResolutionTooLarge {
            width: w,
            height: h,
        });
    }
    let mut out = resize_image(img, w, h)?;

    if let Some(crop) = plan.crop {
        out = out.crop_imm(crop.x, crop.y, crop.width, crop.height);
    }

    if let Some(canvas) = plan.canvas {
        let fill = match background {
            Some(value) => parse_color(value).ok_or_else(|| {
                TransformError::InvalidParams(format!("unsupported background color: {value}"))
            })?,
            None => DEFAULT_BACKGROUND,
        };
        let mut padded = RgbaImage::from_pixel(canvas.width, canvas.height, fill);
        imageops::overlay(&mut padded, &out.to_rgba8(), canvas.x as i64, canvas.y as i64);
        out = DynamicImage::ImageRgba8(padded);
    }

    Ok(out)
}

/// 色指定を解釈する
///
/// `#rgb`, `#rrggbb`, `#rrggbbaa`（# は省略可）と white / black / transparent を受け付ける。
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "white" => return Some(Rgba([255, 255, 255, 255])),
        "black" => return Some(Rgba([0, 0, 0, 255])),
        "transparent" => return Some(Rgba([0, 0, 0, 0])),
        _ => {}
    }

    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Some(Rgba([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        ])),
        8 => Some(Rgba([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ])),
        _ => None,
    }
}
