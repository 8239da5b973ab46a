use crate::constants::{MAX_BLUR, MAX_BRIGHTNESS, MAX_CONTRAST, MAX_DIMENSION, MAX_GAMMA, MAX_SHARPEN};
use crate::directive::TransformDirective;
use crate::errors::TransformError;

/// 変換指定をパイプライン実行前に検証する
///
/// パーサは寛容なので範囲外の値もここまで届く。範囲外は TransformError とし、
/// 呼び出し側でフォールバックさせる。
pub fn validate_directive(directive: &TransformDirective) -> Result<(), TransformError> {
    // 幅の検証
    if let Some(w) = directive.width
        && w > MAX_DIMENSION
    {
        return Err(TransformError::InvalidParams(format!(
            "width must be 1-{MAX_DIMENSION}, got {w}"
        )));
    }

    // 高さの検証
    if let Some(h) = directive.height
        && h > MAX_DIMENSION
    {
        return Err(TransformError::InvalidParams(format!(
            "height must be 1-{MAX_DIMENSION}, got {h}"
        )));
    }

    check_range("blur", directive.blur, 0.0, MAX_BLUR)?;
    check_range("brightness", directive.brightness, 0.0, MAX_BRIGHTNESS)?;
    check_range("contrast", directive.contrast, 0.0, MAX_CONTRAST)?;
    check_range("gamma", directive.gamma, 0.0, MAX_GAMMA)?;
    check_range("sharpen", directive.sharpen, 0.0, MAX_SHARPEN)?;

    if directive.gamma.is_some_and(|g| g == 0.0) {
        return Err(TransformError::InvalidParams(
            "gamma must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn check_range(name: &str, value: Option<f32>, min: f32, max: f32) -> Result<(), TransformError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(TransformError::InvalidParams(format!(
            "{name} must be {min}-{max}, got {v}"
        ))),
        _ => Ok(()),
    }
}
