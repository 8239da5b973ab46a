pub mod parse;

use std::fmt;

use serde::Serialize;

use crate::transform::OutputFormat;

pub use parse::{parse_directive, parse_option_string};

/// リクエストされた出力フォーマット（auto はネゴシエーション対象）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatDirective {
    Auto,
    Webp,
    Avif,
    Jpeg,
    Png,
}

impl FormatDirective {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            other => OutputFormat::from_str(other).map(Self::from),
        }
    }

    /// 明示的なフォーマットなら OutputFormat を返す
    pub fn explicit(self) -> Option<OutputFormat> {
        match self {
            Self::Auto => None,
            Self::Webp => Some(OutputFormat::WebP),
            Self::Avif => Some(OutputFormat::Avif),
            Self::Jpeg => Some(OutputFormat::Jpeg),
            Self::Png => Some(OutputFormat::Png),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

impl From<OutputFormat> for FormatDirective {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Jpeg => Self::Jpeg,
            OutputFormat::Png => Self::Png,
            OutputFormat::WebP => Self::Webp,
            OutputFormat::Avif => Self::Avif,
        }
    }
}

/// 出力寸法と元画像のアスペクト比の調整方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fit {
    ScaleDown,
    Contain,
    Cover,
    Crop,
    Pad,
}

impl Fit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "scale-down" => Some(Self::ScaleDown),
            "contain" => Some(Self::Contain),
            "cover" => Some(Self::Cover),
            "crop" => Some(Self::Crop),
            "pad" => Some(Self::Pad),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScaleDown => "scale-down",
            Self::Contain => "contain",
            Self::Cover => "cover",
            Self::Crop => "crop",
            Self::Pad => "pad",
        }
    }
}

/// クロップ・パディング時の基準位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    Auto,
    Side,
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl Gravity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "side" => Some(Self::Side),
            "center" => Some(Self::Center),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Side => "side",
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// 1 リクエスト分の変換指定（デフォルト適用済み）
///
/// `parse_directive` でのみ構築され、構築後は変更されない。
/// X-Transform-Options ヘッダーにはこの JSON 表現を出力する。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformDirective {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub quality: u8,
    pub format: FormatDirective,
    pub fit: Fit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<Gravity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpen: Option<f32>,
    #[serde(skip)]
    pub(crate) auto_width: bool,
}

impl TransformDirective {
    /// パスに width=auto があり、明示的な幅がない場合 true
    pub fn wants_auto_width(&self) -> bool {
        self.auto_width && self.width.is_none()
    }

    /// 幅を確定させた新しい指定を返す
    pub fn with_width(&self, width: u32) -> Self {
        Self {
            width: Some(width),
            auto_width: false,
            ..self.clone()
        }
    }

    /// ネゴシエーション後のフォーマットを反映した新しい指定を返す
    pub fn with_output_format(&self, format: OutputFormat) -> Self {
        Self {
            format: format.into(),
            ..self.clone()
        }
    }
}

/// パスのオプション文字列形式で出力する（`width=320,quality=85,...`）
impl fmt::Display for TransformDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        match self.width {
            Some(w) => parts.push(format!("width={w}")),
            None if self.auto_width => parts.push("width=auto".to_string()),
            None => {}
        }
        if let Some(h) = self.height {
            parts.push(format!("height={h}"));
        }
        parts.push(format!("quality={}", self.quality));
        parts.push(format!("format={}", self.format.as_str()));
        parts.push(format!("fit={}", self.fit.as_str()));
        if let Some(g) = self.gravity {
            parts.push(format!("gravity={}", g.as_str()));
        }
        if let Some(bg) = &self.background {
            parts.push(format!("background={bg}"));
        }

        let filters = [
            ("blur", self.blur),
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("gamma", self.gamma),
            ("sharpen", self.sharpen),
        ];
        for (name, value) in filters {
            if let Some(v) = value {
                parts.push(format!("{name}={v}"));
            }
        }

        f.write_str(&parts.join(","))
    }
}
