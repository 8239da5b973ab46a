use crate::constants::{DEFAULT_FIT, DEFAULT_FORMAT, DEFAULT_QUALITY};
use crate::directive::{Fit, FormatDirective, Gravity, TransformDirective};

/// 指定の出どころ。width=auto はパスのオプション文字列でのみ有効
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Path,
    Query,
}

/// 検証済みの 1 項目
#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Width(u32),
    AutoWidth,
    Height(u32),
    Quality(u8),
    Format(FormatDirective),
    Fit(Fit),
    Gravity(Gravity),
    Background(String),
    Blur(f32),
    Brightness(f32),
    Contrast(f32),
    Gamma(f32),
    Sharpen(f32),
}

#[derive(Debug, Default)]
struct DirectiveBuilder {
    width: Option<u32>,
    auto_width: bool,
    height: Option<u32>,
    quality: Option<u8>,
    format: Option<FormatDirective>,
    fit: Option<Fit>,
    gravity: Option<Gravity>,
    background: Option<String>,
    blur: Option<f32>,
    brightness: Option<f32>,
    contrast: Option<f32>,
    gamma: Option<f32>,
    sharpen: Option<f32>,
}

impl DirectiveBuilder {
    fn apply(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Width(w) => self.width = Some(w),
            Fragment::AutoWidth => self.auto_width = true,
            Fragment::Height(h) => self.height = Some(h),
            Fragment::Quality(q) => self.quality = Some(q),
            Fragment::Format(f) => self.format = Some(f),
            Fragment::Fit(f) => self.fit = Some(f),
            Fragment::Gravity(g) => self.gravity = Some(g),
            Fragment::Background(bg) => self.background = Some(bg),
            Fragment::Blur(v) => self.blur = Some(v),
            Fragment::Brightness(v) => self.brightness = Some(v),
            Fragment::Contrast(v) => self.contrast = Some(v),
            Fragment::Gamma(v) => self.gamma = Some(v),
            Fragment::Sharpen(v) => self.sharpen = Some(v),
        }
    }

    fn build(self) -> TransformDirective {
        TransformDirective {
            // 明示的な幅は常に auto より優先
            auto_width: self.auto_width && self.width.is_none(),
            width: self.width,
            height: self.height,
            quality: self.quality.unwrap_or(DEFAULT_QUALITY),
            format: self.format.unwrap_or(DEFAULT_FORMAT),
            fit: self.fit.unwrap_or(DEFAULT_FIT),
            gravity: self.gravity,
            background: self.background,
            blur: self.blur,
            brightness: self.brightness,
            contrast: self.contrast,
            gamma: self.gamma,
            sharpen: self.sharpen,
        }
    }
}

/// パスのオプション文字列とクエリパラメータから変換指定を作る
///
/// 解析は寛容で、失敗しない:
/// - 値のない項目・未知のキー・不正な値は無視する
/// - 同じキーはクエリの値がパスの値を上書きする
/// - 未指定の項目にはデフォルト（quality=85, format=auto, fit=scale-down）を適用する
pub fn parse_directive<'a, I>(options: &str, query: I) -> TransformDirective
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut builder = DirectiveBuilder::default();

    let path_pairs = options
        .split(',')
        .filter_map(|pair| pair.split_once('='));
    for (key, value) in path_pairs {
        if let Some(fragment) = parse_fragment(key, value, Source::Path) {
            builder.apply(fragment);
        }
    }

    for (key, value) in query {
        if let Some(fragment) = parse_fragment(key, value, Source::Query) {
            builder.apply(fragment);
        }
    }

    builder.build()
}

/// オプション文字列のみから変換指定を作る
pub fn parse_option_string(options: &str) -> TransformDirective {
    parse_directive(options, std::iter::empty())
}

fn parse_fragment(key: &str, value: &str, source: Source) -> Option<Fragment> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    match key.trim().to_ascii_lowercase().as_str() {
        "width" | "w" => {
            if value.eq_ignore_ascii_case("auto") {
                (source == Source::Path).then_some(Fragment::AutoWidth)
            } else {
                parse_dimension(value).map(Fragment::Width)
            }
        }
        "height" | "h" => parse_dimension(value).map(Fragment::Height),
        "quality" | "q" => value
            .parse::<u8>()
            .ok()
            .filter(|q| (1..=100).contains(q))
            .map(Fragment::Quality),
        "format" | "f" => FormatDirective::from_str(value).map(Fragment::Format),
        "fit" => Fit::from_str(value).map(Fragment::Fit),
        "gravity" | "g" => Gravity::from_str(value).map(Fragment::Gravity),
        // 色指定は常に ASCII。ヘッダーにそのまま出せない値はここで落とす
        "background" | "bg" => value
            .chars()
            .all(|c| c.is_ascii_graphic())
            .then(|| Fragment::Background(value.to_string())),
        "blur" => parse_magnitude(value).map(Fragment::Blur),
        "brightness" => parse_magnitude(value).map(Fragment::Brightness),
        "contrast" => parse_magnitude(value).map(Fragment::Contrast),
        "gamma" => parse_magnitude(value).map(Fragment::Gamma),
        "sharpen" => parse_magnitude(value).map(Fragment::Sharpen),
        _ => None,
    }
}

fn parse_dimension(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|v| *v > 0)
}

fn parse_magnitude(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}
