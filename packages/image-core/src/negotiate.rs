use crate::directive::FormatDirective;
use crate::transform::OutputFormat;

/// format=auto 時の優先順位（圧縮効率の高い順）
pub const AUTO_FORMAT_PREFERENCE: [OutputFormat; 3] =
    [OutputFormat::Avif, OutputFormat::WebP, OutputFormat::Jpeg];

/// Accept に関係なく常に選択可能なフォーマット
pub const BASELINE_FORMAT: OutputFormat = OutputFormat::Jpeg;

/// Accept ヘッダーで明示されたメディアタイプの集合
///
/// ワイルドカード（`*/*`, `image/*`）は次世代フォーマットの対応を意味しないため数えない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptSet {
    media_types: Vec<String>,
}

impl AcceptSet {
    pub fn parse(header: Option<&str>) -> Self {
        let media_types = header
            .unwrap_or_default()
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let media_type = parts.next()?.trim().to_ascii_lowercase();
                if media_type.is_empty() || media_type.contains('*') {
                    return None;
                }
                // q=0 は「受け付けない」
                let rejected = parts.any(|param| {
                    param
                        .trim()
                        .strip_prefix("q=")
                        .and_then(|q| q.trim().parse::<f32>().ok())
                        .is_some_and(|q| q <= 0.0)
                });
                (!rejected).then_some(media_type)
            })
            .collect();

        Self { media_types }
    }

    pub fn accepts(&self, media_type: &str) -> bool {
        self.media_types.iter().any(|m| m == media_type)
    }
}

/// 出力フォーマットを決定する
///
/// 明示的なフォーマットはそのまま使う。auto の場合は
/// `AUTO_FORMAT_PREFERENCE` の順に Accept で受け付けられるものを選ぶ。
pub fn negotiate_format(requested: FormatDirective, accept: &AcceptSet) -> OutputFormat {
    if let Some(format) = requested.explicit() {
        return format;
    }

    AUTO_FORMAT_PREFERENCE
        .iter()
        .copied()
        .find(|format| *format == BASELINE_FORMAT || accept.accepts(format.content_type()))
        .unwrap_or(BASELINE_FORMAT)
}
