use crate::directive::{Fit, FormatDirective};

/// 出力画像の最大寸法（幅・高さ）
pub const MAX_DIMENSION: u32 = 4096;

/// 画像の最大ピクセル数（1GP = 実質無制限、極端な攻撃のみ防止）
pub const MAX_PIXELS: u64 = 1_000_000_000;

/// 取得する元画像の最大バイト数（64MB）
pub const MAX_INPUT_SIZE: u64 = 64 * 1024 * 1024;

/// オブジェクトキーの最大長
pub const MAX_KEY_LENGTH: usize = 1024;

/// デフォルト品質（1-100）
pub const DEFAULT_QUALITY: u8 = 85;

/// デフォルト出力フォーマット
pub const DEFAULT_FORMAT: FormatDirective = FormatDirective::Auto;

/// デフォルトの fit
pub const DEFAULT_FIT: Fit = Fit::ScaleDown;

/// width=auto 時のデバイス別の幅
pub const MOBILE_WIDTH: u32 = 320;
pub const TABLET_WIDTH: u32 = 768;
pub const DESKTOP_WIDTH: u32 = 1200;

/// フィルタ強度の上限
pub const MAX_BLUR: f32 = 250.0;
pub const MAX_BRIGHTNESS: f32 = 10.0;
pub const MAX_CONTRAST: f32 = 10.0;
pub const MAX_GAMMA: f32 = 10.0;
pub const MAX_SHARPEN: f32 = 10.0;

/// 変換成功時: ブラウザ 1 日、エッジ 1 年
pub const CACHE_CONTROL_OPTIMIZED: &str = "public, max-age=86400, s-maxage=31536000";

/// フォールバック時: 1 時間
pub const CACHE_CONTROL_FALLBACK: &str = "public, max-age=3600";

/// 出力選択に影響するリクエストヘッダー
pub const VARY_NEGOTIATED: &str = "Accept, User-Agent";

/// X-Fallback ヘッダーの値
pub const FALLBACK_MARKER: &str = "original-r2";
