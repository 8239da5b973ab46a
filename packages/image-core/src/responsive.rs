use crate::constants::{DESKTOP_WIDTH, MOBILE_WIDTH, TABLET_WIDTH};

/// User-Agent から推定したデバイス種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    /// width=auto 時に使う幅
    pub fn width(self) -> u32 {
        match self {
            Self::Mobile => MOBILE_WIDTH,
            Self::Tablet => TABLET_WIDTH,
            Self::Desktop => DESKTOP_WIDTH,
        }
    }
}

// 小文字で比較する
const MOBILE_PATTERNS: &[&str] = &[
    "mobile",
    "android",
    "iphone",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
    "webos",
];

const TABLET_PATTERNS: &[&str] = &["ipad", "tablet", "kindle", "silk", "playbook"];

/// User-Agent をデバイス種別に分類する
///
/// モバイルとタブレットの両方に一致した場合はタブレットとする。
pub fn classify_user_agent(user_agent: Option<&str>) -> DeviceClass {
    let Some(ua) = user_agent else {
        return DeviceClass::Desktop;
    };
    let ua = ua.to_ascii_lowercase();

    let is_mobile = MOBILE_PATTERNS.iter().any(|p| ua.contains(p));
    let is_tablet = TABLET_PATTERNS.iter().any(|p| ua.contains(p));

    if is_mobile && !is_tablet {
        DeviceClass::Mobile
    } else if is_tablet {
        DeviceClass::Tablet
    } else {
        DeviceClass::Desktop
    }
}

/// width=auto を User-Agent に基づいて具体的な幅に解決する
///
/// 明示的な幅がある場合は呼び出さないこと。
pub fn resolve_auto_width(user_agent: Option<&str>) -> u32 {
    classify_user_agent(user_agent).width()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
    const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
    const ANDROID_PHONE_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";
    const ANDROID_TABLET_UA: &str = "Mozilla/5.0 (Linux; Android 13; SM-X700 Tablet) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    #[test]
    fn test_classify_user_agent() {
        assert_eq!(classify_user_agent(Some(IPHONE_UA)), DeviceClass::Mobile);
        assert_eq!(classify_user_agent(Some(ANDROID_PHONE_UA)), DeviceClass::Mobile);
        assert_eq!(classify_user_agent(Some(IPAD_UA)), DeviceClass::Tablet);
        assert_eq!(classify_user_agent(Some(DESKTOP_UA)), DeviceClass::Desktop);
        assert_eq!(classify_user_agent(None), DeviceClass::Desktop);
    }

    #[test]
    fn test_tablet_wins_when_both_match() {
        // Android（モバイル）と Tablet の両方に一致
        assert_eq!(classify_user_agent(Some(ANDROID_TABLET_UA)), DeviceClass::Tablet);
    }

    #[test]
    fn test_resolve_auto_width() {
        assert_eq!(resolve_auto_width(Some("iPhone")), 320);
        assert_eq!(resolve_auto_width(Some("iPad")), 768);
        assert_eq!(resolve_auto_width(Some("curl/8.4.0")), 1200);
        assert_eq!(resolve_auto_width(None), 1200);
    }
}
