use crate::constants::MAX_KEY_LENGTH;
use crate::errors::MediaError;

/// オブジェクトキーを検証する
/// パストラバーサル攻撃を防止し、不正な文字を検出する
pub fn validate_key(key: &str) -> Result<(), MediaError> {
    // 空文字チェック
    if key.is_empty() {
        return Err(MediaError::Validation("key is empty".to_string()));
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(MediaError::Validation(format!(
            "key is too long (max {MAX_KEY_LENGTH})"
        )));
    }

    // キーはデコード済みの文字列をそのまま検証する（`%` はキーの一部として扱う）
    // パストラバーサル防止
    if key.split('/').any(|segment| segment == "..")
        || key.starts_with('/')
        || key.contains("//")
        || key.contains('\\')
    {
        return Err(MediaError::Validation("path traversal detected".to_string()));
    }

    // 作品名にはスペースや括弧が含まれるため、制御文字のみ拒否する
    if key.chars().any(char::is_control) {
        return Err(MediaError::Validation("invalid characters in key".to_string()));
    }

    Ok(())
}
