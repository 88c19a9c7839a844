//! High score persistence.
//!
//! Only one value survives a page reload: the best completed round. It is
//! stored as a plain decimal string so older builds can still read it.
//! Anything that does not start with a digit is treated as "no score yet".

/// localStorage のキー。
pub const HIGH_SCORE_KEY: &str = "tapTapHighScore";

/// Durable single-value storage for the high score.
pub trait ScoreStorage {
    fn read(&self) -> Option<String>;
    fn write(&mut self, value: &str);
}

/// Parse a stored high score the lenient way: leading whitespace is skipped,
/// then the leading run of digits is used. Anything else yields 0.
pub fn parse_high_score(raw: &str) -> u64 {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

pub fn load_high_score(storage: &dyn ScoreStorage) -> u64 {
    storage.read().map(|raw| parse_high_score(&raw)).unwrap_or(0)
}

pub fn save_high_score(storage: &mut dyn ScoreStorage, score: u64) {
    storage.write(&score.to_string());
}

/// Process-local storage. Used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    value: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
        }
    }
}

impl ScoreStorage for MemoryStorage {
    fn read(&self) -> Option<String> {
        self.value.clone()
    }

    fn write(&mut self, value: &str) {
        self.value = Some(value.to_string());
    }
}

/// Browser localStorage. 失敗時はサイレントに無視（コンソールにログ出力）。
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
impl ScoreStorage for LocalStorage {
    fn read(&self) -> Option<String> {
        get_storage()?.get_item(HIGH_SCORE_KEY).ok()?
    }

    fn write(&mut self, value: &str) {
        let Some(storage) = get_storage() else {
            web_sys::console::warn_1(&"Gaia Tappy: localStorage が使えません".into());
            return;
        };
        if let Err(e) = storage.set_item(HIGH_SCORE_KEY, value) {
            web_sys::console::warn_1(
                &format!("Gaia Tappy: ハイスコアの保存に失敗: {e:?}").into(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_loads_as_zero() {
        let storage = MemoryStorage::new();
        assert_eq!(load_high_score(&storage), 0);
    }

    #[test]
    fn stored_value_loads() {
        let storage = MemoryStorage::with_value("42");
        assert_eq!(load_high_score(&storage), 42);
    }

    #[test]
    fn malformed_value_loads_as_zero() {
        for raw in ["", "abc", "-5", "NaN", "99999999999999999999999"] {
            assert_eq!(parse_high_score(raw), 0, "raw={raw:?}");
        }
    }

    #[test]
    fn leading_digits_are_used() {
        assert_eq!(parse_high_score("  17 points"), 17);
        assert_eq!(parse_high_score("30.9"), 30);
    }

    #[test]
    fn save_then_load() {
        let mut storage = MemoryStorage::new();
        save_high_score(&mut storage, 50);
        assert_eq!(storage.read().as_deref(), Some("50"));
        assert_eq!(load_high_score(&storage), 50);
    }
}
