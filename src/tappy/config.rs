//! Round tunables.
//!
//! Defaults reproduce the stock game. On wasm an optional JSON document in
//! localStorage (`tapTapConfig`) can override any subset of the fields;
//! missing fields fall back to their defaults.

use serde::Deserialize;

/// What happens to Gaia Points when a new round starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointsOnReset {
    /// Points carry over so they can be spent on models.
    #[default]
    Keep,
    /// Every round starts from zero points.
    Zero,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TappyConfig {
    /// Round length in seconds.
    pub round_seconds: u32,
    /// Throughputs needed for one Gaia Point.
    pub threshold: f64,
    /// Milliseconds between power-up sub-ticks.
    pub burst_cadence_ms: u32,
    /// Total length of the power-up burst in milliseconds.
    pub burst_window_ms: u32,
    /// Per sub-tick gain relative to the effective multiplier.
    pub burst_factor: f64,
    pub points_on_reset: PointsOnReset,
}

impl Default for TappyConfig {
    fn default() -> Self {
        Self {
            round_seconds: 20,
            threshold: 20.0,
            burst_cadence_ms: 66,
            burst_window_ms: 5000,
            burst_factor: 1.5,
            points_on_reset: PointsOnReset::Keep,
        }
    }
}

impl TappyConfig {
    /// Number of sub-ticks that fall inside the burst window.
    pub fn burst_sub_ticks(&self) -> u32 {
        if self.burst_cadence_ms == 0 {
            return 0;
        }
        self.burst_window_ms / self.burst_cadence_ms
    }

    /// Clamp values that would break the round invariants.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.round_seconds == 0 {
            self.round_seconds = defaults.round_seconds;
        }
        if !(self.threshold.is_finite() && self.threshold >= 1.0) {
            self.threshold = defaults.threshold;
        }
        if self.burst_cadence_ms == 0 {
            self.burst_cadence_ms = defaults.burst_cadence_ms;
        }
        if !(self.burst_factor.is_finite() && self.burst_factor >= 0.0) {
            self.burst_factor = defaults.burst_factor;
        }
        self
    }

    /// Parse a JSON override document. Returns None if it is not valid JSON
    /// for this shape.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<TappyConfig>(json)
            .ok()
            .map(TappyConfig::sanitized)
    }
}

#[cfg(target_arch = "wasm32")]
const CONFIG_KEY: &str = "tapTapConfig";

/// Load config overrides from localStorage, falling back to defaults.
#[cfg(target_arch = "wasm32")]
pub fn load() -> TappyConfig {
    let json = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(CONFIG_KEY).ok().flatten());
    let Some(json) = json else {
        return TappyConfig::default();
    };
    match TappyConfig::from_json(&json) {
        Some(config) => {
            web_sys::console::log_1(&format!("Gaia Tappy: config override {config:?}").into());
            config
        }
        None => {
            web_sys::console::warn_1(
                &"Gaia Tappy: tapTapConfig のパースに失敗（デフォルト設定を使用）".into(),
            );
            TappyConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_game() {
        let c = TappyConfig::default();
        assert_eq!(c.round_seconds, 20);
        assert!((c.threshold - 20.0).abs() < f64::EPSILON);
        assert_eq!(c.points_on_reset, PointsOnReset::Keep);
    }

    #[test]
    fn burst_sub_ticks_within_window() {
        // 66ms cadence: the 75th sub-tick lands at 4950ms, the 76th would be past 5000ms.
        assert_eq!(TappyConfig::default().burst_sub_ticks(), 75);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let c = TappyConfig::from_json(r#"{"points_on_reset": "zero"}"#).unwrap();
        assert_eq!(c.points_on_reset, PointsOnReset::Zero);
        assert_eq!(c.round_seconds, 20);
        assert_eq!(c.burst_cadence_ms, 66);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let c = TappyConfig::from_json(r#"{"round_seconds": 30, "theme": "dark"}"#).unwrap();
        assert_eq!(c.round_seconds, 30);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(TappyConfig::from_json("{round_seconds: 30").is_none());
        assert!(TappyConfig::from_json(r#"{"points_on_reset": "halve"}"#).is_none());
    }

    #[test]
    fn invalid_values_fall_back() {
        let c = TappyConfig::from_json(
            r#"{"round_seconds": 0, "threshold": 0.5, "burst_cadence_ms": 0}"#,
        )
        .unwrap();
        assert_eq!(c.round_seconds, 20);
        assert!((c.threshold - 20.0).abs() < f64::EPSILON);
        assert_eq!(c.burst_cadence_ms, 66);
    }
}
