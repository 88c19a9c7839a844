//! Semantic action IDs for Gaia Tappy click targets.
//!
//! These IDs are registered during render and dispatched via `InputEvent::Click`.

// ── Round actions ───────────────────────────────────────────────
pub const RUN_NODE: u16 = 0;
pub const CALL_AMIR: u16 = 1;
pub const RESTART: u16 = 2;

// ── Model purchase (base + catalog index 0..2) ──────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Display ratio ───────────────────────────────────────────────
pub const TOGGLE_RATIO_PC: u16 = 200;
pub const TOGGLE_RATIO_MOBILE: u16 = 201;
