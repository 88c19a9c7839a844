//! Gaia Tappy: a 20-second tapping game with purchasable tap multipliers.

pub mod actions;
pub mod config;
pub mod engine;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;
pub mod timer;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use engine::RoundEngine;
use state::{RoundPhase, TapEffect, UpgradeKind};

/// How long a tap marker stays on screen.
pub const EFFECT_LIFETIME_MS: u32 = 1000;

/// The 10 most recent markers plus the newest one.
const MAX_PARTICLES: usize = 11;

/// How long the button stays highlighted after a tap.
const PRESS_FLASH_MS: u32 = 100;

/// Screen ratio chosen by the player. Layout only; the round doesn't care.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    Pc,
    Mobile,
}

/// A tap marker currently on screen.
#[derive(Clone, Debug)]
pub struct Particle {
    pub effect: TapEffect,
    pub age_ms: u32,
}

pub struct TappyGame {
    pub engine: RoundEngine,
    pub particles: Vec<Particle>,
    pub display_mode: DisplayMode,
    /// Remaining highlight time for the Run Node button.
    pub press_flash_ms: u32,
}

impl TappyGame {
    pub fn new(engine: RoundEngine) -> Self {
        Self {
            engine,
            particles: Vec::new(),
            display_mode: DisplayMode::Pc,
            press_flash_ms: 0,
        }
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        };
        self.collect_effects();
        consumed
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            ' ' | 't' => {
                self.tap();
                true
            }
            'a' => {
                self.engine.activate_power_up();
                true
            }
            '1'..='3' => {
                if let Some(kind) = UpgradeKind::all().iter().find(|k| k.key() == key) {
                    self.engine.purchase(*kind);
                }
                true
            }
            'r' => self.restart(),
            'm' => {
                self.display_mode = match self.display_mode {
                    DisplayMode::Pc => DisplayMode::Mobile,
                    DisplayMode::Mobile => DisplayMode::Pc,
                };
                true
            }
            _ => false,
        }
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        match action_id {
            actions::RUN_NODE => {
                self.tap();
                true
            }
            actions::CALL_AMIR => {
                self.engine.activate_power_up();
                true
            }
            actions::RESTART => self.restart(),
            actions::TOGGLE_RATIO_PC => {
                self.display_mode = DisplayMode::Pc;
                true
            }
            actions::TOGGLE_RATIO_MOBILE => {
                self.display_mode = DisplayMode::Mobile;
                true
            }
            id if id >= actions::BUY_UPGRADE_BASE => {
                match UpgradeKind::from_index((id - actions::BUY_UPGRADE_BASE) as usize) {
                    Some(kind) => {
                        self.engine.purchase(kind);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    fn tap(&mut self) {
        if self.engine.tap() {
            self.press_flash_ms = PRESS_FLASH_MS;
        }
    }

    /// The restart button only exists once the round is over.
    fn restart(&mut self) -> bool {
        if self.engine.snapshot().phase != RoundPhase::Ended {
            return false;
        }
        self.engine.reset_round();
        true
    }

    fn collect_effects(&mut self) {
        for effect in self.engine.drain_tap_effects() {
            self.particles.push(Particle { effect, age_ms: 0 });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    /// Advance the round and age on-screen markers by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if elapsed_ms == 0 {
            return;
        }
        self.engine.advance(elapsed_ms);
        for p in &mut self.particles {
            p.age_ms = p.age_ms.saturating_add(elapsed_ms);
        }
        self.particles.retain(|p| p.age_ms < EFFECT_LIFETIME_MS);
        self.press_flash_ms = self.press_flash_ms.saturating_sub(elapsed_ms);
        self.collect_effects();
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
