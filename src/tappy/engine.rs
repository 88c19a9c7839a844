//! The round engine: owns the game state, its timers and the high score.
//!
//! All mutation goes through `RoundEngine`. Timer fires are replayed from
//! `advance` one at a time, so clock seconds, burst sub-ticks and player
//! input never overlap.

use super::config::{PointsOnReset, TappyConfig};
use super::logic;
use super::save::{self, ScoreStorage};
use super::state::{
    LogEntry, PurchaseOutcome, RoundPhase, TapEffect, TappyState, UpgradeKind,
};
use super::timer::{Scheduler, TimerHandle, TimerKind};

const MS_PER_SECOND: u32 = 1000;

/// A buy button as the shop shows it.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopEntry {
    pub kind: UpgradeKind,
    pub owned: bool,
    pub affordable: bool,
}

/// Read-only view of everything the UI draws.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub time_remaining: u32,
    pub round_seconds: u32,
    /// Whole throughputs (floor of the accumulator).
    pub throughputs: u64,
    pub threshold: u64,
    pub points: u64,
    pub high_score: u64,
    pub power_up_available: bool,
    pub burst_active: bool,
    pub multiplier: u64,
    pub owned: Vec<UpgradeKind>,
    pub shop: Vec<ShopEntry>,
    pub rounds_played: u32,
}

pub struct RoundEngine {
    state: TappyState,
    config: TappyConfig,
    scheduler: Scheduler,
    clock: Option<TimerHandle>,
    burst: Option<TimerHandle>,
    storage: Box<dyn ScoreStorage>,
}

impl RoundEngine {
    /// Start a fresh round. The high score is read from `storage`.
    pub fn new(config: TappyConfig, storage: Box<dyn ScoreStorage>) -> Self {
        let mut state = TappyState::new(config.round_seconds);
        state.high_score = save::load_high_score(storage.as_ref());
        let mut engine = Self {
            state,
            config,
            scheduler: Scheduler::new(),
            clock: None,
            burst: None,
            storage,
        };
        engine.start_clock();
        engine
    }

    /// Seed the effect RNG (xorshift needs a non-zero state).
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.state.rng_state = seed.max(1);
        self
    }

    fn start_clock(&mut self) {
        self.clock = Some(
            self.scheduler
                .schedule_repeating(TimerKind::RoundClock, MS_PER_SECOND, None),
        );
    }

    /// Drop every pending timer so nothing can fire into a finished round.
    fn cancel_timers(&mut self) {
        self.scheduler.cancel_all();
        self.clock = None;
        self.burst = None;
    }

    /// Feed real elapsed time. Due timers fire in chronological order.
    pub fn advance(&mut self, elapsed_ms: u32) {
        if self.scheduler.is_empty() {
            return;
        }
        let mut budget = elapsed_ms;
        while let Some(fire) = self.scheduler.next_due(&mut budget) {
            match fire.kind {
                TimerKind::RoundClock if self.clock == Some(fire.handle) => self.tick(),
                TimerKind::PowerUpBurst if self.burst == Some(fire.handle) => {
                    self.burst_sub_tick(fire.handle)
                }
                _ => {}
            }
        }
    }

    /// One second of the round clock.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.time_remaining -= 1;
        if self.state.time_remaining == 0 {
            self.end_round();
        }
    }

    fn end_round(&mut self) {
        self.cancel_timers();
        self.state.rounds_played += 1;
        let points = self.state.points;
        if points > self.state.high_score {
            self.state.high_score = points;
            save::save_high_score(self.storage.as_mut(), points);
            self.state
                .add_log(&format!("Time's up! New high score: {} GP", points), true);
        } else {
            self.state
                .add_log(&format!("Time's up! {} Gaia Points", points), false);
        }
    }

    fn burst_sub_tick(&mut self, handle: TimerHandle) {
        logic::burst_sub_tick(
            &mut self.state,
            self.config.burst_factor,
            self.config.threshold,
        );
        if !self.scheduler.is_active(handle) {
            self.burst = None;
            self.state.add_log("Amir hung up.", false);
        }
    }

    pub fn tap(&mut self) -> bool {
        logic::tap(&mut self.state, self.config.threshold)
    }

    /// "Call Amir": once per round, auto-taps at 1.5x for the burst window.
    pub fn activate_power_up(&mut self) -> bool {
        if !self.state.is_running() || self.state.power_up_used {
            return false;
        }
        self.state.power_up_used = true;
        let handle = self.scheduler.schedule_repeating(
            TimerKind::PowerUpBurst,
            self.config.burst_cadence_ms,
            Some(self.config.burst_sub_ticks()),
        );
        // a window shorter than one cadence schedules nothing
        if self.scheduler.is_active(handle) {
            self.burst = Some(handle);
        }
        self.state.add_log("Amir is running your node!", true);
        true
    }

    pub fn purchase(&mut self, kind: UpgradeKind) -> PurchaseOutcome {
        logic::purchase(&mut self.state, kind)
    }

    /// Start a new round. Allowed at any time; owned models are kept.
    pub fn reset_round(&mut self) {
        for handle in [self.clock.take(), self.burst.take()].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
        self.state.time_remaining = self.config.round_seconds;
        self.state.accumulator = 0.0;
        self.state.power_up_used = false;
        if self.config.points_on_reset == PointsOnReset::Zero {
            self.state.points = 0;
        }
        self.start_clock();
        self.state.add_log("New round started.", false);
    }

    /// Hand newly emitted tap effects to the presentation layer.
    pub fn drain_tap_effects(&mut self) -> Vec<TapEffect> {
        std::mem::take(&mut self.state.pending_effects)
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let state = &self.state;
        RoundSnapshot {
            phase: state.phase(),
            time_remaining: state.time_remaining,
            round_seconds: self.config.round_seconds,
            throughputs: state.accumulator.floor() as u64,
            threshold: self.config.threshold as u64,
            points: state.points,
            high_score: state.high_score,
            power_up_available: state.is_running() && !state.power_up_used,
            burst_active: self.burst.is_some(),
            multiplier: logic::effective_multiplier(&state.owned),
            owned: state.owned.iter().collect(),
            shop: UpgradeKind::all()
                .iter()
                .map(|&kind| ShopEntry {
                    kind,
                    owned: state.owned.contains(kind),
                    affordable: logic::can_purchase(state, kind),
                })
                .collect(),
            rounds_played: state.rounds_played,
        }
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.state.log
    }

    #[cfg(test)]
    pub fn state(&self) -> &TappyState {
        &self.state
    }

    #[cfg(test)]
    fn state_mut(&mut self) -> &mut TappyState {
        &mut self.state
    }

    #[cfg(test)]
    fn stored_high_score(&self) -> Option<String> {
        self.storage.read()
    }
}
