//! Cancellable timers driven by elapsed milliseconds.
//!
//! The browser frame loop reports how much real time passed; `Scheduler`
//! turns that into an ordered sequence of timer fires. Nothing here runs on
//! its own, so a timer that has been cancelled (or whose scheduler has been
//! dropped) can never touch game state again.

/// Identifies one scheduled timer. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What a timer drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// One-second round countdown.
    RoundClock,
    /// "Call Amir" auto-tap sub-tick.
    PowerUpBurst,
}

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerFire {
    pub handle: TimerHandle,
    pub kind: TimerKind,
}

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    kind: TimerKind,
    period_ms: u32,
    until_next_ms: u32,
    /// None = repeat until cancelled.
    fires_left: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer firing every `period_ms`, first fire one period from
    /// now. `fires` limits the number of fires; `None` repeats forever.
    pub fn schedule_repeating(
        &mut self,
        kind: TimerKind,
        period_ms: u32,
        fires: Option<u32>,
    ) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        if fires == Some(0) {
            return handle;
        }
        let period_ms = period_ms.max(1);
        self.timers.push(Timer {
            handle,
            kind,
            period_ms,
            until_next_ms: period_ms,
            fires_left: fires,
        });
        handle
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Consume time from `budget_ms` up to the earliest due timer and return
    /// it. When nothing is due within the budget, the whole budget is
    /// consumed and `None` is returned.
    ///
    /// Call in a loop so the caller can react to each fire (including
    /// cancelling other timers) before the next one is considered.
    pub fn next_due(&mut self, budget_ms: &mut u32) -> Option<TimerFire> {
        // min_by_key keeps the first of equal keys: earlier schedule wins ties.
        let earliest = self
            .timers
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.until_next_ms)
            .map(|(i, t)| (i, t.until_next_ms));

        match earliest {
            Some((idx, wait)) if wait <= *budget_ms => {
                *budget_ms -= wait;
                for t in &mut self.timers {
                    t.until_next_ms -= wait;
                }
                let timer = &mut self.timers[idx];
                let fire = TimerFire {
                    handle: timer.handle,
                    kind: timer.kind,
                };
                timer.until_next_ms = timer.period_ms;
                if let Some(left) = timer.fires_left.as_mut() {
                    *left -= 1;
                    if *left == 0 {
                        self.timers.remove(idx);
                    }
                }
                Some(fire)
            }
            _ => {
                let spent = *budget_ms;
                for t in &mut self.timers {
                    t.until_next_ms = t.until_next_ms.saturating_sub(spent);
                }
                *budget_ms = 0;
                None
            }
        }
    }

    /// Drain all fires within `elapsed_ms`. Only for callers that don't need
    /// to interleave reactions.
    #[cfg(test)]
    pub fn advance(&mut self, elapsed_ms: u32) -> Vec<TimerFire> {
        let mut budget = elapsed_ms;
        let mut fires = Vec::new();
        while let Some(fire) = self.next_due(&mut budget) {
            fires.push(fire);
        }
        fires
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_period() {
        let mut s = Scheduler::new();
        s.schedule_repeating(TimerKind::RoundClock, 1000, None);
        assert!(s.advance(999).is_empty());
        assert_eq!(s.advance(1).len(), 1);
    }

    #[test]
    fn repeating_timer_fires_per_period() {
        let mut s = Scheduler::new();
        s.schedule_repeating(TimerKind::RoundClock, 1000, None);
        assert_eq!(s.advance(3500).len(), 3);
        // 500ms carried over
        assert_eq!(s.advance(500).len(), 1);
    }

    #[test]
    fn limited_timer_removes_itself() {
        let mut s = Scheduler::new();
        let h = s.schedule_repeating(TimerKind::PowerUpBurst, 66, Some(3));
        assert_eq!(s.advance(10_000).len(), 3);
        assert!(!s.is_active(h));
        assert!(s.is_empty());
    }

    #[test]
    fn zero_fires_schedules_nothing() {
        let mut s = Scheduler::new();
        let h = s.schedule_repeating(TimerKind::PowerUpBurst, 66, Some(0));
        assert!(!s.is_active(h));
        assert!(s.advance(1000).is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut s = Scheduler::new();
        let h = s.schedule_repeating(TimerKind::PowerUpBurst, 66, None);
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(s.advance(1000).is_empty());
    }

    #[test]
    fn handles_are_not_reused() {
        let mut s = Scheduler::new();
        let a = s.schedule_repeating(TimerKind::RoundClock, 1000, None);
        s.cancel_all();
        let b = s.schedule_repeating(TimerKind::RoundClock, 1000, None);
        assert_ne!(a, b);
        assert!(!s.is_active(a));
        assert!(s.is_active(b));
    }

    #[test]
    fn fires_come_out_in_time_order() {
        let mut s = Scheduler::new();
        s.schedule_repeating(TimerKind::RoundClock, 100, None);
        s.schedule_repeating(TimerKind::PowerUpBurst, 30, None);
        let kinds: Vec<_> = s.advance(100).into_iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimerKind::PowerUpBurst, // 30
                TimerKind::PowerUpBurst, // 60
                TimerKind::PowerUpBurst, // 90
                TimerKind::RoundClock,   // 100
            ]
        );
    }

    #[test]
    fn ties_go_to_earlier_schedule() {
        let mut s = Scheduler::new();
        let clock = s.schedule_repeating(TimerKind::RoundClock, 50, None);
        let burst = s.schedule_repeating(TimerKind::PowerUpBurst, 50, None);
        let fires = s.advance(50);
        assert_eq!(fires[0].handle, clock);
        assert_eq!(fires[1].handle, burst);
    }

    #[test]
    fn caller_can_cancel_between_fires() {
        let mut s = Scheduler::new();
        s.schedule_repeating(TimerKind::RoundClock, 100, None);
        let burst = s.schedule_repeating(TimerKind::PowerUpBurst, 40, None);
        let mut budget = 1000;
        let mut burst_fires = 0;
        while let Some(fire) = s.next_due(&mut budget) {
            match fire.kind {
                TimerKind::PowerUpBurst => burst_fires += 1,
                TimerKind::RoundClock => {
                    s.cancel(burst);
                }
            }
        }
        // 40, 80 before the clock at 100
        assert_eq!(burst_fires, 2);
    }

    #[test]
    fn idle_budget_is_consumed() {
        let mut s = Scheduler::new();
        let mut budget = 500;
        assert!(s.next_due(&mut budget).is_none());
        assert_eq!(budget, 0);
    }
}
