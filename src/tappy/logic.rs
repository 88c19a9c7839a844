//! Gaia Tappy game logic: pure functions over `TappyState`.
//!
//! None of these functions know about timers; `engine` decides when they run.

use super::state::{OwnedUpgrades, PurchaseOutcome, TapEffect, TappyState, UpgradeKind};

/// Product of every owned model's multiplier (1 with nothing owned).
pub fn effective_multiplier(owned: &OwnedUpgrades) -> u64 {
    owned.iter().map(|k| k.multiplier()).product()
}

/// Add throughputs and convert every full `threshold` into one Gaia Point.
/// Returns the number of points awarded.
///
/// All crossings are taken in one division, so a huge gain costs the same
/// as a small one.
pub fn add_throughput(state: &mut TappyState, amount: f64, threshold: f64) -> u64 {
    let acc = state.accumulator + amount;
    if acc < threshold {
        state.accumulator = acc;
        return 0;
    }
    // float-to-int `as` saturates
    let awarded = (acc / threshold).floor() as u64;
    let mut rest = acc.rem_euclid(threshold);
    // rem_euclid may round up to exactly `threshold`; an infinite gain has no remainder
    if !rest.is_finite() || rest >= threshold {
        rest = 0.0;
    }
    state.accumulator = rest;
    state.points = state.points.saturating_add(awarded);
    awarded
}

/// Manual tap. Does nothing once the round has ended.
/// Returns true if the tap counted.
pub fn tap(state: &mut TappyState, threshold: f64) -> bool {
    if !state.is_running() {
        return false;
    }
    let gain = effective_multiplier(&state.owned) as f64;
    add_throughput(state, gain, threshold);
    spawn_tap_effect(state);
    true
}

/// One automatic sub-tick of the "Call Amir" burst.
/// The multiplier is read fresh so a model bought mid-burst applies at once.
pub fn burst_sub_tick(state: &mut TappyState, factor: f64, threshold: f64) -> bool {
    if !state.is_running() {
        return false;
    }
    let gain = effective_multiplier(&state.owned) as f64 * factor;
    add_throughput(state, gain, threshold);
    true
}

/// Queue a floating marker for the presentation layer.
fn spawn_tap_effect(state: &mut TappyState) {
    let id = state.next_effect_id;
    state.next_effect_id += 1;
    let x = (state.next_random() % 40) as i16 - 20; // -20..+19
    let y = -30 - (state.next_random() % 50) as i16; // -79..-30
    state.pending_effects.push(TapEffect { id, x, y });
}

/// Try to buy a model.
pub fn purchase(state: &mut TappyState, kind: UpgradeKind) -> PurchaseOutcome {
    if state.owned.contains(kind) {
        state.add_log(&format!("You already own {}!", kind.name()), false);
        return PurchaseOutcome::AlreadyOwned;
    }
    let cost = kind.cost();
    if state.points < cost {
        state.add_log(
            &format!(
                "Not enough Gaia Points to buy {}. You need {} Gaia Points.",
                kind.name(),
                cost
            ),
            false,
        );
        return PurchaseOutcome::InsufficientPoints { cost };
    }

    state.points -= cost;
    state.owned.insert(kind);
    state.add_log(
        &format!(
            "You bought {}! Taps now x{}",
            kind.name(),
            effective_multiplier(&state.owned)
        ),
        true,
    );
    PurchaseOutcome::Purchased
}

/// Whether the buy button for `kind` should be lit.
pub fn can_purchase(state: &TappyState, kind: UpgradeKind) -> bool {
    !state.owned.contains(kind) && state.points >= kind.cost()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_upgrade() -> impl Strategy<Value = UpgradeKind> {
        prop_oneof![
            Just(UpgradeKind::Qwen),
            Just(UpgradeKind::Gemma),
            Just(UpgradeKind::Llama),
        ]
    }

    proptest! {
        /// The accumulator stays below the threshold and points equal
        /// threshold crossings.
        #[test]
        fn accumulator_bounded_and_points_conserved(
            owned in proptest::collection::vec(arb_upgrade(), 0..3),
            taps in 1usize..200,
        ) {
            let mut state = TappyState::new(20);
            for k in owned {
                state.owned.insert(k);
            }
            let gain = effective_multiplier(&state.owned);
            for _ in 0..taps {
                tap(&mut state, 20.0);
                prop_assert!(state.accumulator >= 0.0);
                prop_assert!(state.accumulator < 20.0);
            }
            let total = gain * taps as u64;
            prop_assert_eq!(state.points, total / 20);
            prop_assert!((state.accumulator - (total % 20) as f64).abs() < 1e-6);
        }

        /// Burst increments keep the accumulator in range too.
        #[test]
        fn burst_keeps_accumulator_bounded(
            owned in proptest::collection::vec(arb_upgrade(), 0..3),
            sub_ticks in 1usize..100,
        ) {
            let mut state = TappyState::new(20);
            for k in owned {
                state.owned.insert(k);
            }
            let mut last_points = 0;
            for _ in 0..sub_ticks {
                burst_sub_tick(&mut state, 1.5, 20.0);
                prop_assert!(state.accumulator >= 0.0 && state.accumulator < 20.0);
                prop_assert!(state.points >= last_points);
                last_points = state.points;
            }
        }

        /// Repeated purchase attempts never deduct twice.
        #[test]
        fn purchase_never_double_deducts(
            kind in arb_upgrade(),
            points in 0u64..2000,
            attempts in 1usize..5,
        ) {
            let mut state = TappyState::new(20);
            state.points = points;
            let mut successes = 0;
            for _ in 0..attempts {
                if purchase(&mut state, kind) == PurchaseOutcome::Purchased {
                    successes += 1;
                }
            }
            prop_assert!(successes <= 1);
            let expected = if points >= kind.cost() { points - kind.cost() } else { points };
            prop_assert_eq!(state.points, expected);
        }
    }
}
