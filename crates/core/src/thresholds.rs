//! Edge-triggered threshold evaluation.
//!
//! Pure logic with no I/O. The sampler feeds one temperature/current pair
//! per cycle into [`AlertEvaluator::evaluate`] and enqueues whatever event
//! comes back.
//!
//! A single [`AlertLatch`] is shared by both quantities:
//!
//! - `Disarmed -> Armed` when either predicate becomes true. One event is
//!   produced, for temperature if both predicates hold.
//! - `Armed -> Disarmed` only when both predicates are false in the same
//!   cycle.
//! - While armed, no further events are produced.

use crate::alert::AlertEvent;
use crate::reading::SensorChannel;

/// Reference temperature threshold in degrees Celsius.
pub const DEFAULT_TEMP_THRESHOLD_C: f32 = 25.0;

/// Reference current threshold in amperes.
pub const DEFAULT_CURRENT_THRESHOLD_A: f32 = 0.3;

/// Alert thresholds. Both comparisons are strictly greater-than.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub temperature_c: f32,
    pub current_a: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature_c: DEFAULT_TEMP_THRESHOLD_C,
            current_a: DEFAULT_CURRENT_THRESHOLD_A,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchState {
    /// No alert raised for the current excursion.
    #[default]
    Disarmed,
    /// An alert was raised; suppress until both quantities return to normal.
    Armed,
}

/// One-bit edge trigger.
#[derive(Debug, Clone, Default)]
pub struct AlertLatch {
    state: LatchState,
}

impl AlertLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LatchState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == LatchState::Armed
    }

    fn arm(&mut self) {
        self.state = LatchState::Armed;
    }

    fn disarm(&mut self) {
        self.state = LatchState::Disarmed;
    }
}

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub temperature_alert: bool,
    pub current_alert: bool,
    /// Present only on the cycle where the latch armed.
    pub event: Option<AlertEvent>,
}

/// Applies [`Thresholds`] to readings and owns the [`AlertLatch`].
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    thresholds: Thresholds,
    temperature: SensorChannel,
    current: SensorChannel,
    latch: AlertLatch,
}

impl AlertEvaluator {
    pub fn new(thresholds: Thresholds, temperature: SensorChannel, current: SensorChannel) -> Self {
        Self {
            thresholds,
            temperature,
            current,
            latch: AlertLatch::new(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn latch(&self) -> &AlertLatch {
        &self.latch
    }

    /// Evaluate one cycle.
    ///
    /// `temperature` is `None` for an invalid probe reading, which never
    /// satisfies the temperature predicate.
    pub fn evaluate(&mut self, temperature: Option<f32>, current: f32) -> Evaluation {
        let temperature_alert = temperature.is_some_and(|t| t > self.thresholds.temperature_c);
        let current_alert = current > self.thresholds.current_a;

        if !temperature_alert && !current_alert {
            self.latch.disarm();
            return Evaluation {
                temperature_alert,
                current_alert,
                event: None,
            };
        }

        if self.latch.is_armed() {
            return Evaluation {
                temperature_alert,
                current_alert,
                event: None,
            };
        }

        let event = match temperature {
            Some(t) if temperature_alert => {
                self.event_for(&self.temperature, t, self.thresholds.temperature_c)
            }
            _ => self.event_for(&self.current, current, self.thresholds.current_a),
        };
        self.latch.arm();

        Evaluation {
            temperature_alert,
            current_alert,
            event: Some(event),
        }
    }

    fn event_for(&self, channel: &SensorChannel, value: f32, threshold: f32) -> AlertEvent {
        AlertEvent::new(channel.id.clone(), value, channel.unit.clone(), threshold)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::{DEFAULT_CURRENT_SENSOR_ID, DEFAULT_TEMP_SENSOR_ID};

    fn evaluator() -> AlertEvaluator {
        AlertEvaluator::new(
            Thresholds::default(),
            SensorChannel::temperature(DEFAULT_TEMP_SENSOR_ID).unwrap(),
            SensorChannel::current(DEFAULT_CURRENT_SENSOR_ID).unwrap(),
        )
    }

    /// Run a temperature series with zero current, returning the cycle
    /// indices that produced an event.
    fn fire_indices(eval: &mut AlertEvaluator, temps: &[f32]) -> Vec<usize> {
        temps
            .iter()
            .enumerate()
            .filter_map(|(i, t)| eval.evaluate(Some(*t), 0.0).event.map(|_| i))
            .collect()
    }

    #[test]
    fn no_event_within_thresholds() {
        let mut eval = evaluator();
        let outcome = eval.evaluate(Some(20.0), 0.1);
        assert!(outcome.event.is_none());
        assert_eq!(eval.latch().state(), LatchState::Disarmed);
    }

    #[test]
    fn rising_temperature_fires_once_then_disarms() {
        let mut eval = evaluator();

        let fired = fire_indices(&mut eval, &[20.0, 24.0, 26.0, 27.0]);
        assert_eq!(fired, vec![2]);
        assert!(eval.latch().is_armed());

        eval.evaluate(Some(24.0), 0.0);
        assert_eq!(eval.latch().state(), LatchState::Disarmed);
    }

    #[test]
    fn event_carries_triggering_value_and_threshold() {
        let mut eval = evaluator();
        let event = eval.evaluate(Some(26.0), 0.0).event.unwrap();

        assert_eq!(event.sensor_name().as_str(), DEFAULT_TEMP_SENSOR_ID);
        assert_eq!(event.unit().as_str(), "C");
        assert_eq!(event.value(), 26.0);
        assert_eq!(event.threshold(), 25.0);
    }

    #[test]
    fn sustained_excursion_produces_single_event() {
        let mut eval = evaluator();
        let fired = fire_indices(&mut eval, &[30.0; 50]);
        assert_eq!(fired, vec![0]);
    }

    #[test]
    fn second_excursion_after_recovery_fires_again() {
        let mut eval = evaluator();
        let fired = fire_indices(&mut eval, &[26.0, 27.0, 25.0, 26.0]);
        assert_eq!(fired, vec![0, 3]);
    }

    #[test]
    fn value_equal_to_threshold_does_not_fire() {
        let mut eval = evaluator();
        assert!(eval.evaluate(None, 0.3).event.is_none());

        let event = eval.evaluate(None, 0.31).event.expect("0.31 A exceeds 0.3 A");
        assert_eq!(event.sensor_name().as_str(), DEFAULT_CURRENT_SENSOR_ID);
        assert_eq!(event.unit().as_str(), "A");
    }

    #[test]
    fn temperature_wins_when_both_exceed() {
        let mut eval = evaluator();
        let outcome = eval.evaluate(Some(40.0), 5.0);

        assert!(outcome.temperature_alert);
        assert!(outcome.current_alert);
        assert_eq!(
            outcome.event.unwrap().sensor_name().as_str(),
            DEFAULT_TEMP_SENSOR_ID
        );
    }

    #[test]
    fn invalid_temperature_never_alerts() {
        let mut eval = evaluator();
        let outcome = eval.evaluate(None, 0.0);
        assert!(!outcome.temperature_alert);
        assert!(outcome.event.is_none());
    }

    #[test]
    fn latch_stays_armed_while_either_quantity_is_high() {
        let mut eval = evaluator();
        assert!(eval.evaluate(Some(30.0), 0.0).event.is_some());

        // Temperature recovers but current is now high: same excursion.
        assert!(eval.evaluate(Some(20.0), 1.0).event.is_none());
        assert!(eval.latch().is_armed());

        eval.evaluate(Some(20.0), 0.0);
        assert!(!eval.latch().is_armed());
    }

    #[test]
    fn invalid_temperature_with_quiet_current_disarms() {
        let mut eval = evaluator();
        eval.evaluate(Some(30.0), 0.0);
        eval.evaluate(None, 0.0);
        assert_eq!(eval.latch().state(), LatchState::Disarmed);
    }
}
