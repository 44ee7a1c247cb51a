use crate::session::Counters;
use std::time::Duration;

/// Standard word length used for words-per-minute.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Derived speed and accuracy of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    /// Percentage in `0..=100`.
    pub accuracy: u8,
}

impl Default for Metrics {
    /// Before any input: no speed, and nothing has gone wrong yet.
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
        }
    }
}

/// Metrics at an arbitrary instant of a running session.
pub fn live_metrics(correct: usize, typed: usize, elapsed: Duration) -> Metrics {
    let minutes = elapsed.as_secs_f64() / 60.0;
    let wpm = if minutes > 0.0 {
        ((correct as f64 / CHARS_PER_WORD) / minutes).round() as u32
    } else {
        0
    };

    let accuracy = if typed > 0 {
        ((correct as f64 / typed as f64) * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        100
    };

    Metrics { wpm, accuracy }
}

/// Metrics when the timer reaches zero: elapsed is the full configured duration.
pub fn final_metrics(counters: Counters, duration: Duration) -> Metrics {
    live_metrics(counters.correct(), counters.typed(), duration)
}

/// Values pushed to the HUD on every tick and keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsUpdate {
    pub metrics: Metrics,
    pub time_left: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_accuracy() {
        let m = live_metrics(3, 3, Duration::from_secs(10));
        assert_eq!(m.accuracy, 100);
    }

    #[test]
    fn test_accuracy_rounds() {
        let m = live_metrics(2, 3, Duration::from_secs(10));
        assert_eq!(m.accuracy, 67);

        let m = live_metrics(1, 3, Duration::from_secs(10));
        assert_eq!(m.accuracy, 33);
    }

    #[test]
    fn test_accuracy_floor_is_zero() {
        let m = live_metrics(0, 12, Duration::from_secs(10));
        assert_eq!(m.accuracy, 0);
    }

    #[test]
    fn test_wpm_at_half_minute() {
        let m = live_metrics(25, 25, Duration::from_secs(30));
        assert_eq!(m.wpm, 10);
    }

    #[test]
    fn test_wpm_rounds_half_up() {
        // 25 words in two minutes
        let m = live_metrics(125, 125, Duration::from_secs(120));
        assert_eq!(m.wpm, 13);
    }

    #[test]
    fn test_zero_elapsed() {
        let m = live_metrics(10, 10, Duration::ZERO);
        assert_eq!(m.wpm, 0);
    }

    #[test]
    fn test_no_input_defaults() {
        let m = live_metrics(0, 0, Duration::from_secs(60));
        assert_eq!(m, Metrics::default());
    }

    #[test]
    fn test_final_metrics_use_full_duration() {
        let m = final_metrics(Counters::default(), Duration::from_secs(60));
        assert_eq!(m.wpm, 0);
        assert_eq!(m.accuracy, 100);
    }
}
