//! Time-budget controller
//!
//! Decides what fraction of `max_time` the tree builder may use this turn,
//! based on how the previous turn went.

use std::time::{Duration, Instant};

use wargame_core::{Algorithm, GameOptions};

pub const AVERAGE_RATIO: f64 = 0.25;
pub const LOWEST_RATIO: f64 = 0.20;
pub const HIGHEST_RATIO: f64 = 0.85;

/// Ratio on the first move when the depth limit is shallow
const OPENING_RATIO: f64 = 0.35;
/// Depth above which the opening uses the average ratio
const DEEP_SEARCH: u32 = 6;
/// Turns after which minimax falls back to the average ratio
const MINIMAX_TURN_LIMIT: u32 = 15;
const DECREASE: f64 = 0.40;
const INCREASE: f64 = 0.01;
/// Stand-in when a budget does not fit in an `Instant`
const FAR_DEADLINE: Duration = Duration::from_secs(365 * 24 * 3600);

/// Timings of the previous turn
#[derive(Clone, Copy, Debug)]
struct TurnTiming {
    /// Minimax / alpha-beta runtime alone
    algorithm: Duration,
    /// Whole turn, construction included
    total: Duration,
}

#[derive(Clone, Debug)]
pub struct TimeBudget {
    ratio: f64,
    last: Option<TurnTiming>,
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self {
            ratio: AVERAGE_RATIO,
            last: None,
        }
    }
}

impl TimeBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Adjust the ratio before this turn's construction and return it
    pub fn update(&mut self, options: &GameOptions, turns_played: u32) -> f64 {
        let max_time = options.max_time;
        self.ratio = match self.last {
            None if options.max_depth > DEEP_SEARCH => AVERAGE_RATIO,
            None => OPENING_RATIO,
            Some(_)
                if options.algorithm == Algorithm::Minimax
                    && turns_played > MINIMAX_TURN_LIMIT =>
            {
                AVERAGE_RATIO
            }
            Some(last) => {
                let algorithm = last.algorithm.as_secs_f64();
                let total = last.total.as_secs_f64();
                if algorithm > max_time - self.ratio * max_time - 0.5
                    || max_time - total < 0.2 * max_time
                {
                    (self.ratio - DECREASE).max(LOWEST_RATIO)
                } else if total < max_time - 1.0 {
                    (self.ratio + INCREASE).min(HIGHEST_RATIO)
                } else {
                    self.ratio
                }
            }
        };
        self.ratio
    }

    /// Construction deadline for a turn that started at `start`
    pub fn deadline(&self, start: Instant, max_time: f64) -> Instant {
        let allowed = Duration::try_from_secs_f64((self.ratio * max_time).max(0.0))
            .unwrap_or(Duration::MAX);
        start
            .checked_add(allowed)
            .or_else(|| start.checked_add(FAR_DEADLINE))
            .unwrap_or(start)
    }

    /// Remember how long the turn that just ended took
    pub fn record(&mut self, algorithm: Duration, total: Duration) {
        self.last = Some(TurnTiming { algorithm, total });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(max_time: f64, max_depth: u32, algorithm: Algorithm) -> GameOptions {
        GameOptions {
            max_time,
            max_depth,
            algorithm,
            ..GameOptions::default()
        }
    }

    #[test]
    fn test_opening_ratio() {
        let mut budget = TimeBudget::new();
        assert_eq!(budget.update(&options(5.0, 4, Algorithm::AlphaBeta), 0), 0.35);

        let mut deep = TimeBudget::new();
        assert_eq!(deep.update(&options(5.0, 8, Algorithm::AlphaBeta), 0), 0.25);
    }

    #[test]
    fn test_fast_turns_increase_slowly() {
        let opts = options(10.0, 4, Algorithm::AlphaBeta);
        let mut budget = TimeBudget::new();
        budget.update(&opts, 0);
        budget.record(Duration::from_millis(100), Duration::from_secs(2));
        let ratio = budget.update(&opts, 1);
        assert!((ratio - 0.36).abs() < 1e-9);
    }

    #[test]
    fn test_increase_is_capped() {
        let opts = options(10.0, 4, Algorithm::AlphaBeta);
        let mut budget = TimeBudget::new();
        budget.update(&opts, 0);
        for turn in 1..100 {
            budget.record(Duration::from_millis(10), Duration::from_millis(500));
            budget.update(&opts, turn);
        }
        assert_eq!(budget.ratio(), HIGHEST_RATIO);
    }

    #[test]
    fn test_slow_algorithm_decreases_to_floor() {
        let opts = options(5.0, 4, Algorithm::AlphaBeta);
        let mut budget = TimeBudget::new();
        budget.update(&opts, 0);
        // 0.35 ratio leaves 5 - 1.75 - 0.5 = 2.75s for the algorithm
        budget.record(Duration::from_secs(3), Duration::from_secs(3));
        assert_eq!(budget.update(&opts, 1), LOWEST_RATIO);
    }

    #[test]
    fn test_little_time_left_decreases() {
        let opts = options(10.0, 4, Algorithm::AlphaBeta);
        let mut budget = TimeBudget::new();
        budget.update(&opts, 0);
        for turn in 1..60 {
            budget.record(Duration::from_millis(10), Duration::from_millis(500));
            budget.update(&opts, turn);
        }
        // Only 1.5s of 10s left unused
        budget.record(Duration::from_millis(10), Duration::from_millis(8500));
        let ratio = budget.update(&opts, 60);
        assert!((ratio - (HIGHEST_RATIO - 0.40)).abs() < 1e-9);
    }

    #[test]
    fn test_unchanged_near_limit() {
        // Between 1s and 20% of the budget left over
        let opts = options(4.0, 4, Algorithm::AlphaBeta);
        let mut budget = TimeBudget::new();
        budget.update(&opts, 0);
        budget.record(Duration::from_millis(10), Duration::from_millis(3100));
        assert_eq!(budget.update(&opts, 1), 0.35);
    }

    #[test]
    fn test_minimax_resets_late_in_game() {
        let opts = options(10.0, 4, Algorithm::Minimax);
        let mut budget = TimeBudget::new();
        budget.update(&opts, 0);
        budget.record(Duration::from_millis(10), Duration::from_millis(500));
        assert_eq!(budget.update(&opts, 16), AVERAGE_RATIO);
    }

    #[test]
    fn test_deadline() {
        let mut budget = TimeBudget::new();
        budget.update(&options(4.0, 4, Algorithm::AlphaBeta), 0);
        let start = Instant::now();
        let deadline = budget.deadline(start, 4.0);
        assert_eq!(deadline - start, Duration::from_secs_f64(1.4));
    }

    #[test]
    fn test_unbounded_time_gives_far_deadline() {
        let budget = TimeBudget::new();
        let start = Instant::now();
        for max_time in [f64::INFINITY, f64::NAN, 1e300] {
            let deadline = budget.deadline(start, max_time);
            assert!(deadline >= start, "{max_time}");
        }
        assert!(budget.deadline(start, f64::INFINITY) > start + Duration::from_secs(3600));
    }
}
