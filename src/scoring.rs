//! Score, cleared-row counter, level and gravity speed.

use std::time::Duration;

pub const POINTS_PER_ROW: u64 = 100;
pub const ROWS_PER_LEVEL: u64 = 10;
pub const INITIAL_DESCEND_INTERVAL: Duration = Duration::from_millis(1000);
pub const DESCEND_STEP: Duration = Duration::from_millis(40);
pub const MIN_DESCEND_INTERVAL: Duration = Duration::from_millis(250);

/// Multiplier for the number of rows cleared in one pass.
pub const fn difficulty_factor(cleared_rows: u32) -> u64 {
    if cleared_rows < 4 {
        1
    } else if cleared_rows < 8 {
        2
    } else {
        3
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub score: u64,
    pub cleared_rows: u64,
    pub level: u32,
    pub descend_interval: Duration,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            cleared_rows: 0,
            level: 1,
            descend_interval: INITIAL_DESCEND_INTERVAL,
        }
    }
}

impl Progress {
    /// Account for one clearing pass. Returns the points awarded.
    pub fn record_clear(&mut self, cleared_rows: u32) -> u64 {
        if cleared_rows == 0 {
            return 0;
        }
        let points = difficulty_factor(cleared_rows) * u64::from(cleared_rows) * POINTS_PER_ROW;
        self.score += points;

        for _ in 0..cleared_rows {
            self.cleared_rows += 1;
            if self.cleared_rows % ROWS_PER_LEVEL == 0 {
                self.level_up();
            }
        }
        points
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.descend_interval = self
            .descend_interval
            .saturating_sub(DESCEND_STEP)
            .max(MIN_DESCEND_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_thresholds() {
        assert_eq!(difficulty_factor(1), 1);
        assert_eq!(difficulty_factor(3), 1);
        assert_eq!(difficulty_factor(4), 2);
        assert_eq!(difficulty_factor(7), 2);
        assert_eq!(difficulty_factor(8), 3);
        assert_eq!(difficulty_factor(20), 3);
    }

    #[test]
    fn test_single_row() {
        let mut p = Progress::default();
        assert_eq!(p.record_clear(1), 100);
        assert_eq!(p.score, 100);
        assert_eq!(p.cleared_rows, 1);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_four_rows_double_factor() {
        let mut p = Progress::default();
        assert_eq!(p.record_clear(4), 800);
    }

    #[test]
    fn test_zero_rows_is_noop() {
        let mut p = Progress::default();
        assert_eq!(p.record_clear(0), 0);
        assert_eq!(p, Progress::default());
    }

    #[test]
    fn test_level_up_every_ten_rows() {
        let mut p = Progress::default();
        for _ in 0..9 {
            p.record_clear(1);
        }
        assert_eq!(p.level, 1);
        p.record_clear(1);
        assert_eq!(p.level, 2);
        assert_eq!(p.descend_interval, Duration::from_millis(960));

        // One pass crossing a multiple of ten levels up once.
        p.record_clear(3);
        p.record_clear(8);
        assert_eq!(p.cleared_rows, 21);
        assert_eq!(p.level, 3);
    }

    #[test]
    fn test_interval_floor() {
        let mut p = Progress::default();
        for _ in 0..40 {
            p.record_clear(10);
        }
        assert_eq!(p.level, 41);
        assert_eq!(p.descend_interval, MIN_DESCEND_INTERVAL);
    }
}
