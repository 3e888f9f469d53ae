use immersion_models::{ImmersionLevel, IMMERSION_LEVELS};
use serde::Serialize;

const SECONDS_PER_HOUR: u64 = 3600;

/// Level whose range contains `hours`; past the table this is the last level
pub fn level_for_hours(hours: f64) -> &'static ImmersionLevel {
    let index = level_index(hours);
    &IMMERSION_LEVELS[index]
}

/// Level for a total watch time, counting whole hours only
pub fn level_for_seconds(seconds: u64) -> &'static ImmersionLevel {
    level_for_hours((seconds / SECONDS_PER_HOUR) as f64)
}

fn level_index(hours: f64) -> usize {
    IMMERSION_LEVELS
        .iter()
        .position(|level| level.contains(hours))
        .unwrap_or(IMMERSION_LEVELS.len() - 1)
}

/// Where a total watch time sits within its level
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LevelProgress {
    pub level: ImmersionLevel,
    pub hours: f64,
    pub whole_hours: u64,
    /// Floored and clamped to 0..=100
    pub percent: u8,
    pub hours_to_next: f64,
    pub is_max_level: bool,
}

impl LevelProgress {
    pub fn from_seconds(seconds: u64) -> Self {
        let whole_hours = seconds / SECONDS_PER_HOUR;
        let index = level_index(whole_hours as f64);
        let level = IMMERSION_LEVELS[index];
        let hours = seconds as f64 / SECONDS_PER_HOUR as f64;

        let percent = ((hours - level.start) / level.span() * 100.0)
            .floor()
            .clamp(0.0, 100.0) as u8;

        Self {
            level,
            hours,
            whole_hours,
            percent,
            hours_to_next: (level.end - hours).max(0.0),
            is_max_level: index == IMMERSION_LEVELS.len() - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_hours(0.0).name, "Beginner");
        assert_eq!(level_for_hours(49.9).name, "Beginner");
        assert_eq!(level_for_hours(50.0).name, "Beginner 1");
        assert_eq!(level_for_hours(1299.99).name, "Intermediate 2");
        assert_eq!(level_for_hours(1800.0).name, "Advanced");
        assert_eq!(level_for_hours(5000.0).name, "Advanced");
    }

    #[test]
    fn test_level_for_seconds_floors_hours() {
        assert_eq!(level_for_seconds(50 * 3600 - 1).name, "Beginner");
        assert_eq!(level_for_seconds(50 * 3600).name, "Beginner 1");
    }

    #[test]
    fn test_progress_within_level() {
        let progress = LevelProgress::from_seconds(125 * 3600);
        assert_eq!(progress.level.name, "Beginner 1");
        assert_eq!(progress.whole_hours, 125);
        assert_eq!(progress.percent, 50);
        assert_eq!(progress.hours_to_next, 75.0);
        assert!(!progress.is_max_level);
    }

    #[test]
    fn test_progress_past_the_table() {
        let progress = LevelProgress::from_seconds(2000 * 3600);
        assert_eq!(progress.level.name, "Advanced");
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.hours_to_next, 0.0);
        assert!(progress.is_max_level);
    }

    #[test]
    fn test_progress_empty_collection() {
        let progress = LevelProgress::from_seconds(0);
        assert_eq!(progress.level.name, "Beginner");
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.hours_to_next, 50.0);
    }
}
