//! Points, levels and badges.
//!
//! Advancing from level `L` to `L + 1` costs `BASE_LEVEL_COST * 2^(L-1)` points.
//! All arithmetic saturates at `i64::MAX`; a saturated threshold is treated as
//! unreachable, which caps progression at the last level whose threshold still
//! fits in an `i64` (57).

use std::fmt;

use serde::{Deserialize, Serialize};

pub const BASE_LEVEL_COST: i64 = 100;
pub const MAX_LEVEL: i32 = 99;

/// Aggregate progression figures for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_points: i64,
    pub current_level: i32,
    pub workouts_completed: i64,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_points: 0,
            current_level: 1,
            workouts_completed: 0,
        }
    }
}

impl UserStats {
    /// Returns the stats after gaining `delta` points. Non-positive deltas are a no-op.
    pub fn add_points(self, delta: i64) -> Self {
        if delta <= 0 {
            return self;
        }
        let total_points = self.total_points.saturating_add(delta);
        Self {
            total_points,
            current_level: level_for(total_points).max(self.current_level),
            ..self
        }
    }

    /// Returns the stats after finishing a workout worth `workout_points`.
    pub fn complete_workout(self, workout_points: i64) -> Self {
        let with_points = self.add_points(workout_points);
        Self {
            workouts_completed: with_points.workouts_completed.saturating_add(1),
            ..with_points
        }
    }

    pub fn badge(&self) -> Badge {
        Badge::for_level(self.current_level)
    }

    pub fn points_for_next_level(&self) -> i64 {
        points_for_next_level(self.current_level)
    }
}

/// Points needed to advance from `level` to `level + 1`.
pub fn level_cost(level: i32) -> i64 {
    let mut cost = BASE_LEVEL_COST;
    for _ in 1..level.max(1) {
        cost = cost.saturating_mul(2);
        if cost == i64::MAX {
            break;
        }
    }
    cost
}

/// Total points required to reach `level`. Reaching level 1 costs nothing.
pub fn cumulative_threshold(level: i32) -> i64 {
    let mut total: i64 = 0;
    let mut cost = BASE_LEVEL_COST;
    for _ in 1..level.clamp(1, MAX_LEVEL + 1) {
        total = total.saturating_add(cost);
        cost = cost.saturating_mul(2);
    }
    total
}

/// The level reached from level 1 with `points` cumulative points.
pub fn level_for(points: i64) -> i32 {
    let mut level = 1;
    while level < MAX_LEVEL {
        let next = cumulative_threshold(level + 1);
        if next == i64::MAX || points < next {
            break;
        }
        level += 1;
    }
    level
}

pub fn points_for_next_level(level: i32) -> i64 {
    if level >= MAX_LEVEL {
        0
    } else {
        level_cost(level)
    }
}

/// Cosmetic rank derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Badge {
    BeginnerHero,
    IntermediateHero,
    AdvancedHero,
    ProfessionalHero,
    VeteranHero,
    MasterHero,
    LegendaryHero,
}

impl Badge {
    pub fn for_level(level: i32) -> Self {
        match level {
            l if l >= 50 => Badge::LegendaryHero,
            l if l >= 40 => Badge::MasterHero,
            l if l >= 30 => Badge::VeteranHero,
            l if l >= 20 => Badge::ProfessionalHero,
            l if l >= 10 => Badge::AdvancedHero,
            l if l >= 5 => Badge::IntermediateHero,
            _ => Badge::BeginnerHero,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::BeginnerHero => "BEGINNER_HERO",
            Badge::IntermediateHero => "INTERMEDIATE_HERO",
            Badge::AdvancedHero => "ADVANCED_HERO",
            Badge::ProfessionalHero => "PROFESSIONAL_HERO",
            Badge::VeteranHero => "VETERAN_HERO",
            Badge::MasterHero => "MASTER_HERO",
            Badge::LegendaryHero => "LEGENDARY_HERO",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Highest level whose cumulative threshold fits in an i64.
    const LAST_REACHABLE: i32 = 57;

    fn stats(total_points: i64, current_level: i32) -> UserStats {
        UserStats {
            total_points,
            current_level,
            workouts_completed: 0,
        }
    }

    #[test]
    fn level_costs_double() {
        assert_eq!(level_cost(1), 100);
        assert_eq!(level_cost(2), 200);
        assert_eq!(level_cost(3), 400);
        assert_eq!(level_cost(10), 100 * 512);
        assert_eq!(level_cost(80), i64::MAX);
    }

    #[test]
    fn cumulative_thresholds() {
        assert_eq!(cumulative_threshold(1), 0);
        assert_eq!(cumulative_threshold(2), 100);
        assert_eq!(cumulative_threshold(3), 300);
        assert_eq!(cumulative_threshold(4), 700);
        assert_eq!(cumulative_threshold(5), 1_500);
        assert_eq!(cumulative_threshold(6), 3_100);
        assert!(cumulative_threshold(LAST_REACHABLE) < i64::MAX);
        assert_eq!(cumulative_threshold(LAST_REACHABLE + 1), i64::MAX);
        assert_eq!(cumulative_threshold(MAX_LEVEL), i64::MAX);
    }

    #[test]
    fn threshold_is_inclusive_for_every_reachable_level() {
        for level in 1..=LAST_REACHABLE {
            let threshold = cumulative_threshold(level);
            assert_eq!(level_for(threshold), level, "level {level}");
            if level > 1 {
                assert_eq!(level_for(threshold - 1), level - 1, "just below level {level}");
            }
        }
    }

    #[test]
    fn level_is_monotonic_in_points() {
        let mut points = 0i64;
        let mut previous = level_for(0);
        while points < i64::MAX / 3 {
            let level = level_for(points);
            assert!(level >= previous, "level dropped at {points} points");
            previous = level;
            points = points * 3 / 2 + 7;
        }
    }

    #[test]
    fn saturated_thresholds_are_never_reached() {
        assert_eq!(level_for(i64::MAX), LAST_REACHABLE);
        let capped = stats(i64::MAX - 5, LAST_REACHABLE).add_points(1_000);
        assert_eq!(capped.total_points, i64::MAX);
        assert_eq!(capped.current_level, LAST_REACHABLE);
    }

    #[test]
    fn non_positive_delta_is_a_no_op() {
        let before = stats(250, 2);
        assert_eq!(before.add_points(0), before);
        assert_eq!(before.add_points(-40), before);
    }

    #[test]
    fn first_hundred_points_reach_level_two() {
        let after = UserStats::default().add_points(100);
        assert_eq!(after.total_points, 100);
        assert_eq!(after.current_level, 2);
        assert_eq!(after.badge(), Badge::BeginnerHero);
    }

    #[test]
    fn crossing_level_five_changes_badge() {
        let short = stats(700, 4).add_points(1);
        assert_eq!(short.current_level, 4);
        assert_eq!(short.badge(), Badge::BeginnerHero);

        let after = stats(1_499, 4).add_points(1);
        assert_eq!(after.current_level, 5);
        assert_eq!(after.badge(), Badge::IntermediateHero);
    }

    #[test]
    fn large_gain_climbs_several_levels() {
        let after = UserStats::default().add_points(3_100);
        assert_eq!(after.current_level, 6);
    }

    #[test]
    fn completing_a_workout_counts_and_adds_points() {
        let after = UserStats::default().complete_workout(50);
        assert_eq!(after.total_points, 50);
        assert_eq!(after.workouts_completed, 1);
        assert_eq!(after.current_level, 1);

        let zero_point_workout = after.complete_workout(0);
        assert_eq!(zero_point_workout.workouts_completed, 2);
        assert_eq!(zero_point_workout.total_points, 50);
    }

    #[test]
    fn points_for_next_level_is_single_step_cost() {
        assert_eq!(points_for_next_level(1), 100);
        assert_eq!(points_for_next_level(4), 800);
        assert_eq!(points_for_next_level(98), i64::MAX);
        assert_eq!(points_for_next_level(MAX_LEVEL), 0);
    }

    #[test]
    fn badge_steps() {
        let cases = [
            (1, "BEGINNER_HERO"),
            (4, "BEGINNER_HERO"),
            (5, "INTERMEDIATE_HERO"),
            (10, "ADVANCED_HERO"),
            (20, "PROFESSIONAL_HERO"),
            (30, "VETERAN_HERO"),
            (40, "MASTER_HERO"),
            (49, "MASTER_HERO"),
            (50, "LEGENDARY_HERO"),
            (99, "LEGENDARY_HERO"),
        ];
        for (level, label) in cases {
            assert_eq!(Badge::for_level(level).as_str(), label, "level {level}");
        }
        let json = serde_json::to_string(&Badge::VeteranHero).unwrap();
        assert_eq!(json, "\"VETERAN_HERO\"");
        assert_eq!(Badge::MasterHero.to_string(), "MASTER_HERO");
    }

    #[test]
    fn gaining_points_never_lowers_a_stored_level() {
        let after = stats(10, 3).add_points(5);
        assert_eq!(after.current_level, 3);
    }
}
