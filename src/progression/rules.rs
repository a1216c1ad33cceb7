//! Achievement rules and the evaluator that decides what a user has earned.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use super::leveling::UserStats;
use crate::achievements::repo_types::{Achievement, AchievementKind};

/// Stats captured once before an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub stats: UserStats,
    pub distinct_completed_exercises: i64,
}

/// Unlock condition of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    WorkoutCount(i64),
    TotalPoints(i64),
    LevelReached(i64),
    DistinctExercises(i64),
    /// Needs an explicit grant; never satisfied by stats alone.
    Manual(AchievementKind),
    /// Automatic kind stored without a required value.
    Unconfigured(AchievementKind),
}

impl Rule {
    pub fn new(kind: AchievementKind, required: Option<i64>) -> Self {
        match (kind, required) {
            (AchievementKind::WorkoutCount, Some(n)) => Rule::WorkoutCount(n),
            (AchievementKind::TotalPoints, Some(n)) => Rule::TotalPoints(n),
            (AchievementKind::LevelReached, Some(n)) => Rule::LevelReached(n),
            (AchievementKind::CategoryMaster, Some(n)) => Rule::DistinctExercises(n),
            (k, _) if !k.is_automatic() => Rule::Manual(k),
            (k, _) => Rule::Unconfigured(k),
        }
    }

    pub fn of(achievement: &Achievement) -> Self {
        Self::new(achievement.kind, achievement.required_value)
    }

    pub fn is_satisfied(&self, snapshot: &ProgressSnapshot) -> bool {
        let stats = &snapshot.stats;
        match *self {
            Rule::WorkoutCount(n) => stats.workouts_completed >= n,
            Rule::TotalPoints(n) => stats.total_points >= n,
            Rule::LevelReached(n) => i64::from(stats.current_level) >= n,
            Rule::DistinctExercises(n) => snapshot.distinct_completed_exercises >= n,
            Rule::Manual(_) | Rule::Unconfigured(_) => false,
        }
    }

    /// Value recorded on the unlock record for progress display.
    pub fn progress_value(&self, snapshot: &ProgressSnapshot) -> Option<i64> {
        let stats = &snapshot.stats;
        match self {
            Rule::WorkoutCount(_) => Some(stats.workouts_completed),
            Rule::TotalPoints(_) => Some(stats.total_points),
            Rule::LevelReached(_) => Some(i64::from(stats.current_level)),
            Rule::DistinctExercises(_) => Some(snapshot.distinct_completed_exercises),
            Rule::Manual(_) | Rule::Unconfigured(_) => None,
        }
    }
}

/// Active, not yet unlocked catalog entries satisfied by `snapshot`.
///
/// Every rule is checked against the same snapshot, so the result does not
/// depend on catalog order and rewards granted afterwards are not read back.
pub fn evaluate<'a>(
    snapshot: &ProgressSnapshot,
    catalog: &'a [Achievement],
    already_unlocked: &HashSet<Uuid>,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| a.is_active && !already_unlocked.contains(&a.id))
        .filter(|a| {
            let rule = Rule::of(a);
            match rule {
                Rule::Manual(kind) => {
                    debug!(achievement = %a.name, ?kind, "skipping manual achievement");
                    false
                }
                Rule::Unconfigured(kind) => {
                    debug!(achievement = %a.name, ?kind, "achievement has no required value");
                    false
                }
                _ => rule.is_satisfied(snapshot),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::store::fixtures::achievement;

    fn snapshot(points: i64, level: i32, workouts: i64, distinct: i64) -> ProgressSnapshot {
        ProgressSnapshot {
            stats: UserStats {
                total_points: points,
                current_level: level,
                workouts_completed: workouts,
            },
            distinct_completed_exercises: distinct,
        }
    }

    fn ids(found: &[&Achievement]) -> HashSet<Uuid> {
        found.iter().map(|a| a.id).collect()
    }

    #[test]
    fn each_automatic_kind_checks_its_own_stat() {
        let s = snapshot(1_000, 4, 3, 2);
        assert!(Rule::new(AchievementKind::WorkoutCount, Some(3)).is_satisfied(&s));
        assert!(!Rule::new(AchievementKind::WorkoutCount, Some(4)).is_satisfied(&s));
        assert!(Rule::new(AchievementKind::TotalPoints, Some(1_000)).is_satisfied(&s));
        assert!(!Rule::new(AchievementKind::TotalPoints, Some(1_001)).is_satisfied(&s));
        assert!(Rule::new(AchievementKind::LevelReached, Some(4)).is_satisfied(&s));
        assert!(!Rule::new(AchievementKind::LevelReached, Some(5)).is_satisfied(&s));
        assert!(Rule::new(AchievementKind::CategoryMaster, Some(2)).is_satisfied(&s));
        assert!(!Rule::new(AchievementKind::CategoryMaster, Some(3)).is_satisfied(&s));
    }

    #[test]
    fn manual_and_unconfigured_rules_never_fire() {
        let s = snapshot(i64::MAX, 57, i64::MAX, i64::MAX);
        let consecutive = Rule::new(AchievementKind::ConsecutiveDays, Some(1));
        let specific = Rule::new(AchievementKind::SpecificExercise, None);
        let unconfigured = Rule::new(AchievementKind::TotalPoints, None);
        assert_eq!(consecutive, Rule::Manual(AchievementKind::ConsecutiveDays));
        assert_eq!(unconfigured, Rule::Unconfigured(AchievementKind::TotalPoints));
        assert!(!consecutive.is_satisfied(&s));
        assert!(!specific.is_satisfied(&s));
        assert!(!unconfigured.is_satisfied(&s));
    }

    #[test]
    fn skips_inactive_and_already_unlocked_entries() {
        let first = achievement("First Win", AchievementKind::WorkoutCount, Some(1), 50);
        let mut retired = achievement("Retired", AchievementKind::WorkoutCount, Some(1), 50);
        retired.is_active = false;
        let owned = achievement("Owned", AchievementKind::WorkoutCount, Some(1), 50);
        let catalog = vec![first.clone(), retired, owned.clone()];

        let unlocked = HashSet::from([owned.id]);
        let found = evaluate(&snapshot(50, 1, 1, 1), &catalog, &unlocked);
        assert_eq!(ids(&found), HashSet::from([first.id]));
    }

    #[test]
    fn result_does_not_depend_on_catalog_order() {
        let catalog = vec![
            achievement("One", AchievementKind::WorkoutCount, Some(1), 50),
            achievement("Ten", AchievementKind::WorkoutCount, Some(10), 100),
            achievement("Hundred Points", AchievementKind::TotalPoints, Some(100), 50),
            achievement("Level 2", AchievementKind::LevelReached, Some(2), 100),
            achievement("Explorer", AchievementKind::CategoryMaster, Some(3), 75),
            achievement("Streak", AchievementKind::ConsecutiveDays, Some(3), 75),
        ];
        let mut reversed = catalog.clone();
        reversed.reverse();
        let s = snapshot(150, 2, 1, 3);

        let forward = ids(&evaluate(&s, &catalog, &HashSet::new()));
        let backward = ids(&evaluate(&s, &reversed, &HashSet::new()));
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 4);
    }

    #[test]
    fn progress_value_reports_the_checked_stat() {
        let s = snapshot(300, 3, 7, 5);
        assert_eq!(Rule::WorkoutCount(1).progress_value(&s), Some(7));
        assert_eq!(Rule::TotalPoints(1).progress_value(&s), Some(300));
        assert_eq!(Rule::LevelReached(1).progress_value(&s), Some(3));
        assert_eq!(Rule::DistinctExercises(1).progress_value(&s), Some(5));
        assert_eq!(
            Rule::Manual(AchievementKind::SpecificExercise).progress_value(&s),
            None
        );
    }
}
