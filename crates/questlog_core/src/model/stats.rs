//! Experience points, levels and the roll-over rule.
//!
//! # Responsibility
//! - Define the singleton `UserStats` record.
//! - Own the one XP normalization rule both storage backends apply.
//!
//! # Invariants
//! - After normalization `0 <= xp < 100` and `level >= 1`.
//! - Levels only ever increase; toggling work back does not revoke XP.

use serde::{Deserialize, Serialize};

/// XP threshold converted into one level increment.
pub const XP_PER_LEVEL: i64 = 100;

/// XP awarded for creating a note.
pub const XP_NOTE_CREATED: i64 = 5;
/// XP awarded for creating a goal.
pub const XP_GOAL_CREATED: i64 = 10;
/// XP awarded when a goal update sets status to `completed`.
pub const XP_GOAL_COMPLETED: i64 = 50;
/// XP awarded when a subtask flips from open to completed.
pub const XP_SUBTASK_COMPLETED: i64 = 10;
/// XP awarded once per successful AI breakdown batch.
pub const XP_GOAL_BREAKDOWN: i64 = 20;

/// Gamification counters; a singleton record per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Remainder after roll-over, kept in `[0, XP_PER_LEVEL)`.
    pub xp: i64,
    /// Unbounded above, starts at 1.
    pub level: i64,
}

impl Default for UserStats {
    fn default() -> Self {
        Self { xp: 0, level: 1 }
    }
}

/// Adds `amount` XP and rolls every full hundred into a level increment.
///
/// # Contract
/// - `amount` must be non-negative; callers validate before reaching here.
/// - Pure: returns the normalized stats without touching storage.
pub fn apply_xp(stats: UserStats, amount: i64) -> UserStats {
    let mut xp = stats.xp + amount;
    let mut level = stats.level;
    while xp >= XP_PER_LEVEL {
        xp -= XP_PER_LEVEL;
        level += 1;
    }
    UserStats { xp, level }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_award_accumulates_without_level_up() {
        let stats = apply_xp(UserStats::default(), 5);
        assert_eq!(stats, UserStats { xp: 5, level: 1 });
    }

    #[test]
    fn roll_over_carries_remainder() {
        let stats = apply_xp(UserStats { xp: 90, level: 1 }, 45);
        assert_eq!(stats, UserStats { xp: 35, level: 2 });
    }

    #[test]
    fn large_award_rolls_over_repeatedly() {
        let stats = apply_xp(UserStats { xp: 10, level: 3 }, 250);
        assert_eq!(stats, UserStats { xp: 60, level: 5 });
    }

    #[test]
    fn exact_threshold_leaves_zero_remainder() {
        let stats = apply_xp(UserStats { xp: 50, level: 1 }, 50);
        assert_eq!(stats, UserStats { xp: 0, level: 2 });
    }

    #[test]
    fn zero_award_is_identity() {
        let stats = UserStats { xp: 42, level: 7 };
        assert_eq!(apply_xp(stats, 0), stats);
    }
}
