// core/src/streak.rs
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::goals::daily_stats;
use crate::store::DocumentStore;

pub const POINTS_PER_DAY: u64 = 10;
pub const WEEK_BONUS: u64 = 50;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current_streak_days: u32,
    pub points: u64,
    /// Nyeste dag i den løpende streaken; None når streaken er 0.
    pub last_active: Option<NaiveDate>,
}

pub fn points_for(streak_days: u32) -> u64 {
    let days = u64::from(streak_days);
    days * POINTS_PER_DAY + (days / 7) * WEEK_BONUS
}

fn qualifies(store: &dyn DocumentStore, user_id: &str, day: NaiveDate, goal_m: f64) -> Result<bool> {
    Ok(match daily_stats(store, user_id, day)? {
        Some(d) => d.distance_m >= goal_m && d.distance_m > 0.0,
        None => false,
    })
}

/// Går bakover dag for dag fra `today`. Er ikke dagens mål nådd ennå,
/// starter vi fra i går – streaken lever til dagen er over.
/// Hver dag leses én gang fra lageret.
pub fn compute_streak(
    store: &dyn DocumentStore,
    user_id: &str,
    today: NaiveDate,
    goal_m: f64,
    lookback_days: u32,
) -> Result<StreakSummary> {
    let mut streak = 0u32;
    let mut last_active = None;

    if lookback_days > 0 && qualifies(store, user_id, today, goal_m)? {
        streak = 1;
        last_active = Some(today);
    }

    let mut day = today.pred_opt();
    while let Some(d) = day {
        if streak >= lookback_days || !qualifies(store, user_id, d, goal_m)? {
            break;
        }
        last_active.get_or_insert(d);
        streak += 1;
        day = d.pred_opt();
    }

    debug!("streak for {user_id} per {today}: {streak} dager");
    Ok(StreakSummary { current_streak_days: streak, points: points_for(streak), last_active })
}
