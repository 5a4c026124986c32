use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::DailyStats;
use crate::route::ActivitySummary;
use crate::store::{get_typed, DocumentStore};

pub const DAILY_STATS: &str = "daily_stats";

/// Fremdrift mot dagens distansemål.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub distance_m: f64,
    pub goal_m: f64,
    pub percent: f64,    // 0–100
    pub remaining_m: f64,
    pub met: bool,
}

impl GoalProgress {
    pub fn compute(distance_m: f64, goal_m: f64) -> Self {
        let distance_m = if distance_m.is_finite() { distance_m.max(0.0) } else { 0.0 };
        if goal_m.is_nan() || goal_m <= 0.0 {
            // mål ikke satt → regnes som nådd
            return Self { distance_m, goal_m, percent: 100.0, remaining_m: 0.0, met: true };
        }
        let percent = (distance_m / goal_m * 100.0).clamp(0.0, 100.0);
        Self {
            distance_m,
            goal_m,
            percent,
            remaining_m: (goal_m - distance_m).max(0.0),
            met: distance_m >= goal_m,
        }
    }
}

pub fn daily_stats(store: &dyn DocumentStore, user_id: &str, date: NaiveDate) -> Result<Option<DailyStats>> {
    get_typed(store, DAILY_STATS, &DailyStats::doc_id(user_id, date))
}

/// Legger økten til dagens dokument (opprettes ved behov). Går gjennom
/// `DocumentStore::update`, så samtidige økter for samme dag summeres begge.
pub fn record_activity(
    store: &dyn DocumentStore,
    user_id: &str,
    date: NaiveDate,
    activity: &ActivitySummary,
) -> Result<DailyStats> {
    let saved = store.update(DAILY_STATS, &DailyStats::doc_id(user_id, date), &mut |current| {
        let mut day: DailyStats = match current {
            Some(v) => serde_path_to_error::deserialize(v)?,
            None => DailyStats::empty(user_id, date),
        };
        day.distance_m += activity.distance_m;
        day.active_secs += activity.duration_s;
        day.sessions += 1;
        Ok(serde_json::to_value(&day)?)
    })?;
    let day: DailyStats = serde_path_to_error::deserialize(saved)?;

    info!(
        "økt lagret for {user_id} {date}: +{:.0} m (totalt {:.0} m, {} økter)",
        activity.distance_m, day.distance_m, day.sessions
    );
    Ok(day)
}

/// Dagens fremdrift lest fra lageret.
pub fn progress_for_day(
    store: &dyn DocumentStore,
    user_id: &str,
    date: NaiveDate,
    goal_m: f64,
) -> Result<GoalProgress> {
    let distance = daily_stats(store, user_id, date)?.map(|d| d.distance_m).unwrap_or(0.0);
    Ok(GoalProgress::compute(distance, goal_m))
}

/// Hele historikken for en bruker, eldste dag først.
pub fn user_history(store: &dyn DocumentStore, user_id: &str) -> Result<Vec<DailyStats>> {
    let docs = store.query_eq(DAILY_STATS, "user_id", &serde_json::Value::from(user_id))?;
    let mut days = docs
        .into_iter()
        .map(|d| -> Result<DailyStats> { Ok(serde_path_to_error::deserialize(d)?) })
        .collect::<Result<Vec<_>>>()?;
    days.sort_by_key(|d| d.date);
    Ok(days)
}
