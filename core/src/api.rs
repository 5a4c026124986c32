// core/src/api.rs
//
// JSON inn / JSON ut – brukes av Python-bindingen og fittrack-replay.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::{FilterConfig, FixFilter, FixOutcome};
use crate::models::RawFix;
use crate::route::{ActivitySummary, RouteRecorder};

#[derive(Debug, Clone, Deserialize)]
pub struct TrackIn {
    pub fixes: Vec<RawFix>,
    #[serde(default)]
    pub config: Option<FilterConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackOut {
    pub outcomes: Vec<&'static str>,
    pub accepted: Vec<RawFix>,
    pub summary: ActivitySummary,
    pub counts: BTreeMap<&'static str, usize>,
    pub report: String,
}

/// Spiller av fixes gjennom et nytt filter; fixens tidsstempel brukes som klokke.
pub fn filter_track(input: TrackIn) -> Result<TrackOut> {
    let mut filter = FixFilter::try_new(input.config.unwrap_or_default())?.with_global_metrics();

    let started_at = input
        .fixes
        .first()
        .and_then(|f| DateTime::<Utc>::from_timestamp_millis(f.timestamp_ms))
        .unwrap_or_else(Utc::now);
    let mut route = RouteRecorder::start(started_at);

    let mut counts: BTreeMap<&'static str, usize> =
        FixOutcome::LABELS.iter().map(|l| (*l, 0usize)).collect();
    let mut outcomes = Vec::with_capacity(input.fixes.len());
    let mut accepted = Vec::new();

    for fix in &input.fixes {
        let outcome = filter.filter_location(fix, fix.timestamp_ms);
        route.record(&outcome);
        if let Some(f) = outcome.fix() {
            accepted.push(*f);
        }
        *counts.entry(outcome.label()).or_default() += 1;
        outcomes.push(outcome.label());
    }

    Ok(TrackOut {
        outcomes,
        accepted,
        summary: route.finish(),
        counts,
        report: filter.stats_report(),
    })
}

pub fn filter_track_json(json_in: &str) -> Result<String> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    let input: TrackIn = serde_path_to_error::deserialize(&mut de)?;
    de.end()?;
    let out = filter_track(input)?;
    Ok(serde_json::to_string(&out)?)
}
