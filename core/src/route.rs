// core/src/route.rs
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::filter::FixOutcome;
use crate::geo::speed_kmh;
use crate::models::RawFix;

/// Oppsummering av en ferdig økt (lagres og vises på dashboardet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub started_at: DateTime<Utc>,
    pub points: usize,
    pub distance_m: f64,
    pub duration_s: f64,
    pub avg_speed_kmh: f64,
    /// min/km, None når distansen er 0
    pub pace_min_per_km: Option<f64>,
}

/// Bygger polylinjen av aksepterte fixes og summerer distanse.
#[derive(Debug, Clone)]
pub struct RouteRecorder {
    started_at: DateTime<Utc>,
    segments: Vec<Vec<RawFix>>,
    distance_m: f64,
    paused: bool,
}

impl RouteRecorder {
    pub fn start(started_at: DateTime<Utc>) -> Self {
        info!("rute startet {started_at}");
        Self { started_at, segments: vec![Vec::new()], distance_m: 0.0, paused: false }
    }

    /// Legger til fixen hvis utfallet er akseptert. Returnerer true ved innlegging.
    pub fn record(&mut self, outcome: &FixOutcome) -> bool {
        if self.paused {
            return false;
        }
        let Some(fix) = outcome.fix() else {
            return false;
        };
        let Some(segment) = self.segments.last_mut() else {
            return false;
        };
        if let Some(prev) = segment.last() {
            self.distance_m += prev.distance_to(fix);
        }
        segment.push(*fix);
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Nytt segment: ingen distanse over pausen.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if self.segments.last().map(|s| !s.is_empty()).unwrap_or(true) {
            self.segments.push(Vec::new());
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn segments(&self) -> &[Vec<RawFix>] {
        &self.segments
    }

    pub fn points(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Varighet = sum av tidsspenn per segment (pauser teller ikke).
    pub fn moving_secs(&self) -> f64 {
        self.segments
            .iter()
            .filter_map(|s| match (s.first(), s.last()) {
                (Some(a), Some(b)) => Some(b.timestamp_ms.saturating_sub(a.timestamp_ms).max(0) as f64 / 1000.0),
                _ => None,
            })
            .sum()
    }

    pub fn summary(&self) -> ActivitySummary {
        let duration_s = self.moving_secs();
        let pace_min_per_km = if self.distance_m > 0.0 {
            Some((duration_s / 60.0) / (self.distance_m / 1000.0))
        } else {
            None
        };
        ActivitySummary {
            started_at: self.started_at,
            points: self.points(),
            distance_m: self.distance_m,
            duration_s,
            avg_speed_kmh: speed_kmh(self.distance_m, duration_s),
            pace_min_per_km,
        }
    }

    pub fn finish(self) -> ActivitySummary {
        let summary = self.summary();
        info!(
            "rute ferdig: {} punkter, {:.0} m på {:.0} s",
            summary.points, summary.distance_m, summary.duration_s
        );
        summary
    }
}
