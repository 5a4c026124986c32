// core/src/filter.rs
//
// Heuristisk GPS-filter: avgjør fix for fix om en rå posisjon er ekte
// bevegelse som skal inn i ruten, eller støy (drift, multipath, stillstand).

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{FitTrackError, Result};
use crate::geo::speed_kmh;
use crate::metrics::FilterMetrics;
use crate::models::RawFix;
use crate::smoothing::WeightedWindow;

// ──────────────────────────────────────────────────────────────────────────────
// Konfig
// ──────────────────────────────────────────────────────────────────────────────

/// Terskler, faste etter konstruksjon. `Default` gir referanseverdiene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_accuracy_m: f64,
    pub max_accuracy_first_fix_m: f64,
    pub min_distance_m: f64,
    pub max_speed_kmh: f64,
    pub min_time_interval_ms: i64,
    pub stationary_radius_m: f64,
    pub max_stationary_count: u32,
    pub significant_movement_m: f64,
    pub smoothing_window_size: usize,
    pub min_consecutive_valid_readings: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_accuracy_m: 15.0,
            max_accuracy_first_fix_m: 10.0,
            min_distance_m: 8.0,
            max_speed_kmh: 30.0,
            min_time_interval_ms: 3_000,
            stationary_radius_m: 12.0,
            max_stationary_count: 8,
            significant_movement_m: 15.0,
            smoothing_window_size: 3,
            min_consecutive_valid_readings: 3,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        let meters = [
            ("min_accuracy_m", self.min_accuracy_m),
            ("max_accuracy_first_fix_m", self.max_accuracy_first_fix_m),
            ("min_distance_m", self.min_distance_m),
            ("max_speed_kmh", self.max_speed_kmh),
            ("stationary_radius_m", self.stationary_radius_m),
            ("significant_movement_m", self.significant_movement_m),
        ];
        for (name, v) in meters {
            if !v.is_finite() || v < 0.0 {
                return Err(FitTrackError::InvalidConfig(format!(
                    "{name} must be a finite, non-negative number (got {v})"
                )));
            }
        }
        if self.min_time_interval_ms < 0 {
            return Err(FitTrackError::InvalidConfig(format!(
                "min_time_interval_ms must be >= 0 (got {})",
                self.min_time_interval_ms
            )));
        }
        if self.smoothing_window_size == 0 {
            return Err(FitTrackError::InvalidConfig(
                "smoothing_window_size must be at least 1".into(),
            ));
        }
        if self.max_stationary_count == 0 || self.min_consecutive_valid_readings == 0 {
            return Err(FitTrackError::InvalidConfig(
                "max_stationary_count and min_consecutive_valid_readings must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Utfall
// ──────────────────────────────────────────────────────────────────────────────

/// Lukket sett av utfall. Kun de to ACCEPTED-variantene bærer en fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    RejectedLowAccuracy,
    RejectedTimeInterval,
    RejectedSmallDistance,
    RejectedHighSpeed,
    RejectedStationary,
    AcceptedFirstLocation(RawFix),
    AcceptedAndSmoothed(RawFix),
}

impl FixOutcome {
    pub const LABELS: [&'static str; 7] = [
        "rejected_low_accuracy",
        "rejected_time_interval",
        "rejected_small_distance",
        "rejected_high_speed",
        "rejected_stationary",
        "accepted_first_location",
        "accepted_and_smoothed",
    ];

    pub fn is_accepted(&self) -> bool {
        self.fix().is_some()
    }

    pub fn fix(&self) -> Option<&RawFix> {
        match self {
            FixOutcome::AcceptedFirstLocation(f) | FixOutcome::AcceptedAndSmoothed(f) => Some(f),
            _ => None,
        }
    }

    /// Stabilt navn for logg, metrikker og JSON.
    pub fn label(&self) -> &'static str {
        let idx = match self {
            FixOutcome::RejectedLowAccuracy => 0,
            FixOutcome::RejectedTimeInterval => 1,
            FixOutcome::RejectedSmallDistance => 2,
            FixOutcome::RejectedHighSpeed => 3,
            FixOutcome::RejectedStationary => 4,
            FixOutcome::AcceptedFirstLocation(_) => 5,
            FixOutcome::AcceptedAndSmoothed(_) => 6,
        };
        Self::LABELS[idx]
    }
}

impl fmt::Display for FixOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Tilstand
// ──────────────────────────────────────────────────────────────────────────────

/// Tilstand for én sporingsøkt. Eies av én filterinstans.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub last_valid_fix: Option<RawFix>,
    pub last_accepted_at_ms: i64,
    pub consecutive_stationary_count: u32,
    pub consecutive_valid_readings: u32,
    pub smoothing: WeightedWindow,
    pub total_rejected_since_last_accept: u64,
}

impl FilterState {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            last_valid_fix: None,
            last_accepted_at_ms: 0,
            consecutive_stationary_count: 0,
            consecutive_valid_readings: 0,
            smoothing: WeightedWindow::with_capacity(config.smoothing_window_size),
            total_rejected_since_last_accept: 0,
        }
    }

    /// Tilbake til "ingen fix ennå" uten ny allokering av vinduet.
    pub fn reset(&mut self) {
        self.last_valid_fix = None;
        self.last_accepted_at_ms = 0;
        self.consecutive_stationary_count = 0;
        self.consecutive_valid_readings = 0;
        self.smoothing.clear();
        self.total_rejected_since_last_accept = 0;
    }

    fn reject(&mut self, outcome: FixOutcome) -> FixOutcome {
        self.total_rejected_since_last_accept += 1;
        outcome
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Overgang
// ──────────────────────────────────────────────────────────────────────────────

/// Ren overgang: tar tilstanden, returnerer neste tilstand og utfallet.
pub fn evaluate(
    state: FilterState,
    fix: &RawFix,
    now_ms: i64,
    config: &FilterConfig,
) -> (FilterState, FixOutcome) {
    let mut state = state;
    let outcome = step(&mut state, fix, now_ms, config);
    (state, outcome)
}

/// Samme overgang som `evaluate`, men på lånt tilstand.
pub fn step(state: &mut FilterState, fix: &RawFix, now_ms: i64, cfg: &FilterConfig) -> FixOutcome {
    // Avvisning i steg 1–3 rører ikke debounce-telleren; kun steg 6–8 nullstiller.

    // 1) mangler nøyaktighet
    if !fix.has_accuracy || !fix.accuracy_m.is_finite() {
        debug!("fix avvist: mangler nøyaktighet");
        return state.reject(FixOutcome::RejectedLowAccuracy);
    }

    // 2) nøyaktighet – strengere for første fix
    let bound = if state.last_valid_fix.is_none() {
        cfg.max_accuracy_first_fix_m
    } else {
        cfg.min_accuracy_m
    };
    if f64::from(fix.accuracy_m) > bound {
        debug!("fix avvist: nøyaktighet {:.1} m > {:.1} m", fix.accuracy_m, bound);
        return state.reject(FixOutcome::RejectedLowAccuracy);
    }

    // 3) tidsport (ikke for første fix)
    let prev = state.last_valid_fix;
    let last = match prev {
        Some(last) => {
            let since = now_ms.saturating_sub(state.last_accepted_at_ms);
            if since < cfg.min_time_interval_ms {
                debug!("fix avvist: {since} ms siden forrige (< {} ms)", cfg.min_time_interval_ms);
                return state.reject(FixOutcome::RejectedTimeInterval);
            }
            last
        }
        None => {
            // 4) første fix i økten
            state.last_valid_fix = Some(*fix);
            state.last_accepted_at_ms = now_ms;
            state.consecutive_stationary_count = 0;
            state.consecutive_valid_readings = 0;
            state.smoothing.seed(*fix);
            state.total_rejected_since_last_accept = 0;
            info!(
                "første posisjon akseptert: {:.6}, {:.6} (±{:.1} m)",
                fix.latitude, fix.longitude, fix.accuracy_m
            );
            return FixOutcome::AcceptedFirstLocation(*fix);
        }
    };

    // 5) avstand, tid og implisitt fart
    let distance = last.distance_to(fix);
    let elapsed_s = now_ms.saturating_sub(state.last_accepted_at_ms) as f64 / 1000.0;
    let speed = speed_kmh(distance, elapsed_s);

    // 6) urealistisk fart
    if speed > cfg.max_speed_kmh {
        state.consecutive_valid_readings = 0;
        debug!("fix avvist: {speed:.1} km/t > {:.1} km/t ({distance:.1} m)", cfg.max_speed_kmh);
        return state.reject(FixOutcome::RejectedHighSpeed);
    }

    // 7) stillstand
    if distance <= cfg.stationary_radius_m {
        state.consecutive_stationary_count += 1;
        if state.consecutive_stationary_count >= cfg.max_stationary_count {
            state.consecutive_valid_readings = 0;
            debug!(
                "fix avvist: stillestående ({} på rad innen {:.1} m)",
                state.consecutive_stationary_count, cfg.stationary_radius_m
            );
            return state.reject(FixOutcome::RejectedStationary);
        }
    } else if distance >= cfg.significant_movement_m {
        state.consecutive_stationary_count = 0;
    }

    // 8) minsteavstand
    if distance < cfg.min_distance_m {
        state.consecutive_valid_readings = 0;
        debug!("fix avvist: {distance:.1} m < {:.1} m", cfg.min_distance_m);
        return state.reject(FixOutcome::RejectedSmallDistance);
    }

    // 9) debounce – fremdrift beholdes ved avvisning
    state.consecutive_valid_readings += 1;
    if state.consecutive_valid_readings < cfg.min_consecutive_valid_readings {
        debug!(
            "fix avvist: {}/{} gyldige på rad",
            state.consecutive_valid_readings, cfg.min_consecutive_valid_readings
        );
        return state.reject(FixOutcome::RejectedSmallDistance);
    }

    // 10) glatting
    state.smoothing.push(*fix);
    let smoothed = state.smoothing.weighted_average().unwrap_or(*fix);

    // 11) glatting kan spise opp en marginal bevegelse
    let smoothed_distance = last.distance_to(&smoothed);
    if smoothed_distance < cfg.min_distance_m {
        debug!("fix avvist: glattet avstand {smoothed_distance:.1} m < {:.1} m", cfg.min_distance_m);
        return state.reject(FixOutcome::RejectedSmallDistance);
    }

    // 12) aksepter
    state.last_valid_fix = Some(smoothed);
    state.last_accepted_at_ms = now_ms;
    state.total_rejected_since_last_accept = 0;
    info!(
        "posisjon akseptert: {:.6}, {:.6} ({smoothed_distance:.1} m, {speed:.1} km/t)",
        smoothed.latitude, smoothed.longitude
    );
    FixOutcome::AcceptedAndSmoothed(smoothed)
}

// ──────────────────────────────────────────────────────────────────────────────
// Fasade
// ──────────────────────────────────────────────────────────────────────────────

/// Stateful filter for én lokasjonsstrøm. Ingen intern synkronisering:
/// kalleren må serialisere tilgang hvis fixes kommer fra flere tråder.
#[derive(Debug, Clone)]
pub struct FixFilter {
    config: FilterConfig,
    state: FilterState,
    metrics: Option<FilterMetrics>,
    total_accepted: u64,
    total_rejected: u64,
}

impl Default for FixFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl FixFilter {
    pub fn new(config: FilterConfig) -> Self {
        let state = FilterState::new(&config);
        Self { config, state, metrics: None, total_accepted: 0, total_rejected: 0 }
    }

    /// Som `new`, men validerer tersklene først.
    pub fn try_new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_metrics(mut self, metrics: FilterMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Kobler på de prosess-globale tellerne i `metrics::REGISTRY`, hvis de finnes.
    pub fn with_global_metrics(self) -> Self {
        match FilterMetrics::global() {
            Some(m) => self.with_metrics(m.clone()),
            None => self,
        }
    }

    pub fn filter_location(&mut self, fix: &RawFix, now_ms: i64) -> FixOutcome {
        let outcome = step(&mut self.state, fix, now_ms, &self.config);
        if outcome.is_accepted() {
            self.total_accepted += 1;
        } else {
            self.total_rejected += 1;
        }
        if let Some(m) = &self.metrics {
            m.observe(&outcome, self.state.consecutive_stationary_count);
        }
        outcome
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.total_accepted = 0;
        self.total_rejected = 0;
        debug!("GPS-filter nullstilt");
    }

    pub fn is_moving(&self) -> bool {
        self.state.consecutive_stationary_count < self.config.max_stationary_count
    }

    pub fn last_fix(&self) -> Option<&RawFix> {
        self.state.last_valid_fix.as_ref()
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn stats_report(&self) -> String {
        self.to_string()
    }
}

fn fmt_ts(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        None => format!("{ms} ms"),
    }
}

impl fmt::Display for FixFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.state;
        let c = &self.config;

        writeln!(f, "=== GPS filter ===")?;
        match &s.last_valid_fix {
            Some(fix) => writeln!(
                f,
                "last fix:                 {:.6}, {:.6} (±{:.1} m) @ {}",
                fix.latitude,
                fix.longitude,
                fix.accuracy_m,
                fmt_ts(fix.timestamp_ms)
            )?,
            None => writeln!(f, "last fix:                 none")?,
        }
        if s.last_valid_fix.is_some() {
            writeln!(f, "last accepted at:         {}", fmt_ts(s.last_accepted_at_ms))?;
        }
        writeln!(f, "moving:                   {}", if self.is_moving() { "yes" } else { "no" })?;
        writeln!(
            f,
            "stationary count:         {}/{}",
            s.consecutive_stationary_count, c.max_stationary_count
        )?;
        writeln!(
            f,
            "valid readings in a row:  {}/{}",
            s.consecutive_valid_readings, c.min_consecutive_valid_readings
        )?;
        writeln!(
            f,
            "smoothing buffer:         {}/{}",
            s.smoothing.len(),
            s.smoothing.capacity()
        )?;
        writeln!(f, "rejected since accept:    {}", s.total_rejected_since_last_accept)?;
        writeln!(
            f,
            "session totals:           {} accepted, {} rejected",
            self.total_accepted, self.total_rejected
        )?;
        writeln!(f, "--- thresholds ---")?;
        writeln!(f, "min accuracy:             {:.1} m", c.min_accuracy_m)?;
        writeln!(f, "max accuracy (first fix): {:.1} m", c.max_accuracy_first_fix_m)?;
        writeln!(f, "min distance:             {:.1} m", c.min_distance_m)?;
        writeln!(f, "max speed:                {:.1} km/h", c.max_speed_kmh)?;
        writeln!(f, "min time interval:        {} ms", c.min_time_interval_ms)?;
        writeln!(f, "stationary radius:        {:.1} m", c.stationary_radius_m)?;
        writeln!(f, "significant movement:     {:.1} m", c.significant_movement_m)?;
        write!(f, "smoothing window:         {}", c.smoothing_window_size)
    }
}
