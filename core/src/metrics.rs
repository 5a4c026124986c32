use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, IntGauge, Opts, Registry};

use crate::filter::FixOutcome;

/// Prosess-global registry for FitTrack-metrikker.
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static GLOBAL_FILTER_METRICS: Lazy<Option<FilterMetrics>> = Lazy::new(|| {
    match FilterMetrics::register(&REGISTRY) {
        Ok(m) => Some(m),
        Err(e) => {
            log::warn!("kunne ikke registrere filter-metrikker: {e}");
            None
        }
    }
});

/// Tellere for filterutfall.
#[derive(Clone)]
pub struct FilterMetrics {
    outcomes: IntCounterVec,
    stationary: IntGauge,
}

impl std::fmt::Debug for FilterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterMetrics")
            .field("stationary", &self.stationary.get())
            .finish_non_exhaustive()
    }
}

impl FilterMetrics {
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let outcomes = IntCounterVec::new(
            Opts::new("fittrack_fix_outcomes_total", "GPS fixes per filter outcome"),
            &["outcome"],
        )?;
        let stationary = IntGauge::new(
            "fittrack_consecutive_stationary",
            "Consecutive fixes inside the stationary radius",
        )?;
        registry.register(Box::new(outcomes.clone()))?;
        registry.register(Box::new(stationary.clone()))?;
        Ok(Self { outcomes, stationary })
    }

    /// Delt instans registrert i `REGISTRY` (None hvis registrering feilet).
    pub fn global() -> Option<&'static FilterMetrics> {
        GLOBAL_FILTER_METRICS.as_ref()
    }

    pub fn observe(&self, outcome: &FixOutcome, stationary_count: u32) {
        self.outcomes.with_label_values(&[outcome.label()]).inc();
        self.stationary.set(i64::from(stationary_count));
    }

    pub fn count(&self, label: &str) -> u64 {
        self.outcomes.with_label_values(&[label]).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_registration_fails() {
        let r = Registry::new();
        assert!(FilterMetrics::register(&r).is_ok());
        assert!(FilterMetrics::register(&r).is_err());
    }
}
