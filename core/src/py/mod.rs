use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use serde_json as json;
use serde_path_to_error as spte;

use crate::filter::{FilterConfig, FixFilter};
use crate::models::RawFix;

fn value_err(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_fix(json_in: &str) -> PyResult<RawFix> {
    let mut de = json::Deserializer::from_str(json_in);
    let fix: RawFix = spte::deserialize(&mut de)
        .map_err(|e| PyValueError::new_err(format!("parse error (RawFix) at {}: {}", e.path(), e)))?;
    de.end().map_err(value_err)?;
    Ok(fix)
}

// ──────────────────────────────────────────────────────────────────────────────
// Filter-klasse (én per sporingsøkt)
// ──────────────────────────────────────────────────────────────────────────────

#[pyclass(name = "FixFilter")]
pub struct PyFixFilter {
    inner: FixFilter,
}

#[pymethods]
impl PyFixFilter {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(s) => {
                let mut de = json::Deserializer::from_str(s);
                let cfg: FilterConfig = spte::deserialize(&mut de).map_err(|e| {
                    PyValueError::new_err(format!("parse error (FilterConfig) at {}: {}", e.path(), e))
                })?;
                de.end().map_err(value_err)?;
                cfg
            }
            None => FilterConfig::default(),
        };
        let inner = FixFilter::try_new(config).map_err(value_err)?.with_global_metrics();
        Ok(Self { inner })
    }

    /// Returnerer utfallets label; aksepterte fixes hentes med `last_fix_json`.
    fn filter_location(&mut self, fix_json: &str, now_ms: i64) -> PyResult<&'static str> {
        let fix = parse_fix(fix_json)?;
        Ok(self.inner.filter_location(&fix, now_ms).label())
    }

    fn last_fix_json(&self) -> PyResult<Option<String>> {
        self.inner
            .last_fix()
            .map(|f| json::to_string(f).map_err(value_err))
            .transpose()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn is_moving(&self) -> bool {
        self.inner.is_moving()
    }

    fn stats_report(&self) -> String {
        self.inner.stats_report()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pyfunction]
fn filter_track_json(json_in: &str) -> PyResult<String> {
    crate::api::filter_track_json(json_in).map_err(value_err)
}

#[pymodule]
fn fittrack_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(filter_track_json, m)?)?;
    m.add_class::<PyFixFilter>()?;
    Ok(())
}
