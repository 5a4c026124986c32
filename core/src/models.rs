use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Én rå posisjonsrapport fra lokasjonskilden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFixIn")]
pub struct RawFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: f32,  // radius (m)
    pub timestamp_ms: i64,
    pub has_accuracy: bool,
    pub altitude_m: Option<f64>,
    pub bearing_deg: Option<f32>,
    pub speed_ms: Option<f32>,
}

// Tolerant inngang: mangler accuracy_m → has_accuracy = false
#[derive(Deserialize)]
struct RawFixIn {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    accuracy_m: Option<f32>,
    timestamp_ms: i64,
    #[serde(default)]
    has_accuracy: Option<bool>,
    #[serde(default)]
    altitude_m: Option<f64>,
    #[serde(default)]
    bearing_deg: Option<f32>,
    #[serde(default)]
    speed_ms: Option<f32>,
}

impl From<RawFixIn> for RawFix {
    fn from(r: RawFixIn) -> Self {
        Self {
            latitude: r.latitude,
            longitude: r.longitude,
            accuracy_m: r.accuracy_m.unwrap_or(0.0),
            timestamp_ms: r.timestamp_ms,
            has_accuracy: r.accuracy_m.is_some() && r.has_accuracy.unwrap_or(true),
            altitude_m: r.altitude_m,
            bearing_deg: r.bearing_deg,
            speed_ms: r.speed_ms,
        }
    }
}

impl RawFix {
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f32, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
            timestamp_ms,
            has_accuracy: true,
            altitude_m: None,
            bearing_deg: None,
            speed_ms: None,
        }
    }

    /// Fix uten nøyaktighetsestimat (enkelte providere leverer slike).
    pub fn without_accuracy(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            accuracy_m: 0.0,
            has_accuracy: false,
            ..Self::new(latitude, longitude, 0.0, timestamp_ms)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub display_name: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub daily_distance_goal_m: f64,
    pub daily_water_goal_ml: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            display_name: None,
            weight_kg: None,
            height_cm: None,
            daily_distance_goal_m: 5_000.0,
            daily_water_goal_ml: None,
        }
    }
}

/// Dagsdokument i lageret (én per bruker per dag).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub distance_m: f64,
    #[serde(default)]
    pub active_secs: f64,
    #[serde(default)]
    pub sessions: u32,
}

impl DailyStats {
    pub fn empty(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            distance_m: 0.0,
            active_secs: 0.0,
            sessions: 0,
        }
    }

    /// Dokument-id i `daily_stats`-samlingen.
    pub fn doc_id(user_id: &str, date: NaiveDate) -> String {
        format!("{user_id}:{date}")
    }
}
