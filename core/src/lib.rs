pub mod api;
pub mod error;
pub mod filter;
pub mod geo;
pub mod goals;
pub mod metrics;
pub mod models;
pub mod route;
pub mod smoothing;
pub mod storage;
pub mod store;
pub mod streak;

#[cfg(feature = "python")]
mod py;

pub use api::{filter_track, filter_track_json, TrackIn, TrackOut};
pub use error::{FitTrackError, Result};
pub use filter::{evaluate, FilterConfig, FilterState, FixFilter, FixOutcome};
pub use geo::haversine_m;
pub use models::{DailyStats, Profile, RawFix};
pub use route::{ActivitySummary, RouteRecorder};
pub use storage::{load_filter_config, load_profile, save_profile};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};
pub use streak::{compute_streak, StreakSummary};
