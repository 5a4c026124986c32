use std::path::Path;

use log::{info, warn};

use crate::error::Result;
use crate::filter::FilterConfig;
use crate::models::Profile;

/// Leser inn profil fra disk (JSON).
/// Hvis filen ikke finnes, returneres en default-profil.
pub fn load_profile(path: impl AsRef<Path>) -> Result<Profile> {
    let path = path.as_ref();
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let mut de = serde_json::Deserializer::from_str(&contents);
        let profile: Profile = serde_path_to_error::deserialize(&mut de)?;
        de.end()?;
        info!(
            "profil lastet fra {} (mål={:.0} m)",
            path.display(),
            profile.daily_distance_goal_m
        );
        Ok(profile)
    } else {
        warn!("fant ikke profil på {}, returnerer default", path.display());
        Ok(Profile::default())
    }
}

/// Lagrer profil til disk som JSON (pretty-print).
pub fn save_profile(profile: &Profile, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, json)?;
    info!("profil lagret til {}", path.display());
    Ok(())
}

/// Filterterskler fra JSON. Manglende fil → referanseverdier;
/// manglende felt → default for feltet. Resultatet valideres.
pub fn load_filter_config(path: impl AsRef<Path>) -> Result<FilterConfig> {
    let path = path.as_ref();
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let mut de = serde_json::Deserializer::from_str(&contents);
        let cfg: FilterConfig = serde_path_to_error::deserialize(&mut de)?;
        de.end()?;
        info!("filterkonfig lastet fra {}", path.display());
        cfg
    } else {
        warn!("fant ikke filterkonfig på {}, bruker standardterskler", path.display());
        FilterConfig::default()
    };
    config.validate()?;
    Ok(config)
}
