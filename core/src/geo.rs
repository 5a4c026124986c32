// core/src/geo.rs
use crate::models::RawFix;

/// Midlere jordradius (m), IUGG.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Storsirkelavstand (haversine) i meter.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // clamp: avrunding kan gi a litt over 1 for antipoder
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Implisitt fart (km/t). 0 når tiden er 0 eller negativ.
#[inline]
pub fn speed_kmh(distance_m: f64, elapsed_s: f64) -> f64 {
    if elapsed_s > 0.0 { distance_m / elapsed_s * 3.6 } else { 0.0 }
}

impl RawFix {
    pub fn distance_to(&self, other: &RawFix) -> f64 {
        haversine_m(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_millidegree_latitude_is_about_111_m() {
        let d = haversine_m(10.0, 20.0, 10.001, 20.0);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_m(59.91, 10.75, 59.91, 10.75), 0.0);
    }

    #[test]
    fn speed_is_zero_without_elapsed_time() {
        assert_eq!(speed_kmh(100.0, 0.0), 0.0);
        assert!((speed_kmh(10.0, 1.0) - 36.0).abs() < 1e-9);
    }
}
