use crate::error::EngineError;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, EngineError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(EngineError::validation("lat", format!("invalid latitude {lat}")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(EngineError::validation("lng", format!("invalid longitude {lng}")));
        }
        Ok(Self { lat, lng })
    }

    /// Round both axes to `precision` decimals so nearby requests share a
    /// cache key.
    pub fn rounded(&self, precision: u32) -> (i64, i64) {
        let scale = 10_f64.powi(precision as i32);
        ((self.lat * scale).round() as i64, (self.lng * scale).round() as i64)
    }

    /// Great-circle distance in kilometers (haversine).
    pub fn haversine_km(&self, other: &Coordinates) -> f64 {
        let (lat1, lon1) = (self.lat.to_radians(), self.lng.to_radians());
        let (lat2, lon2) = (other.lat.to_radians(), other.lng.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let sin_dlat = (dlat * 0.5).sin();
        let sin_dlon = (dlon * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_KM * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-4.05, 39.66).is_ok());
    }

    #[test]
    fn rounding_collapses_nearby_points() {
        let a = Coordinates::new(-4.043740, 39.668207).unwrap();
        let b = Coordinates::new(-4.043744, 39.668211).unwrap();
        assert_eq!(a.rounded(4), b.rounded(4));
        assert_ne!(a.rounded(6), b.rounded(6));
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Nairobi CBD to Westlands, roughly 3.4 km as the crow flies.
        let cbd = Coordinates::new(-1.28333, 36.81667).unwrap();
        let westlands = Coordinates::new(-1.26361, 36.80222).unwrap();
        let d = cbd.haversine_km(&westlands);
        assert!((2.0..5.0).contains(&d), "got {d}");
    }

    #[test]
    fn haversine_is_zero_for_same_point() {
        let p = Coordinates::new(10.0, 10.0).unwrap();
        assert!(p.haversine_km(&p) < 1e-9);
    }
}
