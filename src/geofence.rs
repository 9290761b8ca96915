use crate::config::Config;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Circular boundary around the office point used to validate that a
/// check-in happened on-site.
#[derive(Debug, Clone, Copy)]
pub struct Geofence {
    lat: f64,
    lng: f64,
    radius_m: f64,
}

impl Geofence {
    pub fn new(lat: f64, lng: f64, radius_m: f64) -> Self {
        Self { lat, lng, radius_m }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.office_lat, config.office_lng, config.geofence_radius_m)
    }

    /// Fails closed: a missing coordinate is out of bounds, not an error.
    pub fn is_within_office(&self, lat: Option<f64>, lng: Option<f64>) -> bool {
        match (lat, lng) {
            (Some(lat), Some(lng)) => self.contains(lat, lng),
            _ => false,
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        haversine_distance_m(lat, lng, self.lat, self.lng) <= self.radius_m
    }
}

/// Great-circle distance in meters between two coordinate pairs.
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> Geofence {
        Geofence::from_config(&Config::default())
    }

    #[test]
    fn one_degree_of_longitude_at_equator_is_about_111_km() {
        let d = haversine_distance_m(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn office_point_itself_is_within_bounds() {
        let config = Config::default();
        assert!(office().is_within_office(Some(config.office_lat), Some(config.office_lng)));
    }

    #[test]
    fn point_beyond_radius_is_out_of_bounds() {
        // Roughly 550 km north of the office, far past the 50 km demo radius.
        let config = Config::default();
        assert!(!office().is_within_office(Some(config.office_lat + 5.0), Some(config.office_lng)));
    }

    #[test]
    fn missing_coordinates_fail_closed() {
        let config = Config::default();
        assert!(!office().is_within_office(None, Some(config.office_lng)));
        assert!(!office().is_within_office(Some(config.office_lat), None));
        assert!(!office().is_within_office(None, None));
    }

    #[test]
    fn tight_radius_rejects_nearby_point() {
        let fence = Geofence::new(0.0, 0.0, 100.0);
        assert!(fence.contains(0.0, 0.0));
        // ~111 m east of the center.
        assert!(!fence.contains(0.0, 0.001));
    }
}
