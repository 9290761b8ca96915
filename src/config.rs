use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

// Demo office deployment values, overridable from the environment.
const DEFAULT_OFFICE_LAT: &str = "9.99727368641802";
const DEFAULT_OFFICE_LNG: &str = "77.45770896724405";
const DEFAULT_GEOFENCE_RADIUS_M: &str = "50000";
const DEFAULT_LATE_CUTOFF: &str = "09:00";

#[derive(Clone, Debug)]
pub struct Config {
    pub office_lat: f64,
    pub office_lng: f64,
    /// Geofence radius around the office point, in meters.
    pub geofence_radius_m: f64,
    /// Check-ins strictly after this time of day count as late.
    pub late_cutoff: NaiveTime,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            office_lat: env::var("OFFICE_LAT")
                .unwrap_or_else(|_| DEFAULT_OFFICE_LAT.to_string())
                .parse()
                .expect("OFFICE_LAT must be a number"),
            office_lng: env::var("OFFICE_LNG")
                .unwrap_or_else(|_| DEFAULT_OFFICE_LNG.to_string())
                .parse()
                .expect("OFFICE_LNG must be a number"),
            geofence_radius_m: env::var("GEOFENCE_RADIUS_M")
                .unwrap_or_else(|_| DEFAULT_GEOFENCE_RADIUS_M.to_string())
                .parse()
                .expect("GEOFENCE_RADIUS_M must be a number"),
            late_cutoff: NaiveTime::parse_from_str(
                &env::var("LATE_CUTOFF").unwrap_or_else(|_| DEFAULT_LATE_CUTOFF.to_string()),
                "%H:%M",
            )
            .expect("LATE_CUTOFF must be HH:MM"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            office_lat: DEFAULT_OFFICE_LAT.parse().expect("default office lat"),
            office_lng: DEFAULT_OFFICE_LNG.parse().expect("default office lng"),
            geofence_radius_m: DEFAULT_GEOFENCE_RADIUS_M.parse().expect("default radius"),
            late_cutoff: NaiveTime::parse_from_str(DEFAULT_LATE_CUTOFF, "%H:%M")
                .expect("default late cutoff"),
        }
    }
}
