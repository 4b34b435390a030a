use serde::{Deserialize, Serialize};

/// One normalized forecast sample: a timestamp plus the seven marine
/// measurements, each already resolved to a single source's reading.
///
/// The timestamp is kept verbatim as the provider returned it; no parsing
/// or timezone normalization happens in this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: String,
    pub swell_direction: f64,
    pub swell_height: f64,
    pub swell_period: f64,
    pub wave_direction: f64,
    pub wave_height: f64,
    pub wind_direction: f64,
    pub wind_speed: f64,
}
