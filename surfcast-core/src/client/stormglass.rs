use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::ForecastPoint;

use super::ForecastClient;

/// Fields requested from the API, comma-joined into the `params` query
/// argument.
const API_PARAMS: &str =
    "swellDirection,swellHeight,swellPeriod,waveDirection,waveHeight,windDirection,windSpeed";

/// StormGlass client errors.
#[derive(Debug, Error)]
pub enum StormGlassError {
    /// The outbound call never completed as a well-formed HTTP exchange:
    /// network failure, malformed request, or an undecodable body.
    #[error("Unexpected error when trying to communicate to StormGlass: {0}")]
    ClientRequest(String),

    /// The service answered with a failure status. Carries the status code
    /// and the response body exactly as returned.
    #[error("Unexpected error returned by the StormGlass service: Error: {body} Code: {status}")]
    Response { status: u16, body: String },
}

/// HTTP client for the StormGlass point-forecast API.
#[derive(Debug, Clone)]
pub struct StormGlassClient {
    api_url: String,
    api_token: String,
    source: String,
    http: Client,
}

impl StormGlassClient {
    pub fn new(api_url: String, api_token: String, source: String) -> Self {
        Self {
            api_url,
            api_token,
            source,
            http: Client::new(),
        }
    }

    /// Fetch and normalize the point forecast for a coordinate pair.
    ///
    /// Coordinates are passed through as-is; the upstream service is the
    /// authority on valid ranges. Exactly one outbound request is made,
    /// with no retry and no caching. An empty result is a valid outcome.
    #[instrument(skip(self), fields(lat = %lat, lng = %lng))]
    pub async fn fetch_points(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Vec<ForecastPoint>, StormGlassError> {
        let url = self.point_url(lat, lng);
        debug!(url = %url, "Fetching StormGlass point forecast");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, self.api_token.as_str())
            .send()
            .await
            .map_err(|err| StormGlassError::ClientRequest(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|err| StormGlassError::ClientRequest(err.to_string()))?;
            return Err(StormGlassError::Response {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: RawForecastResponse = response
            .json()
            .await
            .map_err(|err| StormGlassError::ClientRequest(err.to_string()))?;

        let total = decoded.hours.len();
        let points = normalize_response(decoded, &self.source);
        debug!(
            kept = points.len(),
            dropped = total - points.len(),
            "Normalized StormGlass response"
        );

        Ok(points)
    }

    fn point_url(&self, lat: f64, lng: f64) -> String {
        format!(
            "{}/weather/point?lat={}&lng={}&params={}&source={}",
            self.api_url, lat, lng, API_PARAMS, self.source
        )
    }
}

#[async_trait::async_trait]
impl ForecastClient for StormGlassClient {
    async fn fetch_points(&self, lat: f64, lng: f64) -> anyhow::Result<Vec<ForecastPoint>> {
        Ok(StormGlassClient::fetch_points(self, lat, lng).await?)
    }
}

/// One raw reading set: source identifier -> numeric value.
type RawSourceReadings = HashMap<String, f64>;

/// One time slot as returned by the API. Every field is independently
/// optional; a missing key deserializes to an empty map and counts the
/// same as a missing reading.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoint {
    #[serde(default)]
    time: String,
    #[serde(default)]
    swell_direction: RawSourceReadings,
    #[serde(default)]
    swell_height: RawSourceReadings,
    #[serde(default)]
    swell_period: RawSourceReadings,
    #[serde(default)]
    wave_direction: RawSourceReadings,
    #[serde(default)]
    wave_height: RawSourceReadings,
    #[serde(default)]
    wind_direction: RawSourceReadings,
    #[serde(default)]
    wind_speed: RawSourceReadings,
}

#[derive(Debug, Deserialize)]
struct RawForecastResponse {
    hours: Vec<RawPoint>,
}

/// Look up the preferred source's reading for one field.
///
/// A reading of exactly zero counts as missing, matching the upstream
/// contract that zero and absent are interchangeable.
fn source_reading(readings: &RawSourceReadings, source: &str) -> Option<f64> {
    readings.get(source).copied().filter(|value| *value != 0.0)
}

/// Project one raw time slot down to a flat point, or drop it.
///
/// A slot survives only when its timestamp is non-empty and all seven
/// fields have a usable reading from the preferred source. There is no
/// partial acceptance: one missing field drops the whole slot.
fn project_point(point: RawPoint, source: &str) -> Option<ForecastPoint> {
    if point.time.is_empty() {
        return None;
    }

    Some(ForecastPoint {
        swell_direction: source_reading(&point.swell_direction, source)?,
        swell_height: source_reading(&point.swell_height, source)?,
        swell_period: source_reading(&point.swell_period, source)?,
        wave_direction: source_reading(&point.wave_direction, source)?,
        wave_height: source_reading(&point.wave_height, source)?,
        wind_direction: source_reading(&point.wind_direction, source)?,
        wind_speed: source_reading(&point.wind_speed, source)?,
        time: point.time,
    })
}

/// Pure normalization pass over a decoded response body: validate each
/// time slot against the preferred source and flatten the survivors,
/// preserving input order. Dropped slots are silent here.
fn normalize_response(response: RawForecastResponse, source: &str) -> Vec<ForecastPoint> {
    response
        .hours
        .into_iter()
        .filter_map(|point| project_point(point, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "noaa";

    fn readings(source: &str, value: f64) -> RawSourceReadings {
        HashMap::from([(source.to_string(), value)])
    }

    fn raw_point(time: &str, value: f64) -> RawPoint {
        RawPoint {
            time: time.to_string(),
            swell_direction: readings(SOURCE, value),
            swell_height: readings(SOURCE, value),
            swell_period: readings(SOURCE, value),
            wave_direction: readings(SOURCE, value),
            wave_height: readings(SOURCE, value),
            wind_direction: readings(SOURCE, value),
            wind_speed: readings(SOURCE, value),
        }
    }

    fn response(hours: Vec<RawPoint>) -> RawForecastResponse {
        RawForecastResponse { hours }
    }

    #[test]
    fn normalizes_a_fully_populated_noaa_point() {
        let mut point = raw_point("2021-01-01T00:00:00+00:00", 1.0);
        point.swell_direction = readings(SOURCE, 64.26);
        point.wind_speed = readings(SOURCE, 100.0);

        let normalized = normalize_response(response(vec![point]), SOURCE);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].time, "2021-01-01T00:00:00+00:00");
        assert_eq!(normalized[0].swell_direction, 64.26);
        assert_eq!(normalized[0].wind_speed, 100.0);
        assert_eq!(normalized[0].wave_height, 1.0);
    }

    #[test]
    fn drops_point_missing_one_field_under_the_preferred_source() {
        let valid = raw_point("2021-01-01T00:00:00+00:00", 1.0);
        let mut invalid = raw_point("2021-01-01T01:00:00+00:00", 1.0);
        invalid.swell_height = RawSourceReadings::new();

        let normalized = normalize_response(response(vec![valid, invalid]), SOURCE);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].time, "2021-01-01T00:00:00+00:00");
    }

    #[test]
    fn a_reading_under_another_source_does_not_count() {
        let mut point = raw_point("2021-01-01T00:00:00+00:00", 1.0);
        point.wind_direction = readings("sg", 270.0);

        let normalized = normalize_response(response(vec![point]), SOURCE);

        assert!(normalized.is_empty());
    }

    #[test]
    fn projection_picks_the_preferred_source_when_several_are_present() {
        let mut point = raw_point("2021-01-01T00:00:00+00:00", 1.0);
        point.wave_height.insert("sg".to_string(), 9.9);

        let normalized = normalize_response(response(vec![point]), SOURCE);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].wave_height, 1.0);
    }

    #[test]
    fn zero_reading_disqualifies_the_sample() {
        let mut point = raw_point("2021-01-01T00:00:00+00:00", 1.0);
        point.wind_speed = readings(SOURCE, 0.0);

        let normalized = normalize_response(response(vec![point]), SOURCE);

        assert!(normalized.is_empty());
    }

    #[test]
    fn empty_timestamp_disqualifies_the_sample() {
        let point = raw_point("", 1.0);

        let normalized = normalize_response(response(vec![point]), SOURCE);

        assert!(normalized.is_empty());
    }

    #[test]
    fn preserves_input_order_of_valid_points() {
        let hours = vec![
            raw_point("t1", 1.0),
            raw_point("", 1.0),
            raw_point("t2", 2.0),
            raw_point("t3", 3.0),
        ];

        let normalized = normalize_response(response(hours), SOURCE);

        let times: Vec<&str> = normalized.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(times, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn empty_hours_yield_empty_output() {
        let normalized = normalize_response(response(vec![]), SOURCE);
        assert!(normalized.is_empty());
    }

    #[test]
    fn missing_field_key_deserializes_as_empty_and_drops_the_point() {
        // swellHeight absent entirely, not just empty.
        let body = r#"{
            "hours": [{
                "time": "2021-01-01T00:00:00+00:00",
                "swellDirection": {"noaa": 123.41},
                "swellPeriod": {"noaa": 3.67},
                "waveDirection": {"noaa": 232.12},
                "waveHeight": {"noaa": 0.47},
                "windDirection": {"noaa": 299.45},
                "windSpeed": {"noaa": 100.0}
            }]
        }"#;

        let decoded: RawForecastResponse = serde_json::from_str(body).expect("must decode");
        let normalized = normalize_response(decoded, SOURCE);

        assert!(normalized.is_empty());
    }

    #[test]
    fn point_url_contains_coordinates_params_and_source() {
        let client = StormGlassClient::new(
            "https://api.stormglass.io/v2".to_string(),
            "TOKEN".to_string(),
            SOURCE.to_string(),
        );

        let url = client.point_url(-33.792726, 151.289824);

        assert_eq!(
            url,
            "https://api.stormglass.io/v2/weather/point?lat=-33.792726&lng=151.289824\
             &params=swellDirection,swellHeight,swellPeriod,waveDirection,waveHeight,\
             windDirection,windSpeed&source=noaa"
        );
    }

    #[test]
    fn error_display_carries_prefix_and_cause() {
        let err = StormGlassError::ClientRequest("timeout".to_string());
        assert_eq!(
            err.to_string(),
            "Unexpected error when trying to communicate to StormGlass: timeout"
        );

        let err = StormGlassError::Response {
            status: 429,
            body: r#"{"errors":"rate limit"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected error returned by the StormGlass service: \
             Error: {\"errors\":\"rate limit\"} Code: 429"
        );
    }
}
