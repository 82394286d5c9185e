use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::geo::GeoCoordinate;

pub const DEFAULT_ISS_URL: &str = "https://api.wheretheiss.at/v1/satellites/25544";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("position service returned {status} {status_text}")]
    Status { status: u16, status_text: String },
    #[error("request to position service failed: {0}")]
    Transport(String),
    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
    #[error("malformed position payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Body of a satellite position lookup.
///
/// Only the coordinates are required; the rest is informational and missing
/// fields are tolerated.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IssReport {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64, // kilometers
    #[serde(default)]
    pub velocity: Option<f64>, // km/h
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub solar_lat: Option<f64>,
    #[serde(default)]
    pub solar_lon: Option<f64>,
}

impl IssReport {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::with_altitude(self.latitude, self.longitude, self.altitude)
    }
}

pub fn parse_report(body: &str) -> Result<IssReport, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Anything that can tell us where the station is right now.
pub trait PositionSource {
    fn fetch(&self) -> Result<IssReport, FetchError>;
}

pub struct HttpPositionSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpPositionSource {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("issglobe/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PositionSource for HttpPositionSource {
    fn fetch(&self) -> Result<IssReport, FetchError> {
        debug!(url = %self.url, "requesting ISS position");

        let response = match self.agent.get(&self.url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                return Err(FetchError::Status {
                    status,
                    status_text: response.status_text().to_string(),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(FetchError::Transport(transport.to_string()));
            }
        };

        let body = response.into_string()?;
        parse_report(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "name": "iss",
        "id": 25544,
        "latitude": 50.11496269845,
        "longitude": 118.07900427317,
        "altitude": 408.05526028199,
        "velocity": 27635.971970874,
        "visibility": "daylight",
        "footprint": 4446.1877699772,
        "timestamp": 1364069476,
        "daynum": 2456375.3411574,
        "solar_lat": 1.3327003598631,
        "solar_lon": 238.78610691196,
        "units": "kilometers"
    }"#;

    #[test]
    fn test_parse_full_report() {
        let report = parse_report(SAMPLE).unwrap();
        assert_eq!(report.latitude, 50.11496269845);
        assert_eq!(report.longitude, 118.07900427317);
        assert_eq!(report.visibility.as_deref(), Some("daylight"));
        assert_eq!(report.timestamp, Some(1364069476));

        let coord = report.coordinate();
        assert_eq!(coord.altitude, Some(408.05526028199));
    }

    #[test]
    fn test_parse_minimal_report() {
        let report =
            parse_report(r#"{"latitude": -12.5, "longitude": 170.0, "altitude": 420}"#).unwrap();
        assert_eq!(report.altitude, 420.0);
        assert!(report.velocity.is_none());
        assert!(report.solar_lon.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_coordinates() {
        let err = parse_report(r#"{"latitude": 1.0, "altitude": 400.0}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err =
            parse_report(r#"{"latitude": "north", "longitude": 0, "altitude": 0}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_error_page() {
        let err = parse_report("<html><body>502 Bad Gateway</body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_unreachable_host_is_an_error() {
        // Port 1 on loopback is never listening in the test environment
        let source = HttpPositionSource::new("http://127.0.0.1:1/v1/satellites/25544");
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            status: 429,
            status_text: "Too Many Requests".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "position service returned 429 Too Many Requests"
        );
    }
}
