use thiserror::Error;

use crate::geo::GeoCoordinate;

#[derive(Debug, Error, PartialEq)]
pub enum LocateError {
    #[error("no observer location configured (set [observer] in config or pass --lat/--lon)")]
    Unavailable,
    #[error("observer location is not a finite coordinate: {latitude}, {longitude}")]
    Invalid { latitude: f64, longitude: f64 },
}

/// Where the user is standing, when known.
#[derive(Debug, Clone)]
pub struct Observer {
    pub name: String,
    pub latitude: Option<f64>,  // degrees
    pub longitude: Option<f64>, // degrees
}

/// Source of the user's own position.
pub trait Locator {
    fn locate(&self) -> Result<GeoCoordinate, LocateError>;
}

impl Observer {
    pub fn new(name: String, lat: Option<f64>, lon: Option<f64>) -> Self {
        Self {
            name,
            latitude: lat,
            longitude: lon,
        }
    }

    /// Command-line coordinates win over the configured ones, field by field.
    pub fn with_override(mut self, lat: Option<f64>, lon: Option<f64>) -> Self {
        if lat.is_some() {
            self.latitude = lat;
        }
        if lon.is_some() {
            self.longitude = lon;
        }
        self
    }
}

impl Locator for Observer {
    fn locate(&self) -> Result<GeoCoordinate, LocateError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                if !latitude.is_finite() || !longitude.is_finite() {
                    return Err(LocateError::Invalid {
                        latitude,
                        longitude,
                    });
                }
                Ok(GeoCoordinate::new(latitude, longitude))
            }
            _ => Err(LocateError::Unavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_configured() {
        let observer = Observer::new("Home".to_string(), Some(47.6), Some(-122.3));
        let coord = observer.locate().unwrap();
        assert_eq!(coord, GeoCoordinate::new(47.6, -122.3));
        assert_eq!(coord.altitude, None);
    }

    #[test]
    fn test_locate_missing() {
        let observer = Observer::new("Nowhere".to_string(), Some(10.0), None);
        assert_eq!(observer.locate(), Err(LocateError::Unavailable));
    }

    #[test]
    fn test_locate_rejects_nan() {
        let observer = Observer::new("Broken".to_string(), Some(f64::NAN), Some(0.0));
        assert!(matches!(observer.locate(), Err(LocateError::Invalid { .. })));
    }

    #[test]
    fn test_override_per_field() {
        let observer = Observer::new("Home".to_string(), Some(1.0), Some(2.0))
            .with_override(None, Some(3.0));
        assert_eq!(observer.locate().unwrap(), GeoCoordinate::new(1.0, 3.0));
    }
}
