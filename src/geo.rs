use nalgebra::Vector3;

/// A position on the Earth's surface, as reported by the tracking service or
/// the observer's location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,         // degrees
    pub longitude: f64,        // degrees
    pub altitude: Option<f64>, // kilometers
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: Some(altitude),
        }
    }

    pub fn to_cartesian(&self, radius: f64) -> CartesianPoint {
        geo_to_cartesian(self.latitude, self.longitude, radius)
    }
}

/// A point in scene space. +y points at the north pole and longitude 180
/// sits on the -x axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CartesianPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn norm(&self) -> f64 {
        self.to_vector().norm()
    }
}

impl From<Vector3<f64>> for CartesianPoint {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Maps latitude/longitude (degrees) onto a sphere of the given radius.
///
/// The longitude is shifted by 180 degrees so the map seam lands on -x,
/// matching an equirectangular texture wrapped around the globe.
pub fn geo_to_cartesian(lat: f64, lon: f64, radius: f64) -> CartesianPoint {
    let phi = lat.to_radians();
    let theta = (lon - 180.0).to_radians();

    let x = -radius * phi.cos() * theta.cos();
    let y = radius * phi.sin();
    let z = radius * phi.cos() * theta.sin();

    CartesianPoint { x, y, z }
}

/// Marker placement relative to the globe mesh.
#[derive(Debug, Clone, Copy)]
pub struct GlobeGeometry {
    pub radius: f64,
    pub surface_offset: f64,
    pub altitude_scale: f64, // scene units per kilometer
}

impl Default for GlobeGeometry {
    fn default() -> Self {
        Self {
            radius: 100.0,
            surface_offset: 2.0,
            altitude_scale: 0.015,
        }
    }
}

impl GlobeGeometry {
    // Ground markers float just above the mesh so they don't z-fight with it
    pub fn surface_radius(&self) -> f64 {
        self.radius + self.surface_offset
    }

    pub fn orbit_radius(&self, altitude_km: f64) -> f64 {
        self.radius + altitude_km * self.altitude_scale
    }

    pub fn surface_point(&self, coord: &GeoCoordinate) -> CartesianPoint {
        coord.to_cartesian(self.surface_radius())
    }

    pub fn orbit_point(&self, coord: &GeoCoordinate) -> CartesianPoint {
        let radius = match coord.altitude {
            Some(alt) => self.orbit_radius(alt),
            None => self.surface_radius(),
        };
        coord.to_cartesian(radius)
    }
}
