use chrono::{DateTime, Utc};
use nalgebra::{Rotation3, Vector3};

use crate::geo::{CartesianPoint, GeoCoordinate, GlobeGeometry};
use crate::tracker::IssReport;

/// Labels are hidden once the marker is this far round the back of the globe.
const OCCLUSION_THRESHOLD: f64 = -0.2;

/// Receiver of converted positions. The scene is the only real implementation;
/// the trait keeps the poller independent of how things get drawn.
pub trait Presenter {
    fn place_iss(&mut self, report: &IssReport, point: CartesianPoint);
    fn place_observer(&mut self, coord: &GeoCoordinate, point: CartesianPoint);
    fn place_sun(&mut self, angle: f64, point: CartesianPoint);
}

#[derive(Debug, Clone)]
pub struct Marker {
    pub label: &'static str,
    pub coord: GeoCoordinate,
    pub point: CartesianPoint,
}

#[derive(Debug, Clone, Copy)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    pub front: bool,
}

pub struct Scene {
    pub globe: GlobeGeometry,
    pub camera_distance: f64,
    pub camera_yaw: f64, // degrees about +y
    pub iss: Option<Marker>,
    pub iss_report: Option<IssReport>,
    pub iss_updated: Option<DateTime<Utc>>,
    pub observer: Option<Marker>,
    pub sun: Option<CartesianPoint>,
    pub solar_angle: Option<f64>,
    pub status: Option<String>,
}

impl Scene {
    pub fn new(globe: GlobeGeometry) -> Self {
        Self {
            globe,
            camera_distance: 2.0 * globe.radius,
            camera_yaw: 0.0,
            iss: None,
            iss_report: None,
            iss_updated: None,
            observer: None,
            sun: None,
            solar_angle: None,
            status: None,
        }
    }

    /// Orbit the camera around the globe's axis.
    pub fn advance(&mut self, degrees: f64) {
        self.camera_yaw = (self.camera_yaw + degrees).rem_euclid(360.0);
    }

    fn camera_rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::y_axis(), self.camera_yaw.to_radians())
    }

    pub fn camera_position(&self) -> Vector3<f64> {
        self.camera_rotation() * Vector3::new(0.0, 0.0, self.camera_distance)
    }

    /// Orthographic projection onto the camera's image plane.
    pub fn project(&self, point: CartesianPoint) -> Projected {
        let view = self.camera_rotation().inverse() * point.to_vector();
        Projected {
            x: view.x,
            y: view.y,
            front: view.z >= 0.0,
        }
    }

    pub fn is_occluded(&self, point: CartesianPoint) -> bool {
        let p = point.to_vector();
        let eye = self.camera_position() - p;
        match (eye.try_normalize(f64::EPSILON), p.try_normalize(f64::EPSILON)) {
            (Some(eye), Some(p)) => eye.dot(&p) < OCCLUSION_THRESHOLD,
            _ => false,
        }
    }

    /// Whether a surface point faces the sun. Everything counts as lit
    /// until a sun position is known.
    pub fn is_lit(&self, point: CartesianPoint) -> bool {
        match self.sun {
            Some(sun) => sun.to_vector().dot(&point.to_vector()) > 0.0,
            None => true,
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.observer.iter().chain(self.iss.iter())
    }
}

impl Presenter for Scene {
    fn place_iss(&mut self, report: &IssReport, point: CartesianPoint) {
        self.iss = Some(Marker {
            label: "ISS",
            coord: report.coordinate(),
            point,
        });
        self.iss_report = Some(report.clone());
        self.iss_updated = Some(Utc::now());
        self.status = None;
    }

    fn place_observer(&mut self, coord: &GeoCoordinate, point: CartesianPoint) {
        self.observer = Some(Marker {
            label: "You",
            coord: *coord,
            point,
        });
    }

    fn place_sun(&mut self, angle: f64, point: CartesianPoint) {
        self.solar_angle = Some(angle);
        self.sun = Some(point);
    }
}

/// Latitude/longitude wireframe, one polyline per parallel and meridian.
pub fn graticule(step: f64, sample: f64) -> Vec<Vec<GeoCoordinate>> {
    let mut lines = Vec::new();

    let mut lat = -90.0 + step;
    while lat < 90.0 {
        let mut line = Vec::new();
        let mut lon = -180.0;
        while lon <= 180.0 {
            line.push(GeoCoordinate::new(lat, lon));
            lon += sample;
        }
        lines.push(line);
        lat += step;
    }

    let mut lon = -180.0;
    while lon < 180.0 {
        let mut line = Vec::new();
        let mut lat = -90.0;
        while lat <= 90.0 {
            line.push(GeoCoordinate::new(lat, lon));
            lat += sample;
        }
        lines.push(line);
        lon += step;
    }

    lines
}
