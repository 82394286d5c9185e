use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{info, warn};

use crate::geo::GlobeGeometry;
use crate::scene::Presenter;
use crate::tracker::{FetchError, IssReport, PositionSource};

/// Runs one lookup and hands the converted position to the presenter.
///
/// Failures are logged and returned; the presenter is only touched on success.
pub fn poll_once<S, P>(
    source: &S,
    presenter: &mut P,
    globe: &GlobeGeometry,
) -> Result<IssReport, FetchError>
where
    S: PositionSource + ?Sized,
    P: Presenter + ?Sized,
{
    forward(source.fetch(), presenter, globe)
}

fn forward<P>(
    outcome: Result<IssReport, FetchError>,
    presenter: &mut P,
    globe: &GlobeGeometry,
) -> Result<IssReport, FetchError>
where
    P: Presenter + ?Sized,
{
    match outcome {
        Ok(report) => {
            let point = globe.orbit_point(&report.coordinate());
            info!(
                latitude = report.latitude,
                longitude = report.longitude,
                altitude = report.altitude,
                "ISS position updated"
            );
            presenter.place_iss(&report, point);
            Ok(report)
        }
        Err(e) => {
            warn!("ISS position lookup failed: {}", e);
            Err(e)
        }
    }
}

/// Background lookups for the render loop.
///
/// Each request gets its own thread. Nothing stops a second request while the
/// first is still running; results are applied in the order they arrive.
pub struct Poller {
    source: Arc<dyn PositionSource + Send + Sync>,
    tx: Sender<Result<IssReport, FetchError>>,
    rx: Receiver<Result<IssReport, FetchError>>,
    in_flight: usize,
}

impl Poller {
    pub fn new(source: Arc<dyn PositionSource + Send + Sync>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn request(&mut self) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        let spawned = thread::Builder::new()
            .name("iss-fetch".to_string())
            .spawn(move || {
                // Receiver only goes away on shutdown
                let _ = tx.send(source.fetch());
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => warn!("could not start ISS lookup: {}", e),
        }
    }

    /// Applies every lookup that finished since the last call.
    pub fn drain<P>(
        &mut self,
        presenter: &mut P,
        globe: &GlobeGeometry,
    ) -> Vec<Result<IssReport, FetchError>>
    where
        P: Presenter + ?Sized,
    {
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            outcomes.push(forward(outcome, presenter, globe));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{CartesianPoint, GeoCoordinate};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct CannedSource {
        responses: Mutex<VecDeque<Result<IssReport, FetchError>>>,
    }

    impl CannedSource {
        fn new(responses: Vec<Result<IssReport, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    impl PositionSource for CannedSource {
        fn fetch(&self) -> Result<IssReport, FetchError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("exhausted".to_string())))
        }
    }

    #[derive(Default)]
    struct Recorder {
        iss: Vec<CartesianPoint>,
    }

    impl Presenter for Recorder {
        fn place_iss(&mut self, _report: &IssReport, point: CartesianPoint) {
            self.iss.push(point);
        }

        fn place_observer(&mut self, _coord: &GeoCoordinate, _point: CartesianPoint) {}

        fn place_sun(&mut self, _angle: f64, _point: CartesianPoint) {}
    }

    fn report(lat: f64, lon: f64, alt: f64) -> IssReport {
        IssReport {
            latitude: lat,
            longitude: lon,
            altitude: alt,
            velocity: Some(27600.0),
            visibility: Some("eclipsed".to_string()),
            timestamp: None,
            solar_lat: None,
            solar_lon: None,
        }
    }

    #[test]
    fn test_poll_once_places_marker() {
        let source = CannedSource::new(vec![Ok(report(0.0, 180.0, 400.0))]);
        let mut recorder = Recorder::default();
        let globe = GlobeGeometry::default();

        let got = poll_once(&source, &mut recorder, &globe).unwrap();
        assert_eq!(got.altitude, 400.0);
        assert_eq!(recorder.iss.len(), 1);

        // 100 + 400 * 0.015 on the -x axis
        let p = recorder.iss[0];
        assert!((p.x + 106.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
        assert!(p.z.abs() < 1e-9);
    }

    #[test]
    fn test_poll_once_error_is_returned_not_presented() {
        let source = CannedSource::new(vec![Err(FetchError::Status {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        })]);
        let mut recorder = Recorder::default();

        let err = poll_once(&source, &mut recorder, &GlobeGeometry::default()).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert!(recorder.iss.is_empty());
    }

    #[test]
    fn test_malformed_body_is_returned() {
        let parse_err = crate::tracker::parse_report("{not json").unwrap_err();
        let source = CannedSource::new(vec![Err(parse_err)]);
        let mut recorder = Recorder::default();

        let result = poll_once(&source, &mut recorder, &GlobeGeometry::default());
        assert!(matches!(result, Err(FetchError::Parse(_))));
        assert!(recorder.iss.is_empty());
    }

    #[test]
    fn test_overlapping_requests_all_complete() {
        let source = Arc::new(CannedSource::new(vec![
            Ok(report(10.0, 10.0, 410.0)),
            Err(FetchError::Transport("connection reset".to_string())),
        ]));
        let mut poller = Poller::new(source);
        let mut recorder = Recorder::default();
        let globe = GlobeGeometry::default();

        poller.request();
        poller.request();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while outcomes.len() < 2 && Instant::now() < deadline {
            outcomes.extend(poller.drain(&mut recorder, &globe));
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
        assert_eq!(recorder.iss.len(), 1);
        assert_eq!(poller.in_flight(), 0);
    }

    #[test]
    fn test_drain_without_requests_is_empty() {
        let mut poller = Poller::new(Arc::new(CannedSource::new(Vec::new())));
        let mut recorder = Recorder::default();
        assert!(poller.drain(&mut recorder, &GlobeGeometry::default()).is_empty());
    }
}
