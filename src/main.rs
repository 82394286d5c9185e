mod config;
mod geo;
mod logging;
mod observer;
mod poller;
mod scene;
mod server;
mod solar;
mod tracker;
mod ui;

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use config::Config;
use geo::GeoCoordinate;
use observer::{Locator, Observer};
use poller::{poll_once, Poller};
use scene::{graticule, Presenter, Scene};
use solar::{solar_angle, sub_solar_longitude, sun_position, utc_label};
use tracker::HttpPositionSource;

#[derive(Parser)]
#[command(name = "issglobe", version, about = "Track the ISS on a rotating globe")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive globe in the terminal (default)
    Track(LocationArgs),
    /// Print the current ISS position once and exit
    Where(LocationArgs),
    /// Serve the static asset directory over HTTP
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory to serve
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct LocationArgs {
    /// Your latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Your longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
}

pub struct AppState {
    pub scene: Scene,
    pub observer: Observer,
    pub config: Config,
    pub poller: Poller,
    pub graticule: Vec<Vec<GeoCoordinate>>,
    pub paused: bool,
    pub log_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Track(LocationArgs::default())) {
        Command::Track(location) => run_tracker(config, location),
        Command::Where(location) => {
            logging::init_stderr();
            run_where(config, location)
        }
        Command::Serve { port, dir } => {
            logging::init_stderr();
            let env_port = std::env::var(server::PORT_ENV).ok();
            let port = server::resolve_port(config.server.port, env_port.as_deref(), port)?;
            let dir = dir.unwrap_or(config.server.public_dir);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(dir, port))
        }
    }
}

fn build_observer(config: &Config, location: &LocationArgs) -> Observer {
    Observer::new(
        config.observer.name.clone(),
        config.observer.latitude,
        config.observer.longitude,
    )
    .with_override(location.lat, location.lon)
}

/// Places the user marker and the sun. Neither can fail the scene; a missing
/// location just leaves the marker out.
fn place_static_markers<P: Presenter>(presenter: &mut P, observer: &Observer, config: &Config) {
    let globe = config.globe.geometry();

    match observer.locate() {
        Ok(coord) => presenter.place_observer(&coord, globe.surface_point(&coord)),
        Err(e) => warn!("user location unavailable: {}", e),
    }

    let angle = solar_angle(Utc::now());
    presenter.place_sun(angle, sun_position(angle, config.globe.sun_distance));
}

fn run_where(config: Config, location: LocationArgs) -> Result<()> {
    let observer = build_observer(&config, &location);
    let source = HttpPositionSource::new(config.tracker.url.clone());
    let mut scene = Scene::new(config.globe.geometry());

    place_static_markers(&mut scene, &observer, &config);

    let report = poll_once(&source, &mut scene, &config.globe.geometry())?;

    println!("{}", utc_label(Utc::now()));
    println!(
        "ISS: Lat {:.4}°, Lon {:.4}°, Alt {:.1} km",
        report.latitude, report.longitude, report.altitude
    );
    if let Some(velocity) = report.velocity {
        println!("     Velocity {:.0} km/h", velocity);
    }
    if let Some(visibility) = &report.visibility {
        println!("     Visibility {}", visibility);
    }
    if let Some(marker) = &scene.iss {
        println!(
            "     Scene position ({:.3}, {:.3}, {:.3})",
            marker.point.x, marker.point.y, marker.point.z
        );
    }
    if let Some(marker) = &scene.observer {
        println!(
            "{}: Lat {:.4}°, Lon {:.4}° at ({:.3}, {:.3}, {:.3})",
            observer.name,
            marker.coord.latitude,
            marker.coord.longitude,
            marker.point.x,
            marker.point.y,
            marker.point.z
        );
    }
    if let Some(angle) = scene.solar_angle {
        println!(
            "Sun: {:.2}° (sub-solar longitude {:.2}°)",
            angle,
            sub_solar_longitude(angle)
        );
    }
    if let (Some(lat), Some(lon)) = (report.solar_lat, report.solar_lon) {
        println!("     Service sub-solar point: Lat {:.2}°, Lon {:.2}°", lat, lon);
    }
    if let Some(timestamp) = report.timestamp {
        if let Some(at) = chrono::DateTime::from_timestamp(timestamp, 0) {
            println!("     Reported {}", utc_label(at));
        }
    }

    Ok(())
}

fn run_tracker(config: Config, location: LocationArgs) -> Result<()> {
    let log_path = match logging::init_file() {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        }
    };

    let observer = build_observer(&config, &location);
    let source = Arc::new(HttpPositionSource::new(config.tracker.url.clone()));
    info!(url = %source.url(), "starting tracker");

    let mut scene = Scene::new(config.globe.geometry());
    place_static_markers(&mut scene, &observer, &config);

    let mut poller = Poller::new(source);
    poller.request();

    let mut app_state = AppState {
        scene,
        observer,
        config,
        poller,
        graticule: graticule(15.0, 3.0),
        paused: false,
        log_path,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app_state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app_state: &mut AppState,
) -> Result<()> {
    let globe = app_state.config.globe.geometry();

    loop {
        for outcome in app_state.poller.drain(&mut app_state.scene, &globe) {
            if let Err(e) = outcome {
                app_state.scene.status = Some(e.to_string());
            }
        }

        terminal.draw(|f| {
            ui::draw_ui(f, app_state);
        })?;

        if !app_state.paused {
            app_state
                .scene
                .advance(app_state.config.display.rotation_speed);
        }

        // Handle input
        if event::poll(std::time::Duration::from_millis(
            app_state.config.display.refresh_rate,
        ))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        return Ok(());
                    }
                    KeyCode::Char('r') => {
                        // The sun moves too, so refresh it alongside the station
                        let angle = solar_angle(Utc::now());
                        let distance = app_state.config.globe.sun_distance;
                        app_state.scene.place_sun(angle, sun_position(angle, distance));
                        app_state.poller.request();
                    }
                    KeyCode::Char(' ') => {
                        app_state.paused = !app_state.paused;
                    }
                    _ => {}
                }
            }
        }
    }
}
