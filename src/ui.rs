use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::solar::{sub_solar_longitude, utc_label};
use crate::AppState;

pub fn draw_ui(f: &mut Frame, app_state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5), // Header
            Constraint::Min(10),   // Globe
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, chunks[0], app_state);
    draw_globe(f, chunks[1], app_state);
    draw_footer(f, chunks[2], app_state);
}

fn draw_header(f: &mut Frame, area: Rect, app_state: &AppState) {
    let scene = &app_state.scene;

    let iss_line = match (&scene.iss_report, &scene.status) {
        (_, Some(status)) => Line::from(vec![
            Span::styled("ISS: ", Style::default().fg(Color::Yellow)),
            Span::styled(status.clone(), Style::default().fg(Color::Red)),
        ]),
        (Some(report), None) => {
            let mut spans = vec![
                Span::styled("ISS: ", Style::default().fg(Color::Yellow)),
                Span::raw(format!(
                    "Lat {:.4}°, Lon {:.4}°, Alt {:.1} km",
                    report.latitude, report.longitude, report.altitude
                )),
            ];
            if let Some(velocity) = report.velocity {
                spans.push(Span::raw(format!("  {:.0} km/h", velocity)));
            }
            if let Some(visibility) = &report.visibility {
                spans.push(Span::styled(
                    format!("  ({})", visibility),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        }
        (None, None) => Line::from(vec![
            Span::styled("ISS: ", Style::default().fg(Color::Yellow)),
            Span::raw("waiting for position..."),
        ]),
    };

    let observer_line = match &scene.observer {
        Some(marker) => Line::from(vec![
            Span::styled(
                format!("{}: ", app_state.observer.name),
                Style::default().fg(Color::Red),
            ),
            Span::raw(format!(
                "Lat {:.4}°, Lon {:.4}°",
                marker.coord.latitude, marker.coord.longitude
            )),
        ]),
        None => Line::from(vec![
            Span::styled(
                format!("{}: ", app_state.observer.name),
                Style::default().fg(Color::Red),
            ),
            Span::styled("location unavailable", Style::default().fg(Color::DarkGray)),
        ]),
    };

    let mut time_spans = Vec::new();
    if let Some(updated) = scene.iss_updated {
        time_spans.push(Span::styled(
            utc_label(updated),
            Style::default().fg(Color::Cyan),
        ));
        time_spans.push(Span::raw("  "));
    }
    if let Some(angle) = scene.solar_angle {
        time_spans.push(Span::styled("Sun: ", Style::default().fg(Color::Cyan)));
        time_spans.push(Span::raw(format!(
            "{:.1}° (over {:.1}°)",
            angle,
            sub_solar_longitude(angle)
        )));
    }

    let header = Paragraph::new(vec![iss_line, observer_line, Line::from(time_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title("issglobe")
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(header, area);
}

fn draw_globe(f: &mut Frame, area: Rect, app_state: &AppState) {
    let scene = &app_state.scene;

    // Braille cells are 2x4 dots and roughly twice as tall as wide, so this
    // keeps the sphere round.
    let inner_width = area.width.saturating_sub(2).max(1) as f64;
    let inner_height = area.height.saturating_sub(2).max(1) as f64;
    let half_height = app_state.config.globe.sun_distance.max(scene.globe.radius) * 1.15;
    let half_width = half_height * inner_width / (2.0 * inner_height);

    let mut day = Vec::new();
    let mut night = Vec::new();
    for line in &app_state.graticule {
        for coord in line {
            let point = coord.to_cartesian(scene.globe.radius);
            let projected = scene.project(point);
            if !projected.front {
                continue;
            }
            if scene.is_lit(point) {
                day.push((projected.x, projected.y));
            } else {
                night.push((projected.x, projected.y));
            }
        }
    }

    let show_labels = app_state.config.display.show_labels;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(if app_state.paused {
                    "Globe (paused)"
                } else {
                    "Globe"
                })
                .style(Style::default().fg(Color::White)),
        )
        .x_bounds([-half_width, half_width])
        .y_bounds([-half_height, half_height])
        .marker(symbols::Marker::Braille)
        .paint(|ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: scene.globe.radius,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &night,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &day,
                color: Color::Blue,
            });

            ctx.layer();

            if let Some(sun) = scene.sun {
                let projected = scene.project(sun);
                if projected.front {
                    ctx.print(
                        projected.x,
                        projected.y,
                        Span::styled("☀", Style::default().fg(Color::White)),
                    );
                }
            }

            for marker in scene.markers() {
                let color = if marker.label == "ISS" {
                    Color::Yellow
                } else {
                    Color::Red
                };
                let projected = scene.project(marker.point);
                if !projected.front {
                    continue;
                }
                ctx.draw(&Points {
                    coords: &[(projected.x, projected.y)],
                    color,
                });
                if show_labels && !scene.is_occluded(marker.point) {
                    ctx.print(
                        projected.x,
                        projected.y,
                        Span::styled(
                            marker.label,
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app_state: &AppState) {
    let mut spans = vec![
        Span::styled("r", Style::default().fg(Color::Cyan)),
        Span::raw(": refresh ISS  "),
        Span::styled("space", Style::default().fg(Color::Cyan)),
        Span::raw(": pause rotation  "),
        Span::styled("q/Esc", Style::default().fg(Color::Cyan)),
        Span::raw(": quit"),
    ];

    let in_flight = app_state.poller.in_flight();
    if in_flight > 0 {
        spans.push(Span::styled(
            format!("  fetching ({})", in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(path) = &app_state.log_path {
        spans.push(Span::styled(
            format!("  log: {}", path.display()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
