use mirra_core::model::{AqiBand, ResolvedCollection};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use crate::app::App;

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("mirra – personal dashboard")
        .block(Block::default().borders(Borders::ALL).title("Mirra"));
    frame.render_widget(header, *header_area);

    // Two columns: local widgets on the left, network widgets on the right.
    let column_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(*content_area);

    let columns = column_chunks.as_ref();
    let [left_area, right_area] = columns else {
        return;
    };

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Min(0),
        ])
        .split(*left_area);

    let left = left_chunks.as_ref();
    let [clock_area, bins_area, arrivals_area] = left else {
        return;
    };

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(6)])
        .split(*right_area);

    let right = right_chunks.as_ref();
    let [weather_area, air_quality_area] = right else {
        return;
    };

    draw_clock(frame, app, *clock_area);
    draw_bins(frame, app, *bins_area);
    draw_arrivals(frame, app, *arrivals_area);
    draw_weather(frame, app, *weather_area);
    draw_air_quality(frame, app, *air_quality_area);

    // Status bar
    let nav_hint = "r refresh · q/Ctrl-C quit";

    let errors = app.errors();
    let status_text = if app.is_loading {
        format!("Refreshing… · {nav_hint}")
    } else if errors.is_empty() {
        nav_hint.to_owned()
    } else {
        format!("{} · {nav_hint}", errors.join(" · "))
    };

    let status_style = if !errors.is_empty() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_clock(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let time_line = Line::from(Span::styled(
        app.now.format("%H:%M:%S").to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let date_line = Line::from(app.now.format("%A, %d %B %Y").to_string());

    let clock = Paragraph::new(Text::from(vec![time_line, date_line]))
        .block(Block::default().borders(Borders::ALL).title("Clock"));
    frame.render_widget(clock, area);
}

fn draw_bins(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Next bin day");

    let Some(first) = app.next_collections.first() else {
        let empty = Paragraph::new("No collections configured.")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![Line::from(Span::styled(
        first.display_date.format("%a, %d %B").to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let mut when = vec![Span::raw(collection_time_text(first))];
    if first.days_delay > 0 {
        when.push(Span::styled(
            format!(
                " +{} day{}",
                first.days_delay,
                if first.days_delay > 1 { "s" } else { "" }
            ),
            Style::default().fg(Color::Red),
        ));
    }
    lines.push(Line::from(when));
    lines.push(Line::default());

    // Every stream that shares the earliest evening goes out together.
    for collection in &app.next_collections {
        lines.push(Line::from(Span::styled(
            format!("● {}", collection.name),
            Style::default().fg(accent_color(&collection.accent)),
        )));
    }

    let bins = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(bins, area);
}

fn draw_arrivals(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = app
        .service
        .stop_name()
        .map_or_else(|| "Arrivals".to_owned(), |stop| format!("Arrivals · {stop}"));
    let block = Block::default().borders(Borders::ALL).title(title);

    if !app.service.has_arrivals() {
        frame.render_widget(block, area);
        return;
    }

    if app.arrivals.is_empty() {
        let empty = Paragraph::new("No arrivals reported.")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let rows = app.arrivals.iter().map(|arrival| {
        let destination = if arrival.destination.is_empty() {
            &arrival.towards
        } else {
            &arrival.destination
        };

        Row::new(vec![
            Cell::from(minutes_label(arrival.seconds_to_arrival)),
            Cell::from(arrival.line.clone()),
            Cell::from(destination.clone()),
            Cell::from(arrival.platform.clone().unwrap_or_default()),
        ])
    });

    let column_widths = [
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Min(16),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["In", "Line", "Towards", "Platform"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block)
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn draw_weather(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Weather");

    if !app.service.has_weather() {
        frame.render_widget(block, area);
        return;
    }

    let Some(report) = &app.weather else {
        let waiting = Paragraph::new("Waiting for data…")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(waiting, area);
        return;
    };

    let current = &report.current;
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "{:.1}° {} ({})",
                current.temperature,
                current.kind.label(),
                current.description
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "Feels like {:.1}° · Humidity {}%",
            current.feels_like, current.humidity
        )),
        Line::from(format!(
            "Sunrise {} · Sunset {}",
            current.sunrise.format("%H:%M"),
            current.sunset.format("%H:%M")
        )),
        Line::default(),
    ];

    for day in report.daily.iter().take(5) {
        lines.push(Line::from(format!(
            "{}  {:>3.0}°–{:<3.0}°  {}",
            day.date.format("%a"),
            day.temp_min,
            day.temp_max,
            day.kind.label()
        )));
    }

    let weather = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(weather, area);
}

fn draw_air_quality(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Air quality");

    if !app.service.has_air_quality() {
        frame.render_widget(block, area);
        return;
    }

    let Some(reading) = &app.air_quality else {
        let waiting = Paragraph::new("Waiting for data…")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(waiting, area);
        return;
    };

    let pollutants = reading
        .pollutants
        .iter()
        .map(|pollutant| format!("{} {:.0}", pollutant.label, pollutant.value))
        .collect::<Vec<String>>()
        .join(" · ");

    let lines = vec![
        Line::from(Span::styled(
            format!("AQI {} · {}", reading.index, reading.band.label()),
            Style::default()
                .fg(aqi_color(reading.band))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(reading.station.clone()),
        Line::from(pollutants),
    ];

    let air_quality = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(air_quality, area);
}

/// When to act on the earliest collection, as the widget shows it.
fn collection_time_text(collection: &ResolvedCollection) -> String {
    if collection.is_display_day {
        "Tonight".to_owned()
    } else if collection.is_collection_day && collection.before_cutoff {
        "Now!".to_owned()
    } else if collection.days_until == 1 {
        "Tomorrow".to_owned()
    } else {
        format!("in {} days", collection.days_until)
    }
}

/// Map an `#rrggbb` accent token to a terminal color, white when unparsable.
fn accent_color(token: &str) -> Color {
    parse_hex_color(token).unwrap_or(Color::White)
}

fn parse_hex_color(token: &str) -> Option<Color> {
    let hex = token.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let red = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let green = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let blue = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some(Color::Rgb(red, green, blue))
}

fn aqi_color(band: AqiBand) -> Color {
    match band {
        AqiBand::Good => Color::Green,
        AqiBand::Moderate => Color::Yellow,
        AqiBand::UnhealthyForSensitive => Color::Rgb(255, 165, 0),
        AqiBand::Unhealthy => Color::Red,
        AqiBand::VeryUnhealthy => Color::Magenta,
        AqiBand::Hazardous => Color::Rgb(128, 0, 0),
    }
}

/// Whole minutes until arrival, "due" under a minute.
fn minutes_label(seconds: i64) -> String {
    if seconds < 60 {
        "due".to_owned()
    } else {
        format!("{} min", seconds / 60)
    }
}
