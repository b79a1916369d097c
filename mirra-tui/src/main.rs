//! Terminal smart-mirror dashboard rendering the mirra widgets.

mod app;
mod input;
mod ui;

use std::{fs, io, sync::Arc, time::Duration as StdDuration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mirra_core::{config::MirraConfig, provider::ProviderSet, service::MirraService};
use mirra_provider_openweather as openweather;
use mirra_provider_tfl as tfl;
use mirra_provider_waqi as waqi;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;

use crate::app::App;
use crate::input::Action;

const DEFAULT_CONFIG_PATH: &str = "mirra.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration + HTTP + service setup
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());

    let raw = fs::read_to_string(&config_path)
        .with_context(|| format!("reading configuration from {config_path}"))?;
    let config = MirraConfig::from_toml_str(&raw)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let client = Client::builder().user_agent("mirra/0.1").build()?;

    let providers = ProviderSet {
        weather: config
            .weather
            .as_ref()
            .map(|weather| openweather::port(client.clone(), weather))
            .transpose()?,
        arrivals: config
            .arrivals
            .as_ref()
            .map(|arrivals| tfl::port(client.clone(), arrivals))
            .transpose()?,
        air_quality: config
            .air_quality
            .as_ref()
            .map(|air_quality| waqi::port(client, air_quality))
            .transpose()?,
    };

    let service = Arc::new(MirraService::new(config, providers));

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Clock and bin schedule are pure and cheap; recompute every pass.
        app.tick();

        if app.refresh_due() {
            app.is_loading = true;
            terminal.draw(|frame| ui::draw(frame, &app))?;

            refresh_widgets(&mut app).await;

            app.is_loading = false;
            app.mark_refreshed();
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key) {
                Action::Quit => break,
                Action::Refresh => app.force_refresh(),
                Action::None => {}
            }
        }
    }

    Ok(())
}

async fn refresh_widgets(app: &mut App) {
    if app.service.has_weather() {
        match app.service.weather().await {
            Ok(report) => {
                app.weather = Some(report);
                app.weather_error = None;
            }
            Err(err) => {
                // Keep the previous report on screen; just surface the error.
                app.weather_error = Some(format!("Weather: {err}"));
            }
        }
    }

    if app.service.has_arrivals() {
        match app.service.arrivals().await {
            Ok(arrivals) => {
                app.arrivals = arrivals;
                app.arrivals_error = None;
            }
            Err(err) => {
                app.arrivals_error = Some(format!("Arrivals: {err}"));
            }
        }
    }

    if app.service.has_air_quality() {
        match app.service.air_quality().await {
            Ok(reading) => {
                app.air_quality = Some(reading);
                app.air_quality_error = None;
            }
            Err(err) => {
                app.air_quality_error = Some(format!("Air quality: {err}"));
            }
        }
    }
}
