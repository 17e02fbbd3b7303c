//! Canteen session runner
//!
//! Loads a menu and a script from the fixture directory, replays the script
//! against a live session and prints the resulting state.
//!
//! Use `--menu` to pick the menu fixture
//! Use `--script` to pick the script fixture
//! Use `--flow counter` for the single-role counter flow

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use canteen::{
    clock::{ManualClock, SystemClock, Ticker},
    config::{Config, LogFormat, LoggingConfig},
    fixtures::Fixture,
    live::LiveSession,
    report::{self, ReportError},
    session::Session,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    init_logging(&config.logging)?;

    let fixture = Fixture::with_base_path(&config.fixtures);
    let catalog = Arc::new(fixture.load_catalog(&config.menu)?);
    let script = fixture.load_script(&config.script)?;

    let ticker = Ticker::spawn(config.session.tick_interval(), Arc::new(SystemClock))?;

    // Scripted time starts at the wall clock and only moves on `wait` steps.
    let clock = ManualClock::new(ticker.latest());

    info!(
        flow = ?config.session.flow,
        menu = %config.menu,
        script = %config.script,
        steps = script.steps.len(),
        "replaying script"
    );

    let live = LiveSession::new(Session::with_clock(catalog, config.session, clock.clone()))?;
    let transcript = live.update(|session| script.run(session, &clock))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    report::write_transcript(&mut handle, &transcript)?;

    live.read(|session| -> Result<(), ReportError> {
        report::write_menu(&mut handle, session)?;
        report::write_cart(&mut handle, session)?;
        report::write_orders(&mut handle, session)?;
        report::write_notifications(&mut handle, session)
    })?;

    writeln!(
        handle,
        " {} steps, {} rejected (finished {})",
        transcript.len(),
        transcript.rejected().count(),
        ticker.latest().strftime("%H:%M:%S")
    )?;

    live.shutdown();

    Ok(())
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}
