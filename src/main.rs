use env_logger::Env;
use log::LevelFilter;

use game_magnifier::{ControllerSource, FrameScheduler, LoggingOverlay, MagnifierConfig, Result};

fn main() {
    let config = MagnifierConfig::from_env();

    let level = config
        .as_ref()
        .map(MagnifierConfig::log_filter)
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::from_env(
        Env::default().default_filter_or(level.as_str().to_ascii_lowercase()),
    )
    .format_timestamp_millis()
    .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "gilrs-input")]
fn run(config: &MagnifierConfig) -> Result<()> {
    let source = game_magnifier::input::GilrsSource::new(config)?;
    drive(config, source)
}

#[cfg(not(feature = "gilrs-input"))]
fn run(_config: &MagnifierConfig) -> Result<()> {
    Err(game_magnifier::MagnifierError::ControllerBackend(
        "built without the gilrs-input feature".to_string(),
    ))
}

#[cfg_attr(not(feature = "gilrs-input"), allow(dead_code))]
fn drive<S: ControllerSource>(config: &MagnifierConfig, source: S) -> Result<()> {
    let overlay = LoggingOverlay::new(config);
    let mut scheduler = FrameScheduler::new(config, source, overlay);
    if let Some(path) = &config.trace_csv {
        scheduler = scheduler.with_trace_file(path)?;
    }

    scheduler.start();
    let reason = scheduler.run();
    log::info!("Magnifier stopped: {:?}", reason);
    Ok(())
}
