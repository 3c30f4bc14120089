mod app;
mod config;
mod keymap;
mod renderer;

use anyhow::Context;

use crate::app::App;
use crate::config::Config;

/// Route `log` output through `fern`.
///
/// The terminal is taken over by the display, so interactive runs log to a
/// file; headless runs log to stderr.
fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.log_level);

    let dispatch = if config.headless_frames.is_some() {
        dispatch.chain(std::io::stderr())
    } else {
        let file = fern::log_file(&config.log_file).with_context(|| {
            format!("Failed to open log file {}", config.log_file.display())
        })?;
        dispatch.chain(file)
    };

    dispatch.apply().context("Failed to install logger")
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;
    setup_logging(&config)?;

    let rom = std::fs::read(&config.rom_path)
        .with_context(|| format!("Failed to read ROM from {}", config.rom_path.display()))?;
    log::info!("Loaded {} ({} bytes)", config.rom_path.display(), rom.len());

    let mut app = App::new(&config, &rom)?;

    match config.headless_frames {
        Some(frames) => print!("{}", app.run_headless(frames)),
        None => app.run_terminal()?,
    }

    if let Some(e) = app.halted() {
        log::error!("Execution stopped: {e}");
    }

    Ok(())
}
