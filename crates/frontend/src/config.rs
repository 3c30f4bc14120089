use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use log::LevelFilter;

pub const DEFAULT_STEPS_PER_FRAME: u32 = 10;
pub const DEFAULT_KEY_HOLD_FRAMES: u32 = 6;
pub const DEFAULT_LOG_FILE: &str = "chip8.log";

pub static USAGE: &str = r#"
usage: chip8 [OPTIONS] ROM

options:
    --steps-per-frame N   instructions executed per 60 Hz frame (default 10)
    --key-hold N          frames a key stays pressed after a key event (default 6)
    --log-level LEVEL     off, error, warn, info, debug or trace (default info)
    --log-file PATH       where log output is written (default chip8.log)
    --headless N          run N frames without a terminal, then print the screen

keys:
    1 2 3 4        1 2 3 C
    q w e r   ->   4 5 6 D
    a s d f        7 8 9 E
    z x c v        A 0 B F

    Esc quits.
"#;

/// Settings for a single run of the frontend, taken from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rom_path: PathBuf,
    pub steps_per_frame: u32,
    pub key_hold_frames: u32,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    /// Run this many frames without a terminal instead of interactively.
    pub headless_frames: Option<u32>,
}

impl Config {
    /// Parse the arguments following the program name.
    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut rom_path = None;
        let mut steps_per_frame = DEFAULT_STEPS_PER_FRAME;
        let mut key_hold_frames = DEFAULT_KEY_HOLD_FRAMES;
        let mut log_level = LevelFilter::Info;
        let mut log_file = PathBuf::from(DEFAULT_LOG_FILE);
        let mut headless_frames = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| anyhow!("missing value for {arg}"))
            };
            match arg.as_str() {
                "--steps-per-frame" => steps_per_frame = parse_count(&arg, &value()?)?,
                "--key-hold" => key_hold_frames = parse_count(&arg, &value()?)?,
                "--log-level" => {
                    let level = value()?;
                    log_level = level
                        .parse()
                        .with_context(|| format!("invalid log level {level:?}"))?;
                }
                "--log-file" => log_file = PathBuf::from(value()?),
                "--headless" => headless_frames = Some(parse_count(&arg, &value()?)?),
                "-h" | "--help" => bail!("{USAGE}"),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ if rom_path.is_some() => bail!("only one ROM may be given\n{USAGE}"),
                _ => rom_path = Some(PathBuf::from(&arg)),
            }
        }

        let rom_path = rom_path.ok_or_else(|| anyhow!("no ROM given\n{USAGE}"))?;

        Ok(Self {
            rom_path,
            steps_per_frame,
            key_hold_frames,
            log_level,
            log_file,
            headless_frames,
        })
    }
}

/// Parse a positive count given for `option`.
fn parse_count(option: &str, value: &str) -> anyhow::Result<u32> {
    match value.parse::<u32>() {
        Ok(0) => bail!("{option} must be greater than zero"),
        Ok(n) => Ok(n),
        Err(e) => Err(e).with_context(|| format!("invalid value {value:?} for {option}")),
    }
}
