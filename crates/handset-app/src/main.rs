//! Handset desktop entry point.
//!
//! Runs the device shell as a line-driven session: each line on stdin is a
//! shell control (`:unlock`, `:open Notes`, `:drag 0 3`, ...) or a command
//! for the open applet. The screen is printed after every line. Settings
//! and the home layout persist under the configured storage directory.

mod app_state;
mod commands;
mod input;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use app_state::AppState;
use commands::Flow;
use handset_core::config::HandsetConfig;
use handset_core::platform::{Collaborators, DesktopPlatform, FileStorage};
use handset_core::shell::DeviceShell;

fn draw(state: &mut AppState, out: &mut impl Write) -> io::Result<()> {
    for line in render::frame(state) {
        writeln!(out, "{line}")?;
    }
    write!(out, "{}> ", state.config.device_label)?;
    out.flush()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Config path from CLI arg or HANDSET_CONFIG.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HANDSET_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("handset.toml"));
    let config = HandsetConfig::load(&config_path)?;
    log::info!(
        "Starting {} (storage in {})",
        config.device_label,
        config.storage_dir.display()
    );

    let platform = DesktopPlatform::new().with_battery(85);
    let storage = FileStorage::new(&config.storage_dir);
    let shell = DeviceShell::new(
        &config,
        Box::new(platform),
        Box::new(storage),
        Collaborators::in_memory(),
    );
    let mut state = AppState::new(config, shell);
    state.say("Type :help for controls.");

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    draw(&mut state, &mut out)?;

    for line in stdin.lock().lines() {
        let line = line?;
        state.shell.tick();
        let parsed = input::parse_line(&line, state.shell.geometry());
        let flow = match parsed {
            Ok(parsed) => commands::apply(&mut state, parsed),
            Err(e) => {
                state.say(e.to_string());
                Flow::Continue
            },
        };
        if flow == Flow::Quit {
            break;
        }
        draw(&mut state, &mut out)?;
    }

    writeln!(out)?;
    log::info!("Handset shut down cleanly");
    Ok(())
}
