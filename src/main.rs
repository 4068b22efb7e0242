mod app;
mod color;
mod config;
mod data;
mod output;
mod pipeline;
mod render;
mod state;
mod ui;

use std::path::Path;
use std::process::ExitCode;

use config::RunConfig;

/// Usage: `xyz-plot [config.json]`. Without a config file the built-in
/// defaults are used.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => RunConfig::from_file(Path::new(&path)),
        None => Ok(RunConfig::default()),
    };

    match config.map_err(anyhow::Error::from).and_then(pipeline::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
