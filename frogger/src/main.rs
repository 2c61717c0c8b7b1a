mod app;
mod assets;
mod config;
mod error;
mod geom;
mod input;
mod model;
mod present;
mod render;
mod sim;
mod spawner;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = config::Args::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            eprintln!("frogger: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 2 when the game never got going, 1 when it failed mid-session.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.chain().any(|e| e.is::<error::InitError>()) {
        2
    } else {
        1
    }
}
