use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that stops the game from starting. Fatal, never retried.
#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("could not set up the terminal")]
    Terminal(#[source] io::Error),

    #[error("terminal is {cols}x{rows}, need at least {min_cols}x{min_rows}")]
    TooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },

    #[error("could not load textures")]
    Assets(#[from] AssetError),

    #[error("could not open log file {}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not install logger")]
    Logger(#[from] log::SetLoggerError),
}

#[derive(Debug, Error)]
#[error("failed to load texture {}", .path.display())]
pub(crate) struct AssetError {
    pub(crate) path: PathBuf,
    #[source]
    pub(crate) source: image::ImageError,
}
