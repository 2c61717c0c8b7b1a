use crate::model::{ClampMode, Rules};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "frogger", about = "Cross the road, ride the logs, reach the far bank")]
pub(crate) struct Args {
    /// seed for the obstacle layout (defaults to the wall clock)
    #[arg(long)]
    seed: Option<u64>,

    /// ms per frame
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// directory with truck.png, logLong.png, frog.png, background.bmp, bar.bmp, gameOver.png
    #[arg(long)]
    assets: Option<PathBuf>,

    /// how a frog outside the field is pulled back
    #[arg(long, value_enum, default_value_t = Clamp::Exclusive)]
    clamp: Clamp,

    /// disable the pause key
    #[arg(long)]
    no_pause: bool,

    /// draw the frog beneath trucks and logs
    #[arg(long)]
    player_under: bool,

    /// write logs to this file (filter with RUST_LOG, default info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Clamp {
    /// one bound per frame, in the order: bottom, left, right
    Exclusive,
    /// every violated bound
    Independent,
}

impl From<Clamp> for ClampMode {
    fn from(c: Clamp) -> Self {
        match c {
            Clamp::Exclusive => ClampMode::Exclusive,
            Clamp::Independent => ClampMode::Independent,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) seed: Option<u64>,
    pub(crate) frame: Duration,
    pub(crate) assets: Option<PathBuf>,
    pub(crate) rules: Rules,
    pub(crate) log_file: Option<PathBuf>,
}

impl From<Args> for Settings {
    fn from(a: Args) -> Self {
        Self {
            seed: a.seed,
            frame: Duration::from_millis(a.frame_ms.max(1)),
            assets: a.assets,
            rules: Rules {
                pause_enabled: !a.no_pause,
                clamp: a.clamp.into(),
                player_under_obstacles: a.player_under,
            },
            log_file: a.log_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(argv: &[&str]) -> Settings {
        let mut full = vec!["frogger"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap().into()
    }

    #[test]
    fn test_defaults_match_most_complete_variant() {
        let s = settings(&[]);
        assert_eq!(s.frame, Duration::from_millis(16));
        assert!(s.rules.pause_enabled);
        assert_eq!(s.rules.clamp, ClampMode::Exclusive);
        assert!(!s.rules.player_under_obstacles);
        assert!(s.seed.is_none());
        assert!(s.assets.is_none());
    }

    #[test]
    fn test_variant_flags() {
        let s = settings(&[
            "--no-pause",
            "--clamp",
            "independent",
            "--player-under",
            "--seed",
            "42",
            "--frame-ms",
            "0",
        ]);
        assert!(!s.rules.pause_enabled);
        assert_eq!(s.rules.clamp, ClampMode::Independent);
        assert!(s.rules.player_under_obstacles);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.frame, Duration::from_millis(1));
    }

    #[test]
    fn test_rejects_unknown_clamp() {
        assert!(Args::try_parse_from(["frogger", "--clamp", "sideways"]).is_err());
    }
}
