use crate::assets::Textures;
use crate::config::{Args, Settings};
use crate::error::InitError;
use crate::input::drain_actions;
use crate::model::{Death, GameSession};
use crate::present::{compose, hud_lines};
use crate::render::{fit_view, paint, paint_too_small, Terminal, MIN_COLS, MIN_ROWS};
use crate::sim::{GameEvent, Signal};
use anyhow::Context;
use crossterm::terminal;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

struct App {
    settings: Settings,
    session: GameSession,
    textures: Textures,
}

impl App {
    fn run(&mut self, term: &mut Terminal) -> anyhow::Result<()> {
        loop {
            let started = Instant::now();
            term.resize_if_needed()?;

            let actions = drain_actions()?;
            let report = self.session.step(&actions);
            for event in report.events {
                self.on_event(event)?;
            }
            if report.signal == Signal::Stop {
                log::info!("quit on level {}", self.session.level);
                return Ok(());
            }

            self.draw(term)?;
            pace(started, self.settings.frame);
        }
    }

    fn on_event(&mut self, event: GameEvent) -> anyhow::Result<()> {
        match event {
            GameEvent::Paused => log::info!("paused"),
            GameEvent::Resumed => log::info!("resumed"),
            GameEvent::Died(Death::Hit) => {
                log::info!("hit by a truck on level {}", self.session.level)
            }
            GameEvent::Died(Death::Drowned) => {
                log::info!("drowned on level {}", self.session.level)
            }
            GameEvent::LevelCleared { level } => {
                let fastest = self
                    .session
                    .trucks
                    .iter()
                    .chain(&self.session.logs)
                    .map(|o| o.speed)
                    .max()
                    .unwrap_or(0);
                log::info!("level cleared, now on {level} (top speed {fastest})");
            }
            GameEvent::Restarted => {
                log::info!("restart, reloading textures");
                self.textures = Textures::from_source(self.settings.assets.as_deref())
                    .inspect_err(|e| log::error!("{e}"))
                    .context("reloading textures on restart")?;
            }
        }
        Ok(())
    }

    fn draw(&self, term: &mut Terminal) -> anyhow::Result<()> {
        let (w, h) = term.size();
        match fit_view(w, h) {
            Some(view) => {
                let draws = compose(&self.session);
                let hud = hud_lines(&self.session);
                paint(term, &view, &draws, &self.textures, &hud);
            }
            None => paint_too_small(term),
        }
        term.flush_diff().context("writing frame")
    }
}

/// Sleeps out whatever is left of the frame.
fn pace(started: Instant, frame: Duration) {
    let end = started + frame;
    loop {
        let now = Instant::now();
        if now >= end {
            break;
        }
        let left = end - now;
        if left > Duration::from_millis(2) {
            std::thread::sleep(left - Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0xC0FFEE_u64)
}

fn init_logging(path: Option<&Path>) -> Result<(), InitError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).map_err(|source| InitError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    let settings = Settings::from(args);
    init_logging(settings.log_file.as_deref())?;

    let (cols, rows) = terminal::size().map_err(InitError::Terminal)?;
    if fit_view(cols, rows).is_none() {
        return Err(InitError::TooSmall {
            cols,
            rows,
            min_cols: MIN_COLS,
            min_rows: MIN_ROWS,
        }
        .into());
    }

    let textures =
        Textures::from_source(settings.assets.as_deref()).map_err(InitError::Assets)?;
    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!(
        "seed {seed}, textures from {}, rules {:?}",
        textures.describe(),
        settings.rules
    );

    let session = GameSession::new(seed, settings.rules);
    let mut app = App {
        settings,
        session,
        textures,
    };

    let mut term = Terminal::begin()?;
    let res = app.run(&mut term);
    let restored = term.end();
    res?;
    restored.context("restoring terminal")?;
    Ok(())
}
