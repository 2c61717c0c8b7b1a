use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use image::{Rgba, RgbaImage};
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

const FIELD_W: i32 = 300;
const FIELD_H: i32 = 400;
const STEP: i32 = 15;
const SPRITE: i32 = 20;
const FRAME: Duration = Duration::from_millis(15);

const PLAYER_RGB: (u8, u8, u8) = (220, 40, 30);
const OUTSIDE: Color = Color::Black;

const PLAYER_FILE: &str = "player.png";
const BACKGROUND_FILE: &str = "background.bmp";

#[derive(Parser, Debug)]
#[command(name = "mario", about = "Walk the sprite off the top of the screen")]
struct Args {
    /// directory with player.png and background.bmp (built-in colours otherwise)
    #[arg(long)]
    assets: Option<PathBuf>,
}

/// Decoded images, or `None` to paint from the built-in palette.
#[derive(Default)]
struct Art {
    player: Option<RgbaImage>,
    background: Option<RgbaImage>,
}

impl Art {
    fn load(dir: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            player: Some(open_rgba(&dir.join(PLAYER_FILE))?),
            background: Some(open_rgba(&dir.join(BACKGROUND_FILE))?),
        })
    }
}

fn open_rgba(path: &Path) -> anyhow::Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok(img.into_rgba8())
}

/// Stretches the image over the unit square; transparent texels come back as `None`.
fn texel(img: &RgbaImage, u: f32, v: f32) -> Option<Color> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let x = ((u.clamp(0.0, 1.0) * img.width() as f32) as u32).min(img.width() - 1);
    let y = ((v.clamp(0.0, 1.0) * img.height() as f32) as u32).min(img.height() - 1);
    let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
    (a >= 128).then_some(Color::Rgb { r, g, b })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Move {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Sprite {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl Sprite {
    fn covers(&self, x: f32, y: f32) -> bool {
        x >= self.x as f32
            && x < (self.x + self.w) as f32
            && y >= self.y as f32
            && y < (self.y + self.h) as f32
    }
}

#[derive(Debug)]
struct Game {
    player: Sprite,
}

impl Game {
    fn new() -> Self {
        let mut g = Self {
            player: Sprite {
                x: 0,
                y: 0,
                w: SPRITE,
                h: SPRITE,
            },
        };
        g.reset_player();
        g
    }

    /// Bottom centre of the field.
    fn reset_player(&mut self) {
        self.player.x = FIELD_W / 2 - self.player.w / 2;
        self.player.y = FIELD_H - self.player.h;
    }

    fn nudge(&mut self, m: Move) {
        match m {
            Move::Up => self.player.y -= STEP,
            Move::Down => self.player.y += STEP,
            Move::Left => self.player.x -= STEP,
            Move::Right => self.player.x += STEP,
        }
    }

    /// Runs once per frame after all moves; walking off the top starts over.
    fn settle(&mut self) {
        if self.player.y < 0 {
            self.reset_player();
        }
    }
}

// sky fades toward the horizon
fn sky(y: f32) -> (u8, u8, u8) {
    let t = (y / FIELD_H as f32).clamp(0.0, 1.0);
    let lerp = |a: f32, b: f32| (a + (b - a) * t) as u8;
    (lerp(70.0, 150.0), lerp(120.0, 200.0), lerp(230.0, 250.0))
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Logical units per half-cell and the column where the field starts.
fn layout(cols: u16, rows: u16) -> Option<(f32, u16)> {
    let view_rows = rows.checked_sub(1)?;
    if cols == 0 || view_rows == 0 {
        return None;
    }
    let sub_rows = view_rows as f32 * 2.0;
    let scale = (FIELD_W as f32 / cols as f32).max(FIELD_H as f32 / sub_rows);
    let used = (FIELD_W as f32 / scale).ceil() as u16;
    Some((scale, cols.saturating_sub(used) / 2))
}

fn shade(g: &Game, art: &Art, lx: f32, ly: f32) -> Color {
    if lx < 0.0 || ly < 0.0 || lx >= FIELD_W as f32 || ly >= FIELD_H as f32 {
        return OUTSIDE;
    }
    let backdrop = || {
        art.background
            .as_ref()
            .and_then(|img| texel(img, lx / FIELD_W as f32, ly / FIELD_H as f32))
            .unwrap_or_else(|| rgb(sky(ly)))
    };
    if !g.player.covers(lx, ly) {
        return backdrop();
    }
    match &art.player {
        Some(img) => {
            let u = (lx - g.player.x as f32) / g.player.w as f32;
            let v = (ly - g.player.y as f32) / g.player.h as f32;
            texel(img, u, v).unwrap_or_else(backdrop)
        }
        None => rgb(PLAYER_RGB),
    }
}

fn render(g: &Game, art: &Art, out: &mut Stdout) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    queue!(out, BeginSynchronizedUpdate, cursor::MoveTo(0, 0))?;

    let hud = format!(
        " MARIO | x {:>4} y {:>4} | arrows move, q quits",
        g.player.x, g.player.y
    );
    let hud: String = hud.chars().take(cols as usize).collect();
    queue!(
        out,
        ResetColor,
        Clear(ClearType::CurrentLine),
        Print(hud)
    )?;

    let Some((scale, left)) = layout(cols, rows) else {
        queue!(out, EndSynchronizedUpdate)?;
        return out.flush();
    };

    // each cell is two stacked half-cells: fg paints the top, bg the bottom
    for cy in 0..rows - 1 {
        queue!(out, cursor::MoveTo(0, cy + 1))?;
        let mut last: Option<(Color, Color)> = None;
        for cx in 0..cols {
            let lx = (cx as f32 - left as f32 + 0.5) * scale;
            let top = shade(g, art, lx, (cy as f32 * 2.0 + 0.5) * scale);
            let bottom = shade(g, art, lx, (cy as f32 * 2.0 + 1.5) * scale);
            if last != Some((top, bottom)) {
                queue!(out, SetForegroundColor(top), SetBackgroundColor(bottom))?;
                last = Some((top, bottom));
            }
            queue!(out, Print('▀'))?;
        }
    }

    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()
}

/// Returns false once a quit key arrives.
fn handle_input(g: &mut Game) -> io::Result<bool> {
    while event::poll(Duration::ZERO)? {
        let Event::Key(k) = event::read()? else {
            continue;
        };
        if k.kind != KeyEventKind::Press {
            continue;
        }
        let quit_chord =
            k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c');
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(false),
            _ if quit_chord => return Ok(false),
            KeyCode::Up => g.nudge(Move::Up),
            KeyCode::Down => g.nudge(Move::Down),
            KeyCode::Left => g.nudge(Move::Left),
            KeyCode::Right => g.nudge(Move::Right),
            _ => {}
        }
    }
    Ok(true)
}

fn run(art: &Art, out: &mut Stdout) -> anyhow::Result<()> {
    let mut g = Game::new();
    loop {
        let started = Instant::now();
        if !handle_input(&mut g).context("reading keys")? {
            return Ok(());
        }
        g.settle();
        render(&g, art, out).context("drawing frame")?;
        if let Some(left) = FRAME.checked_sub(started.elapsed()) {
            std::thread::sleep(left);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let art = match args.assets.as_deref().map(Art::load).transpose() {
        Ok(art) => art.unwrap_or_default(),
        Err(err) => {
            eprintln!("mario: {err:#}");
            return ExitCode::from(2);
        }
    };

    let mut out = io::stdout();

    let setup = terminal::enable_raw_mode()
        .and_then(|()| execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All)));
    if let Err(err) = setup {
        let _ = terminal::disable_raw_mode();
        eprintln!("mario: terminal setup failed: {err}");
        return ExitCode::from(2);
    }

    let res = run(&art, &mut out);

    let _ = execute!(out, ResetColor, cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mario: {err:#}");
            ExitCode::FAILURE
        }
    }
}
