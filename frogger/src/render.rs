use crate::assets::Textures;
use crate::error::InitError;
use crate::model::{FIELD_H, FIELD_W};
use crate::present::DrawCall;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

pub(crate) const HUD_ROWS: u16 = 2;
pub(crate) const MIN_COLS: u16 = 20;
pub(crate) const MIN_ROWS: u16 = HUD_ROWS + 10;

const HUD_FG: Color = Color::Rgb {
    r: 230,
    g: 230,
    b: 210,
};
const HUD_BG: Color = Color::Rgb {
    r: 12,
    g: 12,
    b: 18,
};

#[derive(Clone, Copy, PartialEq)]
struct FrameCell {
    ch: char,
    fg: Color,
    bg: Color,
}

const BLANK: FrameCell = FrameCell {
    ch: ' ',
    fg: Color::White,
    bg: Color::Black,
};

/// Alternate-screen terminal with a diffed double buffer.
pub(crate) struct Terminal {
    out: Stdout,
    w: u16,
    h: u16,
    prev: Vec<FrameCell>,
    cur: Vec<FrameCell>,
}

impl Terminal {
    pub(crate) fn begin() -> Result<Self, InitError> {
        let mut out = io::stdout();
        let (w, h) = terminal::size().map_err(InitError::Terminal)?;
        terminal::enable_raw_mode().map_err(InitError::Terminal)?;
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(terminal::ClearType::All)
        )
        .map_err(InitError::Terminal)?;

        let n = (w as usize) * (h as usize);
        Ok(Self {
            out,
            w,
            h,
            prev: vec![BLANK; n],
            cur: vec![BLANK; n],
        })
    }

    pub(crate) fn end(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            ResetColor,
            EnableLineWrap,
            cursor::Show,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub(crate) fn size(&self) -> (u16, u16) {
        (self.w, self.h)
    }

    pub(crate) fn resize_if_needed(&mut self) -> io::Result<bool> {
        let (w, h) = terminal::size()?;
        if w == self.w && h == self.h {
            return Ok(false);
        }
        self.w = w;
        self.h = h;
        let n = (w as usize) * (h as usize);
        self.prev = vec![BLANK; n];
        self.cur = vec![BLANK; n];
        queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        Ok(true)
    }

    fn fill(&mut self, cell: FrameCell) {
        self.cur.fill(cell);
    }

    fn set(&mut self, x: u16, y: u16, cell: FrameCell) {
        if x < self.w && y < self.h {
            self.cur[(y as usize) * (self.w as usize) + (x as usize)] = cell;
        }
    }

    /// Writes a HUD row, padded to the full width so stale text never lingers.
    fn hud_row(&mut self, row: u16, text: &str) {
        let mut chars = text.chars();
        for x in 0..self.w {
            let ch = chars.next().unwrap_or(' ');
            self.set(x, row, FrameCell { ch, fg: HUD_FG, bg: HUD_BG });
        }
    }

    pub(crate) fn flush_diff(&mut self) -> io::Result<()> {
        let runs = changed_runs(&self.prev, &self.cur, self.w as usize);
        queue!(self.out, BeginSynchronizedUpdate)?;
        let mut pen = None::<(Color, Color)>;
        for run in &runs {
            queue!(self.out, cursor::MoveTo(run.x, run.y))?;
            if pen != Some((run.fg, run.bg)) {
                queue!(
                    self.out,
                    SetForegroundColor(run.fg),
                    SetBackgroundColor(run.bg)
                )?;
                pen = Some((run.fg, run.bg));
            }
            queue!(self.out, Print(&run.text))?;
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.copy_from_slice(&self.cur);
        Ok(())
    }
}

/// A stretch of changed cells on one row that share colours.
#[derive(Debug, PartialEq)]
struct Run {
    x: u16,
    y: u16,
    fg: Color,
    bg: Color,
    text: String,
}

fn changed_runs(prev: &[FrameCell], cur: &[FrameCell], w: usize) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    if w == 0 {
        return runs;
    }
    for (y, (old, new)) in prev.chunks(w).zip(cur.chunks(w)).enumerate() {
        let mut open = false;
        for (x, (a, b)) in old.iter().zip(new).enumerate() {
            if a == b {
                open = false;
                continue;
            }
            let extends = open && runs.last().is_some_and(|r| r.fg == b.fg && r.bg == b.bg);
            if extends {
                if let Some(r) = runs.last_mut() {
                    r.text.push(b.ch);
                }
            } else {
                runs.push(Run {
                    x: x as u16,
                    y: y as u16,
                    fg: b.fg,
                    bg: b.bg,
                    text: b.ch.to_string(),
                });
            }
            open = true;
        }
    }
    runs
}

/// Where the play-field lands on screen. One cell is 2x4 braille subpixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    /// subpixels per play-field unit
    pub(crate) scale: f32,
}

impl Viewport {
    fn px_w(&self) -> usize {
        self.cols as usize * 2
    }

    fn px_h(&self) -> usize {
        self.rows as usize * 4
    }
}

pub(crate) fn fit_view(term_w: u16, term_h: u16) -> Option<Viewport> {
    if term_w < MIN_COLS || term_h < MIN_ROWS {
        return None;
    }
    let usable_h = term_h - HUD_ROWS;
    let sx = (term_w as f32 * 2.0) / FIELD_W as f32;
    let sy = (usable_h as f32 * 4.0) / FIELD_H as f32;
    let scale = sx.min(sy);

    let cols = ((FIELD_W as f32 * scale / 2.0).ceil() as u16).min(term_w);
    let rows = ((FIELD_H as f32 * scale / 4.0).ceil() as u16).min(usable_h);
    Some(Viewport {
        x: (term_w - cols) / 2,
        y: HUD_ROWS,
        cols,
        rows,
        scale,
    })
}

fn braille_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (0, 3) => 0x40,
        (1, 3) => 0x80,
        _ => 0,
    }
}

fn braille_char(dots: u8) -> char {
    char::from_u32(0x2800 + dots as u32).unwrap_or(' ')
}

/// Rasterizes draw call indices into a subpixel layer; later calls win.
fn fill_layer(layer: &mut [Option<usize>], v: &Viewport, draws: &[DrawCall], backdrop: bool) {
    let (pw, ph) = (v.px_w(), v.px_h());
    for (i, d) in draws.iter().enumerate() {
        if d.texture.is_backdrop() != backdrop {
            continue;
        }
        let r = d.rect;
        let x0 = ((r.x as f32 * v.scale).floor().max(0.0) as usize).min(pw);
        let x1 = ((r.right() as f32 * v.scale).ceil().max(0.0) as usize).min(pw);
        let y0 = ((r.y as f32 * v.scale).floor().max(0.0) as usize).min(ph);
        let y1 = ((r.bottom() as f32 * v.scale).ceil().max(0.0) as usize).min(ph);
        for y in y0..y1 {
            layer[y * pw + x0..y * pw + x1].fill(Some(i));
        }
    }
}

fn sample_at(
    draw: &DrawCall,
    textures: &Textures,
    v: &Viewport,
    px: usize,
    py: usize,
) -> Option<Color> {
    let lx = (px as f32 + 0.5) / v.scale;
    let ly = (py as f32 + 0.5) / v.scale;
    let r = draw.rect;
    let u = (lx - r.x as f32) / r.w.max(1) as f32;
    let t = (ly - r.y as f32) / r.h.max(1) as f32;
    textures.get(draw.texture).sample(u, t)
}

/// Paints one frame: HUD text on top, the play-field in braille below it.
pub(crate) fn paint(
    term: &mut Terminal,
    v: &Viewport,
    draws: &[DrawCall],
    textures: &Textures,
    hud: &[String; 2],
) {
    term.fill(FrameCell {
        ch: ' ',
        fg: HUD_FG,
        bg: HUD_BG,
    });
    for (row, line) in hud.iter().enumerate() {
        term.hud_row(row as u16, line);
    }

    let (pw, ph) = (v.px_w(), v.px_h());
    let mut back = vec![None; pw * ph];
    let mut front = vec![None; pw * ph];
    fill_layer(&mut back, v, draws, true);
    fill_layer(&mut front, v, draws, false);

    for cy in 0..v.rows as usize {
        for cx in 0..v.cols as usize {
            let (px0, py0) = (cx * 2, cy * 4);

            let bg = back[(py0 + 2) * pw + px0 + 1]
                .and_then(|i| sample_at(&draws[i], textures, v, px0 + 1, py0 + 2))
                .unwrap_or(Color::Black);

            let mut dots = 0u8;
            let mut top: Option<(usize, Color)> = None;
            for dy in 0..4 {
                for dx in 0..2 {
                    let (px, py) = (px0 + dx, py0 + dy);
                    let Some(i) = front[py * pw + px] else {
                        continue;
                    };
                    let Some(color) = sample_at(&draws[i], textures, v, px, py) else {
                        continue;
                    };
                    dots |= braille_bit(dx, dy);
                    if top.map_or(true, |(j, _)| i >= j) {
                        top = Some((i, color));
                    }
                }
            }

            let (ch, fg) = match top {
                Some((_, fg)) => (braille_char(dots), fg),
                None => (' ', HUD_FG),
            };
            term.set(v.x + cx as u16, v.y + cy as u16, FrameCell { ch, fg, bg });
        }
    }
}

pub(crate) fn paint_too_small(term: &mut Terminal) {
    term.fill(FrameCell {
        ch: ' ',
        fg: HUD_FG,
        bg: HUD_BG,
    });
    term.hud_row(0, &format!("Terminal too small. Try at least {MIN_COLS}x{MIN_ROWS}."));
}
