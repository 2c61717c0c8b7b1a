use anyhow::Context;
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use std::process::ExitCode;
use std::time::Duration;

const SCREEN_WIDTH: u32 = 640;
const SCREEN_HEIGHT: u32 = 480;
const HOLD: Duration = Duration::from_secs(2);

fn title() -> String {
    format!(" Hello window ({SCREEN_WIDTH}x{SCREEN_HEIGHT})")
}

/// Paints every cell white, with the title on the first row.
fn fill_white(out: &mut Stdout) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    queue!(
        out,
        SetBackgroundColor(Color::White),
        SetForegroundColor(Color::Black),
        Clear(ClearType::All)
    )?;
    let blank = " ".repeat(cols as usize);
    for y in 0..rows {
        queue!(out, cursor::MoveTo(0, y), Print(&blank))?;
    }
    let t: String = title().chars().take(cols as usize).collect();
    queue!(out, cursor::MoveTo(0, 0), Print(t), ResetColor)?;
    out.flush()
}

fn run(out: &mut Stdout) -> anyhow::Result<()> {
    fill_white(out).context("filling the screen")?;
    std::thread::sleep(HOLD);
    Ok(())
}

fn main() -> ExitCode {
    let mut out = io::stdout();
    if let Err(err) = execute!(out, EnterAlternateScreen, cursor::Hide) {
        eprintln!("hello_window: could not open the screen: {err}");
        return ExitCode::from(2);
    }

    let res = run(&mut out);
    let _ = execute!(out, ResetColor, cursor::Show, LeaveAlternateScreen);

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("hello_window: {err:#}");
            ExitCode::FAILURE
        }
    }
}
