use std::io::{self, Stdout, Write};

use chip8::graphics::{HEIGHT, WIDTH};
use chip8::DisplaySnapshot;
use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{self, ClearType},
};

/// Convert the screen into terminal lines.
///
/// Each line holds two framebuffer rows, drawn with half-block glyphs so the
/// 64x32 screen fits in 64x16 character cells.
pub fn frame_lines(snapshot: &DisplaySnapshot) -> Vec<String> {
    snapshot
        .chunks_exact(2)
        .map(|rows| {
            rows[0]
                .iter()
                .zip(rows[1].iter())
                .map(|(&top, &bottom)| match (top, bottom) {
                    (0, 0) => ' ',
                    (_, 0) => '▀',
                    (0, _) => '▄',
                    _ => '█',
                })
                .collect()
        })
        .collect()
}

/// A renderer for displaying the framebuffer of the `Chip8` in a terminal.
///
/// Creating it switches the terminal to raw mode on the alternate screen;
/// dropping it restores the terminal.
pub struct Renderer {
    stdout: Stdout,
}

impl Renderer {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        Ok(Self { stdout })
    }

    /// Draw the screen inside a border, followed by a status line.
    pub fn draw(&mut self, snapshot: &DisplaySnapshot, status: &str) -> io::Result<()> {
        let border = "─".repeat(WIDTH);
        queue!(self.stdout, cursor::MoveTo(0, 0), Print(format!("┌{border}┐")))?;
        for (row, line) in (1u16..).zip(frame_lines(snapshot)) {
            queue!(self.stdout, cursor::MoveTo(0, row), Print(format!("│{line}│")))?;
        }
        let bottom = (HEIGHT / 2 + 1) as u16;
        queue!(
            self.stdout,
            cursor::MoveTo(0, bottom),
            Print(format!("└{border}┘")),
            cursor::MoveTo(0, bottom + 1),
            terminal::Clear(ClearType::CurrentLine),
            Print(status)
        )?;
        self.stdout.flush()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen) {
            log::error!("Failed to restore the terminal screen: {e}");
        }
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Failed to disable raw mode: {e}");
        }
    }
}
