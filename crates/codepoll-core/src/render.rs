//! Render surfaces for a `Page`.

use std::io::{self, Write};

use crate::page::{CodesArea, CountdownView, Page};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Anything that can present a page. Called once per batch of changes.
pub trait Renderer: Send + 'static {
    fn render(&mut self, page: &Page) -> io::Result<()>;
}

/// Full-redraw terminal view: one `name  value` line per row, then the countdown.
pub struct TerminalRenderer<W> {
    out: W,
    clear: bool,
}

impl<W: Write + Send + 'static> TerminalRenderer<W> {
    /// `clear` emits an ANSI clear-screen before each frame.
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout(clear: bool) -> Self {
        Self::new(io::stdout(), clear)
    }
}

impl<W: Write + Send + 'static> Renderer for TerminalRenderer<W> {
    fn render(&mut self, page: &Page) -> io::Result<()> {
        let mut frame = String::new();
        if self.clear {
            frame.push_str(CLEAR_SCREEN);
        }
        match &page.codes {
            CodesArea::Error(msg) => {
                frame.push_str(msg);
                frame.push('\n');
            }
            CodesArea::Rows(board) => {
                let width = board
                    .rows()
                    .iter()
                    .map(|r| r.name.chars().count())
                    .max()
                    .unwrap_or(0);
                for row in board.rows() {
                    frame.push_str(&format!("{:<width$}  {}\n", row.name, row.value));
                }
            }
        }
        match page.countdown {
            CountdownView::Hidden => {}
            CountdownView::Blank => frame.push('\n'),
            CountdownView::Seconds(n) => frame.push_str(&format!("{n}\n")),
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}
