//! Terminal rendering of execution results.
//!
//! One line per [`ExecutionResult`]: green `✓` lines for successes, red `✗`
//! lines for failures.  Colour is only emitted when the writer is a terminal.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Attribute, Color, ContentStyle, Print, ResetColor, SetStyle},
};

use crate::script::exec::ExecutionResult;

/// Style for a result line.
pub fn result_style(result: &ExecutionResult) -> ContentStyle {
    let mut style = ContentStyle::new();
    if result.success() {
        style.foreground_color = Some(Color::DarkGreen);
    } else {
        style.foreground_color = Some(Color::Red);
        style.attributes.set(Attribute::Bold);
    }
    style
}

/// Writes result lines, coloured or plain.
pub struct ResultPrinter<W: Write> {
    out: W,
    color: bool,
}

impl ResultPrinter<io::Stdout> {
    /// Print to stdout, coloured when stdout is a terminal.
    pub fn stdout() -> Self {
        use std::io::IsTerminal;
        let color = io::stdout().is_terminal();
        ResultPrinter { out: io::stdout(), color }
    }
}

impl<W: Write> ResultPrinter<W> {
    pub fn new(out: W, color: bool) -> Self {
        ResultPrinter { out, color }
    }

    pub fn print(&mut self, result: &ExecutionResult) -> io::Result<()> {
        let line = result.to_string();
        if self.color {
            queue!(self.out, SetStyle(result_style(result)), Print(line), ResetColor, Print("\n"))?;
        } else {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    /// Print every result; returns how many failed.
    pub fn print_all<'a, I>(&mut self, results: I) -> io::Result<usize>
    where
        I: IntoIterator<Item = &'a ExecutionResult>,
    {
        let mut failed = 0;
        for r in results {
            if !r.success() {
                failed += 1;
            }
            self.print(r)?;
        }
        Ok(failed)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
