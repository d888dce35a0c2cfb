//! Daemon Output Sinks
//!
//! - [`AnsiSink`]: truecolor preview of the grid in the terminal
//! - [`LogSink`]: periodic one-line summary through `tracing`

use std::io::{self, Write};

use anyhow::Context;
use hostglow_core::{FrameSink, RenderedFrame, Rgb};

/// Draws every frame as colored blocks, `columns` cells per row
pub struct AnsiSink<W: Write + Send> {
    out: W,
    columns: usize,
    buffer: String,
}

impl AnsiSink<io::Stdout> {
    /// Preview on stdout
    pub fn stdout(columns: usize) -> Self {
        Self::new(io::stdout(), columns)
    }
}

impl<W: Write + Send> AnsiSink<W> {
    /// Preview into any writer
    pub fn new(out: W, columns: usize) -> Self {
        Self {
            out,
            columns: columns.max(1),
            buffer: String::new(),
        }
    }

    fn draw(&mut self, frame: &RenderedFrame) {
        use std::fmt::Write as _;

        self.buffer.clear();
        self.buffer.push_str("\x1b[H");
        for row in frame.colors.chunks(self.columns) {
            for Rgb { r, g, b } in row {
                let _ = write!(self.buffer, "\x1b[38;2;{r};{g};{b}m██");
            }
            self.buffer.push_str("\x1b[0m\n");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> FrameSink for AnsiSink<W> {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn commit(&mut self, frame: &RenderedFrame) -> anyhow::Result<()> {
        self.draw(frame);
        self.out
            .write_all(self.buffer.as_bytes())
            .and_then(|()| self.out.flush())
            .context("Failed to write preview frame")
    }

    fn close(&mut self) {
        let _ = self.out.write_all(b"\x1b[0m\n");
        let _ = self.out.flush();
    }
}

/// Logs a summary every `every` frames
pub struct LogSink {
    every: u64,
    seen: u64,
}

impl LogSink {
    /// Summarize once per `every` frames (at least 1)
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            seen: 0,
        }
    }
}

impl FrameSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn commit(&mut self, frame: &RenderedFrame) -> anyhow::Result<()> {
        self.seen += 1;
        if self.seen % self.every == 0 {
            let hosts = frame.cell_hosts.iter().filter(|h| h.is_some()).count();
            let lit = frame.colors.iter().filter(|c| **c != Rgb::BLACK).count();
            tracing::debug!(frame = self.seen, cells = frame.len(), hosts, lit, "Frame");
        }
        Ok(())
    }
}
