use std::io::Write;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::error::Error;
use super::format::JsonSink;
use super::level::Level;
use super::options::SinkOptions;
use super::record::{Attr, Record};
use super::sink::Sink;
use super::writer::{MemoryWriter, SharedWriter};

const RESET: &str = "\x1b[0m";

fn color_for(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31;20m",
        Level::Warn => "\x1b[33;20m",
        Level::Info => RESET,
        Level::Debug => "\x1b[35;20m",
    }
}

static TERMINAL_COLOR: Lazy<bool> = Lazy::new(|| {
    let color_terminals = ["xterm", "vt100", "rxvt", "screen"];
    match std::env::var("TERM") {
        Ok(term) => color_terminals.iter().any(|t| term.contains(t)),
        Err(_) => false,
    }
});

/// Reports whether the `TERM` environment variable names a terminal known
/// to support ANSI colors. Evaluated once per process.
pub fn terminal_color_enabled() -> bool {
    *TERMINAL_COLOR
}

/// Colors each formatted line according to its record's level.
///
/// Internally the records are formatted by a [`JsonSink`] pointed at a
/// staging buffer; after each record the buffered line is wrapped in the
/// level's ANSI color (when the terminal supports it) and forwarded to the
/// configured writer. Only one record is staged at a time.
pub struct ColorSink {
    inner: Arc<dyn Sink>,
    buf: MemoryWriter,
    out: SharedWriter,
}

impl ColorSink {
    pub fn new(opts: SinkOptions) -> Self {
        let buf = MemoryWriter::new();
        let out = opts.writer.clone();
        let inner = JsonSink::new(opts.with_writer(buf.clone()));
        Self {
            inner: Arc::new(inner),
            buf,
            out,
        }
    }

    fn rewrap(&self, inner: Arc<dyn Sink>) -> Arc<dyn Sink> {
        Arc::new(Self {
            inner,
            buf: self.buf.clone(),
            out: self.out.clone(),
        })
    }
}

impl Sink for ColorSink {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, record: &Record) -> Result<(), Error> {
        self.inner.handle(record)?;
        let line = self.buf.take();
        let rendered = render(&line, record.level, terminal_color_enabled());
        if !rendered.is_empty() {
            let mut out = self.out.clone();
            out.write_all(rendered.as_bytes())?;
        }
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Sink> {
        self.rewrap(self.inner.with_attrs(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Sink> {
        self.rewrap(self.inner.with_group(name))
    }

    fn close(&self) -> Result<(), Error> {
        self.inner.close()
    }
}

fn render(line: &str, level: Level, color: bool) -> String {
    let line = line.trim_end_matches('\n');
    if line.is_empty() {
        return String::new();
    }
    if color {
        format!("{}{}{}\n", color_for(level), line, RESET)
    } else {
        format!("{line}\n")
    }
}
