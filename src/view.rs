use crate::error::Result;
use crate::log_entry::LogEntry;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, StyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use log::error;
use std::io::{self, Write};

/// The UI surface the client writes to: a status line and a scrolling log.
pub trait LogView {
    fn set_status(&mut self, status: &str);

    /// Replaces the log contents with a single informational message.
    fn show_placeholder(&mut self, text: &str);

    /// Removes all entries and any placeholder.
    fn clear(&mut self);

    /// Appends `entry` at the end and scrolls so it is visible.
    fn append(&mut self, entry: &LogEntry);
}

/// In-memory log container with a fixed-height viewport.
#[derive(Debug, Clone)]
pub struct MemoryView {
    status: String,
    history: Vec<String>,
    placeholder: Option<String>,
    entries: Vec<LogEntry>,
    viewport_rows: usize,
    scroll_top: usize,
}

impl MemoryView {
    pub fn new(viewport_rows: usize) -> Self {
        Self {
            status: String::new(),
            history: Vec::new(),
            placeholder: None,
            entries: Vec::new(),
            viewport_rows,
            scroll_top: 0,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Every status text set so far, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    /// Rows of content, one per entry plus the placeholder when shown.
    pub fn scroll_height(&self) -> usize {
        self.entries.len() + usize::from(self.placeholder.is_some())
    }

    pub fn max_scroll(&self) -> usize {
        self.scroll_height().saturating_sub(self.viewport_rows)
    }
}

impl LogView for MemoryView {
    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.history.push(self.status.clone());
    }

    fn show_placeholder(&mut self, text: &str) {
        self.entries.clear();
        self.placeholder = Some(text.to_string());
        self.scroll_top = 0;
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.placeholder = None;
        self.scroll_top = 0;
    }

    fn append(&mut self, entry: &LogEntry) {
        self.entries.push(entry.clone());
        self.scroll_top = self.max_scroll();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
    pub timestamps: bool,
    pub json: bool,
}

/// Separator written to a non-terminal feed when the log is cleared.
pub const CLEARED_SEPARATOR: &str = "---- log cleared ----";

/// Streams entries to a terminal. Log lines go to `out`; status and
/// placeholder text go to `status_out` so piped output stays clean.
pub struct TerminalView {
    out: Box<dyn Write + Send>,
    status_out: Box<dyn Write + Send>,
    options: RenderOptions,
    status: String,
    /// `out` is an interactive terminal that can be wiped
    out_is_tty: bool,
    /// Entries written since the last clear
    written: usize,
}

impl TerminalView {
    pub fn new(options: RenderOptions) -> Self {
        let stdout = io::stdout();
        let out_is_tty = stdout.is_tty();
        let mut view = Self::with_writers(Box::new(stdout), Box::new(io::stderr()), options);
        view.out_is_tty = out_is_tty;
        view
    }

    pub fn with_writers(
        out: Box<dyn Write + Send>,
        status_out: Box<dyn Write + Send>,
        options: RenderOptions,
    ) -> Self {
        Self {
            out,
            status_out,
            options,
            status: String::new(),
            out_is_tty: false,
            written: 0,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn write_entry(&mut self, entry: &LogEntry) -> Result<()> {
        if self.options.json {
            serde_json::to_writer(&mut self.out, entry)?;
            writeln!(self.out)?;
        } else {
            let line = format_entry(entry, self.options.timestamps);
            match entry.class.as_deref() {
                Some(class) if self.options.color => {
                    writeln!(self.out, "{}", style_for_class(class, line))?
                }
                _ => writeln!(self.out, "{line}")?,
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Wipes the screen on a terminal; elsewhere marks the cut with a
    /// separator line. JSON output is left untouched.
    fn clear_output(&mut self) -> Result<()> {
        if self.written == 0 || self.options.json {
            return Ok(());
        }

        if self.out_is_tty {
            queue!(self.out, Clear(ClearType::Purge), Clear(ClearType::All), MoveTo(0, 0))?;
        } else if self.options.color {
            writeln!(self.out, "{}", CLEARED_SEPARATOR.dark_grey())?;
        } else {
            writeln!(self.out, "{CLEARED_SEPARATOR}")?;
        }
        self.out.flush()?;
        self.written = 0;
        Ok(())
    }

    fn write_status_line(&mut self, text: &str) -> Result<()> {
        if self.options.color {
            writeln!(self.status_out, "{}", format!("-- {text}").dark_cyan())?;
        } else {
            writeln!(self.status_out, "-- {text}")?;
        }
        self.status_out.flush()?;
        Ok(())
    }
}

impl LogView for TerminalView {
    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        if let Err(e) = self.write_status_line(status) {
            error!("Failed to write status line: {}", e);
        }
    }

    fn show_placeholder(&mut self, text: &str) {
        if let Err(e) = self.write_status_line(text) {
            error!("Failed to write placeholder: {}", e);
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.clear_output() {
            error!("Failed to clear log output: {}", e);
        }
    }

    fn append(&mut self, entry: &LogEntry) {
        match self.write_entry(entry) {
            Ok(()) => self.written += 1,
            Err(e) => error!("Failed to write log entry: {}", e),
        }
    }
}

fn format_entry(entry: &LogEntry, timestamps: bool) -> String {
    if timestamps {
        format!("{} {}", entry.received_at.format("%H:%M:%S"), entry.message)
    } else {
        entry.message.clone()
    }
}

/// Terminal colour for a classification token.
pub fn class_colour(class: &str) -> Option<Color> {
    if class.starts_with("CRITICAL") {
        return Some(Color::Red);
    }

    match class {
        "ERROR" | "AUTH_ERROR" | "WEBSOCKET_FAIL" => Some(Color::Red),
        "WARN" | "WARNING" | "DISCONNECT" => Some(Color::Yellow),
        "LOGIN" | "REGISTER" | "CONNECT" | "WEBSOCKET_AUTH" => Some(Color::Green),
        "SERVER" | "WEB" | "WEBSOCKET" => Some(Color::Cyan),
        "PUBLIC_MSG" | "PRIVATE_MSG" => Some(Color::Blue),
        "DEBUG" | "TRACE" => Some(Color::DarkGrey),
        _ => None,
    }
}

fn style_for_class(class: &str, line: String) -> StyledContent<String> {
    let styled = match class_colour(class) {
        Some(colour) => line.with(colour),
        None => line.stylize(),
    };

    if class.starts_with("CRITICAL") {
        styled.bold()
    } else {
        styled
    }
}
