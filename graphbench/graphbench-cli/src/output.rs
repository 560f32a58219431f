//! Output formatting utilities for the graphbench CLI.
//!
//! Benchmark output goes to stdout; errors go to stderr. In JSON mode only the
//! final report is written to stdout so the output can be piped.

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::style;
use graphbench_core::Timing;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output for scripting
    Json,
    /// Plain text without colors
    Plain,
}

/// Print a success message
pub fn success(msg: impl Display) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: impl Display) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a section header
pub fn header(msg: impl Display) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: impl Display, value: impl Display) {
    println!("  {}: {}", style(key).cyan(), value);
}

/// Create a progress bar for known progress
pub fn progress_bar(len: u64, msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(msg.into());
    pb
}

/// Progress and timing lines emitted while a benchmark runs
#[derive(Debug, Clone)]
pub struct Reporter {
    format: OutputFormat,
    silent: bool,
    captured: Option<Arc<Mutex<Vec<String>>>>,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            silent: false,
            captured: None,
        }
    }

    /// A reporter that prints nothing
    pub fn silent() -> Self {
        Self {
            format: OutputFormat::Plain,
            silent: true,
            captured: None,
        }
    }

    /// A plain reporter that keeps its lines instead of printing them
    pub fn capturing() -> Self {
        Self {
            format: OutputFormat::Plain,
            silent: false,
            captured: Some(Arc::default()),
        }
    }

    /// Lines kept by a capturing reporter
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|lines| lines.lock().clone())
            .unwrap_or_default()
    }

    fn enabled(&self) -> bool {
        !self.silent && self.format != OutputFormat::Json
    }

    fn emit(&self, line: String) {
        match &self.captured {
            Some(lines) => lines.lock().push(line),
            None => println!("{}", line),
        }
    }

    /// A progress line
    pub fn step(&self, msg: impl Display) {
        if self.enabled() {
            self.emit(msg.to_string());
        }
    }

    /// A stage timing line
    pub fn timing(&self, timing: &Timing) {
        if !self.enabled() {
            return;
        }
        match self.format {
            OutputFormat::Human => self.emit(style(timing.line()).bold().to_string()),
            _ => self.emit(timing.line()),
        }
    }

    /// A progress bar, drawn only for human output
    pub fn progress(&self, len: u64, msg: impl Into<String>) -> ProgressBar {
        if self.enabled() && self.format == OutputFormat::Human && self.captured.is_none() {
            progress_bar(len, msg)
        } else {
            ProgressBar::hidden()
        }
    }
}

/// Create a formatted table
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        Self { table }
    }

    pub fn header<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String> + Display,
    {
        let row: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect();
        self.table.set_header(row);
        self
    }

    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String> + Display,
    {
        let row: Vec<Cell> = cells.into_iter().map(Cell::new).collect();
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> Table {
        self.table
    }

    pub fn print(self) {
        println!("{}", self.table);
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Format milliseconds for summaries
pub fn format_millis(millis: f64) -> String {
    if millis < 1000.0 {
        format!("{:.3} ms", millis)
    } else {
        format!("{:.3} s", millis / 1000.0)
    }
}

/// Output data as pretty JSON
pub fn output<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}
