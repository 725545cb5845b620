use std::fmt::Write as _;

use tracing::warn;

use crate::record::{display_timestamp, SuppressedEvent};

const BOLD_WHITE: &str = "\x1b[1;37m";
const RESET: &str = "\x1b[0m";

/// How suppression records are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per record
    #[default]
    #[value(name = "json", alias = "structured")]
    Structured,
    /// Sectioned, markdown-style layout
    #[value(name = "markdown", alias = "long")]
    Long,
    /// Labelled single lines with trimmed text
    #[value(name = "compact")]
    Compact,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Structured => write!(f, "json"),
            OutputFormat::Long => write!(f, "markdown"),
            OutputFormat::Compact => write!(f, "compact"),
        }
    }
}

pub struct Renderer {
    format: OutputFormat,
    emphasis: bool,
}

impl Renderer {
    /// `emphasis` wraps section labels in ANSI bold; only worth it on a terminal.
    pub fn new(format: OutputFormat, emphasis: bool) -> Self {
        Self { format, emphasis }
    }

    /// Render one record, including its trailing newline.
    ///
    /// Returns `None` when the structured document cannot be produced; the
    /// record is then skipped rather than failing the caller.
    pub fn render(&self, record: &SuppressedEvent) -> Option<String> {
        match self.format {
            OutputFormat::Structured => render_structured(record),
            OutputFormat::Long => Some(self.render_long(record)),
            OutputFormat::Compact => Some(self.render_compact(record)),
        }
    }

    fn label(&self, text: &str) -> String {
        if self.emphasis {
            format!("{BOLD_WHITE}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn render_long(&self, record: &SuppressedEvent) -> String {
        let mut out = String::new();
        let mut section = |title: &str, body: &str| {
            let _ = write!(out, "{}\n\n{}\n\n", self.label(&format!("## {title}")), body);
        };

        section("Timestamp", &display_timestamp(&record.event.ts));
        section(record.origin.kind.label(), &record.origin.name);
        section("Username", record.username());
        section("Text", &record.event.text);

        let _ = write!(out, "{}\n\n", self.label("## Attachments"));
        for attachment in &record.event.attachments {
            let _ = write!(out, "{}\n\n", attachment.fallback);
        }
        out.push_str("---\n\n");
        out
    }

    fn render_compact(&self, record: &SuppressedEvent) -> String {
        let mut out = String::new();
        let mut line = |label: &str, value: &str| {
            let _ = writeln!(out, "{}{}", self.label(&format!("{label}: ")), value);
        };

        line("Timestamp", &display_timestamp(&record.event.ts));
        line(record.origin.kind.label(), &record.origin.name);
        line("Username", record.username());

        let _ = writeln!(out, "{}", self.label("Text:"));
        let _ = writeln!(out, "{}", record.event.text.trim());

        if !record.event.attachments.is_empty() {
            let _ = writeln!(out, "{}", self.label("Attachments:"));
            for attachment in &record.event.attachments {
                let _ = writeln!(out, "{}", attachment.fallback.trim());
            }
        }
        out.push_str("---\n");
        out
    }
}

fn render_structured(record: &SuppressedEvent) -> Option<String> {
    match serde_json::to_string(record) {
        Ok(json) => Some(json + "\n"),
        Err(e) => {
            warn!("Skipping record for {}: {}", record.origin.name, e);
            None
        }
    }
}
