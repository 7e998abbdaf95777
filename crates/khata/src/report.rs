//! Human-readable report.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Utc};
use crossterm::style::{Attribute, Color, ContentStyle};
use serde_json::Value;
use tracing::warn;

use crate::{ErrorRecord, ReportConfig};

/// Timestamp layout used in the Details section.
const REPORT_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Visual roles in the report.
#[derive(Debug, Clone, Copy)]
enum Tone {
    Headline,
    Section,
    File,
    Line,
    Function,
    Label,
    Value,
}

impl Tone {
    fn style(self) -> ContentStyle {
        let (color, attribute) = match self {
            Tone::Headline => (Color::Red, Some(Attribute::Bold)),
            Tone::Section => (Color::Yellow, Some(Attribute::Bold)),
            Tone::File => (Color::Grey, Some(Attribute::Underlined)),
            Tone::Line => (Color::Green, None),
            Tone::Function => (Color::Cyan, None),
            Tone::Label => (Color::White, Some(Attribute::Bold)),
            Tone::Value => (Color::Cyan, None),
        };
        let mut style = ContentStyle {
            foreground_color: Some(color),
            ..ContentStyle::default()
        };
        if let Some(attribute) = attribute {
            style.attributes.set(attribute);
        }
        style
    }
}

/// True when the `NO_COLOR` convention asks for unstyled output.
fn no_color_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

struct Painter<'a> {
    config: &'a ReportConfig,
    color: bool,
}

impl<'a> Painter<'a> {
    fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            color: config.color && !no_color_requested(),
        }
    }

    fn paint(&self, tone: Tone, text: impl Display) -> String {
        if self.color {
            tone.style().apply(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn site(&self, file: &str, line: u32, function_name: &str) -> String {
        format!(
            "{}:{} ({})",
            self.paint(Tone::File, self.config.trim_path(file)),
            self.paint(Tone::Line, line),
            self.paint(Tone::Function, self.config.trim_function(function_name)),
        )
    }

    fn section(&self, title: &str) -> String {
        format!("\n=== {}", self.paint(Tone::Section, title))
    }

    fn detail(&self, label: &str, value: impl Display) -> String {
        format!(
            "  {}: {}",
            self.paint(Tone::Label, label),
            self.paint(Tone::Value, value)
        )
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(REPORT_TIME_FORMAT).to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl ErrorRecord {
    /// Writes the human report to `out`.
    ///
    /// Sections, in order: the message, `Explanations` (oldest first),
    /// `Trace` (freshly captured, innermost first), `Details` and, when any
    /// are set, `Properties`. Capturing the trace overwrites the stored one.
    ///
    /// Styling is skipped when `config.color` is off or `NO_COLOR` is set.
    pub fn write_report<W: Write>(&mut self, config: &ReportConfig, out: &mut W) -> io::Result<()> {
        let handled_at = Utc::now();
        let painter = Painter::new(config);

        writeln!(out)?;
        writeln!(out, "{}", painter.paint(Tone::Headline, self.message()))?;

        writeln!(out, "{}", painter.section("Explanations"))?;
        for explanation in self.explanations() {
            writeln!(
                out,
                "  {}\n  └── {}",
                painter.site(
                    explanation.file(),
                    *explanation.line(),
                    explanation.function_name()
                ),
                painter.paint(Tone::Label, explanation.message()),
            )?;
        }

        writeln!(out, "{}", painter.section("Trace"))?;
        for frame in self.trace() {
            writeln!(
                out,
                "  {}",
                painter.site(frame.file(), *frame.line(), frame.function_name())
            )?;
        }

        let elapsed = (handled_at - self.created_at()).num_milliseconds() as f64 / 1000.0;
        writeln!(out, "{}", painter.section("Details"))?;
        writeln!(out, "{}", painter.detail("Error Type", self.error_type()))?;
        writeln!(out, "{}", painter.detail("Error Code", self.code()))?;
        writeln!(out, "{}", painter.detail("Exit Code", self.exit_code()))?;
        writeln!(
            out,
            "{}",
            painter.detail("Error At", format_timestamp(self.created_at()))
        )?;
        writeln!(
            out,
            "{}",
            painter.detail("Handled At", format_timestamp(handled_at))
        )?;
        writeln!(
            out,
            "{}",
            painter.detail("Elapsed Time", format!("{elapsed:.3}s"))
        )?;

        let properties = self.properties().snapshot();
        if !properties.is_empty() {
            writeln!(out, "{}", painter.section("Properties"))?;
            let width = properties.keys().map(|key| key.len()).max().unwrap_or(0);
            for (key, value) in &properties {
                writeln!(
                    out,
                    "  {}{} -> {}",
                    painter.paint(Tone::Label, key),
                    " ".repeat(width - key.len()),
                    painter.paint(Tone::Value, display_value(value)),
                )?;
            }
        }

        writeln!(out)?;
        Ok(())
    }

    /// The human report as a string.
    pub fn report(&mut self, config: &ReportConfig) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = self.write_report(config, &mut buffer) {
            warn!(error = %e, "Failed to render report");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Prints the human report to stdout with the default configuration.
    pub fn debug(&mut self) -> &mut Self {
        self.debug_with(&ReportConfig::default())
    }

    /// Prints the human report to stdout.
    pub fn debug_with(&mut self, config: &ReportConfig) -> &mut Self {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = self.write_report(config, &mut out) {
            warn!(error = %e, "Failed to print report");
        }
        self
    }
}
