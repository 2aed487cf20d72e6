// Local crates
use crate::{
    helpers::converters::format_display_date, normalizer::models::LogEvent, output::columns,
};

// External crates
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::str::FromStr;
use tracing::instrument;

/// How batches are written to standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Column-aligned table.
    #[default]
    Columns,
    /// One JSON object per event per line.
    Json,
    /// Tab-separated values.
    Tsv,
}

/// A displayable column of [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Date,
    Type,
    Code,
    Text,
}

impl Property {
    pub const DEFAULT_LIST: &'static str = "date, type, code, text";

    pub fn name(&self) -> &'static str {
        match self {
            Property::Date => "date",
            Property::Type => "type",
            Property::Code => "code",
            Property::Text => "text",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Property::Date => "Date",
            Property::Type => "Type",
            Property::Code => "Code",
            Property::Text => "Text",
        }
    }

    /// Column width in the table view; `text` stretches to fill the terminal.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Property::Date => Some(20),
            Property::Type | Property::Code => Some(12),
            Property::Text => None,
        }
    }

    pub fn value(&self, event: &LogEvent) -> String {
        match self {
            Property::Date => format_display_date(&event.date),
            Property::Type => event.kind.to_string(),
            Property::Code => event.code.clone(),
            Property::Text => event.text.clone(),
        }
    }

    /// Parse a comma separated list such as `date, type, code, text`.
    ///
    /// Blank entries are ignored. On failure the unknown names are returned.
    pub fn parse_list(raw: &str) -> Result<Vec<Property>, Vec<String>> {
        let mut properties = Vec::new();
        let mut unknown = Vec::new();

        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name.parse() {
                Ok(p) => properties.push(p),
                Err(()) => unknown.push(name.to_string()),
            }
        }

        if unknown.is_empty() {
            Ok(properties)
        } else {
            Err(unknown)
        }
    }
}

impl FromStr for Property {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Property::Date),
            "type" => Ok(Property::Type),
            "code" => Ok(Property::Code),
            "text" => Ok(Property::Text),
            _ => Err(()),
        }
    }
}

/// Writes batches of events, printing headers only with the first non-empty batch.
#[derive(Debug)]
pub struct OutputSink<W: Write> {
    writer: W,
    format: OutputFormat,
    properties: Vec<Property>,
    widths: Vec<usize>,
    color: bool,
    show_headers: bool,
}

impl<W: Write> OutputSink<W> {
    pub fn new(
        writer: W,
        format: OutputFormat,
        properties: Vec<Property>,
        terminal_width: usize,
        color: bool,
    ) -> Self {
        let widths = columns::column_widths(&properties, terminal_width);

        Self {
            writer,
            format,
            properties,
            widths,
            color,
            show_headers: true,
        }
    }

    /// Write one batch. Empty batches write nothing and leave header state alone.
    #[instrument(
        name = "event_watch_output::emit",
        target = "output::sink::OutputSink",
        skip_all,
        level = "trace"
    )]
    pub fn emit(&mut self, events: &[LogEvent]) -> io::Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let rendered = match self.format {
            OutputFormat::Columns => columns::render(
                events,
                &self.properties,
                &self.widths,
                self.show_headers,
                self.color,
            ),
            OutputFormat::Json => self.render_json(events)?,
            OutputFormat::Tsv => self.render_tsv(events),
        };

        self.writer.write_all(rendered.as_bytes())?;
        self.writer.flush()?;

        tracing::trace!(
            events = events.len(),
            headers = self.show_headers,
            "Batch written to output"
        );
        self.show_headers = false;
        Ok(())
    }

    /// Whether the next non-empty batch will carry headers.
    pub fn headers_pending(&self) -> bool {
        self.show_headers
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// One object per event; keys keep the selection order.
    fn render_json(&self, events: &[LogEvent]) -> io::Result<String> {
        let mut out = String::new();

        for event in events {
            let object: Map<String, Value> = self
                .properties
                .iter()
                .map(|p| (p.name().to_string(), Value::String(p.value(event))))
                .collect();

            out.push_str(&serde_json::to_string(&object)?);
            out.push('\n');
        }

        Ok(out)
    }

    fn render_tsv(&self, events: &[LogEvent]) -> String {
        let mut out = String::new();

        if self.show_headers {
            let names: Vec<&str> = self.properties.iter().map(Property::name).collect();
            out.push_str(&names.join("\t"));
            out.push('\n');
        }

        for event in events {
            let cells: Vec<String> = self
                .properties
                .iter()
                .map(|p| p.value(event).replace(['\t', '\n', '\r'], " "))
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }

        out
    }
}
