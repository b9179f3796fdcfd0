//! # highlight-cli
//!
//! A line-oriented terminal front end for the highlighting pipeline. Every
//! line read from stdin replaces the contents of a virtual chat input; the
//! resulting segmentation is printed whenever it changes.
//!
//! ```bash
//! cargo run --bin highlight -- --endpoint http://localhost:8000/api/chat/recognize-entities
//! ```
//!
//! Lines starting with `/` are commands:
//!
//! - `/send` marks the message as sent and resets all state
//! - `/select N` selects the N-th highlighted entity
//! - `/remove N` hides the N-th highlighted entity
//! - `/quit` exits
//!
//! An empty line clears the input.

use anyhow::{Result, anyhow, bail};
use highlight_remote::HighlightView;
use highlight_spans::{EntitySpan, Segment};

pub mod cli;

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input(String),
    Clear,
    Send,
    Select(usize),
    Remove(usize),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.trim().is_empty() {
            return Ok(Command::Clear);
        }

        let Some(command) = line.strip_prefix('/') else {
            return Ok(Command::Input(line.to_string()));
        };

        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (Some("send"), None) => Ok(Command::Send),
            (Some("quit"), None) => Ok(Command::Quit),
            (Some("select"), Some(index)) => Ok(Command::Select(parse_index(index)?)),
            (Some("remove"), Some(index)) => Ok(Command::Remove(parse_index(index)?)),
            _ => bail!("Unknown command: /{command}"),
        }
    }
}

fn parse_index(index: &str) -> Result<usize> {
    match index.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => Err(anyhow!("Expected a positive entity number, got {index:?}")),
    }
}

/// The N-th (1-based) entity among `segments`.
pub fn nth_entity(segments: &[Segment], index: usize) -> Option<&EntitySpan> {
    highlight_spans::entities(segments).nth(index.checked_sub(1)?)
}

/// Render segments on one line, entities as `[kind: surface]`.
pub fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text { content } => content.clone(),
            Segment::Entity { span } => format!("[{}: {}]", span.kind, span.text),
        })
        .collect()
}

/// Render the status line for a view, if there is anything to report.
pub fn render_status(view: &HighlightView) -> Option<String> {
    if view.loading {
        return Some("recognizing...".to_string());
    }

    if let Some(error) = &view.error {
        return Some(format!("error: {error}"));
    }

    view.processing_time_ms.map(|elapsed| {
        let origin = if view.from_cache { "cached" } else { "fresh" };
        format!(
            "{} entities ({origin}, {elapsed:.1} ms)",
            view.entities().count()
        )
    })
}

/// Describe a selected entity.
pub fn describe(span: &EntitySpan) -> String {
    let mut description = format!(
        "{} ({}, confidence {:.2})",
        span.display_name(),
        span.kind,
        span.confidence
    );

    let metadata = &span.metadata;
    for (label, value) in [
        ("full name", &metadata.full_name),
        ("parent", &metadata.parent),
        ("unit", &metadata.unit),
        ("aggregation", &metadata.aggregation),
        ("from", &metadata.start_date),
        ("to", &metadata.end_date),
    ] {
        if let Some(value) = value {
            description.push_str(&format!("\n  {label}: {value}"));
        }
    }

    description
}
