//! Run events and the sinks that render them.

use std::io::Write;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::metrics::RunSummary;

/// Structured stream produced by the coordinator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        target: String,
        scenario: String,
        requests: u64,
        connections: u64,
    },
    Milestone {
        percentage: u64,
        elapsed_secs: f64,
        lap_secs: f64,
    },
    Finished(RunSummary),
}

/// Consumes run events.
pub trait Reporter: Send {
    fn handle(&mut self, event: &RunEvent) -> std::io::Result<()>;
}

/// Build the sink for `format` writing to `out`.
pub fn reporter_for<W: Write + Send + 'static>(
    format: OutputFormat,
    out: W,
) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(out)),
        OutputFormat::Table => Box::new(TableReporter::new(out)),
        OutputFormat::Json => Box::new(JsonReporter::new(out)),
    }
}

/// Plain console output: header, one line per milestone, three-line summary.
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn progress(&mut self, event: &RunEvent) -> std::io::Result<()> {
        match event {
            RunEvent::Started {
                target,
                scenario,
                requests,
                connections,
            } => {
                writeln!(self.out, "RpcBench: Stress test JSON RPC Server")?;
                writeln!(self.out, "----------------------------------------")?;
                writeln!(self.out)?;
                writeln!(self.out, "  Target                 :  {}", target)?;
                writeln!(self.out, "  Scenario               :  {}", scenario)?;
                writeln!(self.out, "  Requests to serve      :  {}", requests)?;
                writeln!(self.out, "  Concurrent connections :  {}", connections)?;
                writeln!(self.out)?;
                writeln!(self.out, "  Percentage of requests served - ")?;
            }
            RunEvent::Milestone {
                percentage,
                elapsed_secs,
                ..
            } => {
                writeln!(
                    self.out,
                    "   {:4}%  ---  {:.2} seconds",
                    percentage, elapsed_secs
                )?;
            }
            RunEvent::Finished(_) => {}
        }
        self.out.flush()
    }
}

impl<W: Write + Send> Reporter for TextReporter<W> {
    fn handle(&mut self, event: &RunEvent) -> std::io::Result<()> {
        self.progress(event)?;

        if let RunEvent::Finished(summary) = event {
            writeln!(self.out)?;
            writeln!(self.out, "  Successful requests    :  {}", summary.successful)?;
            writeln!(self.out, "  Failed requests        :  {}", summary.failed)?;
            writeln!(
                self.out,
                "  Total time taken       :  {:.2} seconds",
                summary.elapsed_secs
            )?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Text progress followed by a summary table with latency percentiles.
pub struct TableReporter<W: Write> {
    text: TextReporter<W>,
}

impl<W: Write> TableReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            text: TextReporter::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.text.into_inner()
    }
}

impl<W: Write + Send> Reporter for TableReporter<W> {
    fn handle(&mut self, event: &RunEvent) -> std::io::Result<()> {
        self.text.progress(event)?;

        if let RunEvent::Finished(summary) = event {
            writeln!(self.text.out)?;
            writeln!(self.text.out, "{}", format_table(summary))?;
            self.text.out.flush()?;
        }
        Ok(())
    }
}

/// One JSON object per event, newline separated.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn handle(&mut self, event: &RunEvent) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// Format a summary as a console table.
pub fn format_table(summary: &RunSummary) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![format!("Results: {}", summary.scenario)]);

    table.add_row(vec!["Target:", &summary.target]);
    table.add_row(vec![
        "Connections:",
        &format!("{}", summary.connections),
    ]);
    table.add_row(vec!["Duration:", &format!("{:.2}s", summary.elapsed_secs)]);
    table.add_row(vec!["Total Requests:", &format!("{}", summary.requests)]);
    table.add_row(vec!["Successful:", &format!("{}", summary.successful)]);
    table.add_row(vec!["Failed:", &format!("{}", summary.failed)]);
    table.add_row(vec![
        "Success Rate:",
        &format!("{:.1}%", summary.success_rate()),
    ]);
    table.add_row(vec![
        "Requests/sec:",
        &format!("{:.1}", summary.requests_per_second),
    ]);

    table.add_row(vec!["", ""]);
    table.add_row(vec!["Latency (ms)", "p50 / p90 / p99 / max"]);
    table.add_row(vec![
        "",
        &format!(
            "{:.1} / {:.1} / {:.1} / {:.1}",
            summary.latency.p50_ms,
            summary.latency.p90_ms,
            summary.latency.p99_ms,
            summary.latency.max_ms
        ),
    ]);

    if summary.cancelled {
        table.add_row(vec!["", ""]);
        table.add_row(vec!["Cancelled:", "yes (unattempted calls counted as failed)"]);
    }

    table.to_string()
}
