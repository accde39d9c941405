//! Output formatting for decoded frames.
//!
//! Each input frame becomes one row: its line number, length, outcome, the
//! deciding dissector and the attributes it recorded. Rows are written as a
//! table, CSV, or JSON Lines.

use std::io::Write;

use clap::ValueEnum;
use comfy_table::{Cell, Table};

use l7dissect_core::cache::CacheStats;
use l7dissect_core::dissect::{DecoderStatsSnapshot, DispatchOutcome};
use l7dissect_core::message::{AttributeValue, Attributes};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table (default)
    Table,
    /// Comma-separated values
    Csv,
    /// JSON Lines (one JSON object per frame)
    Json,
}

/// Classification result of one input frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub line: usize,
    pub len: usize,
    pub outcome: DispatchOutcome,
    pub attributes: Attributes,
}

const HEADERS: [&str; 5] = ["line", "len", "outcome", "dissector", "attributes"];

/// Formats decoded frames for output.
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a new formatter with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format decoded frames and write them to the given writer.
    pub fn write<W: Write>(&self, frames: &[DecodedFrame], writer: &mut W) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => self.write_table(frames, writer),
            OutputFormat::Csv => self.write_csv(frames, writer),
            OutputFormat::Json => self.write_json(frames, writer),
        }
    }

    /// Attributes as `name=value` pairs in insertion order.
    fn format_attributes(attributes: &Attributes) -> String {
        attributes
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn row(frame: &DecodedFrame) -> [String; 5] {
        [
            frame.line.to_string(),
            frame.len.to_string(),
            frame.outcome.classification.to_string(),
            frame.outcome.dissector.unwrap_or_default().to_string(),
            Self::format_attributes(&frame.attributes),
        ]
    }

    fn write_table<W: Write>(
        &self,
        frames: &[DecodedFrame],
        writer: &mut W,
    ) -> std::io::Result<()> {
        let mut table = Table::new();
        table.set_header(HEADERS.iter().map(Cell::new).collect::<Vec<_>>());

        for frame in frames {
            table.add_row(Self::row(frame).into_iter().map(Cell::new).collect::<Vec<_>>());
        }

        writeln!(writer, "{table}")
    }

    fn write_csv<W: Write>(&self, frames: &[DecodedFrame], writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", HEADERS.join(","))?;

        for frame in frames {
            let values: Vec<String> = Self::row(frame)
                .into_iter()
                .map(|value| {
                    // Escape commas and quotes
                    if value.contains(',') || value.contains('"') || value.contains('\n') {
                        format!("\"{}\"", value.replace('"', "\"\""))
                    } else {
                        value
                    }
                })
                .collect();
            writeln!(writer, "{}", values.join(","))?;
        }

        Ok(())
    }

    fn write_json<W: Write>(&self, frames: &[DecodedFrame], writer: &mut W) -> std::io::Result<()> {
        for frame in frames {
            let mut attributes = serde_json::Map::new();
            for (name, value) in frame.attributes.iter() {
                let json_value = match value {
                    AttributeValue::Str(s) => serde_json::Value::String(s.to_string()),
                    AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
                    AttributeValue::Int(n) => serde_json::Value::Number((*n).into()),
                };
                attributes.insert(name.to_string(), json_value);
            }

            let obj = serde_json::json!({
                "line": frame.line,
                "len": frame.len,
                "outcome": frame.outcome.classification.as_str(),
                "dissector": frame.outcome.dissector,
                "attributes": attributes,
            });
            writeln!(writer, "{obj}")?;
        }

        Ok(())
    }

    /// Write decoder coverage and cache statistics as a table.
    pub fn write_stats<W: Write>(
        &self,
        decoder: &DecoderStatsSnapshot,
        cache: Option<&CacheStats>,
        writer: &mut W,
    ) -> std::io::Result<()> {
        let mut table = Table::new();
        table.set_header(vec![Cell::new("metric"), Cell::new("value")]);

        let mut add = |name: &str, value: String| {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        };
        add("frames", decoder.total().to_string());
        add("detailed", decoder.detailed.to_string());
        add("coarse", decoder.coarse.to_string());
        add("rejected", decoder.rejected.to_string());
        add("unclassified", decoder.unclassified.to_string());
        add("coverage", format!("{:.1}%", decoder.coverage() * 100.0));
        for (dissector, count) in &decoder.by_dissector {
            add(&format!("matches.{dissector}"), count.to_string());
        }

        match cache {
            Some(stats) => {
                add("cache.hits", stats.hits.to_string());
                add("cache.misses", stats.misses.to_string());
                add("cache.hit_ratio", format!("{:.1}%", stats.hit_ratio() * 100.0));
                add("cache.entries", format!("{}/{}", stats.entries, stats.max_entries));
                add("cache.evictions", stats.evictions.to_string());
            }
            None => add("cache", "disabled".to_string()),
        }

        writeln!(writer, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l7dissect_core::dissect::Verdict;
    use l7dissect_core::message::names;

    fn sample_frames() -> Vec<DecodedFrame> {
        let mut query = Attributes::new();
        query.insert(names::SQL, AttributeValue::Str("SELECT a, b FROM t".into()));
        query.insert(names::CONTENT_KEY, AttributeValue::Str("SELECT a, b FROM t".into()));

        let mut quit = Attributes::new();
        quit.insert(names::ONEWAY, AttributeValue::Bool(true));

        vec![
            DecodedFrame {
                line: 1,
                len: 23,
                outcome: DispatchOutcome::from_verdict(Verdict::Detailed, "mysql_query").unwrap(),
                attributes: query,
            },
            DecodedFrame {
                line: 2,
                len: 5,
                outcome: DispatchOutcome::from_verdict(Verdict::Detailed, "mysql_quit").unwrap(),
                attributes: quit,
            },
            DecodedFrame {
                line: 3,
                len: 2,
                outcome: DispatchOutcome::unclassified(),
                attributes: Attributes::new(),
            },
        ]
    }

    fn render(format: OutputFormat) -> String {
        let mut output = Vec::new();
        OutputFormatter::new(format)
            .write(&sample_frames(), &mut output)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_table_output() {
        let output = render(OutputFormat::Table);
        assert!(output.contains("mysql_query"));
        assert!(output.contains("oneway=true"));
        assert!(output.contains("unclassified"));
    }

    #[test]
    fn test_csv_output_escapes() {
        let output = render(OutputFormat::Csv);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "line,len,outcome,dissector,attributes");
        assert_eq!(
            lines[1],
            "1,23,detailed,mysql_query,\"sql=SELECT a, b FROM t; content_key=SELECT a, b FROM t\""
        );
        assert_eq!(lines[3], "3,2,unclassified,,");
    }

    #[test]
    fn test_json_output_keeps_types() {
        let output = render(OutputFormat::Json);
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["attributes"]["sql"], "SELECT a, b FROM t");
        assert_eq!(lines[1]["attributes"]["oneway"], true);
        assert_eq!(lines[2]["outcome"], "unclassified");
        assert!(lines[2]["dissector"].is_null());
    }

    #[test]
    fn test_stats_table() {
        let decoder = DecoderStatsSnapshot {
            detailed: 3,
            unclassified: 1,
            by_dissector: vec![("mysql_query", 3)],
            ..Default::default()
        };
        let mut output = Vec::new();
        OutputFormatter::new(OutputFormat::Table)
            .write_stats(&decoder, None, &mut output)
            .unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("75.0%"));
        assert!(output.contains("matches.mysql_query"));
        assert!(output.contains("disabled"));
    }
}
