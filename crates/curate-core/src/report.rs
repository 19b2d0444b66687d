//! Rendering of the priority order and the metrics report.
//!
//! The order can be written as plain item identifiers (one per line), a JSON
//! array of ranked records, or JSON Lines. The metrics report has a text form
//! and a JSON form.

use serde::Serialize;
use std::io::{self, Write};

use crate::ranking::AggregateReport;
use crate::types::RankingRecord;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One item identifier per line
    Text,
    /// Single JSON array of ranked records
    Json,
    /// One ranked record per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A record together with its 1-based position in the priority order.
#[derive(Debug, Serialize)]
pub struct RankedItem<'a> {
    pub rank: usize,
    #[serde(flatten)]
    pub record: &'a RankingRecord,
}

/// Writes a priority order in the chosen format.
pub struct OrderWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OrderWriter<W> {
    /// Create a new order writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write the full order, front first.
    pub fn write_order(&mut self, records: &[RankingRecord]) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                for record in records {
                    writeln!(self.writer, "{}", record.item())?;
                }
            }
            OutputFormat::Json => {
                let ranked = ranked(records);
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &ranked)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &ranked).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                for item in ranked(records) {
                    serde_json::to_writer(&mut self.writer, &item).map_err(io::Error::other)?;
                    writeln!(self.writer)?;
                }
            }
        }
        self.items_written += records.len();
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

fn ranked(records: &[RankingRecord]) -> Vec<RankedItem<'_>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| RankedItem { rank: i + 1, record })
        .collect()
}

/// Render the metrics report as text: each label's F-score, then micro-F and
/// macro-F.
pub fn metrics_text(report: &AggregateReport) -> String {
    let mut out = String::new();
    for (label, score) in &report.labels {
        out.push_str(&format!("{label} f-score:\n{}\n", score.f_score));
    }
    out.push_str(&format!("Micro-f:\n{}\n", report.micro_f));
    out.push_str(&format!("Macro-f:\n{}\n", report.macro_f));
    out
}

/// Render the metrics report as JSON.
pub fn metrics_json(report: &AggregateReport, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{ConfidenceExtractor, MetricsAccumulator};
    use crate::types::ScoreMap;

    fn records() -> Vec<RankingRecord> {
        let e = ConfidenceExtractor::default();
        vec![
            e.record("b.jpg", &ScoreMap::from_pairs([("dog", 0.4), ("cat", 0.3)]))
                .unwrap(),
            e.record("a.jpg", &ScoreMap::from_pairs([("cat", 0.9)]))
                .unwrap(),
        ]
    }

    #[test]
    fn test_write_text() {
        let mut buffer = Vec::new();
        let mut writer = OrderWriter::new(&mut buffer, OutputFormat::Text, false);
        writer.write_order(&records()).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "b.jpg\na.jpg\n");
    }

    #[test]
    fn test_write_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OrderWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_order(&records()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"rank\":1"));
        assert!(lines[0].contains("\"item\":\"b.jpg\""));
        // Single-label record: no second, ratio null
        assert!(!lines[1].contains("second"));
        assert!(lines[1].contains("\"ratio\":null"));
    }

    #[test]
    fn test_write_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OrderWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_order(&records()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_metrics_text() {
        let e = ConfidenceExtractor::default();
        let mut m = MetricsAccumulator::new();
        let hit = e
            .record("x", &ScoreMap::from_pairs([("cat", 0.9), ("dog", 0.1)]))
            .unwrap();
        m.observe("cat", &hit);
        let text = metrics_text(&m.report().unwrap());
        assert_eq!(text, "cat f-score:\n1\nMicro-f:\n1\nMacro-f:\n1\n");
    }

    #[test]
    fn test_metrics_json() {
        let e = ConfidenceExtractor::default();
        let mut m = MetricsAccumulator::new();
        let miss = e
            .record("x", &ScoreMap::from_pairs([("dog", 0.9), ("cat", 0.1)]))
            .unwrap();
        m.observe("cat", &miss);
        let json = metrics_json(&m.report().unwrap(), false).unwrap();
        assert!(json.contains("\"micro_f\":0.0"));
        assert!(json.contains("\"total_labels\":1"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }
}
