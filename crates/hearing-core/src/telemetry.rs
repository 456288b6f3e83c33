//! Range Telemetry
//!
//! Append-only JSONL logging of range writes and dominant-source changes.

use bevy_ecs::prelude::*;
use hearing_events::{generate_event_id, DominantSourceRecord, RangeEvent};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// One line of the telemetry stream.
#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum TelemetryLine<'a> {
    Range(&'a RangeEvent),
    DominantSource(&'a DominantSourceRecord),
}

/// Resource for logging telemetry to a JSONL file.
#[derive(Resource)]
pub struct RangeLog {
    writer: Option<BufWriter<File>>,
    event_count: u64,
    next_event_id: u64,
}

impl RangeLog {
    /// Create a new log writing to the specified path.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
            next_event_id: 1,
        })
    }

    /// Create a log that discards output (for testing and headless runs).
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
            next_event_id: 1,
        }
    }

    /// Generate the next event ID.
    pub fn next_id(&mut self) -> String {
        let id = generate_event_id(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    /// Get the current event count.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log a range event.
    pub fn log_event(&mut self, event: &RangeEvent) -> std::io::Result<()> {
        self.event_count += 1;
        self.write_line(&TelemetryLine::Range(event))
    }

    /// Log a dominant-source record.
    pub fn log_dominant(&mut self, record: &DominantSourceRecord) -> std::io::Result<()> {
        self.event_count += 1;
        self.write_line(&TelemetryLine::DominantSource(record))
    }

    /// Log a range event, swallowing write failures with a warning.
    /// Telemetry must never disturb the simulation.
    pub fn record(&mut self, event: RangeEvent) {
        if let Err(e) = self.log_event(&event) {
            warn!("telemetry write failed: {}", e);
        }
    }

    /// Log a dominant-source record, swallowing write failures.
    pub fn record_dominant(&mut self, record: DominantSourceRecord) {
        if let Err(e) = self.log_dominant(&record) {
            warn!("telemetry write failed: {}", e);
        }
    }

    fn write_line(&mut self, line: &TelemetryLine<'_>) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(line)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for RangeLog {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: Failed to flush telemetry log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearing_events::{RangeEventKind, SimTimestamp};
    use std::io::BufRead;

    fn sample_event(id: String) -> RangeEvent {
        RangeEvent::new(
            id,
            SimTimestamp::new(1, 0.05),
            "listener_0001",
            RangeEventKind::Activated,
            "equipped",
            50.0,
            50.0,
            87.5,
            1.75,
            1.0,
        )
    }

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.jsonl");

        let mut log = RangeLog::new(&path).unwrap();
        let id = log.next_id();
        log.log_event(&sample_event(id)).unwrap();
        log.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 1);

        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["record"], "range");
        assert_eq!(parsed["event_id"], "hear_00000001");
        assert_eq!(parsed["kind"], "activated");
    }

    #[test]
    fn test_null_log() {
        let mut log = RangeLog::null();
        let id = log.next_id();
        log.log_event(&sample_event(id)).unwrap();
        assert_eq!(log.event_count(), 1);
    }

    #[test]
    fn test_event_id_generation() {
        let mut log = RangeLog::null();
        assert_eq!(log.next_id(), "hear_00000001");
        assert_eq!(log.next_id(), "hear_00000002");
        assert_eq!(log.next_id(), "hear_00000003");
    }

    #[test]
    fn test_dominant_source_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.jsonl");

        let mut log = RangeLog::new(&path).unwrap();
        log.log_dominant(&DominantSourceRecord {
            timestamp: SimTimestamp::new(3, 0.15),
            listener_id: "listener_0001".to_string(),
            source_id: Some("7v0".to_string()),
            distance: 20.0,
            angle_deg: 20.0,
            intensity: 1.08,
            footstep: true,
            important: true,
        })
        .unwrap();
        log.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["record"], "dominant_source");
        assert_eq!(parsed["footstep"], true);
    }
}
