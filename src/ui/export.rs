use anyhow::{Context, Result};
use crate::ui::{ControlsView, MapView, RenderFrame};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct TraceRow {
    index: usize,
    timestamp: String,
    lat: f64,
    lng: f64,
    speed_kmh: f64,
}

/// Writes one CSV row for every point the playback displays
pub struct TraceRecorder<W: Write> {
    writer: csv::Writer<W>,
    last_index: Option<usize>,
    rows: usize,
}

impl TraceRecorder<File> {
    /// Create (or truncate) an export file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Failed to create export file: {:?}", path))?;
        info!("Exporting replay trace to {:?}", path);
        Ok(Self::new(file))
    }
}

impl<W: Write> TraceRecorder<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
            last_index: None,
            rows: 0,
        }
    }

    /// Record the displayed point, skipping repeats of the same index
    pub fn record(&mut self, controls: &ControlsView) -> Result<()> {
        if self.last_index == Some(controls.index) {
            return Ok(());
        }
        self.writer
            .serialize(TraceRow {
                index: controls.index,
                timestamp: controls.timestamp.to_rfc3339(),
                lat: controls.position.lat,
                lng: controls.position.lng,
                speed_kmh: controls.speed_kmh,
            })
            .context("Failed to write trace row")?;
        self.last_index = Some(controls.index);
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    #[cfg(test)]
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush trace: {}", e.error()))
    }
}

impl<W: Write> MapView for TraceRecorder<W> {
    fn render(&mut self, frame: &RenderFrame) {
        match &frame.controls {
            Some(controls) => {
                if let Err(e) = self.record(controls) {
                    warn!("{:#}", e);
                }
            }
            // Route replaced by an empty one; the next point starts fresh
            None => self.last_index = None,
        }
    }

    fn finish(&mut self) {
        match self.writer.flush() {
            Ok(()) => info!("Replay trace complete: {} rows", self.rows()),
            Err(e) => warn!("Failed to flush trace export: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LatLng;
    use chrono::{TimeZone, Utc};

    fn controls(index: usize, speed: f64) -> ControlsView {
        ControlsView {
            index,
            len: 3,
            position: LatLng::new(17.5, 78.25),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            speed_kmh: speed,
            is_playing: true,
        }
    }

    #[test]
    fn test_records_each_index_once() {
        let mut rec = TraceRecorder::new(Vec::new());
        rec.record(&controls(0, 0.0)).unwrap();
        rec.record(&controls(0, 0.0)).unwrap();
        rec.record(&controls(1, 12.5)).unwrap();
        assert_eq!(rec.rows(), 2);

        let out = String::from_utf8(rec.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "index,timestamp,lat,lng,speed_kmh");
        assert_eq!(lines[1], "0,2024-05-01T08:00:00+00:00,17.5,78.25,0.0");
        assert_eq!(lines[2], "1,2024-05-01T08:00:00+00:00,17.5,78.25,12.5");
    }
}
