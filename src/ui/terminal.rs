use crate::ui::{ControlsView, MapView, RenderFrame};
use std::io::Write;
use tracing::warn;

/// Prints a status line whenever the controls panel changes.
///
/// Marker animation frames don't produce output; only index, play state and
/// route changes do.
pub struct TerminalView<W: Write> {
    out: W,
    last: Option<Option<ControlsView>>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MapView for TerminalView<W> {
    fn render(&mut self, frame: &RenderFrame) {
        if self.last.as_ref() == Some(&frame.controls) {
            return;
        }

        let line = match &frame.controls {
            Some(controls) => format_controls(controls),
            None => "No route points for this selection".to_string(),
        };
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!("Failed to write status line: {}", e);
        }
        self.last = Some(frame.controls.clone());
    }

    fn finish(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!("Failed to flush status output: {}", e);
        }
    }
}

/// One-line summary of the controls panel
pub fn format_controls(controls: &ControlsView) -> String {
    let state = if controls.is_playing { "Playing" } else { "Paused" };
    format!(
        "[{}] {}/{}  {:.6}, {:.6}  {:.1} km/h  {}",
        state,
        controls.index + 1,
        controls.len,
        controls.position.lat,
        controls.position.lng,
        controls.speed_kmh,
        controls.timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}
