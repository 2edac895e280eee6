pub mod terminal;
pub mod export;

pub use terminal::TerminalView;
pub use export::TraceRecorder;

use crate::core::LatLng;
use chrono::{DateTime, Utc};

/// Data for the playback controls panel
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsView {
    pub index: usize,
    pub len: usize,
    pub position: LatLng,
    pub timestamp: DateTime<Utc>,
    /// Speed between the previous and current point
    pub speed_kmh: f64,
    pub is_playing: bool,
}

/// Everything the map needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Points travelled so far
    pub path: Vec<LatLng>,
    /// Animated marker position; `None` when there is no route
    pub marker: Option<LatLng>,
    pub center: LatLng,
    pub zoom: u8,
    /// `None` when the route is empty
    pub controls: Option<ControlsView>,
}

/// Rendering collaborator: a map widget, a terminal, a recorder...
pub trait MapView {
    /// Draw one frame
    fn render(&mut self, frame: &RenderFrame);

    /// Called once at teardown
    fn finish(&mut self) {}
}

impl MapView for Vec<Box<dyn MapView>> {
    fn render(&mut self, frame: &RenderFrame) {
        for view in self.iter_mut() {
            view.render(frame);
        }
    }

    fn finish(&mut self) {
        for view in self.iter_mut() {
            view.finish();
        }
    }
}
