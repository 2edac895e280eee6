pub mod command;
pub mod driver;

pub use command::Command;
pub use driver::run;

use crate::core::{RouteSelection, RouteSequence};
use crate::input::{LoadError, LoadTicket, RouteStore};
use crate::playback::{PlaybackConfig, PlaybackController, PlaybackState, PositionInterpolator, TickOutcome, Viewport};
use crate::ui::{ControlsView, MapView, RenderFrame};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Replay session: the single owner of playback, animation and viewport state.
///
/// The driver feeds it commands, ticks, frames and load results; it never
/// touches timers itself, so every transition can be exercised with explicit
/// instants.
pub struct Session {
    store: Arc<RouteStore>,
    config: PlaybackConfig,
    controller: PlaybackController,
    marker: PositionInterpolator,
    viewport: Viewport,
    view: Box<dyn MapView>,
    selection: RouteSelection,
    pending: Option<LoadTicket>,
    autoplay: bool,
    last_error: Option<String>,
    /// Bumped whenever the tick timer must be restarted
    timer_epoch: u64,
}

impl Session {
    pub fn new(store: Arc<RouteStore>, config: PlaybackConfig, view: Box<dyn MapView>) -> Self {
        Self {
            store,
            config,
            controller: PlaybackController::default(),
            marker: PositionInterpolator::new(config.animation_duration),
            viewport: Viewport::default(),
            view,
            selection: RouteSelection::default(),
            pending: None,
            autoplay: false,
            last_error: None,
            timer_epoch: 0,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_selection(mut self, selection: RouteSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Start playing after the next successful load
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn store(&self) -> Arc<RouteStore> {
        self.store.clone()
    }

    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    #[cfg(test)]
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    #[cfg(test)]
    pub fn marker(&self) -> &PositionInterpolator {
        &self.marker
    }

    #[cfg(test)]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Most recently requested selection
    pub fn selection(&self) -> RouteSelection {
        self.selection
    }

    /// True while the latest load request hasn't resolved
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn timer_epoch(&self) -> u64 {
        self.timer_epoch
    }

    /// Whether the tick timer should be running
    pub fn should_tick(&self) -> bool {
        self.controller.should_tick()
    }

    /// Whether frames are still needed
    pub fn is_animating(&self) -> bool {
        self.marker.is_animating() || self.viewport.is_panning()
    }

    /// Register a load for `selection`; results of earlier requests become stale
    pub fn request_load(&mut self, selection: RouteSelection) -> LoadTicket {
        let ticket = self.store.begin_request(selection);
        info!("Loading route {} (request #{})", selection, ticket.seq);
        self.selection = selection;
        self.pending = Some(ticket);
        ticket
    }

    /// Apply a finished load. Returns true if the route was replaced.
    ///
    /// Stale results are dropped; failures keep the last good route.
    pub fn on_load_result(
        &mut self,
        ticket: LoadTicket,
        result: Result<RouteSequence, LoadError>,
        now: Instant,
    ) -> bool {
        if !self.store.is_current(&ticket) {
            debug!("Discarding stale route load #{} for {}", ticket.seq, ticket.selection);
            return false;
        }
        self.pending = None;

        let route = match result {
            Ok(route) => route,
            Err(e) => {
                error!("Error fetching route for {}: {}", ticket.selection, e);
                self.last_error = Some(e.to_string());
                return false;
            }
        };

        info!("Route {} loaded: {} points", ticket.selection, route.len());
        self.last_error = None;
        self.controller.load_complete(route);
        self.timer_epoch += 1;

        match self.controller.current_point().map(|p| p.position()) {
            Some(first) => {
                self.marker.retarget(first, now);
                self.viewport.pan_to(first, now);
            }
            None => self.marker.clear(),
        }

        if self.autoplay && !self.controller.is_empty() {
            self.autoplay = false;
            self.controller.play();
        }
        true
    }

    pub fn toggle_play(&mut self, now: Instant) -> PlaybackState {
        let state = self.controller.toggle_play();
        debug!("Playback toggled: {:?}", state);
        self.timer_epoch += 1;
        self.follow_current(now);
        state
    }

    pub fn play(&mut self, now: Instant) {
        if !self.controller.is_playing() {
            self.toggle_play(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if self.controller.is_playing() {
            self.toggle_play(now);
        }
    }

    /// Rewind to the first point and stop
    pub fn reset(&mut self, now: Instant) {
        self.controller.reset();
        self.timer_epoch += 1;
        self.follow_current(now);
    }

    /// One playback tick
    pub fn on_tick(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.controller.tick();
        match outcome {
            TickOutcome::Advanced(index) => {
                debug!("Advanced to point {}/{}", index + 1, self.controller.len());
                self.follow_current(now);
            }
            TickOutcome::Halted => {
                info!("Reached end of route");
                self.timer_epoch += 1;
            }
            TickOutcome::Idle => {}
        }
        outcome
    }

    /// Advance animations to `now` and hand the frame to the view
    pub fn render(&mut self, now: Instant) -> RenderFrame {
        let marker = self.marker.frame(now);
        let center = self.viewport.frame(now);
        let frame = RenderFrame {
            path: self.controller.traveled_path(),
            marker,
            center,
            zoom: self.viewport.zoom(),
            controls: self.controls(),
        };
        self.view.render(&frame);
        frame
    }

    /// Controls panel data, `None` for an empty route
    pub fn controls(&self) -> Option<ControlsView> {
        let point = self.controller.current_point()?;
        Some(ControlsView {
            index: self.controller.position(),
            len: self.controller.len(),
            position: point.position(),
            timestamp: point.timestamp,
            speed_kmh: self.controller.speed_kmh(),
            is_playing: self.controller.is_playing(),
        })
    }

    /// Teardown
    pub fn shutdown(&mut self) {
        self.view.finish();
    }

    /// Glide the marker to the current point; the map follows only while playing
    fn follow_current(&mut self, now: Instant) {
        let target = match self.controller.current_point() {
            Some(point) => point.position(),
            None => {
                self.marker.clear();
                return;
            }
        };
        self.marker.retarget(target, now);
        if self.controller.is_playing() {
            self.viewport.pan_to(target, now);
        }
    }
}
