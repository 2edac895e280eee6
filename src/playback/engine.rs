use crate::core::{speed_kmh, LatLng, RoutePoint, RouteSequence};
use crate::playback::PlaybackState;
use tracing::debug;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Moved to the given index
    Advanced(usize),
    /// Was at the last point; playback stopped
    Halted,
    /// Not playing, nothing happened
    Idle,
}

/// Playback controller for a route
///
/// Owns the current index and play flag. All mutation goes through the
/// transition methods; the index always stays within `0..max(1, len)`.
pub struct PlaybackController {
    route: RouteSequence,
    state: PlaybackState,
    position: usize,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(RouteSequence::empty())
    }
}

impl PlaybackController {
    pub fn new(route: RouteSequence) -> Self {
        Self {
            route,
            state: PlaybackState::Stopped,
            position: 0,
        }
    }

    /// Replace the route. Always rewinds and stops, whatever the current state.
    pub fn load_complete(&mut self, route: RouteSequence) {
        debug!("Playback route replaced: {} points", route.len());
        self.route = route;
        self.position = 0;
        self.state = PlaybackState::Stopped;
    }

    /// Flip between playing and not playing
    pub fn toggle_play(&mut self) -> PlaybackState {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.state
    }

    /// Start/resume playback
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.state = self.resting_state();
    }

    /// Stop playback and rewind to the first point
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.position = 0;
    }

    /// Advance one point. At the last point playback halts instead of looping.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Idle;
        }

        if self.position + 1 < self.route.len() {
            self.position += 1;
            TickOutcome::Advanced(self.position)
        } else {
            self.position = self.clamped(self.position);
            self.state = self.resting_state();
            debug!("Playback reached end of route at index {}", self.position);
            TickOutcome::Halted
        }
    }

    /// Whether the tick timer should be running
    pub fn should_tick(&self) -> bool {
        self.is_playing() && !self.route.is_empty()
    }

    /// Get current playback state
    #[cfg(test)]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Get current playback position (index into the route)
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get total number of points
    pub fn len(&self) -> usize {
        self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    #[cfg(test)]
    pub fn route(&self) -> &RouteSequence {
        &self.route
    }

    /// Point at the current index, `None` for an empty route
    pub fn current_point(&self) -> Option<&RoutePoint> {
        self.route.get(self.position)
    }

    /// Point before the current one
    #[cfg(test)]
    pub fn previous_point(&self) -> Option<&RoutePoint> {
        self.position.checked_sub(1).and_then(|i| self.route.get(i))
    }

    /// Speed between the previous and current point in km/h
    pub fn speed_kmh(&self) -> f64 {
        speed_kmh(self.position, &self.route)
    }

    /// Positions travelled so far, including the current one
    pub fn traveled_path(&self) -> Vec<LatLng> {
        self.route.path_until(self.position)
    }

    fn clamped(&self, index: usize) -> usize {
        index.min(self.route.len().saturating_sub(1))
    }

    fn resting_state(&self) -> PlaybackState {
        if self.position == 0 {
            PlaybackState::Stopped
        } else {
            PlaybackState::Paused
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn route(n: usize) -> RouteSequence {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        (0..n)
            .map(|i| RoutePoint::new(17.0 + i as f64 * 0.001, 78.0, t0 + Duration::seconds(i as i64 * 10)))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_new_controller_is_stopped() {
        let c = PlaybackController::new(route(3));
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(c.position(), 0);
        assert!(!c.is_playing());
    }

    #[test]
    fn test_tick_only_while_playing() {
        let mut c = PlaybackController::new(route(3));
        assert_eq!(c.tick(), TickOutcome::Idle);
        assert_eq!(c.position(), 0);

        c.toggle_play();
        assert_eq!(c.tick(), TickOutcome::Advanced(1));
        assert_eq!(c.tick(), TickOutcome::Advanced(2));
    }

    #[test]
    fn test_tick_halts_at_end() {
        let mut c = PlaybackController::new(route(3));
        c.play();
        c.tick();
        c.tick();
        assert_eq!(c.position(), 2);
        assert!(c.is_playing());

        // One extra tick past the last index stops playback
        assert_eq!(c.tick(), TickOutcome::Halted);
        assert_eq!(c.position(), 2);
        assert_eq!(c.state(), PlaybackState::Paused);

        // Further ticks do nothing
        assert_eq!(c.tick(), TickOutcome::Idle);
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_single_point_route_halts_immediately() {
        let mut c = PlaybackController::new(route(1));
        c.play();
        assert_eq!(c.tick(), TickOutcome::Halted);
        assert_eq!(c.position(), 0);
        assert_eq!(c.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_toggle_states() {
        let mut c = PlaybackController::new(route(3));
        assert_eq!(c.toggle_play(), PlaybackState::Playing);
        // Pausing at index 0 is the same as stopped
        assert_eq!(c.toggle_play(), PlaybackState::Stopped);

        c.play();
        c.tick();
        assert_eq!(c.toggle_play(), PlaybackState::Paused);
        assert_eq!(c.position(), 1);
        assert_eq!(c.toggle_play(), PlaybackState::Playing);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut c = PlaybackController::new(route(4));
        c.play();
        c.tick();
        c.tick();
        c.reset();
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(c.position(), 0);

        c.play();
        c.tick();
        c.pause();
        c.reset();
        assert_eq!(c.position(), 0);
        assert!(!c.is_playing());
    }

    #[test]
    fn test_load_resets_regardless_of_state() {
        let mut c = PlaybackController::new(route(5));
        c.play();
        c.tick();
        c.tick();
        c.load_complete(route(2));
        assert_eq!(c.position(), 0);
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_empty_route_never_ticks() {
        let mut c = PlaybackController::new(RouteSequence::empty());
        c.toggle_play();
        assert!(!c.should_tick());
        assert_eq!(c.tick(), TickOutcome::Halted);
        assert_eq!(c.position(), 0);
        assert!(c.current_point().is_none());
        assert!(c.traveled_path().is_empty());
        assert_eq!(c.speed_kmh(), 0.0);
    }

    #[test]
    fn test_current_and_previous_points() {
        let mut c = PlaybackController::new(route(3));
        assert!(c.previous_point().is_none());
        c.play();
        c.tick();
        assert_eq!(c.previous_point().unwrap().lat, 17.0);
        assert!((c.current_point().unwrap().lat - 17.001).abs() < 1e-9);
        assert_eq!(c.traveled_path().len(), 2);
        assert!(c.speed_kmh() > 0.0);
    }
}
