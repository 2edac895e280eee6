use crate::core::LatLng;
use std::time::{Duration, Instant};

/// One in-flight glide between two positions
#[derive(Debug, Clone, Copy)]
struct Animation {
    from: LatLng,
    to: LatLng,
    started: Instant,
}

/// Smooths discrete jumps between route points into a continuous glide.
///
/// Call [`retarget`](Self::retarget) whenever the target point changes and
/// [`frame`](Self::frame) on every rendered frame. A new target received
/// mid-glide restarts from the last rendered position, never from the old
/// start, so the marker doesn't snap backwards.
#[derive(Debug, Clone)]
pub struct PositionInterpolator {
    duration: Duration,
    rendered: Option<LatLng>,
    animation: Option<Animation>,
}

impl PositionInterpolator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            rendered: None,
            animation: None,
        }
    }

    /// Start gliding towards `target`. Returns true if a glide was started.
    ///
    /// With nothing rendered yet the target is shown immediately.
    pub fn retarget(&mut self, target: LatLng, now: Instant) -> bool {
        let current = match self.rendered {
            Some(current) => current,
            None => {
                self.snap_to(target);
                return false;
            }
        };

        match self.animation {
            Some(anim) if anim.to == target => return false,
            None if current == target => return false,
            _ => {}
        }

        self.animation = Some(Animation {
            from: current,
            to: target,
            started: now,
        });
        true
    }

    /// Show `target` immediately, dropping any glide in flight
    pub fn snap_to(&mut self, target: LatLng) {
        self.rendered = Some(target);
        self.animation = None;
    }

    /// Remove the rendered position entirely
    pub fn clear(&mut self) {
        self.rendered = None;
        self.animation = None;
    }

    /// Advance the glide to `now` and return the position to draw
    pub fn frame(&mut self, now: Instant) -> Option<LatLng> {
        if let Some(anim) = self.animation {
            let t = progress(anim.started, now, self.duration);
            self.rendered = Some(anim.from.lerp(anim.to, t));
            if t >= 1.0 {
                self.animation = None;
            }
        }
        self.rendered
    }

    /// Last rendered position
    #[cfg(test)]
    pub fn position(&self) -> Option<LatLng> {
        self.rendered
    }

    /// Where the marker is heading, or where it rests
    #[cfg(test)]
    pub fn target(&self) -> Option<LatLng> {
        self.animation.map(|a| a.to).or(self.rendered)
    }

    /// True while more frames are needed
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }
}

/// Fraction of `duration` elapsed since `started`, clamped to [0, 1]
pub fn progress(started: Instant, now: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(started);
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_millis(1000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_progress_clamped() {
        let t0 = Instant::now();
        assert_eq!(progress(t0, t0, DURATION), 0.0);
        assert_eq!(progress(t0, t0 + ms(250), DURATION), 0.25);
        assert_eq!(progress(t0, t0 + ms(5000), DURATION), 1.0);
        assert_eq!(progress(t0, t0, Duration::ZERO), 1.0);
    }

    #[test]
    fn test_first_target_shown_immediately() {
        let mut interp = PositionInterpolator::new(DURATION);
        let t0 = Instant::now();
        assert!(!interp.retarget(LatLng::new(17.0, 78.0), t0));
        assert!(!interp.is_animating());
        assert_eq!(interp.frame(t0), Some(LatLng::new(17.0, 78.0)));
    }

    #[test]
    fn test_glide_start_middle_end() {
        let start = LatLng::new(0.0, 0.0);
        let end = LatLng::new(1.0, 2.0);
        let mut interp = PositionInterpolator::new(DURATION);
        let t0 = Instant::now();
        interp.snap_to(start);
        assert!(interp.retarget(end, t0));

        assert_eq!(interp.frame(t0), Some(start));
        assert_eq!(interp.frame(t0 + ms(500)), Some(LatLng::new(0.5, 1.0)));
        assert!(interp.is_animating());
        assert_eq!(interp.frame(t0 + ms(1000)), Some(end));
        assert!(!interp.is_animating());

        // Later frames stay at the target
        assert_eq!(interp.frame(t0 + ms(3000)), Some(end));
    }

    #[test]
    fn test_glide_is_monotonic() {
        let start = LatLng::new(17.385, 78.486);
        let end = LatLng::new(17.395, 78.476);
        let mut interp = PositionInterpolator::new(DURATION);
        let t0 = Instant::now();
        interp.snap_to(start);
        interp.retarget(end, t0);

        let mut last_lat = start.lat;
        let mut last_lng = start.lng;
        for step in 0..=70 {
            let pos = interp.frame(t0 + ms(step * 16)).unwrap();
            assert!(pos.lat >= last_lat - 1e-12);
            assert!(pos.lng <= last_lng + 1e-12);
            last_lat = pos.lat;
            last_lng = pos.lng;
        }
        assert_eq!(interp.position(), Some(end));
    }

    #[test]
    fn test_retarget_mid_glide_starts_from_rendered() {
        let mut interp = PositionInterpolator::new(DURATION);
        let t0 = Instant::now();
        interp.snap_to(LatLng::new(0.0, 0.0));
        interp.retarget(LatLng::new(1.0, 0.0), t0);
        assert_eq!(interp.frame(t0 + ms(500)), Some(LatLng::new(0.5, 0.0)));

        // New target before the first glide finished
        let t1 = t0 + ms(600);
        assert!(interp.retarget(LatLng::new(2.0, 0.0), t1));
        // Restarts from the last rendered position, not from the original start
        assert_eq!(interp.frame(t1), Some(LatLng::new(0.5, 0.0)));
        assert_eq!(interp.frame(t1 + ms(1000)), Some(LatLng::new(2.0, 0.0)));
    }

    #[test]
    fn test_same_target_does_not_restart() {
        let mut interp = PositionInterpolator::new(DURATION);
        let t0 = Instant::now();
        interp.snap_to(LatLng::new(0.0, 0.0));
        assert!(interp.retarget(LatLng::new(1.0, 0.0), t0));
        assert!(!interp.retarget(LatLng::new(1.0, 0.0), t0 + ms(400)));
        assert_eq!(interp.frame(t0 + ms(1000)), Some(LatLng::new(1.0, 0.0)));
        assert!(!interp.retarget(LatLng::new(1.0, 0.0), t0 + ms(1200)));
    }

    #[test]
    fn test_clear_removes_marker() {
        let mut interp = PositionInterpolator::new(DURATION);
        let t0 = Instant::now();
        interp.snap_to(LatLng::new(0.0, 0.0));
        interp.retarget(LatLng::new(1.0, 0.0), t0);
        interp.clear();
        assert!(!interp.is_animating());
        assert_eq!(interp.frame(t0 + ms(500)), None);
        assert_eq!(interp.target(), None);
    }
}
