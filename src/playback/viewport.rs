use crate::core::LatLng;
use crate::playback::PositionInterpolator;
use std::time::{Duration, Instant};

/// Center of central Hyderabad, shown before any route point is known
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 17.385044,
    lng: 78.486671,
};

pub const DEFAULT_ZOOM: u8 = 15;

/// Map viewport. Recentering is a best-effort glide, not synchronized with the marker.
#[derive(Debug, Clone)]
pub struct Viewport {
    center: PositionInterpolator,
    default_center: LatLng,
    zoom: u8,
}

impl Viewport {
    pub fn new(default_center: LatLng, zoom: u8, pan_duration: Duration) -> Self {
        Self {
            center: PositionInterpolator::new(pan_duration),
            default_center,
            zoom,
        }
    }

    /// Glide towards `target`
    pub fn pan_to(&mut self, target: LatLng, now: Instant) {
        self.center.retarget(target, now);
    }

    /// Advance any glide and return the center to draw
    pub fn frame(&mut self, now: Instant) -> LatLng {
        self.center.frame(now).unwrap_or(self.default_center)
    }

    #[cfg(test)]
    pub fn center(&self) -> LatLng {
        self.center.position().unwrap_or(self.default_center)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn is_panning(&self) -> bool {
        self.center.is_animating()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER, DEFAULT_ZOOM, Duration::from_millis(1200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_center_until_first_point() {
        let mut vp = Viewport::default();
        assert_eq!(vp.center(), DEFAULT_CENTER);
        assert_eq!(vp.frame(Instant::now()), DEFAULT_CENTER);
        assert_eq!(vp.zoom(), 15);
    }

    #[test]
    fn test_pan_glides() {
        let mut vp = Viewport::new(DEFAULT_CENTER, 15, Duration::from_millis(1200));
        let t0 = Instant::now();
        // First target is shown immediately
        vp.pan_to(LatLng::new(0.0, 0.0), t0);
        assert!(!vp.is_panning());
        vp.pan_to(LatLng::new(1.2, 0.0), t0);
        assert!(vp.is_panning());
        let mid = vp.frame(t0 + Duration::from_millis(600));
        assert!((mid.lat - 0.6).abs() < 1e-9);
        assert_eq!(vp.frame(t0 + Duration::from_millis(1200)), LatLng::new(1.2, 0.0));
        assert!(!vp.is_panning());
    }
}
