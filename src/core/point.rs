use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A geographic coordinate pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Linear blend towards `other`; `t` is clamped to [0, 1]
    pub fn lerp(self, other: LatLng, t: f64) -> LatLng {
        if t <= 0.0 {
            return self;
        }
        if t >= 1.0 {
            return other;
        }
        LatLng {
            lat: self.lat + (other.lat - self.lat) * t,
            lng: self.lng + (other.lng - self.lng) * t,
        }
    }
}

/// One recorded GPS fix, already filtered by type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl RoutePoint {
    pub fn new(lat: f64, lng: f64, timestamp: DateTime<Utc>) -> Self {
        Self { lat, lng, timestamp }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Ordered, immutable sequence of route points for one selection.
///
/// Order is the order of the source data; it is never re-sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSequence {
    points: Vec<RoutePoint>,
}

impl RouteSequence {
    pub fn new(points: Vec<RoutePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`, `None` when out of range
    pub fn get(&self, index: usize) -> Option<&RoutePoint> {
        self.points.get(index)
    }

    #[cfg(test)]
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Positions of the points travelled so far, `0..=index` inclusive
    pub fn path_until(&self, index: usize) -> Vec<LatLng> {
        if self.points.is_empty() {
            return Vec::new();
        }
        let end = index.min(self.points.len() - 1);
        self.points[..=end].iter().map(RoutePoint::position).collect()
    }
}

impl From<Vec<RoutePoint>> for RouteSequence {
    fn from(points: Vec<RoutePoint>) -> Self {
        Self::new(points)
    }
}
