use async_trait::async_trait;
use crate::input::{LoadError, RouteBuckets, RouteSource};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use serde_json::{json, Value};
use std::io;
use std::time::Duration;

/// In-memory route source
///
/// Serves a fixed set of buckets, optionally after a delay or with a
/// simulated failure. Used for the built-in demo route and in tests.
pub struct MemoryRouteSource {
    name: String,
    buckets: RouteBuckets,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl MemoryRouteSource {
    pub fn new(buckets: RouteBuckets) -> Self {
        Self {
            name: "memory".to_string(),
            buckets,
            delay: None,
            failure: None,
        }
    }

    /// A source whose every fetch fails
    #[cfg(test)]
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::new(RouteBuckets::new())
        }
    }

    /// Delay each fetch, to simulate a slow data source
    #[cfg(test)]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Source preloaded with a short generated drive in every bucket
    pub fn demo() -> Self {
        Self {
            name: "demo".to_string(),
            ..Self::new(demo_buckets())
        }
    }
}

#[async_trait]
impl RouteSource for MemoryRouteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<RouteBuckets, LoadError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.failure {
            return Err(LoadError::Io {
                path: self.name.clone(),
                source: io::Error::new(io::ErrorKind::NotConnected, reason.clone()),
            });
        }
        Ok(self.buckets.clone())
    }
}

/// Generate a small drive around central Hyderabad for each day bucket.
///
/// Points alternate between wireless and manual fixes, 30 seconds apart.
pub fn demo_buckets() -> RouteBuckets {
    let mut buckets = RouteBuckets::new();
    let days = [("today", 0i64), ("yesterday", 1), ("day3", 3)];

    for (key, days_back) in days {
        let start = match Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).single() {
            Some(t) => t - ChronoDuration::days(days_back),
            None => continue,
        };
        let mut points = Vec::new();
        for i in 0..24i64 {
            // Vary the heading a little per day so the routes differ
            let step = i as f64;
            let lat = 17.385044 + step * 0.0009;
            let lng = 78.486671 + step * 0.0007 * (1.0 + days_back as f64 * 0.3);
            let kind = if i % 2 == 0 { "wireless" } else { "manual" };
            points.push(json!({
                "lat": lat,
                "lng": lng,
                "timestamp": (start + ChronoDuration::seconds(i * 30)).to_rfc3339(),
                "type": kind,
            }));
        }
        buckets.insert(key.to_string(), Value::Array(points));
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Day, PointType, RouteSelection};
    use crate::input::select_route;

    #[tokio::test]
    async fn test_memory_source_serves_buckets() {
        let source = MemoryRouteSource::demo();
        let buckets = source.fetch().await.unwrap();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets["day3"].as_array().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = MemoryRouteSource::failing("no network");
        match source.fetch().await {
            Err(LoadError::Io { source, .. }) => assert_eq!(source.to_string(), "no network"),
            other => panic!("expected failure, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn test_demo_route_is_ordered_and_filtered() {
        let selection = RouteSelection::new(Day::ThreeDaysAgo, PointType::Manual);
        let route = select_route(&demo_buckets(), selection).unwrap();
        assert_eq!(route.len(), 12);
        for pair in route.points().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }
}
