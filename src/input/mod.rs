pub mod json;
pub mod memory;

pub use json::JsonFileSource;
pub use memory::MemoryRouteSource;

use async_trait::async_trait;
use crate::core::{RoutePoint, RouteSelection, RouteSequence};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

/// A point record exactly as it appears in the source data
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoutePoint {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// All recorded points, grouped by day bucket key.
///
/// Buckets stay undecoded until selected, so a malformed bucket only affects
/// loads that read it.
pub type RouteBuckets = HashMap<String, Value>;

/// Failure to load route data
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read route data from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("route data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bucket '{bucket}' is not a list of points")]
    InvalidBucket { bucket: String },
    #[error("point {index} in bucket '{bucket}' is malformed: {source}")]
    InvalidPoint {
        bucket: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("point {index} in bucket '{bucket}' has an invalid timestamp '{value}'")]
    InvalidTimestamp {
        bucket: String,
        index: usize,
        value: String,
    },
}

/// Provider of the raw day buckets. The whole payload is fetched per load.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Name of the source, for logging
    fn name(&self) -> &str;

    /// Fetch every bucket
    async fn fetch(&self) -> Result<RouteBuckets, LoadError>;
}

/// Identifies one load request. Only the most recently issued ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub selection: RouteSelection,
}

/// Loads and filters route sequences, guarding against out-of-order responses
pub struct RouteStore {
    source: Arc<dyn RouteSource>,
    latest: AtomicU64,
}

impl RouteStore {
    pub fn new(source: Arc<dyn RouteSource>) -> Self {
        Self {
            source,
            latest: AtomicU64::new(0),
        }
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Register a new load request; any earlier ticket becomes stale
    pub fn begin_request(&self, selection: RouteSelection) -> LoadTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket { seq, selection }
    }

    /// Check whether a ticket is still the latest request
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }

    /// Load the sequence for a selection
    pub async fn load(&self, selection: RouteSelection) -> Result<RouteSequence, LoadError> {
        let buckets = self.source.fetch().await?;
        let route = select_route(&buckets, selection)?;
        debug!(
            "Loaded {} points for {} from {}",
            route.len(),
            selection,
            self.source.name()
        );
        Ok(route)
    }
}

/// Pick the day's bucket and keep only points of the selected type.
///
/// A missing or `null` bucket yields an empty sequence. Records of another
/// type, or with no type at all, are skipped without being decoded.
pub fn select_route(buckets: &RouteBuckets, selection: RouteSelection) -> Result<RouteSequence, LoadError> {
    let key = selection.day.bucket_key();
    let records = match buckets.get(key) {
        None | Some(Value::Null) => return Ok(RouteSequence::empty()),
        Some(Value::Array(records)) => records,
        Some(_) => {
            return Err(LoadError::InvalidBucket {
                bucket: key.to_string(),
            })
        }
    };

    let wanted = selection.point_type.as_str();
    let mut points = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if record.get("type").and_then(Value::as_str) != Some(wanted) {
            continue;
        }
        let p = RawRoutePoint::deserialize(record).map_err(|source| LoadError::InvalidPoint {
            bucket: key.to_string(),
            index,
            source,
        })?;
        let timestamp = parse_timestamp(&p.timestamp).ok_or_else(|| LoadError::InvalidTimestamp {
            bucket: key.to_string(),
            index,
            value: p.timestamp.clone(),
        })?;
        points.push(RoutePoint::new(p.lat, p.lng, timestamp));
    }

    Ok(RouteSequence::new(points))
}

/// Parse an ISO-8601 timestamp.
///
/// A date-time without an offset is local wall-clock time; a bare date is
/// midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        // Times skipped by a DST jump have no local reading
        let utc = Local
            .from_local_datetime(&naive)
            .earliest()
            .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc));
        return Some(utc);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
