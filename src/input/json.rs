use async_trait::async_trait;
use crate::input::{LoadError, RouteBuckets, RouteSource};
use std::path::{Path, PathBuf};

/// Route data stored as a static JSON document keyed by day bucket:
///
/// ```json
/// { "today": [{ "lat": 17.38, "lng": 78.48, "timestamp": "2024-05-01T08:00:00Z", "type": "wireless" }] }
/// ```
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path.to_string_lossy().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl RouteSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<RouteBuckets, LoadError> {
        let data = tokio::fs::read(&self.path).await.map_err(|source| LoadError::Io {
            path: self.name.clone(),
            source,
        })?;
        parse_buckets(&data)
    }
}

/// Parse a full route document. Only the top level is checked here; each
/// bucket is decoded when it is selected.
pub fn parse_buckets(data: &[u8]) -> Result<RouteBuckets, LoadError> {
    Ok(serde_json::from_slice(data)?)
}
