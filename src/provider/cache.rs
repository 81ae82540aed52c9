//! Daily file cache for zone lookups.
//!
//! Avoids repeated provider calls when synthesizing the same region many
//! times a day.

use super::ZoneProvider;
use crate::config::ZONE_CACHE_PREFIX;
use crate::error::{TopologyError, TopologyResult};
use std::path::{Path, PathBuf};

/// Wraps another provider, keeping its answers in `{dir}/zone_cache_{region}_{date}.json`.
#[derive(Debug, Clone)]
pub struct CachedZones<P> {
    inner: P,
    cache_dir: PathBuf,
}

impl<P: ZoneProvider> CachedZones<P> {
    pub fn new(inner: P, cache_dir: &Path) -> CachedZones<P> {
        CachedZones {
            inner,
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Cache file used today for `region`.
    pub fn cache_file(&self, region: &str) -> PathBuf {
        let today = chrono::Utc::now().format("%Y-%m-%d");
        self.cache_dir
            .join(format!("{ZONE_CACHE_PREFIX}_{region}_{today}.json"))
    }

    fn read_cache(&self, cache_file: &Path) -> Option<Vec<String>> {
        let json = std::fs::read_to_string(cache_file).ok()?;
        match serde_json::from_str::<Vec<String>>(&json) {
            Ok(zones) if !zones.is_empty() => {
                log::info!("Reading zones from cache file: {}", cache_file.display());
                Some(zones)
            }
            Ok(_) => {
                log::warn!("Ignoring empty cache file: {}", cache_file.display());
                None
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable cache file {}: {e}",
                    cache_file.display()
                );
                None
            }
        }
    }
}

impl<P: ZoneProvider> ZoneProvider for CachedZones<P> {
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>> {
        let cache_file = self.cache_file(region);
        if let Some(zones) = self.read_cache(&cache_file) {
            return Ok(zones);
        }

        log::warn!("Cache file not found: {}", cache_file.display());
        let zones = self.inner.list_availability_zones(region)?;

        let json = serde_json::to_string_pretty(&zones)
            .map_err(|e| TopologyError::ZoneLookup(format!("error serializing zones: {e}")))?;
        std::fs::create_dir_all(&self.cache_dir).map_err(|e| {
            TopologyError::ZoneLookup(format!(
                "error creating cache dir {}: {e}",
                self.cache_dir.display()
            ))
        })?;
        log::warn!("Writing zones to cache file: {}", cache_file.display());
        std::fs::write(&cache_file, json).map_err(|e| {
            TopologyError::ZoneLookup(format!(
                "error writing cache file {}: {e}",
                cache_file.display()
            ))
        })?;
        Ok(zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticZones;

    struct Unreachable;

    impl ZoneProvider for Unreachable {
        fn list_availability_zones(&self, _region: &str) -> TopologyResult<Vec<String>> {
            Err(TopologyError::ZoneLookup("offline".to_string()))
        }
    }

    #[test]
    fn test_cache_written_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let first = CachedZones::new(StaticZones::new(&["eu-west-1a", "eu-west-1b"]), dir.path());
        let zones = first.list_availability_zones("eu-west-1").unwrap();
        assert_eq!(zones, vec!["eu-west-1a", "eu-west-1b"]);
        assert!(first.cache_file("eu-west-1").exists());

        let second = CachedZones::new(Unreachable, dir.path());
        assert_eq!(second.list_availability_zones("eu-west-1").unwrap(), zones);
        // other regions are not served from this cache
        assert!(second.list_availability_zones("us-east-1").is_err());
    }

    #[test]
    fn test_corrupt_cache_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedZones::new(StaticZones::new(&["r1a"]), dir.path());
        std::fs::write(cached.cache_file("r1"), "not json").unwrap();
        assert_eq!(cached.list_availability_zones("r1").unwrap(), vec!["r1a"]);

        let reread = std::fs::read_to_string(cached.cache_file("r1")).unwrap();
        assert!(reread.contains("r1a"));
    }

    #[test]
    fn test_cache_file_name() {
        let cached = CachedZones::new(Unreachable, Path::new("/tmp/zones"));
        let name = cached.cache_file("ap-south-1");
        let file = name.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.starts_with("zone_cache_ap-south-1_"), "{file}");
        assert!(file.ends_with(".json"));
    }
}
