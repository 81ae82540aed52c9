//! Availability-zone providers.
//!
//! The builder never computes zones itself; it asks a [`ZoneProvider`]:
//! - [`StaticZones`] - A fixed list
//! - [`RegionSuffixZones`] - `{region}a`, `{region}b`, ... for offline synthesis
//! - [`AwsCliZones`] - Lookup through the AWS CLI
//! - [`CachedZones`] - Daily file cache around another provider

mod aws;
mod cache;
mod cli;

use crate::error::{TopologyError, TopologyResult};

pub use aws::{parse_zone_names, AwsCliZones};
pub use cache::CachedZones;
pub use cli::run;

/// Source of the ordered availability zones of a region.
pub trait ZoneProvider {
    /// Ordered zone identifiers for `region`.
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>>;
}

impl<P: ZoneProvider + ?Sized> ZoneProvider for &P {
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>> {
        (**self).list_availability_zones(region)
    }
}

impl<P: ZoneProvider + ?Sized> ZoneProvider for Box<P> {
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>> {
        (**self).list_availability_zones(region)
    }
}

/// A fixed zone list, returned for every region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticZones {
    zones: Vec<String>,
}

impl StaticZones {
    pub fn new<S: AsRef<str>>(zones: &[S]) -> StaticZones {
        StaticZones {
            zones: zones.iter().map(|z| z.as_ref().trim().to_string()).collect(),
        }
    }

    /// Parse a comma-separated list such as `us-east-1a,us-east-1b`.
    pub fn parse(list: &str) -> TopologyResult<StaticZones> {
        let zones: Vec<&str> = list.split(',').map(str::trim).collect();
        if zones.iter().any(|z| z.is_empty()) {
            return Err(TopologyError::InvalidConfig(format!(
                "empty entry in zone list '{list}'"
            )));
        }
        Ok(StaticZones::new(zones.as_slice()))
    }
}

impl ZoneProvider for StaticZones {
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>> {
        log::debug!("static zones for {region}: {:?}", self.zones);
        Ok(self.zones.clone())
    }
}

/// Zones named after the region with letter suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSuffixZones {
    count: usize,
}

impl RegionSuffixZones {
    /// At most 26 zones (`a`..`z`).
    pub fn new(count: usize) -> RegionSuffixZones {
        RegionSuffixZones {
            count: count.min(26),
        }
    }
}

impl ZoneProvider for RegionSuffixZones {
    fn list_availability_zones(&self, region: &str) -> TopologyResult<Vec<String>> {
        Ok((b'a'..=b'z')
            .take(self.count)
            .map(|c| format!("{region}{}", c as char))
            .collect())
    }
}
