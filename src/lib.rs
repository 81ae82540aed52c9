//! Deterministic derivation of a standard VPC topology.
//!
//! Given a project name, a VPC CIDR and lists of public and private subnet
//! CIDRs, [`topology::NetworkTopologyBuilder`] derives a [`models::ResourceGraph`]
//! holding the network, zone-bound subnets, an internet gateway and route
//! tables with their associations. Creating the resources is left to an
//! external provisioning backend fed from [`output`].

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod provider;
pub mod topology;

use std::error::Error;
use std::path::Path;

pub use config::{PrivateRouteTablePolicy, RawTopologyConfig, TopologyConfig};
pub use error::{TopologyError, TopologyResult};
pub use models::{DeploymentContext, ResourceGraph};
pub use topology::NetworkTopologyBuilder;

use provider::{AwsCliZones, CachedZones, RegionSuffixZones, StaticZones, ZoneProvider};

/// Where availability zones come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneSource {
    /// Explicit comma-separated list.
    List(String),
    /// AWS CLI lookup, optionally with a profile and a cache directory.
    AwsCli {
        profile: Option<String>,
        cache_dir: Option<std::path::PathBuf>,
    },
    /// `{region}a`, `{region}b`, ... with the given count.
    Synthesized(usize),
}

/// Instantiate the provider for a zone source.
pub fn zone_provider(source: &ZoneSource) -> TopologyResult<Box<dyn ZoneProvider>> {
    let provider: Box<dyn ZoneProvider> = match source {
        ZoneSource::List(list) => Box::new(StaticZones::parse(list)?),
        ZoneSource::AwsCli {
            profile,
            cache_dir: Some(dir),
        } => Box::new(CachedZones::new(AwsCliZones::new(profile.as_deref()), dir)),
        ZoneSource::AwsCli {
            profile,
            cache_dir: None,
        } => Box::new(AwsCliZones::new(profile.as_deref())),
        ZoneSource::Synthesized(count) => {
            log::warn!("No zone lookup configured, synthesizing {count} zones per region");
            Box::new(RegionSuffixZones::new(*count))
        }
    };
    Ok(provider)
}

/// Build the topology and render it in one go.
pub fn build_and_render(
    config: &TopologyConfig,
    context: DeploymentContext,
    zones: &dyn ZoneProvider,
    format: output::OutputFormat,
) -> Result<String, Box<dyn Error>> {
    let graph = NetworkTopologyBuilder::new(context).build(config, zones)?;
    Ok(output::render(&graph, format)?)
}

/// Write rendered output to `out`, or stdout when None.
pub fn write_output(text: &str, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .map_err(|e| format!("Error writing output file {}: {e}", path.display()))?;
            log::info!("Wrote {} bytes to {}", text.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
