//! Topology configuration: defaults, raw input, and validation.

use crate::error::{TopologyError, TopologyResult};
use crate::models::Ipv4;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Network CIDR used when none is given.
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";

/// Public subnets used when the list is omitted.
pub const DEFAULT_PUBLIC_SUBNET_CIDRS: [&str; 3] = ["10.0.1.0/24", "10.0.2.0/24", "10.0.3.0/24"];

/// Private subnets used when the list is omitted.
pub const DEFAULT_PRIVATE_SUBNET_CIDRS: [&str; 3] =
    ["10.0.11.0/24", "10.0.12.0/24", "10.0.13.0/24"];

/// Parent construct every resource is declared under.
pub const DEFAULT_CONSTRUCT_ID: &str = "standard_vpc";

/// Private route tables allocated by the fixed policy.
pub const FIXED_PRIVATE_ROUTE_TABLES: usize = 3;

/// Zones synthesized per region when no lookup is configured.
pub const DEFAULT_SYNTH_ZONES: usize = 3;

/// Prefix of the daily zone cache files.
pub const ZONE_CACHE_PREFIX: &str = "zone_cache";

/// Upper bound on captured CLI stdout, in bytes.
pub const MAX_CLI_OUTPUT: usize = 500_000;

/// How many private route tables to declare.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PrivateRouteTablePolicy {
    /// Always [`FIXED_PRIVATE_ROUTE_TABLES`], whatever the subnet count.
    #[default]
    Fixed,
    /// One table per private subnet.
    PerSubnet,
}

impl PrivateRouteTablePolicy {
    /// Number of tables for `private_subnets` private subnets.
    pub fn table_count(&self, private_subnets: usize) -> usize {
        match self {
            PrivateRouteTablePolicy::Fixed => FIXED_PRIVATE_ROUTE_TABLES,
            PrivateRouteTablePolicy::PerSubnet => private_subnets,
        }
    }
}

/// Raw input as read from a config file; every field but the project is optional.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawTopologyConfig {
    #[serde(default)]
    pub project_name: String,
    pub vpc_cidr: Option<String>,
    pub public_subnet_cidrs: Option<Vec<String>>,
    pub private_subnet_cidrs: Option<Vec<String>>,
    pub construct_id: Option<String>,
    pub max_azs: Option<usize>,
    #[serde(default)]
    pub private_route_tables: PrivateRouteTablePolicy,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Validated topology input.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TopologyConfig {
    pub project_name: String,
    pub network_cidr: Ipv4,
    pub public_subnet_cidrs: Vec<Ipv4>,
    pub private_subnet_cidrs: Vec<Ipv4>,
    pub construct_id: String,
    pub max_azs: Option<usize>,
    pub private_route_tables: PrivateRouteTablePolicy,
    pub tags: BTreeMap<String, String>,
}

impl TopologyConfig {
    /// Validate the minimal input, applying defaults for the omitted parts.
    pub fn new(
        project_name: &str,
        vpc_cidr: Option<&str>,
        public_subnet_cidrs: Option<&[&str]>,
        private_subnet_cidrs: Option<&[&str]>,
    ) -> TopologyResult<TopologyConfig> {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        TopologyConfig::from_raw(RawTopologyConfig {
            project_name: project_name.to_string(),
            vpc_cidr: vpc_cidr.map(str::to_string),
            public_subnet_cidrs: public_subnet_cidrs.map(owned),
            private_subnet_cidrs: private_subnet_cidrs.map(owned),
            ..Default::default()
        })
    }

    /// Validate raw input.
    ///
    /// Empty subnet lists count as omitted. Malformed CIDRs, a blank project
    /// name, or overlapping subnets fail with [`TopologyError::InvalidConfig`].
    pub fn from_raw(raw: RawTopologyConfig) -> TopologyResult<TopologyConfig> {
        let project_name = raw.project_name.trim().to_string();
        if project_name.is_empty() {
            return Err(TopologyError::InvalidConfig(
                "project_name must not be empty".to_string(),
            ));
        }

        let construct_id = raw
            .construct_id
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| DEFAULT_CONSTRUCT_ID.to_string());
        if construct_id.is_empty() || construct_id.contains('/') {
            return Err(TopologyError::InvalidConfig(format!(
                "construct_id '{construct_id}' must be non-empty and contain no '/'"
            )));
        }

        if raw.max_azs == Some(0) {
            return Err(TopologyError::InvalidConfig(
                "max_azs must be at least 1".to_string(),
            ));
        }

        let network_cidr = parse_cidr(
            "vpc_cidr",
            raw.vpc_cidr.as_deref().unwrap_or(DEFAULT_VPC_CIDR),
        )?;
        let public_subnet_cidrs = parse_list(
            "public_subnet_cidrs",
            raw.public_subnet_cidrs,
            &DEFAULT_PUBLIC_SUBNET_CIDRS,
        )?;
        let private_subnet_cidrs = parse_list(
            "private_subnet_cidrs",
            raw.private_subnet_cidrs,
            &DEFAULT_PRIVATE_SUBNET_CIDRS,
        )?;

        let config = TopologyConfig {
            project_name,
            network_cidr,
            public_subnet_cidrs,
            private_subnet_cidrs,
            construct_id,
            max_azs: raw.max_azs,
            private_route_tables: raw.private_route_tables,
            tags: raw.tags,
        };
        config.check_overlaps()?;
        config.warn_outside_network();
        Ok(config)
    }

    /// Larger of the two subnet list lengths: the zone slots needed.
    pub fn zone_slots(&self) -> usize {
        self.public_subnet_cidrs
            .len()
            .max(self.private_subnet_cidrs.len())
    }

    fn labelled_subnets(&self) -> Vec<(String, Ipv4)> {
        let public = self
            .public_subnet_cidrs
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("public_subnet_cidrs[{i}]"), *c));
        let private = self
            .private_subnet_cidrs
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("private_subnet_cidrs[{i}]"), *c));
        public.chain(private).collect()
    }

    fn check_overlaps(&self) -> TopologyResult<()> {
        let subnets = self.labelled_subnets();
        let clash = subnets
            .iter()
            .tuple_combinations()
            .find(|((_, a), (_, b))| a.overlaps(b));
        match clash {
            Some(((la, a), (lb, b))) => Err(TopologyError::InvalidConfig(format!(
                "{la} ({a}) overlaps {lb} ({b})"
            ))),
            None => Ok(()),
        }
    }

    // Containment is enforced by the provider, not here.
    fn warn_outside_network(&self) {
        for (label, cidr) in self.labelled_subnets() {
            if !self.network_cidr.covers(&cidr) {
                log::warn!(
                    "{label} {cidr} is outside vpc_cidr {network}",
                    network = self.network_cidr
                );
            }
        }
    }
}

/// Read a JSON config file without validating it, so callers can override fields.
pub fn read_raw_config(path: &Path) -> TopologyResult<RawTopologyConfig> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        TopologyError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
    })?;
    log::info!("Reading topology config from {}", path.display());
    parse_raw_config(&json)
}

/// Read and validate a JSON config file.
pub fn load_config(path: &Path) -> TopologyResult<TopologyConfig> {
    TopologyConfig::from_raw(read_raw_config(path)?)
}

/// Parse JSON config text, reporting the path of the offending field.
pub fn parse_raw_config(json: &str) -> TopologyResult<RawTopologyConfig> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        TopologyError::InvalidConfig(format!("config path={} error={}", e.path(), e.inner()))
    })
}

/// Parse and validate JSON config text.
pub fn parse_config(json: &str) -> TopologyResult<TopologyConfig> {
    TopologyConfig::from_raw(parse_raw_config(json)?)
}

fn parse_cidr(field: &str, value: &str) -> TopologyResult<Ipv4> {
    Ipv4::new(value).map_err(|e| TopologyError::InvalidConfig(format!("{field}: {e}")))
}

fn parse_list(
    field: &str,
    values: Option<Vec<String>>,
    defaults: &[&str],
) -> TopologyResult<Vec<Ipv4>> {
    match values {
        Some(values) if !values.is_empty() => values
            .iter()
            .enumerate()
            .map(|(i, v)| parse_cidr(&format!("{field}[{i}]"), v))
            .collect(),
        _ => {
            log::debug!("{field} not given, using defaults {defaults:?}");
            defaults
                .iter()
                .map(|v| parse_cidr(field, v))
                .collect()
        }
    }
}
