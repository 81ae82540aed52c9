//! Typed resource and edge records of a topology.

use super::Ipv4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Construct path of a resource, e.g. `standard_vpc/PublicSubnet1`.
pub type ResourceId = String;

/// Tag key holding the generated human-readable name.
pub const NAME_TAG: &str = "Name";

/// One declared resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Unique id within the graph.
    pub id: ResourceId,
    /// Logical id used by template backends (`PublicSubnet1`, ...).
    pub logical_id: String,
    /// Construct the resource was declared under.
    pub parent: Option<ResourceId>,
    /// Tags to apply; always holds [`NAME_TAG`].
    pub tags: BTreeMap<String, String>,
    #[serde(flatten)]
    pub kind: ResourceKind,
}

impl Resource {
    /// The generated `Name` tag value.
    pub fn name(&self) -> &str {
        self.tags.get(NAME_TAG).map(String::as_str).unwrap_or("")
    }
}

/// Resource payload by type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    Network(NetworkResource),
    Subnet(SubnetResource),
    Gateway(GatewayResource),
    RouteTable(RouteTableResource),
}

impl ResourceKind {
    /// Short label used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Network(_) => "network",
            ResourceKind::Subnet(_) => "subnet",
            ResourceKind::Gateway(_) => "gateway",
            ResourceKind::RouteTable(_) => "route_table",
        }
    }
}

/// The virtual network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkResource {
    pub cidr: Ipv4,
    pub enable_dns_support: bool,
    pub enable_dns_hostnames: bool,
}

/// A subnet bound to one availability zone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetResource {
    pub cidr: Ipv4,
    pub network: ResourceId,
    pub availability_zone: String,
    /// Public subnets auto-assign public addresses on launch.
    pub public: bool,
    /// 0-based position in its list; never renumbered.
    pub index: usize,
}

impl SubnetResource {
    pub fn tier(&self) -> SubnetTier {
        if self.public {
            SubnetTier::Public
        } else {
            SubnetTier::Private
        }
    }
}

/// Public or private half of the topology.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubnetTier {
    Public,
    Private,
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetTier::Public => write!(f, "public"),
            SubnetTier::Private => write!(f, "private"),
        }
    }
}

/// Internet gateway. Its attachment is an [`AttachmentEdge`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayResource {}

/// A route table with its routes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteTableResource {
    pub network: ResourceId,
    pub scope: RouteTableScope,
    pub routes: Vec<Route>,
}

/// Which subnets a route table serves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum RouteTableScope {
    /// Shared by every public subnet.
    Public,
    /// Serves the private subnet at the same index.
    Private { index: usize },
}

/// One routing rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub logical_id: String,
    pub destination: Ipv4,
    pub target: RouteTarget,
}

/// Next hop of a route.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RouteTarget {
    Gateway(ResourceId),
}

/// Typed relation between two resources.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Edge {
    Attachment(AttachmentEdge),
    Association(AssociationEdge),
}

/// Binds a gateway to a network.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttachmentEdge {
    pub logical_id: String,
    pub gateway: ResourceId,
    pub network: ResourceId,
}

/// Binds a subnet to exactly one route table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssociationEdge {
    pub logical_id: String,
    pub subnet: ResourceId,
    pub route_table: ResourceId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_json_shape() {
        let mut tags = BTreeMap::new();
        tags.insert(NAME_TAG.to_string(), "demo-eu-west-1-vpc".to_string());
        let resource = Resource {
            id: "standard_vpc/StandardVPC".to_string(),
            logical_id: "StandardVPC".to_string(),
            parent: Some("standard_vpc".to_string()),
            tags,
            kind: ResourceKind::Network(NetworkResource {
                cidr: Ipv4::new("10.0.0.0/16").unwrap(),
                enable_dns_support: true,
                enable_dns_hostnames: true,
            }),
        };

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["type"], "network");
        assert_eq!(value["cidr"], "10.0.0.0/16");
        assert_eq!(value["tags"]["Name"], "demo-eu-west-1-vpc");
        assert_eq!(resource.name(), "demo-eu-west-1-vpc");

        let back: Resource = serde_json::from_value(value).unwrap();
        assert_eq!(back, resource);
    }

    #[test]
    fn test_route_table_scope_json() {
        let scope = RouteTableScope::Private { index: 2 };
        let value = serde_json::to_value(scope).unwrap();
        assert_eq!(value["tier"], "private");
        assert_eq!(value["index"], 2);
    }
}
