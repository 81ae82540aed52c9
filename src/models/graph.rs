//! Resource graph emitted to the provisioning backend.
//!
//! A [`ResourceGraph`] is read-only once built. Construction goes through
//! [`GraphAccumulator`], which the topology builder threads through every
//! allocation step.

use super::{
    AssociationEdge, AttachmentEdge, DeploymentContext, Edge, Resource, ResourceId, ResourceKind,
    RouteTableResource, RouteTableScope, SubnetResource, SubnetTier,
};
use serde::{Deserialize, Serialize};

/// Typed resources plus the edges between them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceGraph {
    project_name: String,
    context: DeploymentContext,
    resources: Vec<Resource>,
    edges: Vec<Edge>,
}

impl ResourceGraph {
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn context(&self) -> &DeploymentContext {
        &self.context
    }

    /// All resources in declaration order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a resource by id.
    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Resources of one kind, selected by label (`network`, `subnet`, ...).
    pub fn resources_of(&self, label: &str) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| r.kind.label() == label)
            .collect()
    }

    pub fn networks(&self) -> Vec<&Resource> {
        self.resources_of("network")
    }

    pub fn gateways(&self) -> Vec<&Resource> {
        self.resources_of("gateway")
    }

    /// Subnets of one tier, in creation order.
    pub fn subnets(&self, tier: SubnetTier) -> Vec<(&Resource, &SubnetResource)> {
        self.resources
            .iter()
            .filter_map(|r| match &r.kind {
                ResourceKind::Subnet(s) if s.tier() == tier => Some((r, s)),
                _ => None,
            })
            .collect()
    }

    /// All subnets, public first, in creation order.
    pub fn all_subnets(&self) -> Vec<(&Resource, &SubnetResource)> {
        let mut subnets = self.subnets(SubnetTier::Public);
        subnets.extend(self.subnets(SubnetTier::Private));
        subnets
    }

    /// Route tables in creation order.
    pub fn route_tables(&self) -> Vec<(&Resource, &RouteTableResource)> {
        self.resources
            .iter()
            .filter_map(|r| match &r.kind {
                ResourceKind::RouteTable(rt) => Some((r, rt)),
                _ => None,
            })
            .collect()
    }

    /// The shared public route table, if one was declared.
    pub fn public_route_table(&self) -> Option<(&Resource, &RouteTableResource)> {
        self.route_tables()
            .into_iter()
            .find(|(_, rt)| rt.scope == RouteTableScope::Public)
    }

    /// Private route tables ordered by their index.
    pub fn private_route_tables(&self) -> Vec<(&Resource, &RouteTableResource)> {
        let mut tables: Vec<_> = self
            .route_tables()
            .into_iter()
            .filter(|(_, rt)| matches!(rt.scope, RouteTableScope::Private { .. }))
            .collect();
        tables.sort_by_key(|(_, rt)| match rt.scope {
            RouteTableScope::Private { index } => index,
            RouteTableScope::Public => 0,
        });
        tables
    }

    pub fn attachments(&self) -> Vec<&AttachmentEdge> {
        self.edges
            .iter()
            .filter_map(|e| match e {
                Edge::Attachment(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn associations(&self) -> Vec<&AssociationEdge> {
        self.edges
            .iter()
            .filter_map(|e| match e {
                Edge::Association(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    /// Associations whose subnet is `subnet_id`.
    pub fn associations_for(&self, subnet_id: &str) -> Vec<&AssociationEdge> {
        self.associations()
            .into_iter()
            .filter(|a| a.subnet == subnet_id)
            .collect()
    }
}

/// Mutable accumulator the builder fills before freezing it into a graph.
#[derive(Debug)]
pub(crate) struct GraphAccumulator {
    graph: ResourceGraph,
}

impl GraphAccumulator {
    pub(crate) fn new(project_name: &str, context: &DeploymentContext) -> Self {
        GraphAccumulator {
            graph: ResourceGraph {
                project_name: project_name.to_string(),
                context: context.clone(),
                resources: Vec::new(),
                edges: Vec::new(),
            },
        }
    }

    /// Record a resource and hand back its id.
    pub(crate) fn add_resource(&mut self, resource: Resource) -> ResourceId {
        log::trace!(
            "declare {kind} {id} ({name})",
            kind = resource.kind.label(),
            id = resource.id,
            name = resource.name()
        );
        let id = resource.id.clone();
        self.graph.resources.push(resource);
        id
    }

    pub(crate) fn add_edge(&mut self, edge: Edge) {
        self.graph.edges.push(edge);
    }

    /// Mutable access to a declared route table.
    pub(crate) fn route_table_mut(&mut self, id: &str) -> Option<&mut RouteTableResource> {
        self.graph
            .resources
            .iter_mut()
            .find(|r| r.id == id)
            .and_then(|r| match &mut r.kind {
                ResourceKind::RouteTable(rt) => Some(rt),
                _ => None,
            })
    }

    pub(crate) fn finish(self) -> ResourceGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GatewayResource, Ipv4, NAME_TAG};
    use std::collections::BTreeMap;

    fn resource(id: &str, kind: ResourceKind) -> Resource {
        let mut tags = BTreeMap::new();
        tags.insert(NAME_TAG.to_string(), format!("{id}-name"));
        Resource {
            id: id.to_string(),
            logical_id: id.to_string(),
            parent: None,
            tags,
            kind,
        }
    }

    #[test]
    fn test_accumulator_queries() {
        let ctx = DeploymentContext::new("us-east-1").unwrap();
        let mut acc = GraphAccumulator::new("demo", &ctx);
        acc.add_resource(resource("igw", ResourceKind::Gateway(GatewayResource {})));
        for (i, public) in [(0, true), (0, false), (1, true)] {
            acc.add_resource(resource(
                &format!("subnet-{i}-{public}"),
                ResourceKind::Subnet(SubnetResource {
                    cidr: Ipv4::new("10.0.1.0/24").unwrap(),
                    network: "vpc".to_string(),
                    availability_zone: "us-east-1a".to_string(),
                    public,
                    index: i,
                }),
            ));
        }
        let rt = acc.add_resource(resource(
            "rt",
            ResourceKind::RouteTable(RouteTableResource {
                network: "vpc".to_string(),
                scope: RouteTableScope::Public,
                routes: vec![],
            }),
        ));
        assert!(acc.route_table_mut(&rt).is_some());
        assert!(acc.route_table_mut("igw").is_none());
        acc.add_edge(Edge::Association(AssociationEdge {
            logical_id: "assoc".to_string(),
            subnet: "subnet-0-true".to_string(),
            route_table: rt,
        }));

        let graph = acc.finish();
        assert_eq!(graph.project_name(), "demo");
        assert_eq!(graph.gateways().len(), 1);
        assert_eq!(graph.subnets(SubnetTier::Public).len(), 2);
        assert_eq!(graph.subnets(SubnetTier::Private).len(), 1);
        assert_eq!(graph.all_subnets()[2].0.id, "subnet-0-false");
        assert!(graph.public_route_table().is_some());
        assert!(graph.private_route_tables().is_empty());
        assert_eq!(graph.associations_for("subnet-0-true").len(), 1);
        assert!(graph.associations_for("subnet-1-true").is_empty());
        assert_eq!(graph.get("igw").map(|r| r.name()), Some("igw-name"));
    }
}
