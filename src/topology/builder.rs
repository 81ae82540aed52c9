//! Derivation of the standard VPC layout.

use super::naming::{resource_id, resource_name, Role};
use super::verify::verify;
use crate::config::TopologyConfig;
use crate::error::{TopologyError, TopologyResult};
use crate::models::{
    AssociationEdge, AttachmentEdge, DeploymentContext, Edge, GatewayResource, GraphAccumulator,
    Ipv4, NetworkResource, Resource, ResourceGraph, ResourceId, ResourceKind, Route,
    RouteTableResource, RouteTableScope, RouteTarget, SubnetResource, SubnetTier, NAME_TAG,
};
use crate::provider::ZoneProvider;

/// Builds a [`ResourceGraph`] from a [`TopologyConfig`].
///
/// Holds no mutable state; one builder can serve any number of builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTopologyBuilder {
    context: DeploymentContext,
}

/// State threaded through one build.
struct BuildState<'a> {
    config: &'a TopologyConfig,
    context: &'a DeploymentContext,
    graph: GraphAccumulator,
}

impl<'a> BuildState<'a> {
    fn declare(&mut self, role: Role, kind: ResourceKind) -> ResourceId {
        let mut tags = self.config.tags.clone();
        tags.insert(
            NAME_TAG.to_string(),
            resource_name(&self.config.project_name, &self.context.region, role),
        );
        self.graph.add_resource(Resource {
            id: resource_id(&self.config.construct_id, role),
            logical_id: role.logical_id(),
            parent: Some(self.config.construct_id.clone()),
            tags,
            kind,
        })
    }

    fn associate(&mut self, role: Role, subnet: &str, route_table: &str) {
        self.graph.add_edge(Edge::Association(AssociationEdge {
            logical_id: role.logical_id(),
            subnet: subnet.to_string(),
            route_table: route_table.to_string(),
        }));
    }

    fn declare_subnets(
        &mut self,
        network: &str,
        tier: SubnetTier,
        cidrs: &[Ipv4],
        zones: &[String],
    ) -> TopologyResult<Vec<ResourceId>> {
        cidrs
            .iter()
            .enumerate()
            .map(|(index, cidr)| {
                let zone = zones.get(index).ok_or_else(|| TopologyError::InsufficientZones {
                    region: self.context.region.clone(),
                    required: cidrs.len(),
                    available: zones.len(),
                })?;
                let role = match tier {
                    SubnetTier::Public => Role::PublicSubnet(index),
                    SubnetTier::Private => Role::PrivateSubnet(index),
                };
                log::debug!("{tier} subnet {} {cidr} -> {zone}", index + 1);
                Ok(self.declare(
                    role,
                    ResourceKind::Subnet(SubnetResource {
                        cidr: *cidr,
                        network: network.to_string(),
                        availability_zone: zone.clone(),
                        public: tier == SubnetTier::Public,
                        index,
                    }),
                ))
            })
            .collect()
    }
}

impl NetworkTopologyBuilder {
    pub fn new(context: DeploymentContext) -> NetworkTopologyBuilder {
        NetworkTopologyBuilder { context }
    }

    /// Builder for the region/account found in the environment.
    pub fn from_env() -> TopologyResult<NetworkTopologyBuilder> {
        Ok(NetworkTopologyBuilder::new(DeploymentContext::from_env()?))
    }

    pub fn context(&self) -> &DeploymentContext {
        &self.context
    }

    /// Derive the full topology.
    ///
    /// Public subnet *i* and private subnet *i* both land in zone *i*. The
    /// shared public route table gets the default route to the internet
    /// gateway; private subnet *i* is associated with private route table *i*.
    ///
    /// # Errors
    /// * [`TopologyError::InsufficientZones`] - fewer zones than the longer subnet list
    /// * [`TopologyError::IndexOutOfRange`] - more private subnets than private route tables
    /// * [`TopologyError::ZoneLookup`] - the provider failed or listed a zone twice
    pub fn build<P>(&self, config: &TopologyConfig, zones: &P) -> TopologyResult<ResourceGraph>
    where
        P: ZoneProvider + ?Sized,
    {
        let region = &self.context.region;
        log::info!(
            "Building topology '{project}' in {region}: vpc {cidr}, {public} public + {private} private subnets",
            project = config.project_name,
            cidr = config.network_cidr,
            public = config.public_subnet_cidrs.len(),
            private = config.private_subnet_cidrs.len(),
        );

        let mut state = BuildState {
            config,
            context: &self.context,
            graph: GraphAccumulator::new(&config.project_name, &self.context),
        };

        let network = state.declare(
            Role::Vpc,
            ResourceKind::Network(NetworkResource {
                cidr: config.network_cidr,
                enable_dns_support: true,
                enable_dns_hostnames: true,
            }),
        );

        let zones = self.resolve_zones(config, zones)?;

        let public_subnets =
            state.declare_subnets(&network, SubnetTier::Public, &config.public_subnet_cidrs, &zones)?;
        let private_subnets = state.declare_subnets(
            &network,
            SubnetTier::Private,
            &config.private_subnet_cidrs,
            &zones,
        )?;

        let gateway = state.declare(
            Role::InternetGateway,
            ResourceKind::Gateway(GatewayResource {}),
        );
        state.graph.add_edge(Edge::Attachment(AttachmentEdge {
            logical_id: Role::GatewayAttachment.logical_id(),
            gateway: gateway.clone(),
            network: network.clone(),
        }));

        let public_rt = state.declare(
            Role::PublicRouteTable,
            ResourceKind::RouteTable(RouteTableResource {
                network: network.clone(),
                scope: RouteTableScope::Public,
                routes: Vec::new(),
            }),
        );
        let default_route = Route {
            logical_id: Role::PublicRoute.logical_id(),
            destination: Ipv4::any(),
            target: RouteTarget::Gateway(gateway),
        };
        state
            .graph
            .route_table_mut(&public_rt)
            .ok_or_else(|| {
                TopologyError::InconsistentGraph(format!("route table {public_rt} vanished"))
            })?
            .routes
            .push(default_route);
        for (i, subnet) in public_subnets.iter().enumerate() {
            state.associate(Role::PublicAssociation(i), subnet, &public_rt);
        }

        let table_count = config
            .private_route_tables
            .table_count(private_subnets.len());
        let private_rts: Vec<ResourceId> = (0..table_count)
            .map(|i| {
                state.declare(
                    Role::PrivateRouteTable(i),
                    ResourceKind::RouteTable(RouteTableResource {
                        network: network.clone(),
                        scope: RouteTableScope::Private { index: i },
                        routes: Vec::new(),
                    }),
                )
            })
            .collect();
        for (i, subnet) in private_subnets.iter().enumerate() {
            let rt = private_rts.get(i).ok_or(TopologyError::IndexOutOfRange {
                index: i,
                tables: private_rts.len(),
            })?;
            state.associate(Role::PrivateAssociation(i), subnet, rt);
        }
        if private_rts.len() > private_subnets.len() {
            log::debug!(
                "{} private route tables left without subnets",
                private_rts.len() - private_subnets.len()
            );
        }

        let graph = state.graph.finish();
        verify(&graph)?;
        log::info!(
            "Built topology '{}': {} resources, {} edges",
            config.project_name,
            graph.resources().len(),
            graph.edges().len()
        );
        Ok(graph)
    }

    /// Zones to bind subnets to, capped by `max_azs` and checked for size.
    fn resolve_zones<P>(&self, config: &TopologyConfig, provider: &P) -> TopologyResult<Vec<String>>
    where
        P: ZoneProvider + ?Sized,
    {
        let region = &self.context.region;
        let mut zones = provider.list_availability_zones(region)?;
        if let Some(max_azs) = config.max_azs {
            zones.truncate(max_azs);
        }

        let duplicate = {
            let mut seen = std::collections::HashSet::new();
            zones.iter().find(|z| !seen.insert(z.as_str())).cloned()
        };
        if let Some(dup) = duplicate {
            return Err(TopologyError::ZoneLookup(format!(
                "zone '{dup}' listed twice for {region}"
            )));
        }

        let required = config.zone_slots();
        if zones.len() < required {
            log::warn!(
                "Region {region} offers {} zones, topology needs {required}",
                zones.len()
            );
            return Err(TopologyError::InsufficientZones {
                region: region.clone(),
                required,
                available: zones.len(),
            });
        }
        log::debug!("Using zones {:?}", &zones[..required]);
        Ok(zones)
    }
}
