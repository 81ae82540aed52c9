//! Domain models for the VPC topology builder.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Ipv4`] - IPv4 CIDR block with overlap/containment checks
//! - [`DeploymentContext`] - Region and account a topology is derived for
//! - [`Resource`] and [`Edge`] - Typed resource and relation records
//! - [`ResourceGraph`] - The finished, read-only topology

mod context;
mod graph;
mod ipv4;
mod resource;

// Re-export public types
pub use context::DeploymentContext;
pub(crate) use graph::GraphAccumulator;
pub use graph::ResourceGraph;
pub use ipv4::{
    broadcast_addr, cut_addr, get_cidr_mask, num_aws_hosts, CidrError, Ipv4,
    AWS_RESERVED_ADDRESSES, MAX_LENGTH,
};
pub use resource::{
    AssociationEdge, AttachmentEdge, Edge, GatewayResource, NetworkResource, Resource,
    ResourceId, ResourceKind, Route, RouteTableResource, RouteTableScope, RouteTarget,
    SubnetResource, SubnetTier, NAME_TAG,
};
