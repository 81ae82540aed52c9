//! Topology derivation logic.
//!
//! This module turns a validated config into a resource graph:
//! - [`builder`] - Allocation of network, subnets, gateway and route tables
//! - [`naming`] - Name tags and logical ids
//! - [`verify`] - Structural self-check run on every built graph

mod builder;
mod naming;
mod verify;

// Re-export public functions
pub use builder::NetworkTopologyBuilder;
pub use naming::{resource_id, resource_name, Role};
pub use verify::verify;
