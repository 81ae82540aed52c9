//! Structural self-check of a derived graph.

use crate::error::{TopologyError, TopologyResult};
use crate::models::{
    Ipv4, ResourceGraph, ResourceKind, Route, RouteTableResource, RouteTableScope, RouteTarget,
    SubnetTier,
};
use std::collections::HashSet;

fn fail<T>(msg: String) -> TopologyResult<T> {
    Err(TopologyError::InconsistentGraph(msg))
}

fn exactly_one<T>(items: Vec<T>, what: &str) -> TopologyResult<T> {
    let count = items.len();
    let mut items = items.into_iter();
    match (items.next(), items.next()) {
        (Some(item), None) => Ok(item),
        _ => fail(format!("expected exactly one {what}, found {count}")),
    }
}

fn route_table<'g>(graph: &'g ResourceGraph, id: &str) -> TopologyResult<&'g RouteTableResource> {
    match graph.get(id).map(|r| &r.kind) {
        Some(ResourceKind::RouteTable(rt)) => Ok(rt),
        Some(other) => fail(format!("{id} is a {}, not a route table", other.label())),
        None => fail(format!("unknown route table {id}")),
    }
}

/// Check the invariants every emitted graph must hold.
///
/// One network, one gateway attached to it, one public route table holding
/// exactly the default route to that gateway, and every subnet associated
/// exactly once with the table of its tier and index.
pub fn verify(graph: &ResourceGraph) -> TopologyResult<()> {
    let mut ids = HashSet::new();
    if let Some(dup) = graph.resources().iter().find(|r| !ids.insert(r.id.as_str())) {
        return fail(format!("duplicate resource id {}", dup.id));
    }

    let network = exactly_one(graph.networks(), "network")?;
    let gateway = exactly_one(graph.gateways(), "gateway")?;

    let attachment = exactly_one(graph.attachments(), "gateway attachment")?;
    if attachment.gateway != gateway.id || attachment.network != network.id {
        return fail(format!(
            "attachment {} binds {} to {}, expected {} to {}",
            attachment.logical_id, attachment.gateway, attachment.network, gateway.id, network.id
        ));
    }

    for (resource, subnet) in graph.all_subnets() {
        if subnet.network != network.id {
            return fail(format!("{} belongs to unknown network {}", resource.id, subnet.network));
        }
    }
    for (resource, rt) in graph.route_tables() {
        if rt.network != network.id {
            return fail(format!("{} belongs to unknown network {}", resource.id, rt.network));
        }
    }

    let (public_rt, public_table) = graph
        .public_route_table()
        .ok_or_else(|| TopologyError::InconsistentGraph("no public route table".to_string()))?;
    let public_tables = graph
        .route_tables()
        .iter()
        .filter(|(_, rt)| rt.scope == RouteTableScope::Public)
        .count();
    if public_tables != 1 {
        return fail(format!("expected exactly one public route table, found {public_tables}"));
    }
    let routes: Vec<&Route> = public_table.routes.iter().collect();
    let route = exactly_one(routes, "public route")?;
    if route.destination != Ipv4::any() || route.target != RouteTarget::Gateway(gateway.id.clone())
    {
        return fail(format!(
            "public route {} -> {:?} is not the default route to {}",
            route.destination, route.target, gateway.id
        ));
    }
    let mut private_indices = HashSet::new();
    for (resource, rt) in graph.private_route_tables() {
        if !rt.routes.is_empty() {
            return fail(format!("private route table {} carries routes", resource.id));
        }
        if let RouteTableScope::Private { index } = rt.scope {
            if !private_indices.insert(index) {
                return fail(format!(
                    "private route table {} repeats index {index}",
                    resource.id
                ));
            }
        }
    }

    for (resource, subnet) in graph.all_subnets() {
        let association = exactly_one(
            graph.associations_for(&resource.id),
            &format!("association for {}", resource.id),
        )?;
        let table = route_table(graph, &association.route_table)?;
        let expected = match subnet.tier() {
            SubnetTier::Public => RouteTableScope::Public,
            SubnetTier::Private => RouteTableScope::Private {
                index: subnet.index,
            },
        };
        if table.scope != expected {
            return fail(format!(
                "{} is associated with {} ({:?}), expected {:?}",
                resource.id, association.route_table, table.scope, expected
            ));
        }
        if subnet.tier() == SubnetTier::Public && association.route_table != public_rt.id {
            return fail(format!("{} skips the public route table", resource.id));
        }
    }

    for association in graph.associations() {
        match graph.get(&association.subnet).map(|r| &r.kind) {
            Some(ResourceKind::Subnet(_)) => {}
            _ => {
                return fail(format!(
                    "association {} references unknown subnet {}",
                    association.logical_id, association.subnet
                ))
            }
        }
    }

    log::debug!("graph for '{}' passed verification", graph.project_name());
    Ok(())
}
