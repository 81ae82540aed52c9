//! CloudFormation-style template rendering.

use crate::error::{TopologyError, TopologyResult};
use crate::models::{Edge, Resource, ResourceGraph, ResourceKind, RouteTarget};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const TEMPLATE_VERSION: &str = "2010-09-09";

fn tags(tags: &BTreeMap<String, String>) -> Value {
    Value::Array(
        tags.iter()
            .map(|(k, v)| json!({"Key": k, "Value": v}))
            .collect(),
    )
}

/// `{"Ref": <logical id>}` for a resource id of the graph.
fn reference(graph: &ResourceGraph, id: &str) -> TopologyResult<Value> {
    let resource = graph.get(id).ok_or_else(|| {
        TopologyError::InconsistentGraph(format!("template references unknown resource {id}"))
    })?;
    Ok(json!({"Ref": resource.logical_id}))
}

fn resource_entry(graph: &ResourceGraph, resource: &Resource) -> TopologyResult<Value> {
    let entry = match &resource.kind {
        ResourceKind::Network(n) => json!({
            "Type": "AWS::EC2::VPC",
            "Properties": {
                "CidrBlock": n.cidr.to_string(),
                "EnableDnsHostnames": n.enable_dns_hostnames,
                "EnableDnsSupport": n.enable_dns_support,
                "Tags": tags(&resource.tags),
            }
        }),
        ResourceKind::Subnet(s) => json!({
            "Type": "AWS::EC2::Subnet",
            "Properties": {
                "VpcId": reference(graph, &s.network)?,
                "AvailabilityZone": s.availability_zone,
                "CidrBlock": s.cidr.to_string(),
                "MapPublicIpOnLaunch": s.public,
                "Tags": tags(&resource.tags),
            }
        }),
        ResourceKind::Gateway(_) => json!({
            "Type": "AWS::EC2::InternetGateway",
            "Properties": { "Tags": tags(&resource.tags) }
        }),
        ResourceKind::RouteTable(rt) => json!({
            "Type": "AWS::EC2::RouteTable",
            "Properties": {
                "VpcId": reference(graph, &rt.network)?,
                "Tags": tags(&resource.tags),
            }
        }),
    };
    Ok(entry)
}

/// Render the graph as a CloudFormation-style template.
///
/// Routes become `AWS::EC2::Route` entries depending on the gateway
/// attachment, since a route to an unattached gateway is rejected.
pub fn render_template(graph: &ResourceGraph) -> TopologyResult<Value> {
    let mut resources = Map::new();

    for resource in graph.resources() {
        resources.insert(
            resource.logical_id.clone(),
            resource_entry(graph, resource)?,
        );
    }

    let attachment = graph.attachments().first().map(|a| a.logical_id.clone());
    for (resource, rt) in graph.route_tables() {
        for route in &rt.routes {
            let RouteTarget::Gateway(gateway) = &route.target;
            let mut entry = json!({
                "Type": "AWS::EC2::Route",
                "Properties": {
                    "RouteTableId": {"Ref": resource.logical_id},
                    "DestinationCidrBlock": route.destination.to_string(),
                    "GatewayId": reference(graph, gateway)?,
                }
            });
            if let Some(attachment) = &attachment {
                entry["DependsOn"] = json!(attachment);
            }
            resources.insert(route.logical_id.clone(), entry);
        }
    }

    for edge in graph.edges() {
        let (logical_id, entry) = match edge {
            Edge::Attachment(a) => (
                &a.logical_id,
                json!({
                    "Type": "AWS::EC2::VPCGatewayAttachment",
                    "Properties": {
                        "VpcId": reference(graph, &a.network)?,
                        "InternetGatewayId": reference(graph, &a.gateway)?,
                    }
                }),
            ),
            Edge::Association(a) => (
                &a.logical_id,
                json!({
                    "Type": "AWS::EC2::SubnetRouteTableAssociation",
                    "Properties": {
                        "SubnetId": reference(graph, &a.subnet)?,
                        "RouteTableId": reference(graph, &a.route_table)?,
                    }
                }),
            ),
        };
        if resources.insert(logical_id.clone(), entry).is_some() {
            return Err(TopologyError::InconsistentGraph(format!(
                "logical id {logical_id} declared twice"
            )));
        }
    }

    log::debug!("template holds {} entries", resources.len());
    Ok(json!({
        "AWSTemplateFormatVersion": TEMPLATE_VERSION,
        "Description": format!(
            "Standard VPC for {} in {}",
            graph.project_name(),
            graph.context().region
        ),
        "Resources": resources,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use crate::models::DeploymentContext;
    use crate::provider::RegionSuffixZones;
    use crate::topology::NetworkTopologyBuilder;

    fn template() -> Value {
        let config = TopologyConfig::new("demo", Some("10.30.0.0/16"), None, None).unwrap();
        let graph = NetworkTopologyBuilder::new(DeploymentContext::new("eu-west-1").unwrap())
            .build(&config, &RegionSuffixZones::new(3))
            .unwrap();
        render_template(&graph).unwrap()
    }

    #[test]
    fn test_template_entries() {
        let t = template();
        let resources = t["Resources"].as_object().unwrap();
        // 1 vpc, 6 subnets, igw, attachment, 4 route tables, 1 route, 6 associations
        assert_eq!(resources.len(), 20);
        assert_eq!(resources["StandardVPC"]["Type"], "AWS::EC2::VPC");
        assert_eq!(
            resources["StandardVPC"]["Properties"]["CidrBlock"],
            "10.30.0.0/16"
        );
        assert_eq!(resources["StandardVPC"]["Properties"]["EnableDnsSupport"], true);
        assert_eq!(resources["StandardVPC"]["Properties"]["EnableDnsHostnames"], true);
        assert_eq!(
            resources["PublicSubnet1"]["Properties"]["MapPublicIpOnLaunch"],
            true
        );
        assert_eq!(
            resources["PrivateSubnet2"]["Properties"]["AvailabilityZone"],
            "eu-west-1b"
        );
        assert_eq!(
            resources["PrivateSubnet2"]["Properties"]["VpcId"],
            json!({"Ref": "StandardVPC"})
        );
    }

    #[test]
    fn test_template_routing() {
        let t = template();
        let r = &t["Resources"];
        assert_eq!(r["PublicRoute"]["DependsOn"], "IGWAttachment");
        assert_eq!(
            r["PublicRoute"]["Properties"]["GatewayId"],
            json!({"Ref": "InternetGateway"})
        );
        assert_eq!(
            r["PublicRoute"]["Properties"]["DestinationCidrBlock"],
            "0.0.0.0/0"
        );
        assert_eq!(
            r["PrivateSubnetRouteTableAssociation3"]["Properties"]["RouteTableId"],
            json!({"Ref": "PrivateRouteTable3"})
        );
        assert_eq!(
            r["InternetGateway"]["Properties"]["Tags"][0],
            json!({"Key": "Name", "Value": "demo-eu-west-1-igw"})
        );
    }
}
