//! Integration tests for vpc-topology-builder
//!
//! These tests drive the public API from config text to rendered output.

use pretty_assertions::assert_eq;
use vpc_topology_builder::config::{load_config, parse_config};
use vpc_topology_builder::models::{RouteTarget, SubnetTier};
use vpc_topology_builder::output::{render, OutputFormat};
use vpc_topology_builder::provider::{StaticZones, ZoneProvider};
use vpc_topology_builder::topology::verify;
use vpc_topology_builder::{
    build_and_render, DeploymentContext, NetworkTopologyBuilder, PrivateRouteTablePolicy,
    TopologyConfig, TopologyError,
};

const REGION: &str = "ap-southeast-2";

fn zones(n: usize) -> StaticZones {
    let names: Vec<String> = (0..n)
        .map(|i| format!("{REGION}{}", (b'a' + i as u8) as char))
        .collect();
    StaticZones::new(names.as_slice())
}

fn builder() -> NetworkTopologyBuilder {
    NetworkTopologyBuilder::new(DeploymentContext::new(REGION).unwrap())
}

fn sample_config() -> TopologyConfig {
    load_config(std::path::Path::new("demos/test-cdk-project.json"))
        .expect("Failed to load demo config")
}

#[test]
fn test_sample_project_scenario() {
    let graph = builder().build(&sample_config(), &zones(3)).unwrap();

    assert_eq!(graph.networks().len(), 1);
    assert_eq!(graph.all_subnets().len(), 6);
    assert_eq!(graph.gateways().len(), 1);
    assert_eq!(graph.private_route_tables().len(), 3);
    assert_eq!(graph.associations().len(), 6);

    let (_, public_rt) = graph.public_route_table().expect("public route table");
    assert_eq!(public_rt.routes.len(), 1);

    let names: Vec<&str> = graph
        .subnets(SubnetTier::Public)
        .iter()
        .map(|(r, _)| r.name())
        .collect();
    assert_eq!(
        names,
        vec![
            "test-cdk-project-ap-southeast-2-public-subnet-1",
            "test-cdk-project-ap-southeast-2-public-subnet-2",
            "test-cdk-project-ap-southeast-2-public-subnet-3",
        ]
    );
}

#[test]
fn test_subnet_zone_follows_list_position() {
    let provider = zones(3);
    let listed = provider.list_availability_zones(REGION).unwrap();
    let graph = builder().build(&sample_config(), &provider).unwrap();

    for tier in [SubnetTier::Public, SubnetTier::Private] {
        for (_, subnet) in graph.subnets(tier) {
            assert_eq!(subnet.availability_zone, listed[subnet.index]);
            assert_eq!(subnet.public, tier == SubnetTier::Public);
        }
    }
}

#[test]
fn test_associations_and_routes() {
    let graph = builder().build(&sample_config(), &zones(3)).unwrap();
    let (public_rt, table) = graph.public_route_table().unwrap();
    let gateway = graph.gateways()[0];
    let network = graph.networks()[0];

    assert_eq!(table.routes[0].destination.to_string(), "0.0.0.0/0");
    assert_eq!(table.routes[0].target, RouteTarget::Gateway(gateway.id.clone()));

    let attachments = graph.attachments();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].gateway, gateway.id);
    assert_eq!(attachments[0].network, network.id);

    for (resource, _) in graph.subnets(SubnetTier::Public) {
        let assoc = graph.associations_for(&resource.id);
        assert_eq!(assoc.len(), 1);
        assert_eq!(assoc[0].route_table, public_rt.id);
    }
    let private_tables = graph.private_route_tables();
    for (resource, subnet) in graph.subnets(SubnetTier::Private) {
        let assoc = graph.associations_for(&resource.id);
        assert_eq!(assoc.len(), 1);
        assert_eq!(assoc[0].route_table, private_tables[subnet.index].0.id);
    }
    assert!(verify(&graph).is_ok());
}

#[test]
fn test_build_is_idempotent() {
    let config = sample_config();
    let first = builder().build(&config, &zones(3)).unwrap();
    let second = builder().build(&config, &zones(3)).unwrap();
    assert_eq!(first, second);

    let json_a = render(&first, OutputFormat::Graph).unwrap();
    let json_b = render(&second, OutputFormat::Graph).unwrap();
    assert_eq!(json_a, json_b);
}

#[test]
fn test_four_private_subnets_fail_under_fixed_tables() {
    let json = r#"{
        "project_name": "wide",
        "private_subnet_cidrs": ["10.0.11.0/24", "10.0.12.0/24", "10.0.13.0/24", "10.0.14.0/24"]
    }"#;
    let config = parse_config(json).unwrap();
    assert_eq!(config.private_route_tables, PrivateRouteTablePolicy::Fixed);

    let err = builder().build(&config, &zones(4)).unwrap_err();
    assert_eq!(err, TopologyError::IndexOutOfRange { index: 3, tables: 3 });
}

#[test]
fn test_per_subnet_demo_config() {
    let config = load_config(std::path::Path::new("demos/per-subnet.json")).unwrap();
    let graph = builder().build(&config, &zones(4)).unwrap();
    assert_eq!(graph.private_route_tables().len(), 4);
    assert_eq!(graph.subnets(SubnetTier::Public).len(), 2);
    assert_eq!(graph.associations().len(), 6);
    let staging = graph
        .resources()
        .iter()
        .filter(|r| r.tags.get("env").map(String::as_str) == Some("staging"))
        .count();
    assert_eq!(staging, graph.resources().len());
}

#[test]
fn test_three_public_subnets_two_zones() {
    let err = builder().build(&sample_config(), &zones(2)).unwrap_err();
    assert!(
        matches!(
            err,
            TopologyError::InsufficientZones {
                required: 3,
                available: 2,
                ..
            }
        ),
        "{err:?}"
    );
}

#[test]
fn test_invalid_config_rejected() {
    let err = parse_config(r#"{"project_name": "", "vpc_cidr": "10.0.0.0/16"}"#).unwrap_err();
    assert!(matches!(err, TopologyError::InvalidConfig(_)));

    let err = parse_config(r#"{"project_name": "x", "public_subnet_cidrs": ["10.0.1.0/24", "bogus"]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("public_subnet_cidrs[1]"), "{err}");
}

#[test]
fn test_render_template_through_helper() {
    let text = build_and_render(
        &sample_config(),
        DeploymentContext::new(REGION).unwrap(),
        &zones(3),
        OutputFormat::Template,
    )
    .unwrap();
    let template: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
    assert_eq!(
        template["Resources"]["PrivateSubnet1"]["Properties"]["CidrBlock"],
        "10.50.1.0/24"
    );
}

#[test]
fn test_graph_json_roundtrip_verifies() {
    let graph = builder().build(&sample_config(), &zones(3)).unwrap();
    let text = render(&graph, OutputFormat::Graph).unwrap();
    let back: vpc_topology_builder::ResourceGraph = serde_json::from_str(&text).unwrap();
    assert_eq!(back, graph);
    assert!(verify(&back).is_ok());
}
