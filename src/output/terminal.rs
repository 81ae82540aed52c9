//! Terminal output utilities.

use crate::models::{ResourceGraph, SubnetTier};
use colored::Colorize;
use std::fmt::Write;

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// Human-readable overview of a graph, one line per resource.
pub fn summary(graph: &ResourceGraph) -> String {
    let ctx = graph.context();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Topology '{project}' in {region}{account}",
        project = graph.project_name().bold(),
        region = ctx.region.cyan(),
        account = ctx
            .account
            .as_deref()
            .map(|a| format!(" (account {a})"))
            .unwrap_or_default(),
    );

    for network in graph.networks() {
        let _ = writeln!(out, "  {:<12} {}", "network".green(), network.name());
    }
    for tier in [SubnetTier::Public, SubnetTier::Private] {
        for (resource, subnet) in graph.subnets(tier) {
            let _ = writeln!(
                out,
                "  {:<12} {} {} {}",
                format!("{tier}-subnet").green(),
                resource.name(),
                subnet.cidr.to_string().yellow(),
                subnet.availability_zone
            );
        }
    }
    for gateway in graph.gateways() {
        let _ = writeln!(out, "  {:<12} {}", "gateway".green(), gateway.name());
    }
    for (resource, rt) in graph.route_tables() {
        let _ = writeln!(
            out,
            "  {:<12} {} ({} routes)",
            "route-table".green(),
            resource.name(),
            rt.routes.len()
        );
    }

    let _ = writeln!(
        out,
        "{} resources, {} attachments, {} associations",
        graph.resources().len(),
        graph.attachments().len(),
        graph.associations().len()
    );
    out
}
