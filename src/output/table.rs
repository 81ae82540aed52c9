//! CSV-like subnet plan.

use super::terminal::format_field;
use crate::models::{num_aws_hosts, ResourceGraph};

/// One row of the subnet plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetPlanRow {
    /// 1-based row number.
    pub j: usize,
    pub tier: String,
    pub subnet_name: String,
    pub subnet_cidr: String,
    pub broadcast: String,
    /// Usable hosts after the AWS reservation, or "n/a" for tiny subnets.
    pub hosts: String,
    pub zone: String,
    pub route_table: String,
}

/// Rows for every subnet, public first, in creation order.
pub fn subnet_plan_rows(graph: &ResourceGraph) -> Vec<SubnetPlanRow> {
    graph
        .all_subnets()
        .into_iter()
        .enumerate()
        .map(|(i, (resource, subnet))| {
            let route_table = graph
                .associations_for(&resource.id)
                .first()
                .and_then(|a| graph.get(&a.route_table))
                .map(|rt| rt.name().to_string())
                .unwrap_or_else(|| "None".to_string());
            SubnetPlanRow {
                j: i + 1,
                tier: subnet.tier().to_string(),
                subnet_name: resource.name().to_string(),
                subnet_cidr: subnet.cidr.to_string(),
                broadcast: subnet.cidr.hi().to_string(),
                hosts: num_aws_hosts(subnet.cidr.mask)
                    .map(|h| h.to_string())
                    .unwrap_or_else(|_| "n/a".to_string()),
                zone: subnet.availability_zone.clone(),
                route_table,
            }
        })
        .collect()
}

/// The subnet plan as CSV text with a header line.
pub fn subnet_table(graph: &ResourceGraph) -> String {
    let mut lines = vec![
        r#" "cnt",    "tier",                         "subnet_name",      "subnet_cidr",    "broadcast",  "hosts",           "zone",                      "route_table""#
            .to_string(),
    ];
    lines.extend(subnet_plan_rows(graph).iter().map(format_row));
    lines.join("\n") + "\n"
}

fn format_row(row: &SubnetPlanRow) -> String {
    format!(
        "{j},{tier},{subnet_name},{subnet_cidr},{broadcast},{hosts},{zone},{route_table}",
        j = format_field(row.j, 6),
        tier = format_field(&row.tier, 9),
        subnet_name = format_field(&row.subnet_name, 38),
        subnet_cidr = format_field(&row.subnet_cidr, 18),
        broadcast = format_field(format!("{}_br", row.broadcast), 18),
        hosts = format_field(&row.hosts, 8),
        zone = format_field(&row.zone, 16),
        route_table = format_field(&row.route_table, 30),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologyConfig;
    use crate::models::DeploymentContext;
    use crate::provider::StaticZones;
    use crate::topology::NetworkTopologyBuilder;

    fn graph() -> ResourceGraph {
        let config = TopologyConfig::new(
            "demo",
            None,
            Some(&["10.0.1.0/24", "10.0.2.0/28"]),
            Some(&["10.0.11.0/24"]),
        )
        .unwrap();
        NetworkTopologyBuilder::new(DeploymentContext::new("us-east-1").unwrap())
            .build(&config, &StaticZones::new(&["use1-a", "use1-b"]))
            .unwrap()
    }

    #[test]
    fn test_plan_rows() {
        let rows = subnet_plan_rows(&graph());
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            SubnetPlanRow {
                j: 2,
                tier: "public".to_string(),
                subnet_name: "demo-us-east-1-public-subnet-2".to_string(),
                subnet_cidr: "10.0.2.0/28".to_string(),
                broadcast: "10.0.2.15".to_string(),
                hosts: "11".to_string(),
                zone: "use1-b".to_string(),
                route_table: "demo-us-east-1-public-rt".to_string(),
            }
        );
        assert_eq!(rows[2].route_table, "demo-us-east-1-private-rt-1");
        assert_eq!(rows[2].hosts, "251");
    }

    #[test]
    fn test_table_text() {
        let text = subnet_table(&graph());
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("\"10.0.11.0/24\""));
        assert!(text.contains("\"10.0.1.255_br\""));
    }
}
