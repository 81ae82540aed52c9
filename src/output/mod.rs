//! Output formatting for resource graphs.
//!
//! This module renders a built graph for its consumers:
//! - [`template`] - CloudFormation-style template for the provisioning backend
//! - [`table`] - CSV-like subnet plan
//! - [`terminal`] - Colored summary and field helpers

mod table;
mod template;
mod terminal;

use crate::error::TopologyResult;
use crate::models::ResourceGraph;
use clap::ValueEnum;

pub use table::subnet_table;
pub use template::render_template;
pub use terminal::{format_field, summary};

/// Rendering selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Resource graph as pretty JSON.
    #[default]
    Graph,
    /// CloudFormation-style template.
    Template,
    /// Colored human summary.
    Summary,
    /// Subnet plan as CSV.
    Table,
}

/// Render `graph` in the chosen format.
pub fn render(graph: &ResourceGraph, format: OutputFormat) -> TopologyResult<String> {
    log::debug!("rendering graph as {format:?}");
    match format {
        OutputFormat::Graph => Ok(serde_json::to_string_pretty(graph)?),
        OutputFormat::Template => Ok(serde_json::to_string_pretty(&render_template(graph)?)?),
        OutputFormat::Summary => Ok(summary(graph)),
        OutputFormat::Table => Ok(subnet_table(graph)),
    }
}
