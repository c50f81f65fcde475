//! Read-only graph overview.

use std::path::PathBuf;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::formatting::{print_package_table, print_section_header, SectionStyle};

use super::load_graph;

pub fn cmd_status(packages_dir: PathBuf, json: bool) -> Result<()> {
    let graph = load_graph(&packages_dir)?;
    let order = graph.topological_order()?;
    let levels = graph.build_levels()?;

    if json {
        let packages: Vec<serde_json::Value> = graph
            .packages()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "version": p.version,
                    "private": p.private(),
                    "path": p.path,
                })
            })
            .collect();
        let status = serde_json::json!({
            "packages": packages,
            "order": order,
            "levels": levels,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print_section_header("[Workspace Status]", SectionStyle::Primary);

    if graph.is_empty() {
        println!("  {} No packages found", "WARNING:".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {} {} packages, {} dependency edges",
        "OK".green(),
        graph.len().to_string().bold().cyan(),
        graph.edge_count().to_string().bold().cyan()
    );
    println!();

    print_package_table(graph.packages().as_slice());
    println!();

    println!("  {} Topological order:", "ORDER:".bright_cyan());
    for (idx, name) in order.iter().enumerate() {
        println!(
            "  {} {}",
            format!("{:2}", idx + 1).bright_black(),
            name.bold().white()
        );
    }
    println!();

    println!("  {} Build levels:", "LEVELS:".bright_cyan());
    for (idx, level) in levels.iter().enumerate() {
        println!(
            "  {} {}",
            format!("{:2}", idx).bright_black(),
            level.join(", ").bold().white()
        );
    }
    println!();

    Ok(())
}
