//! External dependency version drift reporting and resolution.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;

use monorail_core::ConflictResolver;

use crate::formatting::{print_section_header, print_success, SectionStyle};

use super::load_packages;

pub fn cmd_sync_deps(packages_dir: PathBuf, dry_run: bool) -> Result<()> {
    let mut packages = load_packages(&packages_dir)?;
    let conflicts = ConflictResolver::detect(&packages);

    if dry_run {
        print_section_header("[Dependency Sync (Dry Run)]", SectionStyle::Primary);
    } else {
        print_section_header("[Dependency Sync]", SectionStyle::Primary);
    }

    if conflicts.is_empty() {
        print_success("No version conflicts detected");
        println!();
        return Ok(());
    }

    println!(
        "  {} {} external {} declared with divergent ranges:",
        "WARNING:".yellow(),
        conflicts.len().to_string().bold().yellow(),
        if conflicts.len() == 1 {
            "dependency"
        } else {
            "dependencies"
        }
    );
    println!();

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Dependency").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Range").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Used by").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Suggested").add_attribute(comfy_table::Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    for conflict in &conflicts {
        let suggested = if conflict.confident {
            conflict.suggested.clone()
        } else {
            format!("{} (low confidence)", conflict.suggested)
        };
        for (range, owners) in &conflict.usages {
            table.add_row(vec![
                Cell::new(&conflict.name).fg(comfy_table::Color::White),
                Cell::new(range),
                Cell::new(owners.join(", ")),
                Cell::new(&suggested).fg(comfy_table::Color::Cyan),
            ]);
        }
    }
    println!("{}", table);
    println!();

    let changes = ConflictResolver::apply(&mut packages, &conflicts, dry_run)?;

    for change in &changes {
        let label = if dry_run { "WOULD SYNC" } else { "SYNCED" };
        println!(
            "  {} {}: {} {} → {}",
            label.cyan(),
            change.package.bold().white(),
            change.dependency.bold(),
            change.from.bright_black(),
            change.to.bold().cyan()
        );
    }
    println!();

    if !dry_run {
        print_success(&format!("{} ranges rewritten", changes.len()));
        println!();
    }

    Ok(())
}
