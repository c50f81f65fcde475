//! Table formatting utilities using comfy-table.

use comfy_table::{Cell, Table};
use monorail_core::Package;

/// Prints the workspace package table.
pub fn print_package_table(packages: &[&Package]) {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Package").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Version").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Visibility").add_attribute(comfy_table::Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    for package in packages {
        let visibility = if package.private() {
            Cell::new("private").fg(comfy_table::Color::DarkGrey)
        } else {
            Cell::new("public")
        };
        table.add_row(vec![
            Cell::new(&package.name).fg(comfy_table::Color::White),
            Cell::new(&package.version),
            visibility,
        ]);
    }

    println!("{}", table);
}
