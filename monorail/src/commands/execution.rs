//! Build and test execution commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;

use monorail_core::{ShellRunner, TaskOrchestrator, TaskReport, TaskStatus};

use crate::formatting::{
    create_progress_bar, format_duration, print_section_header, print_summary_box, SectionStyle,
    Status,
};

use super::{load_config, load_graph};

pub fn cmd_build(packages_dir: PathBuf, sequential: bool, parallel: Option<usize>) -> Result<()> {
    run_scripts(
        packages_dir,
        &["build"],
        sequential,
        parallel,
        "[Building packages]",
        "[Build Results]",
    )
}

pub fn cmd_test(
    packages_dir: PathBuf,
    sequential: bool,
    parallel: Option<usize>,
    coverage: bool,
) -> Result<()> {
    let scripts: &[&str] = if coverage {
        &["test:coverage", "test"]
    } else {
        &["test"]
    };
    run_scripts(
        packages_dir,
        scripts,
        sequential,
        parallel,
        "[Running tests]",
        "[Test Results]",
    )
}

fn run_scripts(
    packages_dir: PathBuf,
    scripts: &[&str],
    sequential: bool,
    parallel: Option<usize>,
    header: &str,
    results_title: &str,
) -> Result<()> {
    let start = Instant::now();
    let config = load_config(&packages_dir)?;
    let graph = load_graph(&packages_dir)?;
    let total = graph.len();

    print_section_header(header, SectionStyle::Primary);

    let orchestrator = TaskOrchestrator::new(&packages_dir, graph, Arc::new(ShellRunner))
        .with_max_parallel(parallel.or(config.default_parallel));

    let pb = create_progress_bar(total as u64);
    pb.set_message("Running...".to_string());

    let reports = if sequential {
        orchestrator.run_sequential(scripts)?
    } else {
        orchestrator.run_parallel(scripts)?
    };
    pb.finish_and_clear();

    print_task_results(&reports, results_title);

    let succeeded = reports
        .iter()
        .filter(|r| matches!(r.status, TaskStatus::Success { .. }))
        .count();
    let skipped = reports
        .iter()
        .filter(|r| matches!(r.status, TaskStatus::SkippedNoScript))
        .count();
    let blocked = reports
        .iter()
        .filter(|r| matches!(r.status, TaskStatus::Blocked { .. }))
        .count();
    let failed = reports
        .iter()
        .filter(|r| matches!(r.status, TaskStatus::Failed { .. }))
        .count();

    print_summary_box(
        "Summary",
        &[
            ("Succeeded", &succeeded.to_string()),
            ("Skipped", &skipped.to_string()),
            ("Blocked", &blocked.to_string()),
            ("Failed", &failed.to_string()),
            ("Duration", &format_duration(start.elapsed().as_secs_f64())),
        ],
    );
    println!();

    if failed > 0 || blocked > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_task_results(reports: &[TaskReport], title: &str) {
    print_section_header(title, SectionStyle::Primary);

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Package").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Details").add_attribute(comfy_table::Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    for report in reports {
        match &report.status {
            TaskStatus::Success { duration } => {
                table.add_row(vec![
                    Cell::new(Status::Success.symbol()).fg(comfy_table::Color::Green),
                    Cell::new(&report.package).fg(comfy_table::Color::White),
                    Cell::new(format_duration(duration.as_secs_f64())),
                ]);
            }
            TaskStatus::SkippedNoScript => {
                table.add_row(vec![
                    Cell::new(Status::Info.symbol()).fg(comfy_table::Color::Cyan),
                    Cell::new(&report.package).fg(comfy_table::Color::DarkGrey),
                    Cell::new(format!("no {} script", report.script))
                        .fg(comfy_table::Color::DarkGrey),
                ]);
            }
            TaskStatus::Blocked { failed_dependency } => {
                table.add_row(vec![
                    Cell::new(Status::Warning.symbol()).fg(comfy_table::Color::Yellow),
                    Cell::new(&report.package).fg(comfy_table::Color::Yellow),
                    Cell::new(format!("blocked by {}", failed_dependency)),
                ]);
            }
            TaskStatus::Failed { message } => {
                table.add_row(vec![
                    Cell::new(Status::Error.symbol()).fg(comfy_table::Color::Red),
                    Cell::new(&report.package).fg(comfy_table::Color::Red),
                    Cell::new(message),
                ]);
            }
        }
    }
    println!("{}", table);

    for report in reports {
        if matches!(report.status, TaskStatus::Failed { .. }) && !report.stderr.is_empty() {
            println!(
                "  {} {}",
                format!("[{}]", report.package).bright_black(),
                report.stderr.trim().bright_red()
            );
        }
    }
    println!();
}
