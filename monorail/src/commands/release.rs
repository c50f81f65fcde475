//! Versioning, publishing, verification, and rollback commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;

use monorail_core::registry::VcsTagger;
use monorail_core::{
    Changelog, DependencyGraph, PublishOptions, PublishOrchestrator, PublishStatus, ReleaseEngine,
    RollbackOutcome, ShellRunner, VerifyOutcome,
};
use monorail_registry::{GitTagger, NpmRegistry};

use crate::formatting::{
    format_duration, print_error, print_section_header, print_success, print_summary_box,
    print_warning, SectionStyle, Status,
};

use super::{load_config, load_graph, load_packages, repo_root};

pub fn cmd_version(packages_dir: PathBuf, new_version: String, dry_run: bool) -> Result<()> {
    let config = load_config(&packages_dir)?;
    let mut packages = load_packages(&packages_dir)?;

    // Structural validation before any manifest is touched.
    let graph = DependencyGraph::build(packages.clone())?;
    graph.topological_order()?;

    if dry_run {
        print_section_header("[Version Bump (Dry Run)]", SectionStyle::Primary);
    } else {
        print_section_header("[Version Bump]", SectionStyle::Primary);
    }

    let engine = ReleaseEngine::new(dry_run);
    let bumps = engine.bump_all(&mut packages, &new_version)?;

    for bump in &bumps {
        println!(
            "  {} {} {} → {}",
            "BUMP".cyan(),
            bump.package.bold().white(),
            bump.old_version.bright_black(),
            bump.new_version.bold().cyan()
        );
    }
    println!();

    if dry_run {
        return Ok(());
    }

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let released: Vec<String> = bumps.iter().map(|b| b.package.clone()).collect();
    Changelog::prepend(
        &config.changelog_path(&packages_dir),
        &new_version,
        &date,
        &released,
    )?;

    let tag = format!("{}{}", config.tag_prefix(), new_version);
    let tagger = GitTagger::with_default_remote(repo_root(&packages_dir, &config));
    tagger.tag(&tag, &format!("Release {}", tag))?;

    print_success(&format!(
        "{} packages bumped to {}, tagged {}",
        bumps.len(),
        new_version,
        tag
    ));
    println!();

    Ok(())
}

pub fn cmd_publish(
    packages_dir: PathBuf,
    dry_run: bool,
    force: bool,
    skip_version_check: bool,
) -> Result<()> {
    let config = load_config(&packages_dir)?;
    let graph = load_graph(&packages_dir)?;
    let total = graph.len();

    if dry_run {
        print_section_header("[Publishing (Dry Run)]", SectionStyle::Primary);
    } else {
        print_section_header("[Publishing]", SectionStyle::Primary);
    }

    let options = PublishOptions {
        dry_run,
        force,
        skip_version_check,
        delay: config.publish_delay(),
    };
    let orchestrator = PublishOrchestrator::new(
        &packages_dir,
        graph,
        Arc::new(ShellRunner),
        Arc::new(NpmRegistry::new(config.registry.clone())),
        options,
    );

    let records = orchestrator.publish_all()?;

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Package").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Version").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Details").add_attribute(comfy_table::Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    let mut published = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for record in &records {
        match &record.status {
            PublishStatus::Published { duration } => {
                published += 1;
                table.add_row(vec![
                    Cell::new(Status::Success.symbol()).fg(comfy_table::Color::Green),
                    Cell::new(&record.package).fg(comfy_table::Color::White),
                    Cell::new(&record.version),
                    Cell::new(format_duration(duration.as_secs_f64())),
                ]);
            }
            PublishStatus::Skipped { reason } => {
                skipped += 1;
                table.add_row(vec![
                    Cell::new(Status::Info.symbol()).fg(comfy_table::Color::Cyan),
                    Cell::new(&record.package).fg(comfy_table::Color::DarkGrey),
                    Cell::new(&record.version),
                    Cell::new(reason).fg(comfy_table::Color::DarkGrey),
                ]);
            }
            PublishStatus::DryRun => {
                table.add_row(vec![
                    Cell::new(Status::Info.symbol()).fg(comfy_table::Color::Cyan),
                    Cell::new(&record.package).fg(comfy_table::Color::White),
                    Cell::new(&record.version),
                    Cell::new("would publish").fg(comfy_table::Color::Cyan),
                ]);
            }
            PublishStatus::Failed { message } => {
                failed += 1;
                table.add_row(vec![
                    Cell::new(Status::Error.symbol()).fg(comfy_table::Color::Red),
                    Cell::new(&record.package).fg(comfy_table::Color::Red),
                    Cell::new(&record.version),
                    Cell::new(message),
                ]);
            }
        }
    }
    println!("{}", table);
    println!();

    if records.len() < total && failed > 0 {
        print_warning(&format!(
            "Run aborted; {} packages were not attempted",
            total - records.len()
        ));
    }

    print_summary_box(
        "Publish Summary",
        &[
            ("Published", &published.to_string()),
            ("Skipped", &skipped.to_string()),
            ("Failed", &failed.to_string()),
        ],
    );
    println!();

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

pub fn cmd_verify(packages_dir: PathBuf, version: String, timeout_ms: Option<u64>) -> Result<()> {
    let config = load_config(&packages_dir)?;
    let graph = load_graph(&packages_dir)?;

    let delay = config.verify_delay();
    let attempts = match timeout_ms {
        Some(ms) => ((ms / delay.as_millis().max(1) as u64) as u32).max(1),
        None => config.verify_attempts(),
    };

    print_section_header("[Verifying Release]", SectionStyle::Primary);

    let orchestrator = PublishOrchestrator::new(
        &packages_dir,
        graph,
        Arc::new(ShellRunner),
        Arc::new(NpmRegistry::new(config.registry.clone())),
        PublishOptions::default(),
    );

    let records = orchestrator.verify_release(&version, attempts, delay)?;

    let mut timeouts = 0;
    for record in &records {
        match record.outcome {
            VerifyOutcome::Verified => {
                println!(
                    "  {} {}@{}",
                    "VERIFIED".green(),
                    record.package.bold().white(),
                    record.version
                );
            }
            VerifyOutcome::Timeout => {
                timeouts += 1;
                println!(
                    "  {} {}@{} not visible after {} attempts",
                    "TIMEOUT".yellow(),
                    record.package.bold().yellow(),
                    record.version,
                    attempts
                );
            }
        }
    }
    println!();

    if timeouts > 0 {
        print_warning(&format!(
            "{} packages have not propagated to the registry",
            timeouts
        ));
        println!();
        std::process::exit(1);
    }

    print_success("All packages verified on the registry");
    println!();

    Ok(())
}

pub fn cmd_rollback(
    packages_dir: PathBuf,
    version: String,
    force: bool,
    unpublish: bool,
) -> Result<()> {
    if !force {
        print_error("Rollback is destructive; pass --force to confirm");
        println!();
        std::process::exit(1);
    }

    let config = load_config(&packages_dir)?;
    let graph = load_graph(&packages_dir)?;
    let tag = format!("{}{}", config.tag_prefix(), version);

    print_section_header("[Rolling Back]", SectionStyle::Primary);

    let tagger = GitTagger::with_default_remote(repo_root(&packages_dir, &config));
    let orchestrator = PublishOrchestrator::new(
        &packages_dir,
        graph,
        Arc::new(ShellRunner),
        Arc::new(NpmRegistry::new(config.registry.clone())),
        PublishOptions::default(),
    );

    let report = orchestrator.rollback(&tag, &version, unpublish, &tagger)?;

    if report.tag_removed {
        print_success(&format!("Removed tag {} (local and remote)", report.tag));
    } else {
        for error in &report.tag_errors {
            print_warning(error);
        }
    }
    println!();

    let mut failures = 0;
    for record in &report.packages {
        match &record.outcome {
            RollbackOutcome::Success => {
                println!(
                    "  {} {}@{} unpublished",
                    "OK".green(),
                    record.package.bold().white(),
                    version
                );
            }
            RollbackOutcome::NotFound => {
                println!(
                    "  {} {}@{} not on registry",
                    "NOT FOUND".bright_black(),
                    record.package.bold().white(),
                    version
                );
            }
            RollbackOutcome::Failed(message) => {
                failures += 1;
                println!(
                    "  {} {}@{}: {}",
                    "FAILED".red(),
                    record.package.bold().red(),
                    version,
                    message
                );
            }
        }
    }
    println!();

    if failures > 0 || !report.tag_removed {
        std::process::exit(1);
    }

    Ok(())
}
