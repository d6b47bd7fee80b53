//! Terminal rendering of launch results

use colored::Colorize;
use tabled::{Table, Tabled};

use locus_core::application::{BackgroundOutcome, ProfileReport};
use locus_core::domain::LaunchStatus;

#[derive(Tabled)]
struct ProgramRow {
    command: String,
    status: String,
}

fn status_label(status: Option<LaunchStatus>) -> &'static str {
    status.map_or("skipped", LaunchStatus::as_str)
}

fn colorize(status: Option<LaunchStatus>) -> String {
    let label = status_label(status);
    match status {
        Some(LaunchStatus::Started) => label.green().bold().to_string(),
        Some(LaunchStatus::AlreadyRunning) => label.cyan().to_string(),
        Some(LaunchStatus::NotInstalled) => label.yellow().to_string(),
        Some(LaunchStatus::UnspecifiedError) => label.red().bold().to_string(),
        None => label.dimmed().to_string(),
    }
}

pub fn print_status(command: &str, status: LaunchStatus) {
    println!("{} {}", colorize(Some(status)), command);
}

pub fn print_report(report: &ProfileReport) {
    if report.location_checked {
        let location = report.location.as_deref().unwrap_or("unknown");
        println!("{} {}", "Location:".bold(), location);
    }

    match &report.background {
        Some(BackgroundOutcome::Applied { image }) => {
            println!("{} {}", "Background:".bold(), image);
        }
        Some(BackgroundOutcome::Failed { error }) => {
            println!("{} {}", "Background:".bold(), error.red());
        }
        None => {}
    }

    if report.programs.is_empty() {
        println!("{}", "No programs in profile".yellow());
        return;
    }

    let rows: Vec<ProgramRow> = report
        .programs
        .iter()
        .map(|p| ProgramRow {
            command: p.command.clone(),
            status: colorize(p.status),
        })
        .collect();

    println!();
    println!("{}", Table::new(rows));
    println!(
        "{} started, {} already running, {} not installed, {} failed, {} skipped",
        report.count(LaunchStatus::Started),
        report.count(LaunchStatus::AlreadyRunning),
        report.count(LaunchStatus::NotInstalled),
        report.count(LaunchStatus::UnspecifiedError),
        report.skipped(),
    );
}
