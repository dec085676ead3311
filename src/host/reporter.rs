use colored::{ColoredString, Colorize};
use supports_color::Stream;

use crate::keeper::{MarkerAction, MarkerEvent, ReconcileReport};

/// Enables colored output only when both streams are terminals that support it.
pub fn init_colors() {
    let supported = supports_color::on(Stream::Stdout).is_some()
        && supports_color::on(Stream::Stderr).is_some();
    colored::control::set_override(supported);
}

pub fn print_report(report: &ReconcileReport) {
    for event in &report.events {
        println!("{}", format_event(event));
    }
    for failure in &report.failures {
        eprintln!("{} {}", "error:".red().bold(), failure);
    }
}

fn format_event(event: &MarkerEvent) -> String {
    format!(
        "{} {} in {}",
        colored_action(event.action),
        event.marker_name,
        event.path.display()
    )
}

fn colored_action(action: MarkerAction) -> ColoredString {
    match action {
        MarkerAction::Create => action.to_string().green(),
        MarkerAction::Delete => action.to_string().yellow(),
    }
}
