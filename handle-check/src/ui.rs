//! Terminal display logic for the handle-check CLI.
//!
//! Colored result lines, grouped output, spinner and summaries. Uses only
//! the `console` crate.

use console::{pad_str, style, Alignment, Term};
use handle_check_lib::{Availability, ErrorCode};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

use crate::CheckRow;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Braille-dot progress line on stderr while a batch check runs.
///
/// Shows the candidate being checked and the elapsed time. stdout stays clean.
pub struct Spinner {
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl Spinner {
    pub fn start(name: &str, platform_count: usize) -> Self {
        let (stop, mut stopped) = oneshot::channel();
        let label = spinner_label(name, platform_count);

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let started = Instant::now();
            let mut ticks = tokio::time::interval(Duration::from_millis(80));

            for frame in SPINNER_FRAMES.iter().cycle() {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticks.tick() => {
                        let _ = term.clear_line();
                        let _ = term.write_str(&format!(
                            "{} {} {}",
                            style(frame).cyan(),
                            label,
                            style(format!("{:.1}s", started.elapsed().as_secs_f64())).dim(),
                        ));
                    }
                }
            }
            let _ = term.clear_line();
        });

        Self {
            stop: Some(stop),
            handle,
        }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = self.handle.await;
    }
}

fn spinner_label(name: &str, platform_count: usize) -> String {
    format!(
        "Checking '{}' on {} platform{}...",
        name,
        platform_count,
        if platform_count == 1 { "" } else { "s" }
    )
}

// ── Header ───────────────────────────────────────────────────────────────────

pub fn print_header(name: &str, platform_count: usize, concurrency: usize) {
    println!(
        "{} {} {}",
        style("handle-check").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "· '{}' on {} platform{}",
            name,
            platform_count,
            if platform_count == 1 { "" } else { "s" }
        ))
        .dim(),
    );
    println!("{}", style(format!("Concurrency: {}", concurrency)).dim());
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Print one platform verdict.
///
/// If `counter` is Some((current, total)), a progress prefix like `[3/8]` is shown.
pub fn print_result(row: &CheckRow, debug: bool, counter: Option<(usize, usize)>) {
    let padded = pad_str(row.platform.as_str(), 14, Alignment::Left, Some(".."));

    let prefix = match counter {
        Some((cur, total)) => format!("{} ", style(format!("[{}/{}]", cur, total)).dim()),
        None => String::new(),
    };

    match row.availability {
        Availability::Available => println!(
            "  {}{}  {}",
            prefix,
            style(&padded).white(),
            style("AVAILABLE").green().bold(),
        ),
        Availability::Unavailable => {
            let link = row
                .profile_url
                .as_deref()
                .map(|url| format!("  {}", style(url).dim()))
                .unwrap_or_default();
            println!(
                "  {}{}  {}{}",
                prefix,
                style(&padded).white(),
                style("TAKEN").red().bold(),
                link,
            );
        }
        Availability::Error { code } => println!(
            "  {}{}  {}  {}",
            prefix,
            style(&padded).white(),
            style("UNKNOWN").yellow(),
            style(brief_error(code)).dim(),
        ),
    }

    if debug {
        println!(
            "    {} {} {}",
            style("└─").dim(),
            row.name,
            serde_json::to_string(&row.availability).unwrap_or_default(),
        );
    }
}

// ── Grouped output ───────────────────────────────────────────────────────────

/// Print results grouped by status: Available, Taken, Unknown.
/// Empty sections are omitted entirely.
pub fn print_grouped_results(rows: &[CheckRow], debug: bool) {
    let sections = [
        ("Available", rows.iter().filter(|r| r.availability == Availability::Available).collect::<Vec<_>>()),
        ("Taken", rows.iter().filter(|r| r.availability == Availability::Unavailable).collect()),
        ("Unknown", rows.iter().filter(|r| r.availability.is_error()).collect()),
    ];

    for (title, members) in sections {
        if members.is_empty() {
            continue;
        }
        let heading = format!("── {} ({}) ", title, members.len());
        let rule = "─".repeat(50usize.saturating_sub(heading.chars().count()));
        let heading = match title {
            "Available" => style(heading).green().bold(),
            "Taken" => style(heading).red().bold(),
            _ => style(heading).yellow().bold(),
        };
        println!("  {} {}", heading, style(rule).dim());
        for row in members {
            print_result(row, debug, None);
        }
        println!();
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(rows: &[CheckRow], duration: Duration) {
    let available = rows
        .iter()
        .filter(|r| r.availability == Availability::Available)
        .count();
    let taken = rows
        .iter()
        .filter(|r| r.availability == Availability::Unavailable)
        .count();
    let unknown = rows.iter().filter(|r| r.availability.is_error()).count();

    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} platform{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(rows.len()).bold(),
        if rows.len() == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", available)).green(),
        style("|").dim(),
        style(format!("{} taken", taken)).red(),
        style("|").dim(),
        style(format!("{} unknown", unknown)).yellow(),
    );
}

/// Short reason shown next to an UNKNOWN verdict.
fn brief_error(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidInput => "(invalid name)",
        ErrorCode::UnknownPlatform => "(unknown platform)",
        ErrorCode::AuthFailure => "(credentials missing or rejected)",
        ErrorCode::TransportFailure => "(network error)",
        ErrorCode::Timeout => "(timeout)",
        ErrorCode::UnexpectedResponse => "(unrecognized response)",
    }
}
