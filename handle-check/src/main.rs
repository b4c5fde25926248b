//! Handle Check CLI Application
//!
//! A command-line interface for checking whether a username or domain name
//! is still free across social networks, content sites and DNS.
//! This CLI application provides a user-friendly interface to the handle-check-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use futures::StreamExt;
use handle_check_lib::probes::ProbeStrategy;
use handle_check_lib::{
    load_env_config, parse_timeout_string, Availability, AvailabilityChecker, CheckConfig,
    CheckResponse, ConfigManager, Credentials, FileConfig, PlatformGroup, PlatformId,
    PlatformRegistry, ProbeRequest,
};
use serde::Serialize;
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for handle-check
#[derive(Parser, Debug)]
#[command(name = "handle-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Check username and domain availability across platforms")]
#[command(
    long_about = "Check whether a username or domain name is still free on social networks, content sites and DNS.\n\nEvery platform answers available, taken or unknown. Unknown results carry an error code and are safe to re-check."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Names to check
    #[arg(value_name = "NAMES", help_heading = "Selection")]
    pub names: Vec<String>,

    /// Platforms to check (comma-separated or multiple -p flags)
    #[arg(short = 'p', long = "platform", value_name = "ID", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Selection")]
    pub platforms: Option<Vec<String>>,

    /// Check every platform in a group (use --list-platforms to see all)
    #[arg(long = "group", value_name = "NAME", action = clap::ArgAction::Append, help_heading = "Selection")]
    pub groups: Option<Vec<String>>,

    /// Check every registered platform
    #[arg(long = "all", help_heading = "Selection")]
    pub all_platforms: bool,

    /// TLD for domain checks on the 'web' platform (e.g. dev or .dev)
    #[arg(short = 't', long = "tld", value_name = "TLD", help_heading = "Selection")]
    pub tld: Option<String>,

    /// List all platforms and groups, then exit
    #[arg(long = "list-platforms", help_heading = "Selection")]
    pub list_platforms: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Enable grouped, structured output with section headers
    #[arg(long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// Per-probe timeout (e.g. 500ms, 5s, 2m)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Max platforms probed at once (default: 10, max: 100)
    #[arg(short = 'c', long = "concurrency", value_name = "N", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information and error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// One verdict as shown to the user.
#[derive(Debug, Clone)]
pub(crate) struct CheckRow {
    pub(crate) platform: PlatformId,
    pub(crate) name: String,
    pub(crate) availability: Availability,
    pub(crate) profile_url: Option<String>,
}

/// JSON output element: `{platform, name, available | error}`.
#[derive(Serialize)]
struct JsonRow<'a> {
    platform: &'a str,
    name: &'a str,
    #[serde(flatten)]
    verdict: CheckResponse,
}

impl<'a> From<&'a CheckRow> for JsonRow<'a> {
    fn from(row: &'a CheckRow) -> Self {
        Self {
            platform: row.platform.as_str(),
            name: &row.name,
            verdict: row.availability.into(),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if args.list_platforms {
        print_platforms(&PlatformRegistry::builtin());
        return;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "handle-check starting");

    if let Err(e) = run_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let default_filter = if args.debug {
        "warn,handle_check=debug,handle_check_lib=debug"
    } else if args.verbose {
        "warn,handle_check=info,handle_check_lib=info"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // --list-platforms is self-contained, skip other validation
    if args.list_platforms {
        return Ok(());
    }

    if args.names.is_empty() {
        return Err("You must specify at least one name to check".to_string());
    }

    if args.json && args.pretty {
        return Err("Cannot specify both --json and --pretty".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use a format like '500ms', '5s', '2m'",
                timeout
            ));
        }
    }

    let selectors = [args.platforms.is_some(), args.groups.is_some(), args.all_platforms]
        .iter()
        .filter(|&&x| x)
        .count();
    if selectors > 1 {
        return Err(
            "Cannot combine platform selectors. Use only one of: -p/--platform, --group, or --all"
                .to_string(),
        );
    }

    Ok(())
}

/// Print all platforms grouped, then exit.
fn print_platforms(registry: &PlatformRegistry) {
    use console::Style;

    let heading = Style::new().yellow().bold();
    let name_style = Style::new().green().bold();
    let count_style = Style::new().cyan();

    println!();
    println!("{}", heading.apply_to("Available Platforms:"));
    println!();

    for group in registry.groups() {
        let ids = registry.group_platforms(group.as_str()).unwrap_or_default();
        let list: Vec<&str> = ids.iter().map(PlatformId::as_str).collect();
        println!(
            "  {} {}  {}",
            name_style.apply_to(format!("{:<14}", group.as_str())),
            count_style.apply_to(format!("({})", ids.len())),
            list.join(", "),
        );
    }

    let ungrouped: Vec<&str> = registry
        .entries()
        .into_iter()
        .filter(|e| e.group.is_none())
        .map(|e| e.id.as_str())
        .collect();
    if !ungrouped.is_empty() {
        println!(
            "  {} {}  {}",
            name_style.apply_to(format!("{:<14}", "other")),
            count_style.apply_to(format!("({})", ungrouped.len())),
            ungrouped.join(", "),
        );
    }

    println!();
    println!("Use: handle-check <name> --group <group>");
    println!("     handle-check <name> --platform web --tld <tld>");
}

/// Main checking logic
async fn run_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, credentials) = build_config(&args)?;
    let platforms = select_platforms(&args, &PlatformRegistry::builtin())?;

    let checker = AvailabilityChecker::with_config(config, credentials)?;
    let concurrency = checker.config().concurrency;

    let mut rows = Vec::new();
    for name in &args.names {
        let mut request = ProbeRequest::new(name.as_str());
        if let Some(tld) = &args.tld {
            request = request.with_tld(tld.as_str());
        }

        let started = Instant::now();
        let name_rows = if args.json {
            run_batch(&checker, &platforms, &request).await
        } else if args.pretty {
            ui::print_header(name, platforms.len(), concurrency);
            let spinner = ui::Spinner::start(name, platforms.len());
            let name_rows = run_batch(&checker, &platforms, &request).await;
            spinner.stop().await;
            ui::print_grouped_results(&name_rows, args.debug);
            name_rows
        } else {
            run_streaming(&checker, &platforms, &request, args.debug).await
        };

        if !args.json && name_rows.len() > 1 {
            println!();
            ui::print_summary(&name_rows, started.elapsed());
            println!();
        }
        rows.extend(name_rows);
    }

    if args.json {
        let json: Vec<JsonRow<'_>> = rows.iter().map(JsonRow::from).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    Ok(())
}

/// Check all platforms, keeping the selection order.
async fn run_batch(
    checker: &AvailabilityChecker,
    platforms: &[PlatformId],
    request: &ProbeRequest,
) -> Vec<CheckRow> {
    checker
        .check_platforms(platforms, request)
        .await
        .into_iter()
        .map(|(platform, availability)| to_row(checker.registry(), platform, request, availability))
        .collect()
}

/// Check all platforms, printing each verdict as soon as it arrives.
async fn run_streaming(
    checker: &AvailabilityChecker,
    platforms: &[PlatformId],
    request: &ProbeRequest,
    debug: bool,
) -> Vec<CheckRow> {
    let total = platforms.len();
    let mut rows = Vec::with_capacity(total);
    let mut stream = checker.check_platforms_stream(platforms, request);

    while let Some((platform, availability)) = stream.next().await {
        let row = to_row(checker.registry(), platform, request, availability);
        ui::print_result(&row, debug, Some((rows.len() + 1, total)));
        rows.push(row);
    }
    rows
}

/// Build the display row. The name shown is the one the platform was probed
/// with, so `--tld` only shows up on platforms that take a TLD.
fn to_row(
    registry: &PlatformRegistry,
    platform: PlatformId,
    request: &ProbeRequest,
    availability: Availability,
) -> CheckRow {
    let takes_tld = registry
        .get(platform.as_str())
        .is_some_and(|entry| entry.strategy.requires_tld());
    let identifier = request.candidate(takes_tld);
    CheckRow {
        profile_url: registry.profile_url(platform.as_str(), &identifier),
        platform,
        name: identifier,
        availability,
    }
}

/// Resolve which platforms to probe.
///
/// Unknown `--platform` ids are passed through; the checker reports them as
/// `UnknownPlatform` like any other caller would see.
fn select_platforms(
    args: &Args,
    registry: &PlatformRegistry,
) -> Result<Vec<PlatformId>, Box<dyn std::error::Error>> {
    if let Some(platforms) = &args.platforms {
        return Ok(platforms
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(PlatformId::from)
            .collect());
    }

    if let Some(groups) = &args.groups {
        let mut ids = Vec::new();
        for group in groups {
            let members = registry.group_platforms(group).ok_or_else(|| {
                let known: Vec<&str> = registry.groups().iter().map(|g| g.as_str()).collect();
                format!("Unknown group '{}'. Known groups: {}", group, known.join(", "))
            })?;
            for id in members {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        return Ok(ids);
    }

    let wants_web = args.tld.is_some();
    let ids = registry
        .entries()
        .into_iter()
        .filter(|entry| {
            if args.all_platforms {
                // 'web' needs a TLD to mean anything
                !entry.strategy.requires_tld() || wants_web
            } else {
                entry.group.is_some_and(|g| g != PlatformGroup::DomainNames)
            }
        })
        .map(|entry| entry.id.clone())
        .collect();
    Ok(ids)
}

/// Build the checker configuration.
///
/// Precedence, lowest first: defaults, config file, `HC_*` environment, CLI flags.
fn build_config(args: &Args) -> Result<(CheckConfig, Credentials), Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new();

    let file_config = if let Some(explicit_config_path) = &args.config {
        tracing::info!(path = %explicit_config_path, "using explicit config file");
        config_manager
            .load_file(explicit_config_path)
            .map_err(|e| {
                format!(
                    "Failed to load config file '{}': {}",
                    explicit_config_path, e
                )
            })?
    } else {
        config_manager.discover_and_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config discovery failed, using defaults");
            FileConfig::default()
        })
    };

    let env_config = load_env_config();

    let mut config = file_config.apply_to(CheckConfig::default());
    config = env_config.apply_to(config);
    config = apply_cli_args_to_config(config, args);

    let credentials = file_config.credentials().merge(env_config.credentials());
    tracing::debug!(
        timeout_ms = config.timeout.as_millis() as u64,
        concurrency = config.concurrency,
        credentials = ?credentials.configured_platforms(),
        "resolved configuration"
    );

    Ok((config, credentials))
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(mut config: CheckConfig, args: &Args) -> CheckConfig {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout_string) {
        config = config.with_timeout(timeout);
    }
    config
}
