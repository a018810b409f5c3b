//! FindView CLI
//!
//! Launches the search panel by default; `search` runs the same query
//! builder and runner from the terminal.

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use findview::query::{
    Comparison, NamePattern, Permissions, SizeFilter, SizeUnit, TimeFilter, TimeKind, TypeFilter,
};
use findview::{
    format_size, format_timestamp, logging, AccountDirectory, AppConfig, FsMetadata, SearchController,
    SearchCriteria, SearchOutcome, SystemRunner,
};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// FindView - search panel for the find utility
#[derive(Parser)]
#[command(name = "findview")]
#[command(author = "FindView Contributors")]
#[command(version)]
#[command(about = "Search panel for the find utility", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: logging::LogLevel,

    /// Program used to search
    #[arg(long, global = true, default_value = "find")]
    find_program: String,

    /// Privilege helper for --root searches
    #[arg(long, global = true, default_value = "pkexec")]
    elevate_program: String,

    /// Maximum rows materialized per search
    #[arg(long, global = true, default_value = "2000")]
    max_rows: usize,

    /// Kill searches running longer than this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the search panel (default)
    Gui {
        /// Directory to preselect
        directory: Option<PathBuf>,
    },

    /// Run a search and print the matches
    Search(SearchArgs),

    /// List system users usable with --user
    Users,

    /// List system groups usable with --group
    Groups,
}

#[derive(Args)]
struct SearchArgs {
    /// Directory to search in
    directory: PathBuf,

    /// Name pattern (shell glob, passed to -name)
    #[arg(short, long)]
    name: Option<String>,

    /// Match the name case-insensitively (-iname)
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Pass -invert through to the search program
    #[arg(long)]
    invert: bool,

    /// Only empty files and directories
    #[arg(long)]
    empty: bool,

    /// Entry type
    #[arg(short = 't', long = "type", value_enum, default_value = "any")]
    kind: KindArg,

    /// Time attribute compared with --minutes
    #[arg(long, value_enum, requires = "minutes")]
    time: Option<TimeArg>,

    /// Minutes since the time attribute, e.g. -30, 30, +30
    #[arg(long, allow_hyphen_values = true, value_parser = parse_minutes, requires = "time")]
    minutes: Option<(Comparison, u32)>,

    /// Size, e.g. +10M, -512k, 0c
    #[arg(long, allow_hyphen_values = true, value_parser = parse_size)]
    size: Option<SizeFilter>,

    #[arg(long)]
    readable: bool,

    #[arg(long)]
    writable: bool,

    #[arg(long)]
    executable: bool,

    /// Owner user name
    #[arg(long)]
    user: Option<String>,

    /// Owner group name
    #[arg(long)]
    group: Option<String>,

    /// Run through the privilege helper
    #[arg(long)]
    root: bool,

    /// Print entries as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Any,
    File,
    Dir,
    Link,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimeArg {
    Access,
    Modify,
    Change,
}

impl SearchArgs {
    fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            directory: self.directory.clone(),
            name: self.name.as_ref().map(|pattern| NamePattern {
                pattern: pattern.clone(),
                case_insensitive: self.ignore_case,
            }),
            invert: self.invert,
            empty_only: self.empty,
            kind: match self.kind {
                KindArg::Any => TypeFilter::Any,
                KindArg::File => TypeFilter::File,
                KindArg::Dir => TypeFilter::Directory,
                KindArg::Link => TypeFilter::Symlink,
            },
            time: self.time.zip(self.minutes).map(|(kind, (comparison, minutes))| TimeFilter {
                kind: match kind {
                    TimeArg::Access => TimeKind::Access,
                    TimeArg::Modify => TimeKind::Modify,
                    TimeArg::Change => TimeKind::Change,
                },
                comparison,
                minutes,
            }),
            permissions: Permissions {
                readable: self.readable,
                writable: self.writable,
                executable: self.executable,
            },
            size: self.size,
            owner: self.user.clone(),
            group: self.group.clone(),
            as_root: self.root,
        }
    }
}

/// Split a leading `-`/`+` into a comparison
fn split_comparison(s: &str) -> (Comparison, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (Comparison::Less, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (Comparison::Greater, rest)
    } else {
        (Comparison::Equal, s)
    }
}

fn parse_minutes(s: &str) -> Result<(Comparison, u32), String> {
    let (comparison, digits) = split_comparison(s.trim());
    let minutes = digits
        .parse::<u32>()
        .map_err(|_| format!("invalid minutes '{}'", s))?;
    Ok((comparison, minutes))
}

fn parse_size(s: &str) -> Result<SizeFilter, String> {
    let (comparison, rest) = split_comparison(s.trim());
    let (digits, unit) = match rest.chars().last() {
        Some('c') => (&rest[..rest.len() - 1], SizeUnit::Bytes),
        Some('k') => (&rest[..rest.len() - 1], SizeUnit::Kibibytes),
        Some('M') => (&rest[..rest.len() - 1], SizeUnit::Mebibytes),
        Some('G') => (&rest[..rest.len() - 1], SizeUnit::Gibibytes),
        _ => (rest, SizeUnit::Bytes),
    };
    let amount = digits
        .parse::<u64>()
        .map_err(|_| format!("invalid size '{}'", s))?;
    Ok(SizeFilter {
        comparison,
        amount,
        unit,
    })
}

fn main() {
    let cli = Cli::parse();

    logging::init(cli.log_level);
    logging::info("MAIN", &format!("FindView {} starting up", findview::VERSION));

    let config = AppConfig {
        find_program: cli.find_program,
        elevate_program: cli.elevate_program,
        max_rows: cli.max_rows,
        timeout: cli.timeout.map(Duration::from_secs),
        log_level: cli.log_level,
        ..Default::default()
    };

    let result = match cli.command {
        None => findview::gui::run(config),
        Some(Commands::Gui { directory }) => findview::gui::run(AppConfig {
            start_directory: directory,
            ..config
        }),
        Some(Commands::Search(args)) => cmd_search(&config, &args),
        Some(Commands::Users) => cmd_accounts(false),
        Some(Commands::Groups) => cmd_accounts(true),
    };

    logging::flush();

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Search command implementation
fn cmd_search(config: &AppConfig, args: &SearchArgs) -> findview::Result<()> {
    let criteria = args.criteria();

    if !args.json {
        println!(
            "{} Searching {}",
            style("→").cyan().bold(),
            style(criteria.describe()).yellow()
        );
    }

    let accounts = AccountDirectory::load().unwrap_or_else(|e| {
        logging::warn("MAIN", &format!("Could not read account databases: {}", e));
        AccountDirectory::default()
    });
    let mut search = SearchController::new(findview::search::SearchContext {
        program: config.find_program.clone(),
        max_rows: config.max_rows,
        runner: Arc::new(SystemRunner::from_config(config)),
        metadata: Arc::new(FsMetadata::new(accounts)),
    });

    search.start(&criteria)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Searching...");
    pb.enable_steady_tick(Duration::from_millis(100));
    let outcome = search.wait();
    pb.finish_and_clear();

    match outcome {
        Some(SearchOutcome::Completed {
            parsed,
            elapsed,
            warnings,
        }) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "criteria": criteria,
                        "total": parsed.total,
                        "entries": parsed.entries,
                        "warnings": warnings,
                    })
                );
                return Ok(());
            }

            println!();
            for entry in &parsed.entries {
                let size = entry.size.map(format_size).unwrap_or_else(|| "-".to_string());
                let modified = entry
                    .modified
                    .as_ref()
                    .map(format_timestamp)
                    .unwrap_or_else(|| "-".to_string());
                let icon = if entry.is_directory { "📁" } else { "📄" };
                println!(
                    "{} {} {} {}",
                    icon,
                    style(format!("{:>12}", size)).yellow(),
                    style(modified).dim(),
                    style(entry.path.display()).cyan()
                );
            }
            println!();
            println!(
                "{} {} files found in {}. Showing {} of them.",
                style("✓").green().bold(),
                style(parsed.total).green(),
                style(HumanDuration(elapsed)).cyan(),
                parsed.entries.len()
            );
            if !warnings.is_empty() {
                println!(
                    "  {} {} warnings from {} (see log)",
                    style("!").yellow().bold(),
                    warnings.len(),
                    config.find_program
                );
            }
            Ok(())
        }
        Some(SearchOutcome::Failed(e)) => Err(e),
        Some(SearchOutcome::Cancelled) | None => Err(findview::FindViewError::Cancelled),
    }
}

/// Users/groups command implementation
fn cmd_accounts(groups: bool) -> findview::Result<()> {
    let accounts = AccountDirectory::load()?;
    let names = if groups {
        accounts.group_list()
    } else {
        accounts.user_list()
    };
    for name in names {
        println!("  {} {}", style("•").green(), name);
    }
    Ok(())
}
