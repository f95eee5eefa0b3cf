use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hunkr::config::{self, HunkrConfig};
use hunkr::hunks::{
    diff_to_hunk_headers, extract_all_groups, get_line_locks, line_ids_to_hunk_headers,
    order_headers, parse_diff, parse_file_sections, Action, Hunk, HunkHeader, HunkLock, LineGroup,
    LineId, LineLock, LocalFile,
};
use hunkr::logging;
use hunkr::selection::{build_diff_spec, DiffSpec, FileSelection};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Resolve selected diff lines into hunk headers for partial commit and discard
#[derive(Parser)]
#[command(name = "hunkr", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print compact JSON regardless of config
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Group the changed lines of a single hunk
    Groups {
        /// Hunk text, `-` for stdin
        #[arg(default_value = "-")]
        diff: PathBuf,
    },
    /// Hunk headers for selected lines, or for every change when no line is given
    Headers {
        /// Hunk text, `-` for stdin
        #[arg(default_value = "-")]
        diff: PathBuf,
        /// Selected line: -N (removed), +N (added) or N:M
        #[arg(long = "line", allow_hyphen_values = true)]
        lines: Vec<LineId>,
        /// commit or discard (defaults to the configured action)
        #[arg(long)]
        action: Option<Action>,
        /// Order headers by position in the file
        #[arg(long)]
        sort: bool,
    },
    /// Attribute locks from other stacks to the changed lines of a hunk
    Locks {
        /// Hunk text, `-` for stdin
        #[arg(default_value = "-")]
        diff: PathBuf,
        /// JSON array of {hunk, locks} entries
        #[arg(long)]
        locks: PathBuf,
    },
    /// Interleave a file's hunks with its unchanged content
    Sections {
        /// `git diff` output for the file, `-` for stdin
        diff: PathBuf,
        /// File content the context lines are read from
        #[arg(long)]
        content: PathBuf,
    },
    /// Build commit payloads from per-file selections
    Spec {
        /// `git diff` output, `-` for stdin
        diff: PathBuf,
        /// JSON array of {path, hunks: [{header, lines, diffHash}]}
        #[arg(long)]
        selection: PathBuf,
    },
    /// Print the effective configuration
    Config {
        /// Write it to the global config file and print that file's path
        #[arg(long)]
        save: bool,
    },
}

#[derive(Serialize)]
struct GroupsOutput {
    groups: Vec<LineGroup>,
    header: HunkHeader,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocksOutput {
    fully_locked: bool,
    line_locks: Vec<LineLock>,
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_input(path)?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn headers(diff: &str, lines: &[LineId], action: Action, sort: bool) -> Vec<HunkHeader> {
    let mut headers = if lines.is_empty() {
        diff_to_hunk_headers(diff, action)
    } else {
        line_ids_to_hunk_headers(lines, diff, action)
    };
    if sort {
        headers.sort_by(order_headers);
    }
    headers
}

fn sections(raw: &str, content: String) -> LocalFile {
    let file = parse_diff(raw).into_iter().next();
    let (path, hunks) = file.map(|f| (f.path, f.hunks)).unwrap_or_default();
    LocalFile {
        path,
        hunks,
        content,
    }
}

fn specs(raw: &str, selections: &[FileSelection]) -> Vec<DiffSpec> {
    let files = parse_diff(raw);
    selections
        .iter()
        .filter_map(|selection| {
            let file = files.iter().find(|f| f.path == selection.path);
            if file.is_none() {
                tracing::warn!(path = %selection.path, "selected file is not in the diff, skipping");
            }
            file.map(|f| build_diff_spec(f, &selection.hunks))
        })
        .collect()
}

fn run(cli: Cli, config: &HunkrConfig) -> Result<()> {
    let pretty = config.output.pretty && !cli.compact;

    match cli.command {
        Command::Groups { diff } => {
            let diff = read_input(&diff)?;
            let (groups, header) = extract_all_groups(&diff);
            print_json(&GroupsOutput { groups, header }, pretty)
        }
        Command::Headers {
            diff,
            lines,
            action,
            sort,
        } => {
            let diff = read_input(&diff)?;
            let action = action.unwrap_or(config.headers.action);
            let sort = sort || config.headers.sort;
            tracing::debug!(%action, selected = lines.len(), "resolving hunk headers");
            print_json(&headers(&diff, &lines, action, sort), pretty)
        }
        Command::Locks { diff, locks } => {
            let hunk = Hunk::from_diff(read_input(&diff)?);
            let hunk_locks: Vec<HunkLock> = read_json(&locks)?;
            let (fully_locked, line_locks) = get_line_locks(&hunk, &hunk_locks);
            print_json(
                &LocksOutput {
                    fully_locked,
                    line_locks,
                },
                pretty,
            )
        }
        Command::Sections { diff, content } => {
            let raw = read_input(&diff)?;
            let content = std::fs::read_to_string(&content)
                .with_context(|| format!("Failed to read {}", content.display()))?;
            print_json(&parse_file_sections(&sections(&raw, content)), pretty)
        }
        Command::Spec { diff, selection } => {
            let raw = read_input(&diff)?;
            let selections: Vec<FileSelection> = read_json(&selection)?;
            print_json(&specs(&raw, &selections), pretty)
        }
        Command::Config { save: false } => print_json(config, pretty),
        Command::Config { save: true } => {
            let path = config::save_config(config)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let config = config::load_config(&cwd);
    logging::init(&config.log.level);

    run(cli, &config)
}
