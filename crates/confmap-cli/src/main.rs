//! confmap: inspect TOML config files and merge them with a default file.
//!
//! The binary works on plain value trees, so it needs no config type: it
//! shows what a file holds after parsing, looks up one dotted key, or fills
//! the keys a user file lacks from a defaults file.
//!
//! # Usage
//!
//! ```text
//! confmap show  <FILE>
//! confmap get   <FILE> <KEY>
//! confmap merge <FILE> --defaults <DEFAULTS> [--output <PATH>]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable           | Default | Description                             |
//! |--------------------|---------|-----------------------------------------|
//! | `RUST_LOG`         | `warn`  | Log filter for diagnostics on stderr    |
//! | `CONFMAP_DEFAULTS` | (none)  | Default file for `merge`                |

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use confmap_core::mapping::merge_defaults;
use confmap_core::{Table, Value};
use confmap_toml::{parse, render_value, table_to_string, FileStore, LocalFileStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "confmap",
    about = "Inspect TOML config files and merge them with defaults",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints a file in normalized form: assignments first, then tables.
    Show {
        file: PathBuf,
    },

    /// Prints the value at a dotted key such as `server.port`.
    ///
    /// Scalars print as TOML literals; tables print as a TOML document.
    Get {
        file: PathBuf,
        key: String,
    },

    /// Fills every key missing from FILE with the value from DEFAULTS.
    ///
    /// Keys present in FILE always win.  Tables present on both sides are
    /// merged recursively.
    Merge {
        file: PathBuf,

        #[arg(long, env = "CONFMAP_DEFAULTS")]
        defaults: PathBuf,

        /// Writes the result here instead of stdout.  Parent directories are
        /// created as needed.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn read_table(store: &dyn FileStore, path: &Path) -> anyhow::Result<Table> {
    let bytes = store
        .read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
    let table = parse(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(path = %path.display(), keys = table.len(), "parsed file");
    Ok(table)
}

fn show(store: &dyn FileStore, file: &Path) -> anyhow::Result<String> {
    let table = read_table(store, file)?;
    Ok(table_to_string(&table)?)
}

fn get(store: &dyn FileStore, file: &Path, key: &str) -> anyhow::Result<String> {
    let root = Value::Table(read_table(store, file)?);
    let Some(value) = root.lookup(key) else {
        bail!("key `{key}` not found in {}", file.display());
    };
    let rendered = match value {
        Value::Table(inner) => table_to_string(inner)?,
        other => format!("{}\n", render_value(other, key)?),
    };
    Ok(rendered)
}

fn merge(store: &dyn FileStore, file: &Path, defaults: &Path) -> anyhow::Result<String> {
    let mut table = read_table(store, file)?;
    let default_table = read_table(store, defaults)?;
    let before = table.len();
    merge_defaults(&mut table, &default_table);
    info!(
        file = %file.display(),
        defaults = %defaults.display(),
        added = table.len() - before,
        "merged defaults"
    );
    Ok(table_to_string(&table)?)
}

fn write_output(store: &dyn FileStore, path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        store
            .create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    store
        .write(path, text.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = text.len(), "wrote merged config");
    Ok(())
}

/// Runs one command and returns what should go to stdout.
fn run(cli: Cli, store: &dyn FileStore) -> anyhow::Result<String> {
    match cli.command {
        Command::Show { file } => show(store, &file),
        Command::Get { file, key } => get(store, &file, &key),
        Command::Merge {
            file,
            defaults,
            output,
        } => {
            let text = merge(store, &file, &defaults)?;
            match output {
                Some(path) => {
                    write_output(store, &path, &text)?;
                    Ok(String::new())
                }
                None => Ok(text),
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so stdout stays a clean TOML document.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    let output = run(cli, &LocalFileStore)?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
