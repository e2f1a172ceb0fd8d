//! Command-line configuration.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};

/// File name of the SQLite database inside the data directory.
pub const SQLITE_FILE_NAME: &str = "bookmarks.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// One JSON file per slot.
    File,
    /// `kv_slots` table in a SQLite database.
    Sqlite,
}

#[derive(Debug, Parser)]
#[command(name = "bookmarks", version, about = "Manage personal bookmarks", long_about = None)]
pub struct BookmarksConfig {
    #[arg(
        long,
        value_enum,
        env = "BOOKMARKS_BACKEND",
        default_value_t = BackendKind::File,
        global = true
    )]
    pub backend: BackendKind,

    #[arg(long, env = "BOOKMARKS_DATA_DIR", default_value = "bookmarks-data", global = true)]
    pub data_dir: PathBuf,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "BOOKMARKS_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// File logging is off unless this is set.
    #[arg(long, env = "BOOKMARKS_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all bookmarks in stored order.
    List,
    /// Show every field of one bookmark.
    Show { id: String },
    /// Add a bookmark.
    Add(AddArgs),
    /// Edit fields of an existing bookmark.
    Edit(EditArgs),
    /// Delete a bookmark.
    Delete { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    /// Primary URL.
    #[arg(long)]
    pub url1: String,
    /// Secondary URL.
    #[arg(long)]
    pub url2: Option<String>,
    #[command(flatten)]
    pub icon: IconArgs,
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub url1: Option<String>,
    #[arg(long, conflicts_with = "clear_url2")]
    pub url2: Option<String>,
    #[arg(long)]
    pub clear_url2: bool,
    #[command(flatten)]
    pub icon: IconArgs,
    /// Drop the custom icon and fall back to the site favicon.
    #[arg(long, conflicts_with_all = ["icon_url", "icon_file"])]
    pub clear_icon: bool,
}

#[derive(Debug, Clone, Default, Args)]
#[group(multiple = false)]
pub struct IconArgs {
    /// Custom icon image URL.
    #[arg(long)]
    pub icon_url: Option<String>,
    /// Local image embedded inline as a data URL.
    #[arg(long)]
    pub icon_file: Option<PathBuf>,
}

impl BookmarksConfig {
    /// Logs the effective configuration once logging is up.
    pub fn log_summary(&self) {
        info!("Backend: [{:?}]", self.backend);
        info!("Data directory: [{}]", self.data_dir.display());
    }

    /// Log directory made absolute against the working directory.
    pub fn absolute_log_dir(&self) -> Option<PathBuf> {
        self.log_dir.as_deref().map(absolutize)
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_FILE_NAME)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
