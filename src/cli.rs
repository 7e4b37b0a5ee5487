//! Command-line interface

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::models::{PageKind, PageSnapshot, Thread};
use crate::presentation::Presenter;
use crate::session::{LoadSummary, ThreadFilter};
use crate::store::KeyValueStore;

#[derive(Parser, Debug)]
#[command(name = "thread-filter")]
#[command(version = "0.2.0")]
#[command(about = "Classify and reorder forum thread lists", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to the store file (overrides store.path from the config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a scraped thread list and print the resulting order
    Classify {
        /// JSON file with the scraped page rows
        #[arg(long)]
        rows: PathBuf,

        /// Override the page kind recorded in the rows file
        #[arg(long, value_enum)]
        page: Option<PageArg>,
    },

    /// Toggle a thread's favorite status
    Favorite {
        /// Thread id
        id: u64,
    },

    /// Toggle a thread's manual hide status
    Hide {
        /// Thread id
        id: u64,
    },

    /// Classify a thread list, then apply a quick filter query
    Filter {
        /// JSON file with the scraped page rows
        #[arg(long)]
        rows: PathBuf,

        /// Text to look for in thread titles
        query: String,
    },

    /// Set a preference
    Set {
        /// Preference key, e.g. HIDDEN_USERS
        key: String,
        value: String,
    },

    /// Print a preference
    Get {
        /// Preference key, e.g. HIDDEN_USERS
        key: String,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// List pages accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageArg {
    Forumdisplay,
    Search,
}

impl From<PageArg> for PageKind {
    fn from(page: PageArg) -> Self {
        match page {
            PageArg::Forumdisplay => PageKind::ForumDisplay,
            PageArg::Search => PageKind::Search,
        }
    }
}

/// Read a scraped page from a JSON file
pub async fn load_snapshot(path: &Path) -> Result<PageSnapshot> {
    let json = tokio::fs::read_to_string(path).await?;
    let snapshot: PageSnapshot = serde_json::from_str(&json)?;
    info!("Read {} rows from {:?}", snapshot.rows.len(), path);
    Ok(snapshot)
}

/// Truncate a string to max_len characters, adding "..." if truncated
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len.saturating_sub(3)).collect::<String>())
    }
}

/// Plain-text summary of a classified page
pub struct Report {
    pub page: PageKind,
    pub summary: LoadSummary,
    /// Main list rows, top to bottom
    pub main: Vec<ReportRow>,
    /// Hidden sublist rows, in arrival order
    pub hidden: Vec<ReportRow>,
}

pub struct ReportRow {
    pub id: u64,
    pub flags: String,
    pub title: String,
    pub creator: String,
}

impl ReportRow {
    fn from_thread(thread: &Thread) -> Self {
        let mut flags = String::new();
        flags.push(if thread.is_favorite { '*' } else { ' ' });
        flags.push(if thread.is_highlighted { '!' } else { ' ' });
        flags.push(if thread.is_hidden_by_user {
            'U'
        } else if thread.is_hidden_by_keywords {
            'K'
        } else if thread.is_hidden {
            'H'
        } else {
            ' '
        });
        flags.push(if thread.is_read { 'r' } else { ' ' });

        Self {
            id: thread.id,
            flags,
            title: thread.original_title.clone(),
            creator: thread.creator.clone(),
        }
    }
}

impl Report {
    /// Collect the visible rows of a loaded page, in display order
    pub fn from_filter<S: KeyValueStore, P: Presenter>(filter: &ThreadFilter<S, P>, summary: LoadSummary) -> Self {
        let rows = |ids: &[u64]| {
            ids.iter()
                .filter_map(|id| filter.thread(*id))
                .filter(|t| t.is_hidden || t.is_visible())
                .map(ReportRow::from_thread)
                .collect::<Vec<_>>()
        };

        Self {
            page: filter.page(),
            summary,
            main: rows(&filter.orderer().order()),
            hidden: rows(filter.orderer().hidden()),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:?}: {} threads, {} favorites, {} highlighted, {} hidden, {} read\n",
            self.page,
            self.summary.threads,
            self.summary.favorites,
            self.summary.highlighted,
            self.summary.hidden,
            self.summary.read
        ));
        if self.summary.skipped_rows > 0 {
            out.push_str(&format!("Skipped {} malformed rows\n", self.summary.skipped_rows));
        }
        if self.summary.disabled_rules > 0 {
            out.push_str(&format!(
                "{} rule(s) disabled, check the preferences\n",
                self.summary.disabled_rules
            ));
        }

        out.push('\n');
        for row in &self.main {
            out.push_str(&Self::format_row(row));
        }

        if !self.hidden.is_empty() {
            out.push_str(&format!("\nHidden threads ({})\n", self.hidden.len()));
            for row in &self.hidden {
                out.push_str(&Self::format_row(row));
            }
        }
        out
    }

    fn format_row(row: &ReportRow) -> String {
        format!(
            "  [{}] {:>8}  {:<60}  {}\n",
            row.flags,
            row.id,
            truncate_string(&row.title, 60),
            row.creator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a long thread title", 10), "a long ...");
        assert_eq!(truncate_string("¡Atención!", 10), "¡Atención!");
    }

    #[test]
    fn test_page_arg_conversion() {
        assert_eq!(PageKind::from(PageArg::Forumdisplay), PageKind::ForumDisplay);
        assert_eq!(PageKind::from(PageArg::Search), PageKind::Search);
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::parse_from(["thread-filter", "--store", "s.json", "hide", "42"]);
        assert_eq!(cli.store, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Commands::Hide { id: 42 }));

        let cli = Cli::parse_from([
            "thread-filter",
            "classify",
            "--rows",
            "rows.json",
            "--page",
            "search",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Classify {
                page: Some(PageArg::Search),
                ..
            }
        ));
    }

    #[test]
    fn test_row_flags() {
        let mut thread = Thread::new(7, "Oferta", "bob", 0);
        thread.is_favorite = true;
        thread.is_read = true;
        assert_eq!(ReportRow::from_thread(&thread).flags, "*  r");

        let mut hidden = Thread::new(8, "Spam", "troll", 1);
        hidden.is_hidden = true;
        hidden.is_hidden_by_user = true;
        assert_eq!(ReportRow::from_thread(&hidden).flags, "  U ");
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let file = tempfile::NamedTempFile::new().unwrap();
        tokio::fs::write(
            file.path(),
            r#"{"page":"search","rows":[{"id":1,"title":"Hola","creator":"ana"}]}"#,
        )
        .await
        .unwrap();

        let snapshot = load_snapshot(file.path()).await.unwrap();
        assert_eq!(snapshot.page, PageKind::Search);
        assert_eq!(snapshot.rows.len(), 1);
        assert!(snapshot.separator_index.is_none());
    }

    #[tokio::test]
    async fn test_load_snapshot_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_snapshot(&dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(FilterError::IoError(_))));
    }
}
