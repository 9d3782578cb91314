//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "notekeep", version, about = "Create, edit and delete notes on a notes REST backend")]
pub struct Cli {
    /// TOML config file (base_url, timeout_ms, log_level, log_dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend root URL; overrides config and NOTEKEEP_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Run against a seeded in-process backend instead of the network
    #[arg(long, global = true)]
    pub offline_demo: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all notes
    List,
    /// Show one note
    Show { id: String },
    /// Create a note
    Add(NoteArgs),
    /// Edit a note; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: NoteArgs,
    },
    /// Delete a note
    Delete { id: String },
}

/// Editable note fields.
#[derive(Args, Debug, Clone, Default)]
pub struct NoteArgs {
    #[arg(long, short)]
    pub title: Option<String>,

    /// High, Medium or Low
    #[arg(long, short)]
    pub priority: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,
}

impl NoteArgs {
    /// Supplied fields as `(form field, value)` pairs.
    pub fn supplied(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", self.title.as_deref()),
            ("priority", self.priority.as_deref()),
            ("description", self.description.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn edit_keeps_only_supplied_fields() {
        let cli = Cli::try_parse_from(["notekeep", "edit", "42", "--title", "Renamed"]).unwrap();
        let Command::Edit { id, fields } = cli.command else {
            panic!("expected edit command");
        };
        assert_eq!(id, "42");
        assert_eq!(fields.supplied(), vec![("title", "Renamed")]);
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["notekeep", "list", "--offline-demo", "--log-level", "warn"])
            .unwrap();
        assert!(cli.offline_demo);
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        assert!(matches!(cli.command, Command::List));
    }
}
