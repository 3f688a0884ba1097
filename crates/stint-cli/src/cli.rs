//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::IdArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::list::ListArgs;
use crate::commands::modify::ModifyArgs;
use crate::commands::query::QueryArgs;
use crate::commands::report::ReportArgs;
use crate::commands::start::StartArgs;
use crate::commands::unset::UnsetArgs;

/// Terminal time tracker.
///
/// Start, pause, resume and stop time entries, then report on them.
#[derive(Debug, Parser)]
#[command(name = "stint", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new running entry.
    Start(StartArgs),

    /// Pause a running entry.
    Pause(IdArgs),

    /// Resume a paused entry.
    Resume(IdArgs),

    /// Stop a running or paused entry.
    Stop(IdArgs),

    /// Change fields, status or stopwatch intervals of an entry.
    #[command(visible_alias = "mod")]
    Modify(ModifyArgs),

    /// Clear the tags or project of an entry.
    Unset(UnsetArgs),

    /// Edit the notes of an entry in an external editor.
    Notes(IdArgs),

    /// Delete an entry.
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Show every field of an entry.
    Info(IdArgs),

    /// List running and paused entries.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Time report for a window or search term.
    #[command(visible_alias = "rp")]
    Report(ReportArgs),

    /// Print matching entries for scripts.
    Query(QueryArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn aliases_parse() {
        let cli = Cli::try_parse_from(["stint", "rm", "ab12", "--force"]).unwrap();
        match cli.command {
            Some(Commands::Delete(args)) => {
                assert_eq!(args.alias, "ab12");
                assert!(args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["stint", "mod", "ab12", "--del-time", "2"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Modify(args)) if args.del_time == [2]));
    }

    #[test]
    fn start_joins_words() {
        let cli =
            Cli::try_parse_from(["stint", "start", "write", "docs", "-p", "apollo"]).unwrap();
        let Some(Commands::Start(args)) = cli.command else {
            panic!("expected start");
        };
        assert_eq!(args.description, ["write", "docs"]);
        assert_eq!(args.project.as_deref(), Some("apollo"));
    }

    #[test]
    fn query_accepts_json_with_limit() {
        let cli =
            Cli::try_parse_from(["stint", "query", "any", "--json", "--limit", "alias"]).unwrap();
        let Some(Commands::Query(args)) = cli.command else {
            panic!("expected query");
        };
        assert!(args.json);
        assert_eq!(args.limit.as_deref(), Some("alias"));
    }

    #[test]
    fn report_requires_a_term() {
        assert!(Cli::try_parse_from(["stint", "report"]).is_err());
    }
}
