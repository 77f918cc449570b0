//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::ReportStatus;

/// Internship management: companies, postings, applications, reports and workshops
#[derive(Parser, Debug)]
#[command(name = "internhub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Start with an empty store instead of the demo dataset
    #[arg(long, global = true)]
    pub no_seed: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate and show unread notifications
    Login {
        /// Username
        username: String,
        /// Password
        password: String,
    },

    /// List approved companies (or the pending review queue)
    Companies {
        /// Show companies awaiting review instead
        #[arg(long, conflicts_with_all = ["industry", "search"])]
        pending: bool,
        /// Only companies in this industry
        #[arg(long)]
        industry: Option<String>,
        /// Substring match on the company name
        #[arg(long)]
        search: Option<String>,
    },

    /// List internships visible to students (or the review queue)
    Internships {
        /// Show postings awaiting faculty or SCAD review instead
        #[arg(long, conflicts_with_all = ["industry", "paid", "unpaid", "duration", "search"])]
        pending: bool,
        /// Only postings by companies in this industry
        #[arg(long)]
        industry: Option<String>,
        /// Only paid postings
        #[arg(long, conflicts_with = "unpaid")]
        paid: bool,
        /// Only unpaid postings
        #[arg(long)]
        unpaid: bool,
        /// Only postings of this many months
        #[arg(long)]
        duration: Option<u32>,
        /// Substring match on title or company name
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a student's applications
    Applications {
        /// Student username
        student: String,
    },

    /// Show the applicants of an internship
    Applicants {
        /// Internship id (e.g. int-12 or 12)
        #[arg(value_parser = parse_id)]
        internship: u64,
    },

    /// Suggest internships for a student
    Suggest {
        /// Student username
        student: String,
        /// Maximum number of suggestions (default: from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List workshops
    Workshops {
        /// Only workshops that have not ended yet
        #[arg(long)]
        upcoming: bool,
    },

    /// List internship reports
    Reports {
        /// Only reports with this status (pending, flagged, accepted, rejected)
        #[arg(long)]
        status: Option<ReportStatus>,
    },

    /// Export aggregate statistics
    Stats {
        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,
        /// Write to file (relative paths resolve against export_dir)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show companies, their internships and applicants as a tree
    Overview,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show the global config file location
    Path,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Toml,
}

/// Accept both `int-12` and `12`.
fn parse_id(raw: &str) -> Result<u64, String> {
    let digits = raw.rsplit('-').next().unwrap_or(raw);
    digits
        .parse::<u64>()
        .map_err(|_| format!("'{raw}' is not an id (expected e.g. int-12 or 12)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int-12", Some(12))]
    #[case("7", Some(7))]
    #[case("int-", None)]
    #[case("abc", None)]
    fn given_id_argument_when_parsing_then_accepts_prefixed_and_bare(
        #[case] raw: &str,
        #[case] expected: Option<u64>,
    ) {
        assert_eq!(parse_id(raw).ok(), expected);
    }

    #[test]
    fn given_paid_and_unpaid_when_parsing_then_conflicts() {
        let result = Cli::try_parse_from(["internhub", "internships", "--paid", "--unpaid"]);
        assert!(result.is_err());
    }

    #[test]
    fn given_pending_with_listing_filter_when_parsing_then_conflicts() {
        let result = Cli::try_parse_from(["internhub", "internships", "--pending", "--paid"]);
        assert!(result.is_err());
    }

    #[test]
    fn given_repeated_debug_flag_when_parsing_then_counts() {
        let cli = Cli::try_parse_from(["internhub", "-d", "-d", "overview"]).unwrap();
        assert_eq!(cli.debug, 2);
        assert!(matches!(cli.command, Some(Commands::Overview)));
    }
}
