use clap::{Args, Parser, Subcommand};

/// Extended help shown after `schedkit normalize --help`.
pub const NORMALIZE_AFTER_HELP: &str = "\
Payload shape:
  A JSON object with a `schedules` array, or a bare array of schedule objects.
  Prose around the JSON is tolerated; the first parseable object or array wins.

  Optional side channels on the object form are passed through:
    issues, totals_check, model_recommendations

  <path> is a local file path. Use `-` to read the payload from stdin.
  Example: cat extraction.json | schedkit normalize -

What to do next:
  1. Review `issues` on each schedule for corrections that were applied.
  2. If `rerun.should_rerun` is true, run the extraction again and reconcile
     both runs with `schedkit reconcile <run1> <run2>`.
  3. Run `schedkit project <path>` to produce Garage revenue schedules.
";

/// Extended help shown after `schedkit project --help`.
pub const PROJECT_AFTER_HELP: &str = "\
Pipeline:
  1. Normalize the payload at <path>.
  2. With --second-run, normalize that payload too and attach agreement
     confidence and review flags to each first-run schedule.
  3. Match item names against the mapping table (--mapping or the merchant
     profile's mapping.json / mapping.csv).
  4. Project onto the Garage schema and apply guidance overrides and
     exclusions (--guidance or the merchant profile's guidance.json).

Merchant profiles live under $SCHEDKIT_HOME/merchants/<id>/
(default ~/.schedkit/merchants/<id>/). Explicit paths win over the profile.
";

#[derive(Debug, Parser)]
#[command(
    name = "schedkit",
    version,
    about = "billing schedule normalization and reconciliation",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize one extraction payload into canonical billing schedules
    #[command(after_long_help = NORMALIZE_AFTER_HELP)]
    Normalize {
        /// Path to the extraction payload (use `-` for stdin)
        path: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Compare two extraction runs and score per-schedule agreement
    Reconcile {
        /// Path to the first run's payload (use `-` for stdin)
        run1: String,
        /// Path to the second run's payload (use `-` for stdin)
        run2: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Run the full pipeline and emit Garage revenue schedules
    #[command(after_long_help = PROJECT_AFTER_HELP)]
    Project(ProjectArgs),
    /// Match one contract item name against an integration mapping table
    Match {
        /// Item name as written on the contract
        item_name: String,
        /// Mapping table as CSV or JSON
        #[arg(long)]
        mapping: Option<String>,
        /// Merchant profile id supplying mapping.json or mapping.csv
        #[arg(long)]
        merchant: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Path to the extraction payload (use `-` for stdin)
    pub path: String,
    /// Second extraction run of the same document, for agreement scoring
    #[arg(long)]
    pub second_run: Option<String>,
    /// Mapping table as CSV or JSON
    #[arg(long)]
    pub mapping: Option<String>,
    /// Merchant guidance JSON
    #[arg(long)]
    pub guidance: Option<String>,
    /// Merchant profile id under $SCHEDKIT_HOME/merchants/
    #[arg(long)]
    pub merchant: Option<String>,
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
