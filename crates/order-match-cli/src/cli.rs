//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser)]
#[command(
    name = "order-match",
    version,
    about = "Match free-text procurement order lines to a product catalog",
    long_about = "Match free-text procurement order lines to a product catalog.\n\n\
                  Catalogs, orders and the reference list live in a SQLite database;\n\
                  import them from CSV, then run `match` to print one JSON record per\n\
                  order line on stdout."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database holding catalogs, orders and reference names.
    #[arg(long, value_name = "PATH", default_value = "order-match.db", global = true)]
    pub db: PathBuf,

    /// JSON file with scoring parameters (missing fields take defaults).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replace the catalog with the contents of a CSV file.
    ImportCatalog(ImportArgs),

    /// Replace the pending order lines with the contents of a CSV file.
    ImportRequests(ImportArgs),

    /// Add names to the reference list.
    AddReference(ReferenceArgs),

    /// Match the pending order lines and print the results.
    Match(MatchArgs),

    /// Score two names against each other.
    Compare(CompareArgs),

    /// List department groups present in the catalog.
    Groups,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import.
    #[arg(value_name = "CSV")]
    pub path: PathBuf,

    /// Field delimiter.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Rows above the header row to skip.
    #[arg(long = "skip-rows", default_value_t = 0)]
    pub skip_rows: usize,
}

#[derive(Args)]
pub struct ReferenceArgs {
    /// Names to add.
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Text file with one name per line.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Drop the current list before adding.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args)]
pub struct MatchArgs {
    /// Match against this department group instead of reading it from the notes.
    #[arg(long, value_name = "GROUP")]
    pub department: Option<String>,

    /// Department group recognized in notes (repeatable; defaults to the built-in list).
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "jsonl")]
    pub format: OutputFormatArg,

    /// Write to a file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Order line name.
    pub name_a: String,

    /// Catalog name.
    pub name_b: String,

    #[arg(long = "price-a")]
    pub price_a: Option<f64>,

    #[arg(long = "price-b")]
    pub price_b: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// One JSON record per line.
    Jsonl,
    /// A single JSON document with a summary.
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_match() {
        let cli = Cli::parse_from([
            "order-match",
            "--db",
            "orders.db",
            "match",
            "--group",
            "Пушкина 1",
            "--group",
            "Жумабаева 3",
            "--format",
            "csv",
        ]);

        assert_eq!(cli.db, PathBuf::from("orders.db"));
        match cli.command {
            Command::Match(args) => {
                assert_eq!(args.groups, vec!["Пушкина 1", "Жумабаева 3"]);
                assert_eq!(args.format, OutputFormatArg::Csv);
                assert!(args.department.is_none());
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_parse_import_options() {
        let cli = Cli::parse_from([
            "order-match",
            "import-requests",
            "order.csv",
            "--delimiter",
            ";",
            "--skip-rows",
            "2",
        ]);

        match cli.command {
            Command::ImportRequests(args) => {
                assert_eq!(args.delimiter, ';');
                assert_eq!(args.skip_rows, 2);
            }
            _ => panic!("expected import-requests command"),
        }
    }
}
