use crate::scan::{run_scan, ScanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use bottlescan::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "BottleScan",
    about = "Score cosmetic ingredient lists and find healthier alternatives",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Scan one ingredient list and print the report
    Scan(ScanArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load reference datasets from this directory instead of the bundled seed data
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scan(args) => run_scan(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["bottlescan-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn scan_accepts_repeated_profile_flags() {
        let cli = Cli::try_parse_from([
            "bottlescan-api",
            "scan",
            "--ingredients",
            "Aqua, Parfum",
            "--skin-type",
            "oily",
            "--skin-type",
            "combination",
            "--concern",
            "acne",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Scan(args)) => {
                assert_eq!(args.skin_type, vec!["oily", "combination"]);
                assert_eq!(args.concern, vec!["acne"]);
                assert!(args.json);
            }
            other => panic!("expected scan command, got {other:?}"),
        }
    }

    #[test]
    fn scan_requires_an_ingredient_source() {
        assert!(Cli::try_parse_from(["bottlescan-api", "scan"]).is_err());
    }
}
