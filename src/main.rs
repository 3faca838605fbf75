use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

mod clock;
mod config;
mod daily_report;
mod datetime;
mod grouping;
mod logging;
mod markdown;
mod myhours;
mod overtime_report;
mod project_report;
mod report_command;
mod report_writer;
mod time_entry;

use config::Config;
use myhours::MyHoursClient;
use report_command::{ReportArgs, ReportCommand, ReportKind};

/// My Hoursのtime logからレポートを出力するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- --from 2023-01-01 --to 2023-01-22
/// $ cargo run -- daily --out-dir reports
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(subcommand)]
    subcommand: Option<SubCommands>,

    #[clap(flatten)]
    report: ReportArgs,

    #[clap(short = 'v', long = "verbose", global = true, help = "Show debug logs")]
    verbose: bool,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Write every report (default)
    All,
    /// Write one CSV per project
    Projects,
    /// Write the overtime CSV
    Overtime,
    /// Write the daily text log
    Daily,
}

impl SubCommands {
    fn kinds(&self) -> &'static [ReportKind] {
        match self {
            SubCommands::All => &ReportKind::ALL,
            SubCommands::Projects => &[ReportKind::Projects],
            SubCommands::Overtime => &[ReportKind::Overtime],
            SubCommands::Daily => &[ReportKind::Daily],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(args.verbose)?;

    let config = Config::from_env().context("Failed to load configuration")?;
    let client = MyHoursClient::new(config);
    let kinds = args.subcommand.unwrap_or(SubCommands::All).kinds();

    let summaries = ReportCommand::new(&client)
        .run(&args.report, kinds)
        .await?;

    let failed: usize = summaries.iter().map(|summary| summary.failed).sum();
    if failed > 0 {
        bail!("{} report file(s) could not be written", failed);
    }
    info!("All reports written successfully.");

    Ok(())
}
