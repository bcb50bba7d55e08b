mod cli;
mod logging;

use crate::cli::{Cli, Command, ExportArgs, OrganizeArgs, PartitionsArgs};
use clap::Parser;
use facesort::error::{ErrorKind, Result};
use facesort_catalog::{Database, ExtractOptions, Partition, PartitionId};
use facesort_config::Config;
use facesort_config::error::ErrorKind as ConfigErrorKind;
use std::path::PathBuf;
use std::process::ExitCode;
use time::format_description::well_known::Rfc3339;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).map_err(ErrorKind::config)?;
    match cli.command {
        Command::Export(args) => export(config, args).await,
        Command::Organize(args) => organize(config, args).await,
        Command::Partitions(args) => partitions(config, args).await,
    }
}

async fn open(path: PathBuf) -> Result<Database> {
    Database::open(&path).await.map_err(ErrorKind::catalog)
}

async fn export(config: Config, args: ExportArgs) -> Result<()> {
    let exclude_hidden = args.exclude_hidden_or(config.exclude_hidden);
    let database = open(args.database.unwrap_or(config.database)).await?;
    let output = args.output.unwrap_or(config.interchange);
    let options = ExtractOptions {
        partition: args.partition.map(PartitionId::new),
        exclude_hidden,
    };
    let result = facesort::export(&database, &output, options).await;
    database.close().await;
    let report = result?;
    println!(
        "Exported {} records for {} groups from partition {} to {}",
        report.records,
        report.groups,
        report.partition,
        output.display()
    );
    Ok(())
}

async fn organize(config: Config, args: OrganizeArgs) -> Result<()> {
    let input = args.input.unwrap_or(config.interchange);
    let Some(destination) = args.destination.or(config.destination) else {
        let kind = ConfigErrorKind::Invalid("no destination given (use --destination or set `destination`)".to_string());
        exn::bail!(ErrorKind::Config(kind));
    };
    let rules = args.rules.unwrap_or(config.rules);
    let summary = facesort::organize(&input, &destination, rules).await?;
    println!("Done: {} copied, {} failed across {} groups", summary.copied, summary.failed, summary.groups);
    Ok(())
}

async fn partitions(config: Config, args: PartitionsArgs) -> Result<()> {
    let database = open(args.database.unwrap_or(config.database)).await?;
    let result = facesort::partitions(&database).await;
    database.close().await;
    let partitions = result?;
    if partitions.is_empty() {
        println!("No partitions");
        return Ok(());
    }
    println!("{:>6}  {:<6}  {:>9}  {:<20}  {:>7}  {:>11}", "ID", "ACTIVE", "THRESHOLD", "CREATED", "PERSONS", "ASSIGNMENTS");
    for partition in &partitions {
        println!("{}", partition_row(partition));
    }
    Ok(())
}

fn partition_row(partition: &Partition) -> String {
    let created = partition
        .created_at
        .and_then(|created| created.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>6}  {:<6}  {:>9.3}  {:<20}  {:>7}  {:>11}",
        partition.id.get(),
        if partition.is_active { "yes" } else { "" },
        partition.threshold,
        created,
        partition.persons,
        partition.assignments
    )
}
