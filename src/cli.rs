use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::{ArgAction, Args, Parser, Subcommand};
use facesort_config::Rules;
use std::path::PathBuf;

fn path_parser() -> impl TypedValueParser<Value = PathBuf> {
    NonEmptyStringValueParser::new().map(PathBuf::from)
}

/// Export face groups from the recognition database and sort photos into
/// one folder per person.
#[derive(Debug, Parser)]
#[command(name = "facesort", version, about, long_about = None)]
pub struct Cli {
    /// More log output (repeat for more detail). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Read settings from this file instead of the platform config directory.
    #[arg(long, global = true, value_name = "PATH", env = "FACESORT_CONFIG", value_parser = path_parser())]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write every (person, photo) pair of a partition to the interchange file.
    Export(ExportArgs),
    /// Copy the photos listed in the interchange file into per-person folders.
    Organize(OrganizeArgs),
    /// List the partitions (clustering runs) in the recognition database.
    Partitions(PartitionsArgs),
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Recognition database to read.
    #[arg(long, value_name = "PATH", value_parser = path_parser())]
    pub database: Option<PathBuf>,
    /// Interchange file to write.
    #[arg(short, long, value_name = "PATH", value_parser = path_parser())]
    pub output: Option<PathBuf>,
    /// Export this partition instead of the active one.
    #[arg(long, value_name = "ID")]
    pub partition: Option<i64>,
    /// Leave out hidden persons and hidden faces.
    #[arg(long, overrides_with = "no_exclude_hidden")]
    pub exclude_hidden: bool,
    /// Include hidden persons and hidden faces, even if configured otherwise.
    #[arg(long, overrides_with = "exclude_hidden")]
    pub no_exclude_hidden: bool,
}
impl ExportArgs {
    /// The flag given last wins; without either, the configured value applies.
    pub fn exclude_hidden_or(&self, configured: bool) -> bool {
        match (self.exclude_hidden, self.no_exclude_hidden) {
            (true, _) => true,
            (_, true) => false,
            _ => configured,
        }
    }
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Interchange file to read.
    #[arg(short, long, value_name = "PATH", value_parser = path_parser())]
    pub input: Option<PathBuf>,
    /// Folder to create the per-person folders in.
    #[arg(short, long, value_name = "PATH", value_parser = path_parser())]
    pub destination: Option<PathBuf>,
    /// Naming rules for folder names: windows or posix.
    #[arg(long, value_name = "RULES")]
    pub rules: Option<Rules>,
}

#[derive(Debug, Args)]
pub struct PartitionsArgs {
    /// Recognition database to read.
    #[arg(long, value_name = "PATH", value_parser = path_parser())]
    pub database: Option<PathBuf>,
}
