//! The two stages of sorting photos by person, and the plumbing between them.
//!
//! [`export`] writes the grouped records of a partition to an interchange
//! file; [`organize`] reads such a file and copies every photo into its
//! person's directory. The stages share nothing but that file, so they can run
//! at different times or on different machines.

pub mod error;

use crate::error::{ErrorKind, Result};
use facesort_catalog::{Catalog, Database, ExtractOptions, Partition, PartitionId, extract};
use facesort_config::Rules;
use facesort_organize::{MaterializeEvent, Materializer, Posix, RulesHandle, Summary, Windows};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// What [`export`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub partition: PartitionId,
    pub records: usize,
    pub groups: usize,
}

/// Extracts the grouped records of a partition and writes them to `output`.
///
/// Nothing is written when extraction fails, including when there is no
/// active partition or nothing to export.
#[instrument(skip(database))]
pub async fn export(database: &Database, output: &Path, options: ExtractOptions) -> Result<ExportReport> {
    let extraction = extract(&Catalog::from(database), options).await.map_err(ErrorKind::catalog)?;
    facesort_interchange::write_file(output, &extraction.records).await.map_err(ErrorKind::interchange)?;
    Ok(ExportReport { partition: extraction.partition, records: extraction.records.len(), groups: extraction.groups() })
}

/// Reads the interchange file at `input` and copies every photo into
/// `<destination>/<person>/`.
///
/// Per-file failures are counted in the returned [`Summary`], not raised.
#[instrument]
pub async fn organize(input: &Path, destination: &Path, rules: Rules) -> Result<Summary> {
    let decoded = facesort_interchange::read_file(input).await.map_err(ErrorKind::interchange)?;
    let materializer = Materializer::new(destination).with_rules(rules_handle(rules));

    let mut events = std::pin::pin!(materializer.materialize(&decoded.records));
    let (mut total, mut done) = (0, 0);
    let mut summary = Summary::default();
    while let Some(event) = events.next().await {
        match event.map_err(ErrorKind::organize)? {
            MaterializeEvent::DiscoveryComplete(count) => total = count,
            MaterializeEvent::GroupStarted { label, files, .. } => {
                tracing::info!(%label, files, progress = %format_args!("{done}/{total}"), "Organizing group");
                done += files;
            },
            MaterializeEvent::Complete(finished) => summary = finished,
            MaterializeEvent::Started | MaterializeEvent::Copied { .. } | MaterializeEvent::Failed { .. } => {},
        }
    }
    Ok(summary)
}

/// Every partition in the database, oldest first.
pub async fn partitions(database: &Database) -> Result<Vec<Partition>> {
    Catalog::from(database).partitions().await.map_err(ErrorKind::catalog)
}

pub fn rules_handle(rules: Rules) -> RulesHandle {
    match rules {
        Rules::Windows => Arc::new(Windows),
        Rules::Posix => Arc::new(Posix),
    }
}
