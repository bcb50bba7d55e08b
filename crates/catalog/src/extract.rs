use crate::Catalog;
use crate::error::{ErrorKind, Result};
use crate::models::PartitionId;
use facesort_interchange::Record;
use tracing::instrument;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Export this partition instead of the active one.
    pub partition: Option<PartitionId>,
    /// Leave out hidden persons and hidden faces.
    pub exclude_hidden: bool,
}

/// The grouped records of one partition, in interchange order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub partition: PartitionId,
    /// Sorted by label, then path, comparing bytes.
    pub records: Vec<Record>,
}
impl Extraction {
    /// Number of distinct labels.
    pub fn groups(&self) -> usize {
        self.records.chunk_by(|a, b| a.label == b.label).count()
    }
}

/// Collects every `(label, path)` pair of a partition.
///
/// The partition is the one requested in `options`, or else the active one.
/// An empty result is an error: writing an interchange file with nothing but
/// a header would only hide the problem until organizing.
#[instrument(skip(catalog))]
pub async fn extract(catalog: &Catalog, options: ExtractOptions) -> Result<Extraction> {
    let partition = catalog.resolve_partition(options.partition).await?;
    let mut records = catalog.grouped_records(partition, options.exclude_hidden).await?;
    if records.is_empty() {
        exn::bail!(ErrorKind::EmptyResultSet);
    }
    // SQLite already orders with BINARY collation; the stable sort keeps that
    // guarantee independent of the query plan.
    records.sort();
    let extraction = Extraction { partition, records };
    tracing::info!(
        %partition,
        records = extraction.records.len(),
        groups = extraction.groups(),
        "Extracted grouped records"
    );
    Ok(extraction)
}
