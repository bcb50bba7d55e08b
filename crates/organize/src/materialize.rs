use crate::error::{ErrorKind, Result, io_error};
use crate::rules::{RulesHandle, Windows};
use async_stream::stream;
use exn::ResultExt;
use facesort_interchange::Record;
use futures::{Stream, StreamExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// Counts reported once a run has finished.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub copied: u64,
    pub failed: u64,
    pub groups: u64,
}

/// Progress events emitted by [`Materializer::materialize`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    total file count.
/// 3. For each group, in label order: [`GroupStarted`](Self::GroupStarted),
///    then one [`Copied`](Self::Copied) or [`Failed`](Self::Failed) per file.
/// 4. [`Complete`](Self::Complete): exactly once, with the final counts.
///
/// An `Err` item is fatal and ends the stream; [`Complete`](Self::Complete)
/// is never emitted after one.
#[derive(Debug)]
pub enum MaterializeEvent {
    Started,
    DiscoveryComplete(u64),
    GroupStarted { label: String, directory: PathBuf, files: u64 },
    Copied { source: PathBuf, destination: PathBuf },
    /// The file was not copied. Never fatal.
    Failed { source: PathBuf, error: crate::error::Error },
    Complete(Summary),
}

/// Copies the photos of each group into `<root>/<sanitized label>/`.
///
/// Nothing is ever overwritten, moved or deleted (other than a copy that
/// failed part way): a name that is taken gets a `_<n>` suffix instead, so
/// running twice leaves two sets of copies.
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
    rules: RulesHandle,
}
impl Materializer {
    /// A materializer using [`Windows`] naming rules.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), rules: Arc::new(Windows) }
    }

    pub fn with_rules(mut self, rules: RulesHandle) -> Self {
        self.rules = rules;
        self
    }

    /// Streams [`MaterializeEvent`]s while copying every record's file.
    ///
    /// Groups are processed in byte-wise label order and files in record
    /// order, which decides who gets the `_<n>` suffixes. Failing to create
    /// the root is fatal; failing to create a group's directory fails every
    /// file of that group and moves on.
    pub fn materialize<'a>(&'a self, records: &'a [Record]) -> impl Stream<Item = Result<MaterializeEvent>> + 'a {
        // `rustfmt` does not format macros that use braces. Wrap in parentheses!
        stream!({
            yield Ok(MaterializeEvent::Started);

            let groups = group_by_label(records);
            if groups.is_empty() {
                yield Err(exn::Exn::from(ErrorKind::EmptyResultSet));
                return;
            }
            let total: usize = groups.values().map(Vec::len).sum();
            yield Ok(MaterializeEvent::DiscoveryComplete(u64::try_from(total).unwrap_or(u64::MAX)));

            if let Err(err) = fs::create_dir_all(&self.root).await {
                yield Err(err).or_raise(|| ErrorKind::Destination(self.root.clone()));
                return;
            }

            let mut summary = Summary::default();
            for (label, sources) in groups {
                summary.groups += 1;
                let directory = self.root.join(self.rules.sanitize(label));
                let files = u64::try_from(sources.len()).unwrap_or(u64::MAX);
                yield Ok(MaterializeEvent::GroupStarted { label: label.to_string(), directory: directory.clone(), files });

                if let Err(err) = fs::create_dir_all(&directory).await {
                    tracing::warn!(label, directory = %directory.display(), error = %err, files, "Cannot create group directory, skipping its files");
                    for source in sources {
                        summary.failed += 1;
                        let error = exn::Exn::from(ErrorKind::Destination(directory.clone()));
                        yield Ok(MaterializeEvent::Failed { source: PathBuf::from(source), error });
                    }
                    continue;
                }

                for source in sources {
                    match self.copy_file(source, &directory).await {
                        Ok(destination) => {
                            summary.copied += 1;
                            yield Ok(MaterializeEvent::Copied { source: PathBuf::from(source), destination });
                        },
                        Err(error) => {
                            summary.failed += 1;
                            let kind: &ErrorKind = &error;
                            tracing::warn!(source, error = %kind, "Failed to copy photo");
                            yield Ok(MaterializeEvent::Failed { source: PathBuf::from(source), error });
                        },
                    }
                }
            }

            tracing::info!(copied = summary.copied, failed = summary.failed, groups = summary.groups, "Finished organizing");
            yield Ok(MaterializeEvent::Complete(summary));
        })
    }

    /// Runs [`materialize`](Self::materialize) to completion, ignoring progress.
    #[instrument(skip_all, fields(root = %self.root.display(), records = records.len()))]
    pub async fn run(&self, records: &[Record]) -> Result<Summary> {
        let mut events = std::pin::pin!(self.materialize(records));
        let mut summary = Summary::default();
        while let Some(event) = events.next().await {
            if let MaterializeEvent::Complete(done) = event? {
                summary = done;
            }
        }
        Ok(summary)
    }

    /// Copies `source` into `directory` under the first free candidate name.
    ///
    /// Claiming the name and creating the file is one exclusive open, so a
    /// name is never overwritten even if something else writes to the same
    /// directory meanwhile.
    async fn copy_file(&self, source: &str, directory: &Path) -> Result<PathBuf> {
        let name = self.rules.file_name(source);
        if matches!(name, "" | "." | "..") {
            exn::bail!(ErrorKind::InvalidFileName(source.to_string()));
        }
        let source_path = Path::new(source);
        let mut input = File::open(source_path).await.map_err(|e| io_error(e, source_path))?;

        for attempt in 0..u32::MAX {
            let destination = directory.join(self.rules.candidate(name, attempt));
            let output = match OpenOptions::new().write(true).create_new(true).open(&destination).await {
                Ok(output) => output,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(io_error(err, &destination)),
            };
            if let Err(err) = copy_into(&mut input, output).await {
                // Leave nothing half written behind.
                _ = fs::remove_file(&destination).await;
                return Err(err).or_raise(|| ErrorKind::Copy(destination));
            }
            tracing::debug!(source, destination = %destination.display(), attempt, "Copied photo");
            return Ok(destination);
        }
        exn::bail!(ErrorKind::Copy(directory.join(name)))
    }
}

async fn copy_into(input: &mut File, mut output: File) -> std::io::Result<()> {
    tokio::io::copy(input, &mut output).await?;
    output.flush().await?;
    output.sync_all().await
}

fn group_by_label(records: &[Record]) -> BTreeMap<&str, Vec<&str>> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for record in records {
        groups.entry(record.label.as_str()).or_default().push(record.path.as_str());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Posix;
    use std::fs as sync_fs;
    use tempfile::TempDir;

    /// Writes `contents` to `<temp>/<relative>` and returns the full path as a string.
    fn source(temp: &TempDir, relative: &str, contents: &str) -> String {
        let path = temp.path().join(relative);
        sync_fs::create_dir_all(path.parent().unwrap()).unwrap();
        sync_fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn read(path: impl AsRef<Path>) -> String {
        sync_fs::read_to_string(path).unwrap()
    }

    fn listing(dir: impl AsRef<Path>) -> Vec<String> {
        let mut names: Vec<_> =
            sync_fs::read_dir(dir).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_group_by_label() {
        let records =
            [Record::new("bob", "1"), Record::new("Alice", "2"), Record::new("bob", "3"), Record::new("Émile", "4")];
        let groups = group_by_label(&records);
        let labels: Vec<_> = groups.keys().copied().collect();
        assert_eq!(labels, ["Alice", "bob", "Émile"]);
        assert_eq!(groups["bob"], ["1", "3"]);
    }

    #[tokio::test]
    async fn test_copies_into_group_directories() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let records = [
            Record::new("Alice", source(&sources, "p/a.jpg", "a")),
            Record::new("Alice", source(&sources, "p/b.jpg", "b")),
        ];

        let summary = Materializer::new(dest.path()).run(&records).await.unwrap();
        assert_eq!(summary, Summary { copied: 2, failed: 0, groups: 1 });
        assert_eq!(listing(dest.path()), ["Alice"]);
        assert_eq!(read(dest.path().join("Alice/a.jpg")), "a");
        assert_eq!(read(dest.path().join("Alice/b.jpg")), "b");
    }

    #[tokio::test]
    async fn test_creates_missing_root() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let root = dest.path().join("sorted/by/person");
        let records = [Record::new("Alice", source(&sources, "a.jpg", "a"))];
        let summary = Materializer::new(&root).run(&records).await.unwrap();
        assert_eq!(summary.copied, 1);
        assert_eq!(read(root.join("Alice/a.jpg")), "a");
    }

    #[tokio::test]
    async fn test_existing_file_is_never_overwritten() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        sync_fs::create_dir_all(dest.path().join("Bob")).unwrap();
        sync_fs::write(dest.path().join("Bob/photo.jpg"), "original").unwrap();
        let records = [Record::new("Bob", source(&sources, "x/photo.jpg", "incoming"))];

        let summary = Materializer::new(dest.path()).run(&records).await.unwrap();
        assert_eq!(summary, Summary { copied: 1, failed: 0, groups: 1 });
        assert_eq!(read(dest.path().join("Bob/photo.jpg")), "original");
        assert_eq!(read(dest.path().join("Bob/photo_1.jpg")), "incoming");
    }

    #[tokio::test]
    async fn test_collisions_are_numbered_in_record_order() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let records = [
            Record::new("Alice", source(&sources, "2019/img.jpg", "first")),
            Record::new("Alice", source(&sources, "2020/img.jpg", "second")),
            Record::new("Alice", source(&sources, "2021/img.jpg", "third")),
        ];

        Materializer::new(dest.path()).run(&records).await.unwrap();
        assert_eq!(listing(dest.path().join("Alice")), ["img.jpg", "img_1.jpg", "img_2.jpg"]);
        assert_eq!(read(dest.path().join("Alice/img.jpg")), "first");
        assert_eq!(read(dest.path().join("Alice/img_1.jpg")), "second");
        assert_eq!(read(dest.path().join("Alice/img_2.jpg")), "third");
    }

    #[tokio::test]
    async fn test_running_twice_keeps_both_sets() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let records = [
            Record::new("Alice", source(&sources, "a.jpg", "a")),
            Record::new("Bob", source(&sources, "README", "b")),
        ];
        let materializer = Materializer::new(dest.path());
        materializer.run(&records).await.unwrap();
        let summary = materializer.run(&records).await.unwrap();

        assert_eq!(summary, Summary { copied: 2, failed: 0, groups: 2 });
        assert_eq!(listing(dest.path().join("Alice")), ["a.jpg", "a_1.jpg"]);
        assert_eq!(listing(dest.path().join("Bob")), ["README", "README_1"]);
        assert_eq!(read(dest.path().join("Alice/a.jpg")), read(dest.path().join("Alice/a_1.jpg")));
    }

    #[tokio::test]
    async fn test_missing_source_is_counted_not_fatal() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let missing = sources.path().join("gone.jpg").to_str().unwrap().to_string();
        let records = [
            Record::new("Alice", missing),
            Record::new("Alice", source(&sources, "here.jpg", "here")),
        ];

        let summary = Materializer::new(dest.path()).run(&records).await.unwrap();
        assert_eq!(summary, Summary { copied: 1, failed: 1, groups: 1 });
        assert_eq!(listing(dest.path().join("Alice")), ["here.jpg"]);
    }

    #[tokio::test]
    async fn test_failed_event_carries_the_reason() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let missing = sources.path().join("gone.jpg");
        let records = [Record::new("Alice", missing.to_str().unwrap()), Record::new("Alice", "C:\\Photos\\")];

        let materializer = Materializer::new(dest.path());
        let events: Vec<_> = materializer.materialize(&records).collect().await;
        let failures: Vec<ErrorKind> = events
            .into_iter()
            .filter_map(|event| match event.unwrap() {
                MaterializeEvent::Failed { error, .. } => Some((*error).clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            failures,
            [ErrorKind::NotFound(missing), ErrorKind::InvalidFileName("C:\\Photos\\".to_string())]
        );
    }

    #[tokio::test]
    async fn test_labels_are_sanitized() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let records = [
            Record::new("AC/DC", source(&sources, "a.jpg", "a")),
            Record::new("..", source(&sources, "b.jpg", "b")),
            Record::new("Who? ", source(&sources, "c.jpg", "c")),
        ];
        Materializer::new(dest.path()).run(&records).await.unwrap();
        assert_eq!(listing(dest.path()), ["AC_DC", "Who_", "_"]);
        assert_eq!(read(dest.path().join("_/b.jpg")), "b");
    }

    #[tokio::test]
    async fn test_posix_rules() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let records = [Record::new("Who? Me.", source(&sources, "a.jpg", "a"))];
        Materializer::new(dest.path()).with_rules(Arc::new(Posix)).run(&records).await.unwrap();
        assert_eq!(listing(dest.path()), ["Who? Me."]);
    }

    #[tokio::test]
    async fn test_unusable_group_directory_fails_its_files() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        // A file squatting on the group directory name.
        sync_fs::write(dest.path().join("Carol"), "not a directory").unwrap();
        let records = [
            Record::new("Alice", source(&sources, "a.jpg", "a")),
            Record::new("Carol", source(&sources, "c1.jpg", "c")),
            Record::new("Carol", source(&sources, "c2.jpg", "c")),
        ];

        let summary = Materializer::new(dest.path()).run(&records).await.unwrap();
        assert_eq!(summary, Summary { copied: 1, failed: 2, groups: 2 });
        assert_eq!(read(dest.path().join("Carol")), "not a directory");
    }

    #[tokio::test]
    async fn test_unusable_root_is_fatal() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        sync_fs::write(dest.path().join("file"), "").unwrap();
        let root = dest.path().join("file/sorted");
        let records = [Record::new("Alice", source(&sources, "a.jpg", "a"))];

        let err = Materializer::new(&root).run(&records).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Destination(root));
    }

    #[tokio::test]
    async fn test_nothing_to_organize() {
        let dest = tempfile::tempdir().unwrap();
        let root = dest.path().join("sorted");
        let err = Materializer::new(&root).run(&[]).await.unwrap_err();
        assert_eq!(*err, ErrorKind::EmptyResultSet);
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_event_order() {
        let sources = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let records = [
            Record::new("Bob", source(&sources, "b.jpg", "b")),
            Record::new("Alice", source(&sources, "a.jpg", "a")),
            Record::new("Alice", sources.path().join("gone.jpg").to_str().unwrap()),
        ];
        let materializer = Materializer::new(dest.path());
        let events: Vec<_> = materializer.materialize(&records).map(|event| event.unwrap()).collect().await;

        let names: Vec<_> = events
            .iter()
            .map(|event| match event {
                MaterializeEvent::Started => "started".to_string(),
                MaterializeEvent::DiscoveryComplete(total) => format!("discovered {total}"),
                MaterializeEvent::GroupStarted { label, files, .. } => format!("group {label} ({files})"),
                MaterializeEvent::Copied { destination, .. } => {
                    format!("copied {}", destination.strip_prefix(dest.path()).unwrap().display())
                },
                MaterializeEvent::Failed { .. } => "failed".to_string(),
                MaterializeEvent::Complete(summary) => format!("complete {}/{}", summary.copied, summary.failed),
            })
            .collect();
        assert_eq!(
            names,
            [
                "started",
                "discovered 3",
                "group Alice (2)",
                "copied Alice/a.jpg",
                "failed",
                "group Bob (1)",
                "copied Bob/b.jpg",
                "complete 2/1",
            ]
        );
    }
}
