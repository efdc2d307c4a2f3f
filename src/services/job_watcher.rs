use std::collections::BTreeSet;

use crate::{
    dal::{ArchiveError, ArchiveStore},
    domain::{
        change::{diff_snapshot, ChangeKind},
        filter::FilterCombination,
    },
};

use super::{fetch_snapshot, ListingSource, Notifier, NotifyError, ScrapeError};

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("failed to fetch job listings")]
    Scrape(#[from] ScrapeError),
    #[error("failed to send notification")]
    Notify(#[from] NotifyError),
}

#[derive(Debug, Default, PartialEq)]
pub struct RunReport {
    pub fetched: usize,
    pub new: usize,
    pub removed: usize,
    /// New jobs left unannounced because there was no archive yet.
    pub suppressed: usize,
    pub first_run: bool,
}

/// One fetch, diff, notify, persist cycle over a fixed set of filters.
pub struct JobWatcher<S, N> {
    source: S,
    notifier: N,
    archive: ArchiveStore,
    combinations: Vec<FilterCombination>,
    max_pages: u32,
    notify_first_run: bool,
}

impl<S, N> JobWatcher<S, N>
where
    S: ListingSource + Sync,
    N: Notifier + Sync,
{
    pub fn new(
        source: S,
        notifier: N,
        archive: ArchiveStore,
        combinations: Vec<FilterCombination>,
    ) -> Self {
        JobWatcher {
            source,
            notifier,
            archive,
            combinations,
            max_pages: 100,
            notify_first_run: false,
        }
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn notify_first_run(mut self, notify_first_run: bool) -> Self {
        self.notify_first_run = notify_first_run;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn archive(&self) -> &ArchiveStore {
        &self.archive
    }

    /// Runs a single check. Any error leaves the archive as it was; events
    /// already delivered before a notification failure are not rolled back.
    pub async fn check_once(&self) -> Result<RunReport, WatchError> {
        let archived = self.archive.load()?;
        let first_run = archived.is_none();

        if let Some(previous) = self.archive.load_scope()? {
            let dropped = dropped_filters(&previous, &self.combinations);
            if !dropped.is_empty() {
                log::warn!(
                    "{} filter combination(s) checked last run are not checked now, \
                     their archived jobs will be reported as removed: {}",
                    dropped.len(),
                    dropped
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        let snapshot =
            fetch_snapshot(&self.source, &self.combinations, self.max_pages).await?;

        let changes = diff_snapshot(archived.as_deref(), &snapshot, self.notify_first_run);
        if changes.suppressed > 0 {
            log::warn!(
                "No archive at {}, skipping {} new job notifications on first run",
                self.archive.path().display(),
                changes.suppressed
            );
        }

        for event in changes.events.iter() {
            self.notifier.notify(event).await?;
        }

        // scope goes first and comes back last: a failure in between leaves
        // no sidecar, which only disables the scope warning next run
        self.archive.clear_scope()?;
        self.archive.save(&snapshot)?;
        if let Err(e) = self.archive.save_scope(&self.combinations) {
            log::warn!("Archive saved but its filter list was not: {:?}", e);
        }

        let report = RunReport {
            fetched: snapshot.len(),
            new: changes.count(ChangeKind::New),
            removed: changes.count(ChangeKind::Removed),
            suppressed: changes.suppressed,
            first_run,
        };
        log::info!(
            "Check finished: {} jobs, {} new, {} removed",
            report.fetched,
            report.new,
            report.removed
        );

        Ok(report)
    }
}

/// Combinations that produced the archive but are absent from this run.
pub fn dropped_filters(
    previous: &BTreeSet<FilterCombination>,
    current: &[FilterCombination],
) -> Vec<FilterCombination> {
    let current: BTreeSet<&FilterCombination> = current.iter().collect();

    previous
        .iter()
        .filter(|c| !current.contains(c))
        .copied()
        .collect()
}
