use std::collections::HashSet;

use super::job_record::JobRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub record: JobRecord,
}

/// Outcome of comparing a run's snapshot against the stored archive.
#[derive(Debug, Default, PartialEq)]
pub struct Changes {
    pub events: Vec<ChangeEvent>,
    /// New postings not turned into events because this is the first run.
    pub suppressed: usize,
}

impl Changes {
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

/// Classifies every snapshot record against the archive.
///
/// `archive` is `None` when no archive existed before this run. In that case
/// new records only produce events when `notify_first_run` is set. Records are
/// compared on all four fields, duplicates on either side produce one event
/// per occurrence. New events come first in snapshot order, then removed
/// events in archive order.
pub fn diff_snapshot(
    archive: Option<&[JobRecord]>,
    snapshot: &[JobRecord],
    notify_first_run: bool,
) -> Changes {
    let archived: HashSet<&JobRecord> = archive.unwrap_or_default().iter().collect();
    let current: HashSet<&JobRecord> = snapshot.iter().collect();

    let new_records = snapshot.iter().filter(|record| !archived.contains(record));

    let mut changes = Changes::default();

    if archive.is_none() && !notify_first_run {
        changes.suppressed = new_records.count();
    } else {
        changes.events.extend(new_records.map(|record| ChangeEvent {
            kind: ChangeKind::New,
            record: record.clone(),
        }));
    }

    changes.events.extend(
        archive
            .unwrap_or_default()
            .iter()
            .filter(|record| !current.contains(record))
            .map(|record| ChangeEvent {
                kind: ChangeKind::Removed,
                record: record.clone(),
            }),
    );

    changes
}
