use std::{
    collections::BTreeSet,
    ffi::OsString,
    fs::{self, File, OpenOptions, TryLockError},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::{filter::FilterCombination, job_record::JobRecord};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("failed to {action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: {reason}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("archive is in use by another running process holding {}", .0.display())]
    Locked(PathBuf),
}

/// Flat file holding the records of the last successful run, one per line.
///
/// Next to it live `<archive>.filters` with the filter combinations that
/// produced it and, while a run is active, `<archive>.lock`.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ArchiveStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn scope_path(&self) -> PathBuf {
        self.sibling(".filters")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Returns `None` when no archive has been written yet.
    pub fn load(&self) -> Result<Option<Vec<JobRecord>>, ArchiveError> {
        let Some(contents) = read_optional(&self.path)? else {
            return Ok(None);
        };

        let mut records = vec![];
        for (i, line) in contents.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            let record =
                JobRecord::from_archive_line(line).map_err(|e| ArchiveError::Malformed {
                    path: self.path.clone(),
                    line: i + 1,
                    reason: e.to_string(),
                })?;
            records.push(record);
        }

        log::info!(
            "Loaded {} archived jobs from {}",
            records.len(),
            self.path.display()
        );

        Ok(Some(records))
    }

    /// Replaces the archive with `records`. The new contents are written to a
    /// temp file first and renamed over the archive.
    pub fn save(&self, records: &[JobRecord]) -> Result<(), ArchiveError> {
        let lines = records.iter().map(JobRecord::to_archive_line);
        replace_file(&self.path, &self.sibling(".tmp"), lines)?;

        log::info!(
            "Saved {} jobs to archive {}",
            records.len(),
            self.path.display()
        );

        Ok(())
    }

    /// Filter combinations recorded by the previous run, `None` if the archive
    /// predates scope tracking.
    pub fn load_scope(&self) -> Result<Option<BTreeSet<FilterCombination>>, ArchiveError> {
        let scope_path = self.scope_path();
        let Some(contents) = read_optional(&scope_path)? else {
            return Ok(None);
        };

        let mut scope = BTreeSet::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            match FilterCombination::from_scope_line(line.trim_end_matches('\r')) {
                Some(combination) => {
                    scope.insert(combination);
                }
                None => log::warn!(
                    "Ignoring unknown filter '{}' in {}",
                    line,
                    scope_path.display()
                ),
            }
        }

        Ok(Some(scope))
    }

    /// Removes the scope file so it never outlives the archive it describes.
    pub fn clear_scope(&self) -> Result<(), ArchiveError> {
        let scope_path = self.scope_path();
        match fs::remove_file(&scope_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(io_error("remove", &scope_path)(e))
            }
            _ => Ok(()),
        }
    }

    pub fn save_scope(&self, combinations: &[FilterCombination]) -> Result<(), ArchiveError> {
        let lines = combinations.iter().map(FilterCombination::to_scope_line);
        replace_file(&self.scope_path(), &self.sibling(".filters.tmp"), lines)
    }

    /// Claims the archive for one run. Fails if another live process holds
    /// the lock. The lock file stays on disk, the OS releases the lock when
    /// the holder exits, however it exits.
    pub fn lock(&self) -> Result<ArchiveLock, ArchiveError> {
        let path = self.lock_path();
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(io_error("create lock file", &path))?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => return Err(ArchiveError::Locked(path)),
            Err(TryLockError::Error(e)) => return Err(io_error("lock", &path)(e)),
        }

        // pid is informational only
        let pid = file
            .set_len(0)
            .and_then(|_| writeln!(file, "{}", std::process::id()));
        if let Err(e) = pid {
            log::warn!("Failed to record pid in {}: {:?}", path.display(), e);
        }

        Ok(ArchiveLock { _file: file })
    }
}

/// Held for the duration of a run. Dropping it, or the process exiting,
/// releases the lock.
#[derive(Debug)]
pub struct ArchiveLock {
    _file: File,
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> ArchiveError {
    let path = path.to_path_buf();
    move |source| ArchiveError::Io {
        action,
        path,
        source,
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ArchiveError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read", path)(e)),
    }
}

fn replace_file(
    path: &Path,
    tmp_path: &Path,
    lines: impl Iterator<Item = String>,
) -> Result<(), ArchiveError> {
    let file = File::create(tmp_path).map_err(io_error("create", tmp_path))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line).map_err(io_error("write", tmp_path))?;
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .and_then(|file| file.sync_all())
        .map_err(io_error("flush", tmp_path))?;

    fs::rename(tmp_path, path).map_err(io_error("replace", path))
}
