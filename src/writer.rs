use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use time::{OffsetDateTime, UtcOffset};

use crate::{Result, RotationPolicy};
use crate::rotation::local_offset;

/// State of the current log file.
#[derive(Debug)]
pub struct FileState {
    /// The open file handle.
    pub file: File,
    /// Path of the active, timestamped file.
    pub path: PathBuf,
    /// Start of the rotation period this file belongs to.
    pub period_start: OffsetDateTime,
}

/// A writer that starts a new timestamped file every rotation interval.
///
/// The configured path is kept as a symbolic link to the active file (on
/// unix), and timestamped siblings older than the retention are removed
/// whenever a new file is opened. Nothing is created on disk until the first
/// write.
#[derive(Debug)]
pub struct RotatingWriter {
    /// Stable link path, e.g. `log/demo_info.log`.
    link_path: PathBuf,
    policy: RotationPolicy,
    offset: UtcOffset,
    /// Current file state, protected by mutex.
    state: Mutex<Option<FileState>>,
}

impl RotatingWriter {
    /// Create a new rotating writer, creating the parent directory if needed.
    pub fn new(link_path: &Path, policy: RotationPolicy) -> Result<Self> {
        if let Some(parent) = link_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self {
            link_path: link_path.to_path_buf(),
            policy,
            offset: local_offset(),
            state: Mutex::new(None),
        })
    }

    /// The stable path pointing at the active file.
    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Path of the file currently written to, if one has been opened.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.lock().as_ref().map(|state| state.path.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<FileState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    fn needs_rotation(state: Option<&FileState>, period_start: OffsetDateTime) -> bool {
        state.is_none_or(|state| state.period_start != period_start)
    }

    /// Open the file for the period starting at `period_start`.
    fn rotate(&self, period_start: OffsetDateTime) -> io::Result<FileState> {
        let path = self
            .policy
            .file_path(&self.link_path, period_start)
            .map_err(io::Error::other)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        // link is best effort
        let _ = self.update_link(&path);
        self.prune(&path);

        Ok(FileState {
            file,
            path,
            period_start,
        })
    }

    /// Point the link path at `target`, replacing any previous link atomically.
    #[cfg(unix)]
    fn update_link(&self, target: &Path) -> io::Result<()> {
        let Some(file_name) = target.file_name() else {
            return Ok(());
        };
        let tmp = PathBuf::from(format!("{}_symlink", self.link_path.display()));
        let _ = std::fs::remove_file(&tmp);
        std::os::unix::fs::symlink(file_name, &tmp)?;
        std::fs::rename(&tmp, &self.link_path)
    }

    #[cfg(not(unix))]
    fn update_link(&self, _target: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Remove rotated siblings whose last modification is older than the retention.
    fn prune(&self, active: &Path) {
        let Some(link_name) = self.link_path.file_name().and_then(|n| n.to_str()) else {
            return;
        };
        let dir = match self.link_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let Some(cutoff) = SystemTime::now().checked_sub(self.policy.max_age()) else {
            return;
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !RotationPolicy::is_rotated_name(link_name, name) || entry.path() == active {
                continue;
            }
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .is_ok_and(|modified| modified < cutoff);
            if expired {
                let _ = std::fs::remove_file(entry.path());
            }
        }
    }
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let period_start = self.policy.period_start(self.now());
        let mut guard = self.lock();

        if RotatingWriter::needs_rotation(guard.as_ref(), period_start) {
            // Close current file (drop it)
            *guard = None;
            *guard = Some(self.rotate(period_start)?);
        }

        match guard.as_mut() {
            Some(state) => state.file.write(buf),
            None => Err(io::Error::other("Failed to open log file")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(state) => {
                state.file.flush()?;
                state.file.sync_all()
            }
            None => Ok(()),
        }
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self).flush()
    }
}
