//! Per-path file metadata
//!
//! Each result line from `find` is just a path; everything shown in the
//! table is looked up from the file system when the row is built.

use crate::accounts::AccountDirectory;
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// One path discovered by a search, with whatever metadata could be read.
/// Fields that could not be read are `None` rather than zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundEntry {
    pub path: PathBuf,
    pub name: String,
    pub directory: String,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub created: Option<DateTime<Local>>,
    pub accessed: Option<DateTime<Local>>,
    pub modified: Option<DateTime<Local>>,
    pub changed: Option<DateTime<Local>>,
}

impl FoundEntry {
    /// An entry with only the path-derived fields filled in
    pub fn bare(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let directory = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
            Some(_) => ".".to_string(),
            None => path.to_string_lossy().into_owned(),
        };
        Self {
            path,
            name,
            directory,
            is_directory: false,
            size: None,
            owner: None,
            group: None,
            created: None,
            accessed: None,
            modified: None,
            changed: None,
        }
    }
}

/// Resolves a path into a [`FoundEntry`]
pub trait MetadataSource: Sync {
    fn lookup(&self, path: &Path) -> FoundEntry;
}

/// Reads metadata from the real file system
pub struct FsMetadata {
    accounts: AccountDirectory,
}

impl FsMetadata {
    pub fn new(accounts: AccountDirectory) -> Self {
        Self { accounts }
    }
}

impl MetadataSource for FsMetadata {
    fn lookup(&self, path: &Path) -> FoundEntry {
        let mut entry = FoundEntry::bare(path);
        // Links are reported as themselves, matching `find` without -L
        let Ok(meta) = std::fs::symlink_metadata(path) else {
            return entry;
        };

        entry.is_directory = meta.is_dir();
        entry.size = Some(meta.len());
        entry.owner = Some(
            self.accounts
                .user_name(meta.uid())
                .map(str::to_string)
                .unwrap_or_else(|| meta.uid().to_string()),
        );
        entry.group = Some(
            self.accounts
                .group_name(meta.gid())
                .map(str::to_string)
                .unwrap_or_else(|| meta.gid().to_string()),
        );
        entry.created = meta.created().ok().and_then(to_local);
        entry.accessed = meta.accessed().ok().and_then(to_local);
        entry.modified = meta.modified().ok().and_then(to_local);
        entry.changed = change_time(&meta);
        entry
    }
}

/// `None` for times chrono cannot represent; some file systems store them unclamped
fn to_local(time: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(d) => (i64::try_from(d.as_secs()).ok()?, d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            let secs = -i64::try_from(d.as_secs()).ok()?;
            match d.subsec_nanos() {
                0 => (secs, 0),
                n => (secs - 1, 1_000_000_000 - n),
            }
        }
    };
    Local.timestamp_opt(secs, nanos).single()
}

fn change_time(meta: &Metadata) -> Option<DateTime<Local>> {
    let nanos = u32::try_from(meta.ctime_nsec()).ok()?;
    Local.timestamp_opt(meta.ctime(), nanos).single()
}
