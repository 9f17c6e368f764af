use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

/// Filesystem operations the renamer depends on.
///
/// Implementations must be shareable across threads because renames are
/// dispatched in parallel.
pub trait FileStore: Sync {
    /// Entry names of `folder`, sorted by name. Names are kept as the OS
    /// returns them so non UTF-8 names still point at real files.
    fn list_entries(&self, folder: &Path) -> Result<Vec<OsString>>;
    fn modified_at(&self, path: &Path) -> Result<DateTime<Local>>;
    fn exists(&self, path: &Path) -> bool;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileStore for LocalFs {
    fn list_entries(&self, folder: &Path) -> Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(folder)
            .with_context(|| format!("could not read folder: {}", folder.display()))?
        {
            let entry =
                entry.with_context(|| format!("could not read entry in: {}", folder.display()))?;
            names.push(entry.file_name());
        }
        names.sort();
        tracing::debug!(folder = %folder.display(), count = names.len(), "listed folder");
        Ok(names)
    }

    fn modified_at(&self, path: &Path) -> Result<DateTime<Local>> {
        let time = fs::metadata(path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("could not read modified time: {}", path.display()))?;
        Ok(DateTime::from(time))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::FileStore;
    use anyhow::{anyhow, Result};
    use chrono::{DateTime, Local, TimeZone};
    use std::collections::{BTreeMap, HashSet};
    use std::ffi::OsString;
    use std::io;
    use std::path::Path;
    use std::sync::Mutex;

    /// Single-folder in-memory store keyed by entry name.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        files: Mutex<BTreeMap<String, DateTime<Local>>>,
        failing: HashSet<String>,
        failing_targets: HashSet<String>,
        pub stats: Mutex<usize>,
        pub renames: Mutex<Vec<(String, String)>>,
    }

    pub fn local_date(year: i32, month: u32, day: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("valid local date")
    }

    impl MemoryStore {
        pub fn with_files(files: &[(&str, DateTime<Local>)]) -> Self {
            Self {
                files: Mutex::new(
                    files
                        .iter()
                        .map(|(name, date)| (name.to_string(), *date))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        pub fn failing_on(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }

        pub fn failing_into(mut self, name: &str) -> Self {
            self.failing_targets.insert(name.to_string());
            self
        }

        pub fn names(&self) -> Vec<String> {
            self.files.lock().expect("lock").keys().cloned().collect()
        }
    }

    fn name_of(path: &Path) -> String {
        path.file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    impl FileStore for MemoryStore {
        fn list_entries(&self, _folder: &Path) -> Result<Vec<OsString>> {
            Ok(self.names().into_iter().map(OsString::from).collect())
        }

        fn modified_at(&self, path: &Path) -> Result<DateTime<Local>> {
            *self.stats.lock().expect("lock") += 1;
            self.files
                .lock()
                .expect("lock")
                .get(&name_of(path))
                .copied()
                .ok_or_else(|| anyhow!("no such file: {}", path.display()))
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().expect("lock").contains_key(&name_of(path))
        }

        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            let from_name = name_of(from);
            if self.failing.contains(&from_name) || self.failing_targets.contains(&name_of(to)) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            let mut files = self.files.lock().expect("lock");
            let date = files
                .remove(&from_name)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))?;
            files.insert(name_of(to), date);
            self.renames
                .lock()
                .expect("lock")
                .push((from_name, name_of(to)));
            Ok(())
        }
    }
}
