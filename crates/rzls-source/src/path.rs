//! Path cleaning and platform-aware path identity.
//!
//! `clean_utf8_path` is adapted from the `path-clean` crate,
//! <https://github.com/danreeves/path-clean> (MIT, Copyright (c) 2018 Dan Reeves).

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use camino::Utf8Component;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Serialize;

/// Lexically resolve `.` and `..` segments without touching the file system.
#[must_use]
pub fn clean_utf8_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut out: Vec<Utf8Component<'_>> = Vec::new();

    for comp in path.components() {
        match comp {
            Utf8Component::CurDir => (),
            Utf8Component::ParentDir => match out.last() {
                Some(Utf8Component::RootDir) => (),
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                None
                | Some(
                    Utf8Component::CurDir | Utf8Component::ParentDir | Utf8Component::Prefix(_),
                ) => {
                    out.push(comp);
                }
            },
            comp => out.push(comp),
        }
    }

    if out.is_empty() {
        Utf8PathBuf::from(".")
    } else {
        out.iter().map(Utf8Component::as_str).collect()
    }
}

/// Whether file paths compare case-sensitively on this platform.
///
/// Only Linux file systems are treated as case-sensitive; everything else folds case.
#[must_use]
pub const fn paths_are_case_sensitive() -> bool {
    cfg!(target_os = "linux")
}

/// Normalize separators to `/`, collapse repeated separators and resolve `.`/`..`.
#[must_use]
pub fn normalize_path(path: &str) -> Utf8PathBuf {
    let forward = path.replace('\\', "/");
    let mut collapsed = String::with_capacity(forward.len());
    let mut previous_slash = false;
    for c in forward.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }
    clean_utf8_path(Utf8Path::new(&collapsed))
}

/// A normalized file path whose equality and hashing follow platform case rules.
///
/// The original spelling is kept for display and I/O; comparisons use a folded key
/// on case-insensitive platforms.
#[derive(Clone, Serialize)]
pub struct FilePathKey {
    path: Utf8PathBuf,
    #[serde(skip)]
    key: String,
}

impl FilePathKey {
    #[must_use]
    pub fn new(path: impl AsRef<str>) -> Self {
        Self::with_case_sensitivity(path, paths_are_case_sensitive())
    }

    #[must_use]
    pub fn with_case_sensitivity(path: impl AsRef<str>, case_sensitive: bool) -> Self {
        let path = normalize_path(path.as_ref());
        let key = if case_sensitive {
            path.as_str().to_owned()
        } else {
            path.as_str().to_lowercase()
        };
        Self { path, key }
    }

    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.path.as_str()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Utf8Path> {
        self.path.parent()
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }

    /// Whether `self` lies inside the directory `dir`, honouring case rules.
    #[must_use]
    pub fn starts_with_dir(&self, dir: &FilePathKey) -> bool {
        let dir_key = dir.key.trim_end_matches('/');
        self.key == dir_key
            || (self.key.starts_with(dir_key)
                && self.key.as_bytes().get(dir_key.len()) == Some(&b'/'))
    }
}

impl PartialEq for FilePathKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FilePathKey {}

impl Hash for FilePathKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for FilePathKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilePathKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Debug for FilePathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.path, f)
    }
}

impl fmt::Display for FilePathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

impl From<&str> for FilePathKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&Utf8Path> for FilePathKey {
    fn from(value: &Utf8Path) -> Self {
        Self::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for FilePathKey {
    fn from(value: Utf8PathBuf) -> Self {
        Self::new(value.as_str())
    }
}
