//! Filesystem access for the refresh tick.
//!
//! The tick only needs two things from the outside world: the current list of
//! eligible photos, and a way to point the managed link at one of them.
//! [`PhotoStore`] captures exactly that so the tick can run against an
//! in-memory store in tests.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, CURRENT_IMAGE_NAME};

/// Source of eligible photos and owner of the managed link.
pub trait PhotoStore: Send + Sync {
    /// List the eligible photos, freshly enumerated on every call.
    fn list_photos(&self) -> Result<Vec<PathBuf>, Error>;

    /// Point the managed link at `target`.
    ///
    /// Removes any existing link first, then creates the new one. The two
    /// steps are not atomic; a reader may briefly see no link.
    fn replace_link(&self, target: &Path) -> Result<(), Error>;
}

/// Returns true if the file name infers to `image/jpeg`.
///
/// Inference is by extension only; contents are never inspected.
pub fn is_jpeg(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref e) if ["jpg", "jpeg", "jpe"].contains(&e.as_str())
    )
}

/// [`PhotoStore`] backed by two real directories.
#[derive(Debug, Clone)]
pub struct FsStore {
    photos_path: PathBuf,
    link_path: PathBuf,
}

impl FsStore {
    /// Create a store reading from `photos_path` and managing
    /// `current.jpg` inside `static_path`.
    pub fn new(photos_path: impl Into<PathBuf>, static_path: impl AsRef<Path>) -> Self {
        Self {
            photos_path: photos_path.into(),
            link_path: static_path.as_ref().join(CURRENT_IMAGE_NAME),
        }
    }

    /// Path of the managed link.
    pub fn link_path(&self) -> &Path {
        &self.link_path
    }
}

impl PhotoStore for FsStore {
    fn list_photos(&self) -> Result<Vec<PathBuf>, Error> {
        let entries = fs::read_dir(&self.photos_path).map_err(|e| {
            Error::Tick(format!(
                "Failed to list '{}': {}",
                self.photos_path.display(),
                e
            ))
        })?;

        // Follows symlinks so linked-in photos count as regular files
        let photos = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| is_jpeg(p) && p.is_file())
            .collect();
        Ok(photos)
    }

    fn replace_link(&self, target: &Path) -> Result<(), Error> {
        // symlink_metadata so a dangling link is still removed
        if fs::symlink_metadata(&self.link_path).is_ok() {
            match fs::remove_file(&self.link_path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::Tick(format!("Failed to remove symlink: {}", e)));
                }
            }
        }

        let target = if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.photos_path.join(target)
        };
        symlink(&target, &self.link_path)
            .map_err(|e| Error::Tick(format!("Failed to symlink file: {}", e)))
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"\xFF\xD8\xFF").unwrap();
        path
    }

    #[test]
    fn test_is_jpeg() {
        assert!(is_jpeg(Path::new("a.jpg")));
        assert!(is_jpeg(Path::new("b.JPEG")));
        assert!(is_jpeg(Path::new("/x/y/c.jpe")));
        assert!(!is_jpeg(Path::new("c.png")));
        assert!(!is_jpeg(Path::new("jpg")));
        assert!(!is_jpeg(Path::new("notes.jpg.txt")));
    }

    #[test]
    fn test_list_photos_filters_non_jpeg() {
        let photos = tempfile::tempdir().unwrap();
        let statics = tempfile::tempdir().unwrap();
        touch(photos.path(), "a.jpg");
        touch(photos.path(), "b.jpg");
        touch(photos.path(), "c.png");
        fs::create_dir(photos.path().join("album.jpg")).unwrap();

        let store = FsStore::new(photos.path(), statics.path());
        let names: BTreeSet<_> = store
            .list_photos()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        let expected: BTreeSet<_> = ["a.jpg", "b.jpg"].iter().map(|s| s.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_list_photos_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let store = FsStore::new(root.path().join("gone"), root.path());
        assert!(matches!(store.list_photos(), Err(Error::Tick(_))));
    }

    #[test]
    fn test_replace_link_replaces_existing() {
        let photos = tempfile::tempdir().unwrap();
        let statics = tempfile::tempdir().unwrap();
        let a = touch(photos.path(), "a.jpg");
        let b = touch(photos.path(), "b.jpg");

        let store = FsStore::new(photos.path(), statics.path());
        store.replace_link(&a).unwrap();
        store.replace_link(&b).unwrap();

        assert_eq!(fs::read_link(store.link_path()).unwrap(), b);
        assert_eq!(fs::read_dir(statics.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_replace_link_removes_dangling() {
        let photos = tempfile::tempdir().unwrap();
        let statics = tempfile::tempdir().unwrap();
        let a = touch(photos.path(), "a.jpg");
        let b = touch(photos.path(), "b.jpg");

        let store = FsStore::new(photos.path(), statics.path());
        store.replace_link(&a).unwrap();
        fs::remove_file(&a).unwrap();

        store.replace_link(&b).unwrap();
        assert_eq!(fs::read_link(store.link_path()).unwrap(), b);
    }

    #[test]
    fn test_replace_link_relative_target() {
        let photos = tempfile::tempdir().unwrap();
        let statics = tempfile::tempdir().unwrap();
        touch(photos.path(), "a.jpg");

        let store = FsStore::new(photos.path(), statics.path());
        store.replace_link(Path::new("a.jpg")).unwrap();
        assert_eq!(
            fs::read_link(store.link_path()).unwrap(),
            photos.path().join("a.jpg")
        );
    }

    #[test]
    fn test_replace_link_missing_static_dir() {
        let photos = tempfile::tempdir().unwrap();
        let a = touch(photos.path(), "a.jpg");

        let store = FsStore::new(photos.path(), photos.path().join("missing"));
        assert!(matches!(store.replace_link(&a), Err(Error::Tick(_))));
    }
}
