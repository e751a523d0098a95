//! The link farm: one symlink per mounted share.
//!
//! A [`LinkFarm`] owns a directory of symlinks named after shares, each
//! pointing at the share's mount endpoint. It never touches mount state.
//! Whether a link resolves is the signal the rest of the crate uses to
//! decide that a share is mounted.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::debug;

/// A symlink found in the farm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Link file name (the share name)
    pub name: String,
    /// Where the link points
    pub target: PathBuf,
    /// Whether the target no longer exists
    pub dangling: bool,
}

/// Directory of share symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFarm {
    root: PathBuf,
}

impl LinkFarm {
    /// Create a link farm rooted at `root`. Nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The links root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the links root if missing.
    pub fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    /// Path of the link for `share`.
    pub fn link_path(&self, share: &str) -> PathBuf {
        self.root.join(share)
    }

    /// Whether the link for `share` exists and resolves.
    ///
    /// A dangling link (endpoint gone) counts as absent.
    pub fn exists(&self, share: &str) -> bool {
        let path = self.link_path(share);
        is_symlink(&path) && path.exists()
    }

    /// Point the link for `share` at `target`, replacing any previous link.
    ///
    /// The new link is created under a temporary name and renamed over the
    /// old one, so the link path always holds either the old or the new
    /// link. A non-symlink file at the link path is never clobbered.
    pub fn replace(&self, share: &str, target: &Path) -> io::Result<()> {
        let path = self.link_path(share);

        if let Ok(meta) = fs::symlink_metadata(&path) {
            if !meta.file_type().is_symlink() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a symlink", path.display()),
                ));
            }
        }

        let staging = self.staging_path(share);
        remove_if_present(&staging)?;
        symlink(target, &staging)?;

        if let Err(e) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        debug!(link = %path.display(), target = %target.display(), "Link replaced");
        Ok(())
    }

    /// Remove the link for `share`. Missing links are not an error.
    ///
    /// Only symlinks are removed. Anything else at the path is left alone
    /// and reported as `AlreadyExists`.
    pub fn remove(&self, share: &str) -> io::Result<()> {
        let path = self.link_path(share);
        match fs::symlink_metadata(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
            Ok(meta) if !meta.file_type().is_symlink() => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a symlink", path.display()),
                ));
            }
            Ok(_) => {}
        }
        remove_if_present(&path)?;
        debug!(link = %path.display(), "Link removed");
        Ok(())
    }

    /// All share links currently in the farm, sorted by name.
    ///
    /// A missing links root yields an empty list.
    pub fn entries(&self) -> io::Result<Vec<LinkEntry>> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.file_type()?.is_symlink() {
                continue;
            }
            let path = entry.path();
            let target = fs::read_link(&path)?;
            entries.push(LinkEntry {
                name,
                target,
                dangling: !path.exists(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn staging_path(&self, share: &str) -> PathBuf {
        self.root
            .join(format!(".{}.smblinks-tmp.{}", share, std::process::id()))
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
