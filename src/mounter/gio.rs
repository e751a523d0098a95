//! GIO/GVfs mount backend
//!
//! Uses `gio mount` to ask the user's GVfs daemon to mount an SMB location.
//! GVfs then exposes it under `$XDG_RUNTIME_DIR/gvfs`.

use std::io;

use super::MountBackend;
use crate::process::{self, binary_exists, CommandOutput};

/// Mount backend driving the `gio` command-line tool
pub struct GioBackend;

impl GioBackend {
    /// Create a new gio backend
    pub fn new() -> Self {
        Self
    }

    /// Get the binary name for gio
    pub fn binary_name() -> &'static str {
        "gio"
    }

    /// Check if gio is installed
    pub fn is_available(&self) -> bool {
        binary_exists(Self::binary_name())
    }

    fn mount_args(uri: &str) -> Vec<&str> {
        vec!["mount", uri]
    }

    fn unmount_args(uri: &str) -> Vec<&str> {
        vec!["mount", "-u", uri]
    }
}

impl Default for GioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MountBackend for GioBackend {
    fn name(&self) -> &'static str {
        "gio"
    }

    fn mount(&self, uri: &str) -> io::Result<CommandOutput> {
        process::run(Self::binary_name(), &Self::mount_args(uri))
    }

    fn unmount(&self, uri: &str) -> io::Result<CommandOutput> {
        process::run(Self::binary_name(), &Self::unmount_args(uri))
    }
}
