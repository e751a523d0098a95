//! Mount endpoint resolution.
//!
//! GVfs exposes each mounted SMB share under the user's runtime directory as
//! `gvfs/smb-share:server=<server>,share=<share>`. Resolution is pure: it
//! never touches the filesystem.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur when resolving an endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The server or share name was empty or not a single path component.
    #[error("invalid argument: {0} must be a non-empty name without '/'")]
    InvalidArgument(&'static str),
}

/// Build the `smb://server/share` URI understood by `gio mount`.
pub fn smb_uri(server: &str, share: &str) -> String {
    format!("smb://{}/{}", server, share)
}

/// Check that a server or share name is usable.
///
/// Both end up as a single path component (the share as a link name under
/// the links root, both inside the GVfs endpoint name), so empty names,
/// `.`, `..`, and names containing `/` or NUL are rejected.
pub fn validate(server: &str, share: &str) -> Result<(), EndpointError> {
    if !is_single_component(server) {
        return Err(EndpointError::InvalidArgument("server"));
    }
    if !is_single_component(share) {
        return Err(EndpointError::InvalidArgument("share"));
    }
    Ok(())
}

fn is_single_component(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\0')
}

/// Maps a (server, share) pair to the path GVfs mounts it at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    runtime_dir: PathBuf,
}

impl EndpointResolver {
    /// Create a resolver rooted at an explicit runtime directory.
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
        }
    }

    /// Create a resolver for the current user.
    ///
    /// Uses `$XDG_RUNTIME_DIR` when set, else `/run/user/<uid>`.
    pub fn for_current_user() -> Self {
        Self::new(dirs::runtime_dir().unwrap_or_else(|| default_runtime_dir(current_uid())))
    }

    /// The runtime directory endpoints are resolved under.
    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    /// Resolve the endpoint for `share` on `server`.
    pub fn resolve(&self, server: &str, share: &str) -> Result<PathBuf, EndpointError> {
        validate(server, share)?;
        Ok(self
            .runtime_dir
            .join("gvfs")
            .join(format!("smb-share:server={},share={}", server, share)))
    }
}

/// `/run/user/<uid>`, the systemd-logind runtime directory for `uid`.
pub fn default_runtime_dir(uid: u32) -> PathBuf {
    PathBuf::from(format!("/run/user/{}", uid))
}

/// Real user id of the running process.
pub fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}
