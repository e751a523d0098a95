//! Mount orchestration
//!
//! The [`MountController`] is the only component that changes system mount
//! state. It asks a [`MountBackend`] to mount or unmount `smb://server/share`
//! and keeps the link farm in step with the result.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::endpoint::{self, EndpointError, EndpointResolver};
use crate::links::LinkFarm;
use crate::process::CommandOutput;

mod gio;
pub mod mock;

pub use gio::GioBackend;

/// Errors from a mount request.
#[derive(Debug, Error)]
pub enum MountError {
    /// The mount utility failed; carries its error output.
    #[error("mount failed: {0}")]
    Backend(String),

    /// The share was mounted but its link could not be written.
    #[error("mounted, but link {path} could not be created: {source}")]
    LinkIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The server or share name is unusable.
    #[error(transparent)]
    InvalidShare(#[from] EndpointError),
}

/// Errors from an unmount request.
///
/// The link is always gone by the time either error is reported.
#[derive(Debug, Error)]
pub enum UnmountError {
    /// The unmount utility failed; carries its error output.
    #[error("unmount failed: {0}")]
    Backend(String),

    /// The link could not be removed. The unmount was still attempted;
    /// `backend` holds its error output if it failed too.
    #[error("link {path} could not be removed: {source}")]
    LinkIo {
        path: PathBuf,
        #[source]
        source: io::Error,
        backend: Option<String>,
    },

    /// The server or share name is unusable.
    #[error(transparent)]
    InvalidShare(#[from] EndpointError),
}

/// What a successful mount left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    /// The endpoint was present and the link now points at it.
    Linked(PathBuf),
    /// The mount succeeded but the endpoint had not appeared yet, so no
    /// link was created.
    EndpointMissing(PathBuf),
}

/// Trait for OS-level network mount mechanisms
///
/// `Err` means the utility could not be run; a refusal is reported through
/// [`CommandOutput::success`].
pub trait MountBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Request a mount of `uri` (`smb://server/share`)
    fn mount(&self, uri: &str) -> io::Result<CommandOutput>;

    /// Request an unmount of `uri`
    fn unmount(&self, uri: &str) -> io::Result<CommandOutput>;
}

/// Runs mount/unmount requests and maintains their links.
pub struct MountController {
    backend: Box<dyn MountBackend>,
    resolver: EndpointResolver,
    links: LinkFarm,
}

impl MountController {
    /// Create a controller over the given backend, resolver and link farm
    pub fn new(backend: Box<dyn MountBackend>, resolver: EndpointResolver, links: LinkFarm) -> Self {
        Self {
            backend,
            resolver,
            links,
        }
    }

    /// The link farm this controller writes to
    pub fn links(&self) -> &LinkFarm {
        &self.links
    }

    /// The endpoint resolver in use
    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Mount `share` from `server` and link it.
    ///
    /// If the endpoint does not exist once the mount request returns, the
    /// mount is still reported as successful but no link is made.
    pub fn mount(&self, server: &str, share: &str) -> Result<MountOutcome, MountError> {
        let endpoint = self.resolver.resolve(server, share)?;
        let uri = endpoint::smb_uri(server, share);

        info!(uri = %uri, backend = self.backend.name(), "Mounting share");
        let output = self
            .backend
            .mount(&uri)
            .map_err(|e| MountError::Backend(e.to_string()))?;
        if !output.success {
            let reason = output.failure_reason();
            warn!(uri = %uri, reason = %reason, "Mount failed");
            return Err(MountError::Backend(reason));
        }

        if !endpoint.exists() {
            warn!(
                endpoint = %endpoint.display(),
                "Mounted, but endpoint has not appeared; no link created"
            );
            return Ok(MountOutcome::EndpointMissing(endpoint));
        }

        self.links
            .replace(share, &endpoint)
            .map_err(|source| MountError::LinkIo {
                path: self.links.link_path(share),
                source,
            })?;

        info!(share = %share, link = %self.links.link_path(share).display(), "Share linked");
        Ok(MountOutcome::Linked(endpoint))
    }

    /// Remove the link for `share`, then unmount it.
    ///
    /// The link is removed before the unmount request and is not restored if
    /// that request fails.
    pub fn unmount(&self, server: &str, share: &str) -> Result<(), UnmountError> {
        endpoint::validate(server, share)?;
        let uri = endpoint::smb_uri(server, share);

        let link_result = self.links.remove(share);
        if let Err(ref e) = link_result {
            warn!(share = %share, error = %e, "Could not remove link");
        }

        info!(uri = %uri, backend = self.backend.name(), "Unmounting share");
        let backend_result = match self.backend.unmount(&uri) {
            Ok(output) if output.success => Ok(()),
            Ok(output) => Err(output.failure_reason()),
            Err(e) => Err(e.to_string()),
        };

        if let Err(ref reason) = backend_result {
            warn!(uri = %uri, reason = %reason, "Unmount failed");
        }

        if let Err(source) = link_result {
            return Err(UnmountError::LinkIo {
                path: self.links.link_path(share),
                source,
                backend: backend_result.err(),
            });
        }

        backend_result.map_err(UnmountError::Backend)?;

        debug!(share = %share, "Share unmounted");
        Ok(())
    }
}
