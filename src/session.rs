//! The command API the CLI (or any other front end) drives.
//!
//! A [`Session`] holds the server, the share registry and the components
//! acting on them. Changing the server rebuilds everything; nothing is
//! carried over from the previous server.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::discovery::{Discovery, ShareDiscoverer, ShareLister, ShareName, SmbclientLister};
use crate::links::LinkFarm;
use crate::mounter::{
    GioBackend, MountBackend, MountController, MountError, MountOutcome, UnmountError,
};
use crate::registry::ShareRegistry;

/// Mode applied to the credentials directory
const CREDENTIALS_DIR_MODE: u32 = 0o700;

/// Errors from session-level operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no server selected")]
    NoServer,

    #[error("server name must not be empty")]
    EmptyServer,

    #[error("failed to prepare {path}: {source}")]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Per-share results of a mount batch, in request order
pub type MountResults = Vec<(ShareName, Result<MountOutcome, MountError>)>;

/// Per-share results of an unmount batch, in request order
pub type UnmountResults = Vec<(ShareName, Result<(), UnmountError>)>;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoServer,
    ServerSet,
    SharesDiscovered,
    Mounting,
    Unmounting,
}

/// One user's view of one server's shares.
pub struct Session {
    server: Option<String>,
    registry: ShareRegistry,
    state: SessionState,
    discoverer: ShareDiscoverer,
    controller: MountController,
    credentials_dir: PathBuf,
}

impl Session {
    /// Create a session using the given lister and mount backend
    pub fn new(
        config: &Config,
        lister: Box<dyn ShareLister>,
        backend: Box<dyn MountBackend>,
    ) -> Self {
        let discoverer = ShareDiscoverer::new(lister, config.effective_fallback_shares());
        let controller = MountController::new(
            backend,
            config.endpoint_resolver(),
            LinkFarm::new(config.effective_links_dir()),
        );

        Self {
            server: None,
            registry: ShareRegistry::default(),
            state: SessionState::NoServer,
            discoverer,
            controller,
            credentials_dir: config.effective_credentials_dir(),
        }
    }

    /// Create a session backed by `smbclient` and `gio`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            Box::new(SmbclientLister::new()),
            Box::new(GioBackend::new()),
        )
    }

    /// The current server, if one is set
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn registry(&self) -> &ShareRegistry {
        &self.registry
    }

    pub fn links(&self) -> &LinkFarm {
        self.controller.links()
    }

    /// Select `name` as the server and discover its shares.
    ///
    /// All previous share state is discarded. The links root and the
    /// credentials directory are created if missing.
    pub fn set_server(&mut self, name: &str) -> SessionResult<Discovery> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyServer);
        }

        self.setup_directories()?;

        info!(server = %name, "Server selected");
        self.server = Some(name.to_string());
        self.registry = ShareRegistry::default();
        self.state = SessionState::ServerSet;

        let discovery = self.discoverer.discover(name);
        self.registry = ShareRegistry::rebuild(discovery.shares.iter().cloned())
            .reconcile(self.controller.links());
        self.state = SessionState::SharesDiscovered;

        Ok(discovery)
    }

    /// Shares and their mounted flags, in discovery order.
    pub fn list_shares(&self) -> Vec<(ShareName, bool)> {
        self.registry
            .iter()
            .map(|s| (s.name.clone(), s.mounted))
            .collect()
    }

    /// Re-derive every mounted flag from the link farm.
    pub fn reconcile(&mut self) {
        let registry = std::mem::take(&mut self.registry);
        self.registry = registry.reconcile(self.controller.links());
    }

    /// Mount each share in turn. A failure never stops the batch.
    pub fn mount_many<I, S>(&mut self, names: I) -> SessionResult<MountResults>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let server = self.require_server()?;
        self.state = SessionState::Mounting;

        let mut results = Vec::new();
        for name in names {
            let name = name.as_ref();
            self.note_unknown(name);
            let result = self.controller.mount(&server, name);
            if let Err(ref e) = result {
                warn!(share = %name, error = %e, "Share not mounted");
            }
            results.push((name.to_string(), result));
        }

        self.reconcile();
        self.state = SessionState::SharesDiscovered;
        Ok(results)
    }

    /// Unmount each share in turn. A failure never stops the batch.
    pub fn unmount_many<I, S>(&mut self, names: I) -> SessionResult<UnmountResults>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let server = self.require_server()?;
        self.state = SessionState::Unmounting;

        let mut results = Vec::new();
        for name in names {
            let name = name.as_ref();
            self.note_unknown(name);
            let result = self.controller.unmount(&server, name);
            if let Err(ref e) = result {
                warn!(share = %name, error = %e, "Share not cleanly unmounted");
            }
            results.push((name.to_string(), result));
        }

        self.reconcile();
        self.state = SessionState::SharesDiscovered;
        Ok(results)
    }

    /// Unmount every share whose link currently resolves.
    pub fn unmount_all(&mut self) -> SessionResult<UnmountResults> {
        self.require_server()?;
        self.reconcile();
        let mounted = self.registry.mounted_names();
        debug!(count = mounted.len(), "Unmounting all mounted shares");
        self.unmount_many(mounted)
    }

    /// Rediscover shares on the current server.
    ///
    /// Shares present before and after keep their mounted flag; new shares
    /// start unmounted and vanished ones are dropped.
    pub fn refresh(&mut self) -> SessionResult<Discovery> {
        let server = self.require_server()?;

        let discovery = self.discoverer.discover(&server);
        let fresh = ShareRegistry::rebuild(discovery.shares.iter().cloned());
        self.registry = ShareRegistry::preserve_mounted_across_refresh(&self.registry, fresh);
        self.state = SessionState::SharesDiscovered;

        info!(server = %server, count = self.registry.len(), "Shares refreshed");
        Ok(discovery)
    }

    fn require_server(&self) -> SessionResult<String> {
        self.server.clone().ok_or(SessionError::NoServer)
    }

    fn note_unknown(&self, name: &str) {
        if !self.registry.contains(name) {
            debug!(share = %name, "Share not in discovered list, trying anyway");
        }
    }

    fn setup_directories(&self) -> SessionResult<()> {
        let links_root = self.controller.links().root();
        self.controller
            .links()
            .ensure_root()
            .map_err(|source| setup_error(links_root, source))?;

        fs::create_dir_all(&self.credentials_dir)
            .and_then(|()| {
                fs::set_permissions(
                    &self.credentials_dir,
                    fs::Permissions::from_mode(CREDENTIALS_DIR_MODE),
                )
            })
            .map_err(|source| setup_error(&self.credentials_dir, source))?;

        Ok(())
    }
}

fn setup_error(path: &Path, source: io::Error) -> SessionError {
    SessionError::Setup {
        path: path.to_path_buf(),
        source,
    }
}
