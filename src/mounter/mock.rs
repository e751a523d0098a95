//! Mock mount backend for testing.
//!
//! Records every request and answers without calling `gio`. It can
//! optionally create and remove endpoint directories under a resolver's
//! runtime directory, standing in for GVfs, and can be told to fail for
//! specific shares.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::sync::{Arc, Mutex};

use super::MountBackend;
use crate::endpoint::EndpointResolver;
use crate::process::CommandOutput;

#[derive(Debug, Default)]
struct MockState {
    mounts: Vec<String>,
    unmounts: Vec<String>,
}

/// Mock mount backend.
///
/// Clones share their call log, so a test can keep one clone and hand the
/// other to a controller.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    materialize: Option<EndpointResolver>,
    mount_failures: HashMap<String, String>,
    unmount_failures: HashMap<String, String>,
    unavailable: bool,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// A backend whose requests all succeed and create no endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create endpoint directories on mount (and remove them on unmount)
    /// under `resolver`'s runtime directory.
    pub fn materializing(mut self, resolver: EndpointResolver) -> Self {
        self.materialize = Some(resolver);
        self
    }

    /// Make mounting `share` fail with `stderr`.
    pub fn failing_mount(mut self, share: &str, stderr: &str) -> Self {
        self.mount_failures
            .insert(share.to_string(), stderr.to_string());
        self
    }

    /// Make unmounting `share` fail with `stderr`.
    pub fn failing_unmount(mut self, share: &str, stderr: &str) -> Self {
        self.unmount_failures
            .insert(share.to_string(), stderr.to_string());
        self
    }

    /// Behave as if the mount utility were not installed.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// URIs passed to `mount`, in call order.
    pub fn mounts(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.mounts.clone())
            .unwrap_or_default()
    }

    /// URIs passed to `unmount`, in call order.
    pub fn unmounts(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.unmounts.clone())
            .unwrap_or_default()
    }

    fn record(&self, uri: &str, unmount: bool) {
        if let Ok(mut state) = self.state.lock() {
            if unmount {
                state.unmounts.push(uri.to_string());
            } else {
                state.mounts.push(uri.to_string());
            }
        }
    }

    fn endpoint_for(&self, uri: &str) -> Option<std::path::PathBuf> {
        let resolver = self.materialize.as_ref()?;
        let (server, share) = split_uri(uri)?;
        resolver.resolve(server, share).ok()
    }

    fn answer(failures: &HashMap<String, String>, uri: &str) -> CommandOutput {
        let share = split_uri(uri).map(|(_, share)| share).unwrap_or_default();
        match failures.get(share) {
            Some(stderr) => CommandOutput {
                success: false,
                code: Some(2),
                stdout: String::new(),
                stderr: stderr.clone(),
            },
            None => CommandOutput {
                success: true,
                code: Some(0),
                ..Default::default()
            },
        }
    }

    fn not_installed() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "gio: command not found")
    }
}

/// Split `smb://server/share` into its parts.
fn split_uri(uri: &str) -> Option<(&str, &str)> {
    uri.strip_prefix("smb://")?.split_once('/')
}

impl MountBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn mount(&self, uri: &str) -> io::Result<CommandOutput> {
        self.record(uri, false);
        if self.unavailable {
            return Err(Self::not_installed());
        }

        let output = Self::answer(&self.mount_failures, uri);
        if output.success {
            if let Some(endpoint) = self.endpoint_for(uri) {
                fs::create_dir_all(endpoint)?;
            }
        }
        Ok(output)
    }

    fn unmount(&self, uri: &str) -> io::Result<CommandOutput> {
        self.record(uri, true);
        if self.unavailable {
            return Err(Self::not_installed());
        }

        let output = Self::answer(&self.unmount_failures, uri);
        if output.success {
            if let Some(endpoint) = self.endpoint_for(uri) {
                if endpoint.exists() {
                    fs::remove_dir_all(endpoint)?;
                }
            }
        }
        Ok(output)
    }
}
