//! `smbclient` share lister
//!
//! Runs `smbclient -L <server> -N`, the anonymous (no password) listing of a
//! server's shares.

use std::io;

use super::ShareLister;
use crate::process::{self, binary_exists, CommandOutput};

/// Share lister backed by the Samba `smbclient` utility
pub struct SmbclientLister;

impl SmbclientLister {
    /// Create a new smbclient lister
    pub fn new() -> Self {
        Self
    }

    /// Get the binary name for smbclient
    pub fn binary_name() -> &'static str {
        "smbclient"
    }

    /// Check if smbclient is installed
    pub fn is_available(&self) -> bool {
        binary_exists(Self::binary_name())
    }

    /// Arguments for an anonymous listing of `server`
    fn listing_args(server: &str) -> [&str; 3] {
        ["-L", server, "-N"]
    }
}

impl Default for SmbclientLister {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareLister for SmbclientLister {
    fn name(&self) -> &'static str {
        "smbclient"
    }

    fn list(&self, server: &str) -> io::Result<CommandOutput> {
        process::run(Self::binary_name(), &Self::listing_args(server))
    }
}
