//! Share discovery for SMB servers
//!
//! This module asks a server for the shares it advertises. The actual listing
//! command sits behind the [`ShareLister`] trait so the parsing and fallback
//! logic can be exercised without a network. Discovery never fails: every
//! error path degrades to the configured fallback share list and reports a
//! [`DiscoveryOutcome`] the caller can surface to the user.

use std::fmt;
use std::io;

use tracing::{debug, info, warn};

use crate::process::CommandOutput;

pub mod mock;
mod smbclient;

pub use smbclient::SmbclientLister;

/// Name of a share as returned by discovery (case preserved).
pub type ShareName = String;

/// Trait for share-listing backends
///
/// Implementations run some listing mechanism against a server and hand back
/// its raw output. An `Err` means the command could not be run at all
/// (binary missing, spawn failure); a non-zero exit is reported through
/// [`CommandOutput::success`].
pub trait ShareLister: Send + Sync {
    /// Get the name of this lister
    fn name(&self) -> &'static str;

    /// List the shares of `server` anonymously
    fn list(&self, server: &str) -> io::Result<CommandOutput>;
}

/// How a discovery pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// The server listed at least one disk share.
    Found,
    /// The listing succeeded but no usable disk share was present.
    NoSharesFound,
    /// The listing command failed or could not be run.
    DiscoveryFailed(String),
}

impl DiscoveryOutcome {
    /// Whether the returned share set is the fallback list.
    pub fn used_fallback(&self) -> bool {
        !matches!(self, DiscoveryOutcome::Found)
    }
}

impl fmt::Display for DiscoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryOutcome::Found => write!(f, "shares found"),
            DiscoveryOutcome::NoSharesFound => {
                write!(f, "no shares found, using default shares list")
            }
            DiscoveryOutcome::DiscoveryFailed(reason) => {
                write!(f, "unable to list shares ({}), using default shares list", reason)
            }
        }
    }
}

/// Result of a discovery pass: the share set plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Share names in listing order, or the fallback list
    pub shares: Vec<ShareName>,
    /// How the share set was obtained
    pub outcome: DiscoveryOutcome,
}

/// Queries a server for its disk shares.
pub struct ShareDiscoverer {
    lister: Box<dyn ShareLister>,
    fallback: Vec<ShareName>,
}

impl ShareDiscoverer {
    /// Create a discoverer with the given lister and fallback share list
    pub fn new(lister: Box<dyn ShareLister>, fallback: Vec<ShareName>) -> Self {
        Self { lister, fallback }
    }

    /// The share list used whenever discovery yields nothing usable
    pub fn fallback(&self) -> &[ShareName] {
        &self.fallback
    }

    /// Discover the disk shares advertised by `server`.
    pub fn discover(&self, server: &str) -> Discovery {
        debug!(server = %server, lister = self.lister.name(), "Listing shares");

        let output = match self.lister.list(server) {
            Ok(output) => output,
            Err(e) => {
                warn!(server = %server, error = %e, "Share listing could not run");
                return self.fallback_with(DiscoveryOutcome::DiscoveryFailed(e.to_string()));
            }
        };

        if !output.success {
            let reason = output.failure_reason();
            warn!(server = %server, reason = %reason, "Share listing failed");
            return self.fallback_with(DiscoveryOutcome::DiscoveryFailed(reason));
        }

        let shares = parse_listing(&output.stdout);
        if shares.is_empty() {
            warn!(server = %server, "No disk shares found");
            return self.fallback_with(DiscoveryOutcome::NoSharesFound);
        }

        info!(server = %server, count = shares.len(), "Discovered shares");
        Discovery {
            shares,
            outcome: DiscoveryOutcome::Found,
        }
    }

    fn fallback_with(&self, outcome: DiscoveryOutcome) -> Discovery {
        Discovery {
            shares: self.fallback.clone(),
            outcome,
        }
    }
}

/// Type markers smbclient prints in the column after the share name.
const TYPE_MARKERS: [&str; 4] = ["Disk", "IPC", "Printer", "Device"];

/// Extract disk share names from share-listing output.
///
/// Each share line holds the share name followed by its type marker
/// (`Disk`, `IPC`, `Printer`). Names may contain spaces, so the name is
/// everything before the first marker token. Only `Disk` entries are kept,
/// and any entry whose name carries a `$` (administrative and hidden shares
/// such as `ADMIN$` or `C$`) is dropped. Duplicates are kept once, in
/// first-seen order.
pub fn parse_listing(stdout: &str) -> Vec<ShareName> {
    let mut shares: Vec<ShareName> = Vec::new();

    for line in stdout.lines() {
        let Some((name, kind)) = split_share_line(line) else {
            continue;
        };

        if kind != "Disk" || name.contains('$') {
            continue;
        }

        if !shares.iter().any(|s| s == name) {
            shares.push(name.to_string());
        }
    }

    shares
}

/// Split a listing line into its share name and type marker.
fn split_share_line(line: &str) -> Option<(&str, &str)> {
    let tokens = tokens_with_spans(line);
    let marker = tokens
        .iter()
        .skip(1)
        .position(|(_, _, tok)| TYPE_MARKERS.contains(tok))?
        + 1;

    let start = tokens[0].0;
    let end = tokens[marker - 1].1;
    Some((&line[start..end], tokens[marker].2))
}

/// Whitespace-separated tokens with their byte span in `line`.
fn tokens_with_spans(line: &str) -> Vec<(usize, usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push((s, i, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, line.len(), &line[s..]));
    }

    tokens
}
