//! Mock share lister for testing.
//!
//! Returns canned listing output without running `smbclient`, and records
//! which servers were queried.

use std::io;
use std::sync::{Arc, Mutex};

use super::ShareLister;
use crate::process::CommandOutput;

/// What the mock lister should answer.
#[derive(Debug, Clone)]
pub enum MockListing {
    /// Successful listing with the given stdout.
    Output(String),
    /// Listing exited with the given code and stderr.
    Failure { code: i32, stderr: String },
    /// The command could not be spawned.
    SpawnError(String),
}

impl MockListing {
    /// Successful listing made of the given lines.
    pub fn lines(lines: &[&str]) -> Self {
        MockListing::Output(lines.join("\n"))
    }

    /// Listing that exits non-zero.
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        MockListing::Failure {
            code,
            stderr: stderr.into(),
        }
    }

    /// Listing that cannot be run at all.
    pub fn spawn_error(message: impl Into<String>) -> Self {
        MockListing::SpawnError(message.into())
    }
}

/// Mock share lister.
///
/// Answers with a fixed [`MockListing`], which can be swapped at runtime
/// through [`MockLister::set_listing`] (clones share state), so tests can
/// simulate a server whose share set changes between refreshes.
#[derive(Debug, Clone)]
pub struct MockLister {
    listing: Arc<Mutex<MockListing>>,
    queried: Arc<Mutex<Vec<String>>>,
}

impl MockLister {
    /// Create a mock lister answering with `listing`.
    pub fn new(listing: MockListing) -> Self {
        Self {
            listing: Arc::new(Mutex::new(listing)),
            queried: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replace the canned answer.
    pub fn set_listing(&self, listing: MockListing) {
        if let Ok(mut current) = self.listing.lock() {
            *current = listing;
        }
    }

    /// Servers queried so far, in order.
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl ShareLister for MockLister {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn list(&self, server: &str) -> io::Result<CommandOutput> {
        if let Ok(mut queried) = self.queried.lock() {
            queried.push(server.to_string());
        }

        let listing = self
            .listing
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "mock lister poisoned"))?
            .clone();

        match listing {
            MockListing::Output(stdout) => Ok(CommandOutput {
                success: true,
                code: Some(0),
                stdout,
                stderr: String::new(),
            }),
            MockListing::Failure { code, stderr } => Ok(CommandOutput {
                success: false,
                code: Some(code),
                stdout: String::new(),
                stderr,
            }),
            MockListing::SpawnError(message) => {
                Err(io::Error::new(io::ErrorKind::NotFound, message))
            }
        }
    }
}
