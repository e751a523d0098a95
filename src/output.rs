//! Human and JSON rendering of command results

use serde_json::{json, Value};

use crate::discovery::{Discovery, DiscoveryOutcome};
use crate::links::LinkEntry;
use crate::mounter::{MountOutcome, UnmountError};
use crate::session::{MountResults, UnmountResults};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &Value) {}
}

/// JSON output formatter; only whole documents are printed
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, _message: &str) {}
    fn error(&self, message: &str) {
        eprintln!("{}", json!({"success": false, "error": message}));
    }
    fn warn(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Report a discovery pass; warnings for fallback outcomes.
pub fn report_discovery(out: &dyn OutputFormatter, server: &str, discovery: &Discovery) {
    match discovery.outcome {
        DiscoveryOutcome::Found => out.success(&format!(
            "{} share(s) available on {}",
            discovery.shares.len(),
            server
        )),
        DiscoveryOutcome::NoSharesFound => out.warn(&format!(
            "No shares found on {}. Using default shares list",
            server
        )),
        DiscoveryOutcome::DiscoveryFailed(ref reason) => out.warn(&format!(
            "Unable to list shares on {}: {}. Using default shares list",
            server, reason
        )),
    }
}

/// Report the share list.
pub fn report_shares(
    out: &dyn OutputFormatter,
    server: &str,
    discovery: Option<&Discovery>,
    shares: &[(String, bool)],
) {
    out.print_json(&shares_json(server, discovery, shares));
    for (name, mounted) in shares {
        let mark = if *mounted { "\u{25cf}" } else { "\u{25cb}" };
        let state = if *mounted { "mounted" } else { "not mounted" };
        out.info(&format!("{} {:<20} {}", mark, name, state));
    }
}

/// Report mount results; returns whether every share succeeded.
pub fn report_mounts(out: &dyn OutputFormatter, results: &MountResults) -> bool {
    out.print_json(&mount_results_json(results));
    for (name, result) in results {
        match result {
            Ok(MountOutcome::Linked(_)) => out.success(&format!("{} mounted", name)),
            Ok(MountOutcome::EndpointMissing(endpoint)) => out.warn(&format!(
                "{} mounted, but {} is not available yet; run refresh to link it",
                name,
                endpoint.display()
            )),
            Err(e) => out.error(&format!("{}: {}", name, e)),
        }
    }
    results.iter().all(|(_, r)| r.is_ok())
}

/// Report unmount results; returns whether every share succeeded.
pub fn report_unmounts(out: &dyn OutputFormatter, results: &UnmountResults) -> bool {
    out.print_json(&unmount_results_json(results));
    if results.is_empty() {
        out.info("Nothing to unmount");
    }
    for (name, result) in results {
        match result {
            Ok(()) => out.success(&format!("{} unmounted", name)),
            Err(e) => {
                out.error(&format!("{}: {}", name, e));
                if let Some(reason) = backend_error(e) {
                    out.error(&format!("{}: unmount failed: {}", name, reason));
                }
            }
        }
    }
    results.iter().all(|(_, r)| r.is_ok())
}

/// Report the contents of the link farm.
pub fn report_links(out: &dyn OutputFormatter, entries: &[LinkEntry]) {
    out.print_json(&links_json(entries));
    if entries.is_empty() {
        out.info("No links");
    }
    for entry in entries {
        let line = format!("{} -> {}", entry.name, entry.target.display());
        if entry.dangling {
            out.warn(&format!("{} (dangling)", line));
        } else {
            out.info(&line);
        }
    }
}

fn outcome_json(outcome: &DiscoveryOutcome) -> Value {
    match outcome {
        DiscoveryOutcome::Found => json!({"status": "found"}),
        DiscoveryOutcome::NoSharesFound => json!({"status": "no_shares_found"}),
        DiscoveryOutcome::DiscoveryFailed(reason) => {
            json!({"status": "discovery_failed", "reason": reason})
        }
    }
}

pub fn shares_json(server: &str, discovery: Option<&Discovery>, shares: &[(String, bool)]) -> Value {
    let list: Vec<Value> = shares
        .iter()
        .map(|(name, mounted)| json!({"name": name, "mounted": mounted}))
        .collect();
    let mut value = json!({"server": server, "shares": list});
    if let Some(discovery) = discovery {
        value["discovery"] = outcome_json(&discovery.outcome);
    }
    value
}

pub fn mount_results_json(results: &MountResults) -> Value {
    let list: Vec<Value> = results
        .iter()
        .map(|(name, result)| match result {
            Ok(MountOutcome::Linked(endpoint)) => json!({
                "share": name,
                "success": true,
                "linked": true,
                "endpoint": endpoint.display().to_string(),
            }),
            Ok(MountOutcome::EndpointMissing(endpoint)) => json!({
                "share": name,
                "success": true,
                "linked": false,
                "endpoint": endpoint.display().to_string(),
            }),
            Err(e) => json!({"share": name, "success": false, "error": e.to_string()}),
        })
        .collect();
    json!({"results": list})
}

/// Unmount-utility failure hidden behind a link removal error
fn backend_error(err: &UnmountError) -> Option<&str> {
    match err {
        UnmountError::LinkIo {
            backend: Some(reason),
            ..
        } => Some(reason),
        _ => None,
    }
}

pub fn unmount_results_json(results: &UnmountResults) -> Value {
    let list: Vec<Value> = results
        .iter()
        .map(|(name, result)| match result {
            Ok(()) => json!({"share": name, "success": true}),
            Err(e) => {
                let mut value = json!({"share": name, "success": false, "error": e.to_string()});
                if let Some(reason) = backend_error(e) {
                    value["backend_error"] = json!(reason);
                }
                value
            }
        })
        .collect();
    json!({"results": list})
}

pub fn links_json(entries: &[LinkEntry]) -> Value {
    let list: Vec<Value> = entries
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "target": e.target.display().to_string(),
                "dangling": e.dangling,
            })
        })
        .collect();
    json!({"links": list})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mounter::MountError;
    use std::path::PathBuf;

    #[test]
    fn test_shares_json() {
        let discovery = Discovery {
            shares: vec!["photo".into()],
            outcome: DiscoveryOutcome::DiscoveryFailed("timeout".into()),
        };
        let value = shares_json(
            "lagrange",
            Some(&discovery),
            &[("photo".to_string(), true)],
        );
        assert_eq!(value["server"], "lagrange");
        assert_eq!(value["shares"][0]["name"], "photo");
        assert_eq!(value["shares"][0]["mounted"], true);
        assert_eq!(value["discovery"]["status"], "discovery_failed");
        assert_eq!(value["discovery"]["reason"], "timeout");
    }

    #[test]
    fn test_shares_json_without_discovery() {
        let value = shares_json("lagrange", None, &[]);
        assert!(value.get("discovery").is_none());
    }

    #[test]
    fn test_mount_results_json_preserves_order() {
        let results: MountResults = vec![
            ("A".into(), Ok(MountOutcome::Linked(PathBuf::from("/rt/a")))),
            ("B".into(), Err(MountError::Backend("denied".into()))),
            ("C".into(), Ok(MountOutcome::EndpointMissing(PathBuf::from("/rt/c")))),
        ];
        let value = mount_results_json(&results);
        let list = value["results"].as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["share"], "A");
        assert_eq!(list[0]["linked"], true);
        assert_eq!(list[1]["success"], false);
        assert_eq!(list[1]["error"], "mount failed: denied");
        assert_eq!(list[2]["linked"], false);
    }

    #[test]
    fn test_unmount_results_json() {
        let results: UnmountResults = vec![
            ("A".into(), Ok(())),
            ("B".into(), Err(UnmountError::Backend("busy".into()))),
        ];
        let value = unmount_results_json(&results);
        assert_eq!(value["results"][0]["success"], true);
        assert_eq!(value["results"][1]["error"], "unmount failed: busy");
    }

    #[test]
    fn test_unmount_results_json_carries_backend_error() {
        let results: UnmountResults = vec![(
            "photo".into(),
            Err(UnmountError::LinkIo {
                path: PathBuf::from("/links/photo"),
                source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "not a symlink"),
                backend: Some("gio: Not mounted".into()),
            }),
        )];
        let value = unmount_results_json(&results);
        assert_eq!(value["results"][0]["success"], false);
        assert_eq!(value["results"][0]["backend_error"], "gio: Not mounted");
        assert!(!report_unmounts(&JsonFormatter, &results));
    }

    #[test]
    fn test_unmount_results_json_without_backend_error() {
        let results: UnmountResults = vec![("A".into(), Err(UnmountError::Backend("busy".into())))];
        let value = unmount_results_json(&results);
        assert!(value["results"][0].get("backend_error").is_none());
    }

    #[test]
    fn test_report_mounts_all_ok() {
        let ok: MountResults = vec![("A".into(), Ok(MountOutcome::Linked(PathBuf::from("/a"))))];
        assert!(report_mounts(&JsonFormatter, &ok));

        let failed: MountResults = vec![("A".into(), Err(MountError::Backend("x".into())))];
        assert!(!report_mounts(&JsonFormatter, &failed));
    }

    #[test]
    fn test_links_json() {
        let entries = vec![LinkEntry {
            name: "photo".into(),
            target: PathBuf::from("/rt/gvfs/x"),
            dangling: true,
        }];
        let value = links_json(&entries);
        assert_eq!(value["links"][0]["dangling"], true);
        assert_eq!(value["links"][0]["target"], "/rt/gvfs/x");
    }
}
