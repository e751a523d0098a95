//! In-memory registry of the shares known for the current server.

use serde::Serialize;

use crate::discovery::ShareName;
use crate::links::LinkFarm;

/// A share and whether it is currently mounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub name: ShareName,
    pub mounted: bool,
}

impl Share {
    /// Create an unmounted share
    pub fn new(name: impl Into<ShareName>) -> Self {
        Self {
            name: name.into(),
            mounted: false,
        }
    }
}

/// Shares from the last discovery pass, in discovery order.
///
/// Names are unique. The registry is replaced wholesale on rediscovery;
/// [`ShareRegistry::preserve_mounted_across_refresh`] is the only way
/// flags survive from one registry to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareRegistry {
    shares: Vec<Share>,
}

impl ShareRegistry {
    /// Build a fresh registry with every share unmounted.
    ///
    /// Repeated names are kept once, at their first position.
    pub fn rebuild<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ShareName>,
    {
        let mut registry = Self::default();
        for name in names {
            let name = name.into();
            if !registry.contains(&name) {
                registry.shares.push(Share::new(name));
            }
        }
        registry
    }

    /// Set each share's `mounted` flag from the link farm.
    pub fn reconcile(mut self, links: &LinkFarm) -> Self {
        for share in &mut self.shares {
            share.mounted = links.exists(&share.name);
        }
        self
    }

    /// Carry `mounted` flags from `old` into `new` for names present in both.
    ///
    /// Names only in `old` are dropped; names only in `new` keep their flag.
    pub fn preserve_mounted_across_refresh(old: &ShareRegistry, mut new: ShareRegistry) -> Self {
        for share in &mut new.shares {
            if let Some(previous) = old.get(&share.name) {
                share.mounted = previous.mounted;
            }
        }
        new
    }

    /// Look up a share by name.
    pub fn get(&self, name: &str) -> Option<&Share> {
        self.shares.iter().find(|s| s.name == name)
    }

    /// Whether `name` is a known share.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All shares in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Share> {
        self.shares.iter()
    }

    /// Share names in discovery order.
    pub fn names(&self) -> Vec<ShareName> {
        self.shares.iter().map(|s| s.name.clone()).collect()
    }

    /// Names of shares flagged as mounted.
    pub fn mounted_names(&self) -> Vec<ShareName> {
        self.shares
            .iter()
            .filter(|s| s.mounted)
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn registry(entries: &[(&str, bool)]) -> ShareRegistry {
        ShareRegistry {
            shares: entries
                .iter()
                .map(|(name, mounted)| Share {
                    name: name.to_string(),
                    mounted: *mounted,
                })
                .collect(),
        }
    }

    #[test]
    fn test_rebuild_all_unmounted_in_order() {
        let r = ShareRegistry::rebuild(["photo", "music"]);
        assert_eq!(r, registry(&[("photo", false), ("music", false)]));
    }

    #[test]
    fn test_rebuild_deduplicates() {
        let r = ShareRegistry::rebuild(["a", "b", "a"]);
        assert_eq!(r.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_rebuild_empty() {
        let r = ShareRegistry::rebuild(Vec::<String>::new());
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
    }

    #[test]
    fn test_preserve_mounted_across_refresh() {
        let old = registry(&[("A", true), ("B", false)]);
        let new = ShareRegistry::rebuild(["A", "C"]);

        let merged = ShareRegistry::preserve_mounted_across_refresh(&old, new);

        assert_eq!(merged, registry(&[("A", true), ("C", false)]));
        assert!(!merged.contains("B"));
    }

    #[test]
    fn test_preserve_does_not_resurrect_unmounted() {
        let old = registry(&[("A", false)]);
        let new = registry(&[("A", true)]);
        let merged = ShareRegistry::preserve_mounted_across_refresh(&old, new);
        assert_eq!(merged.get("A").map(|s| s.mounted), Some(false));
    }

    #[test]
    fn test_reconcile_from_links() {
        let temp = TempDir::new().unwrap();
        let links = LinkFarm::new(temp.path().join("links"));
        links.ensure_root().unwrap();
        let endpoint = temp.path().join("endpoint");
        fs::create_dir(&endpoint).unwrap();
        links.replace("music", &endpoint).unwrap();

        let r = ShareRegistry::rebuild(["photo", "music"]).reconcile(&links);

        assert_eq!(r, registry(&[("photo", false), ("music", true)]));
        assert_eq!(r.mounted_names(), vec!["music"]);
    }

    #[test]
    fn test_reconcile_clears_stale_flags() {
        let temp = TempDir::new().unwrap();
        let links = LinkFarm::new(temp.path());
        let r = registry(&[("photo", true)]).reconcile(&links);
        assert_eq!(r.mounted_names(), Vec::<String>::new());
    }

    #[test]
    fn test_get_and_iter() {
        let r = registry(&[("photo", true), ("music", false)]);
        assert_eq!(r.get("photo").map(|s| s.mounted), Some(true));
        assert!(r.get("video").is_none());
        let names: Vec<_> = r.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["photo", "music"]);
    }

    #[test]
    fn test_share_serializes() {
        let json = serde_json::to_value(Share::new("photo")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "photo", "mounted": false}));
    }
}
