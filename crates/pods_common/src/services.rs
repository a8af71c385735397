//! Service discovery
//!
//! Base services come from the package root. Beamline services come from the
//! site root, both directly under `compose/` and under `compose/beamline/`,
//! and never share a name with a base service.
//!
//! Listing is advisory: unreadable directories are treated as empty.

use crate::compose::{BASE_FILE, COMPOSE_DIR};
use crate::config::PodsConfig;
use crate::error::{PodsError, Result};
use crate::fs_probe::FsProbe;
use crate::roots::PathRoots;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Used when the package tree carries no compose directory
pub const BASE_SERVICES: &[&str] = &["bluesky-services", "queueserver", "gui", "sim", "viewer"];

/// Services started by the demo
pub const DEMO_SERVICES: &[&str] = &["bluesky-services", "gui", "queueserver", "sim", "viewer"];

pub const BEAMLINE_SUBDIR: &str = "beamline";

/// `docker-compose*.yml`
fn is_compose_file(name: &str) -> bool {
    name.starts_with("docker-compose") && name.ends_with(".yml")
}

/// Base and beamline services, disjoint and sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceCatalog {
    pub base: BTreeSet<String>,
    pub beamline: BTreeSet<String>,
}

impl ServiceCatalog {
    pub fn contains(&self, name: &str) -> bool {
        self.base.contains(name) || self.beamline.contains(name)
    }

    /// Base services first, then beamline services
    pub fn all(&self) -> Vec<String> {
        self.base.iter().chain(self.beamline.iter()).cloned().collect()
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(PodsError::UnknownService {
                name: name.to_string(),
                available: self.all(),
            })
        }
    }
}

pub struct ServiceDiscovery<'a> {
    roots: PathRoots,
    fs: &'a dyn FsProbe,
}

impl<'a> ServiceDiscovery<'a> {
    pub fn new(cfg: &PodsConfig, fs: &'a dyn FsProbe) -> Self {
        Self {
            roots: PathRoots::from_config(cfg),
            fs,
        }
    }

    pub fn with_roots(roots: PathRoots, fs: &'a dyn FsProbe) -> Self {
        Self { roots, fs }
    }

    pub fn discover_base(&self) -> BTreeSet<String> {
        let compose_dir = self.roots.package_root().join(COMPOSE_DIR);
        let found: BTreeSet<String> = self
            .subdirs(&compose_dir)
            .into_iter()
            .filter(|name| self.has_any_compose_file(&compose_dir.join(name)))
            .collect();

        if found.is_empty() {
            debug!("no base services under {}, using built-in list", compose_dir.display());
            return BASE_SERVICES.iter().map(|s| s.to_string()).collect();
        }
        found
    }

    pub fn discover_beamline(&self) -> BTreeSet<String> {
        self.beamline_excluding(&self.discover_base())
    }

    pub fn catalog(&self) -> ServiceCatalog {
        let base = self.discover_base();
        let beamline = self.beamline_excluding(&base);
        ServiceCatalog { base, beamline }
    }

    fn beamline_excluding(&self, base: &BTreeSet<String>) -> BTreeSet<String> {
        if self.roots.is_demo() {
            return BTreeSet::new();
        }

        let compose_dir = self.roots.site_root().join(COMPOSE_DIR);
        let nested_dir = compose_dir.join(BEAMLINE_SUBDIR);

        let mut services = BTreeSet::new();
        for dir in [&compose_dir, &nested_dir] {
            for name in self.subdirs(dir) {
                if base.contains(&name) {
                    continue;
                }
                if self.fs.exists(&dir.join(&name).join(BASE_FILE)) {
                    services.insert(name);
                }
            }
        }
        services
    }

    /// Immediate subdirectory names; empty when `dir` cannot be listed
    fn subdirs(&self, dir: &Path) -> Vec<String> {
        match self.fs.list_dir(dir) {
            Ok(names) => names
                .into_iter()
                .filter(|name| self.fs.is_dir(&dir.join(name)))
                .collect(),
            Err(err) => {
                debug!("skipping {}: {}", dir.display(), err);
                Vec::new()
            }
        }
    }

    fn has_any_compose_file(&self, service_dir: &Path) -> bool {
        match self.fs.list_dir(service_dir) {
            Ok(names) => names.iter().any(|n| is_compose_file(n)),
            Err(err) => {
                debug!("skipping {}: {}", service_dir.display(), err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_probe::FakeFs;

    fn discovery<'a>(fs: &'a FakeFs, site: Option<&str>) -> ServiceDiscovery<'a> {
        let mut cfg = PodsConfig::new("/pkg");
        if let Some(site) = site {
            cfg = cfg.with_beamline_dir(site);
        }
        ServiceDiscovery::new(&cfg, fs)
    }

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn base_from_package_compose_dir() {
        let fs = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_file("/pkg/compose/gui/docker-compose.wayland.yml")
            .with_file("/pkg/compose/notes/README.md")
            .with_file("/pkg/compose/stray.yml");
        let base = discovery(&fs, None).discover_base();
        assert_eq!(names(&base), vec!["gui", "sim"]);
    }

    #[test]
    fn base_falls_back_to_builtin_list() {
        let fs = FakeFs::new();
        let base = discovery(&fs, None).discover_base();
        assert_eq!(
            names(&base),
            vec!["bluesky-services", "gui", "queueserver", "sim", "viewer"]
        );
    }

    #[test]
    fn unreadable_package_dir_uses_builtin_list() {
        let fs = FakeFs::new().with_unreadable("/pkg/compose");
        assert_eq!(discovery(&fs, None).discover_base().len(), BASE_SERVICES.len());
    }

    #[test]
    fn demo_mode_has_no_beamline_services() {
        let fs = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_file("/pkg/compose/beamline/det/docker-compose.yml");
        assert!(discovery(&fs, None).discover_beamline().is_empty());
        assert!(discovery(&fs, Some("/pkg")).discover_beamline().is_empty());
    }

    #[test]
    fn beamline_merges_top_level_and_nested() {
        let fs = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_file("/pkg/compose/gui/docker-compose.yml")
            .with_file("/site/compose/sim/docker-compose.override.yml")
            .with_file("/site/compose/sim/docker-compose.yml")
            .with_file("/site/compose/motors/docker-compose.yml")
            .with_file("/site/compose/beamline/motors/docker-compose.yml")
            .with_file("/site/compose/beamline/detectors/docker-compose.yml")
            .with_file("/site/compose/beamline/gui/docker-compose.yml")
            .with_file("/site/compose/beamline/scratch/notes.txt");
        let catalog = discovery(&fs, Some("/site")).catalog();
        assert_eq!(names(&catalog.base), vec!["gui", "sim"]);
        assert_eq!(names(&catalog.beamline), vec!["detectors", "motors"]);
        assert!(catalog.base.is_disjoint(&catalog.beamline));
    }

    #[test]
    fn beamline_requires_generic_base_file() {
        let fs = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_file("/site/compose/camera/docker-compose.x11.yml");
        assert!(discovery(&fs, Some("/site")).discover_beamline().is_empty());
    }

    #[test]
    fn unreadable_site_dir_degrades_to_empty() {
        let fs = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_unreadable("/site/compose")
            .with_file("/site/compose/beamline/det/docker-compose.yml");
        // the nested dir is still readable
        assert_eq!(
            names(&discovery(&fs, Some("/site")).discover_beamline()),
            vec!["det"]
        );

        let locked = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_unreadable("/site/compose");
        assert!(discovery(&locked, Some("/site")).discover_beamline().is_empty());
    }

    #[test]
    fn catalog_validation() {
        let fs = FakeFs::new()
            .with_file("/pkg/compose/sim/docker-compose.yml")
            .with_file("/site/compose/beamline/det/docker-compose.yml");
        let catalog = discovery(&fs, Some("/site")).catalog();
        assert_eq!(catalog.all(), vec!["sim", "det"]);
        assert!(catalog.validate("det").is_ok());
        match catalog.validate("foo") {
            Err(PodsError::UnknownService { name, available }) => {
                assert_eq!(name, "foo");
                assert_eq!(available, vec!["sim", "det"]);
            }
            other => panic!("expected UnknownService, got {:?}", other),
        }
    }

    #[test]
    fn compose_file_pattern() {
        assert!(is_compose_file("docker-compose.yml"));
        assert!(is_compose_file("docker-compose.wayland.yml"));
        assert!(!is_compose_file("docker-compose.yaml"));
        assert!(!is_compose_file("compose.yml"));
    }
}
