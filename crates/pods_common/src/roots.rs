//! Package and site roots
//!
//! The package root ships with nbs-pods. The site root is the beamline's own
//! pods tree; when none is configured it is the package root itself and the
//! installation runs in demo mode.
//!
//! Both roots are made absolute against the configured working directory.
//! Lookups go through `PathRoots::locate`, which checks the site root first
//! and falls back to the package root.

use crate::config::PodsConfig;
use crate::fs_probe::FsProbe;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Which root satisfied a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    Site,
    Package,
}

impl RootKind {
    pub fn label(&self) -> &'static str {
        match self {
            RootKind::Site => "site",
            RootKind::Package => "package",
        }
    }
}

/// A path found under one of the roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Located {
    pub root: RootKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRoots {
    package: PathBuf,
    site: PathBuf,
}

impl PathRoots {
    pub fn new(package: impl Into<PathBuf>, site: Option<PathBuf>, working_dir: &Path) -> Self {
        let package = absolutize(&package.into(), working_dir);
        let site = match site {
            Some(dir) => absolutize(&dir, working_dir),
            None => package.clone(),
        };
        Self { package, site }
    }

    pub fn from_config(cfg: &PodsConfig) -> Self {
        Self::new(
            cfg.package_dir.clone(),
            cfg.beamline_dir.clone(),
            &cfg.working_dir,
        )
    }

    pub fn package_root(&self) -> &Path {
        &self.package
    }

    pub fn site_root(&self) -> &Path {
        &self.site
    }

    /// Site and package roots coincide
    pub fn is_demo(&self) -> bool {
        self.site == self.package
    }

    /// Roots to search, highest precedence first; demo mode yields one
    pub fn search_order(&self) -> Vec<(RootKind, &Path)> {
        if self.is_demo() {
            vec![(RootKind::Package, self.package.as_path())]
        } else {
            vec![
                (RootKind::Site, self.site.as_path()),
                (RootKind::Package, self.package.as_path()),
            ]
        }
    }

    /// First existing `<root>/<relative>` in search order
    pub fn locate(&self, fs: &dyn FsProbe, relative: &Path) -> Option<Located> {
        for (root, dir) in self.search_order() {
            let candidate = dir.join(relative);
            debug!("checking {} file: {}", root.label(), candidate.display());
            if fs.exists(&candidate) {
                return Some(Located {
                    root,
                    path: candidate,
                });
            }
        }
        None
    }
}

/// Join onto `base` when relative and fold `.`/`..` lexically
fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
