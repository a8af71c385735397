//! Docker compose file resolution and chaining
//!
//! A chain is at most three files, in this order:
//! base (or its display variant), override, development.
//! Each layer is looked up independently, site root first.

use crate::config::PodsConfig;
use crate::display::{DisplayProtocol, DisplayProtocolDetector};
use crate::error::{PodsError, Result};
use crate::fs_probe::FsProbe;
use crate::roots::{PathRoots, RootKind};
use crate::COMPOSE_FILE_SEPARATOR;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const COMPOSE_DIR: &str = "compose";
pub const BASE_FILE: &str = "docker-compose.yml";
pub const OVERRIDE_FILE: &str = "docker-compose.override.yml";
pub const DEVELOPMENT_FILE: &str = "docker-compose.development.yml";

pub fn display_variant_file(protocol: &DisplayProtocol) -> String {
    format!("docker-compose.{}.yml", protocol.as_str())
}

/// Position of a file in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeLayer {
    Base,
    DisplayVariant,
    Override,
    Development,
}

impl ComposeLayer {
    pub fn label(&self) -> &'static str {
        match self {
            ComposeLayer::Base => "base",
            ComposeLayer::DisplayVariant => "display",
            ComposeLayer::Override => "override",
            ComposeLayer::Development => "development",
        }
    }

    /// Slot in the chain; base and display variant share the first one
    pub fn slot(&self) -> u8 {
        match self {
            ComposeLayer::Base | ComposeLayer::DisplayVariant => 0,
            ComposeLayer::Override => 1,
            ComposeLayer::Development => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub layer: ComposeLayer,
    pub root: RootKind,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedChain {
    pub service: String,
    pub dev_mode: bool,
    /// Protocol consulted for display-dependent services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_protocol: Option<DisplayProtocol>,
    pub entries: Vec<ChainEntry>,
}

impl ResolvedChain {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn layer(&self, layer: ComposeLayer) -> Option<&ChainEntry> {
        self.entries.iter().find(|e| e.layer == layer)
    }

    /// Value for the COMPOSE_FILE variable
    pub fn compose_file_value(&self) -> String {
        self.paths()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(COMPOSE_FILE_SEPARATOR)
    }
}

pub struct ComposeFileResolver<'a> {
    roots: PathRoots,
    fs: &'a dyn FsProbe,
    display: DisplayProtocolDetector<'a>,
    display_services: Vec<String>,
}

impl<'a> ComposeFileResolver<'a> {
    pub fn new(cfg: &PodsConfig, fs: &'a dyn FsProbe) -> Self {
        Self {
            roots: PathRoots::from_config(cfg),
            fs,
            display: DisplayProtocolDetector::new(cfg, fs),
            display_services: cfg.display_services.clone(),
        }
    }

    pub fn roots(&self) -> &PathRoots {
        &self.roots
    }

    pub fn is_display_service(&self, service: &str) -> bool {
        self.display_services.iter().any(|s| s == service)
    }

    pub fn resolve_chain(&self, service: &str, dev_mode: bool) -> Result<ResolvedChain> {
        let mut display_protocol = None;
        let mut entries = Vec::with_capacity(3);

        let base = if self.is_display_service(service) {
            let protocol = self.display.detect();
            info!("Detected display protocol: {}", protocol);
            let variant = self
                .find(service, &display_variant_file(&protocol), ComposeLayer::DisplayVariant);
            display_protocol = Some(protocol);
            variant.or_else(|| self.find(service, BASE_FILE, ComposeLayer::Base))
        } else {
            self.find(service, BASE_FILE, ComposeLayer::Base)
        };
        entries.push(base.ok_or_else(|| PodsError::MissingBaseFile(service.to_string()))?);

        if let Some(entry) = self.find(service, OVERRIDE_FILE, ComposeLayer::Override) {
            entries.push(entry);
        }

        if dev_mode {
            if let Some(entry) = self.find(service, DEVELOPMENT_FILE, ComposeLayer::Development) {
                entries.push(entry);
            }
        }

        let chain = ResolvedChain {
            service: service.to_string(),
            dev_mode,
            display_protocol,
            entries,
        };
        info!("{}: {}", service, chain.compose_file_value());
        Ok(chain)
    }

    fn find(&self, service: &str, file_name: &str, layer: ComposeLayer) -> Option<ChainEntry> {
        let relative = Path::new(COMPOSE_DIR).join(service).join(file_name);
        self.roots
            .locate(self.fs, &relative)
            .map(|found| ChainEntry {
                layer,
                root: found.root,
                path: found.path,
            })
    }
}
