//! Configuration snapshot
//!
//! Every environment variable and config file value the resolver depends on
//! is read once into a `PodsConfig` and handed to components at construction.
//! Nothing below this module touches the process environment.
//!
//! Precedence per value: environment > config file > built-in default.

use crate::error::{PodsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH: &str = "/etc/beampods/config.toml";

pub const ENV_CONFIG: &str = "BEAMPODS_CONFIG";
pub const ENV_PACKAGE_DIR: &str = "NBS_PODS_DIR";
pub const ENV_BEAMLINE_DIR: &str = "BEAMLINE_PODS_DIR";
pub const ENV_BEAMLINE_NAME: &str = "BEAMLINE_NAME";
pub const ENV_DISPLAY_PROTOCOL: &str = "DISPLAY_PROTOCOL";
pub const ENV_WAYLAND_DISPLAY: &str = "WAYLAND_DISPLAY";
pub const ENV_X11_DISPLAY: &str = "DISPLAY";

pub const DEFAULT_X11_SOCKET_DIR: &str = "/tmp/.X11-unix";
const FALLBACK_PACKAGE_DIR: &str = "/usr/share/nbs-pods";

/// Services whose base file depends on the display protocol
pub const DEFAULT_DISPLAY_SERVICES: &[&str] = &["gui", "viewer"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSettings {
    pub fancy: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { fancy: true }
    }
}

#[derive(Debug, Clone)]
pub struct PodsConfig {
    /// nbs-pods distribution directory
    pub package_dir: PathBuf,
    /// Beamline pods directory as configured, possibly relative
    pub beamline_dir: Option<PathBuf>,
    /// Directory relative beamline paths are resolved against
    pub working_dir: PathBuf,
    pub beamline_name: Option<String>,
    pub display_protocol: Option<String>,
    pub wayland_display: Option<String>,
    pub x11_display: Option<String>,
    pub uid: u32,
    /// Holds the Wayland socket, `/run/user/<uid>` by default
    pub runtime_dir: PathBuf,
    pub x11_socket_dir: PathBuf,
    pub display_services: Vec<String>,
    pub ui: UiSettings,
}

impl PodsConfig {
    /// Defaults only: no site tree, no display variables
    pub fn new(package_dir: impl Into<PathBuf>) -> Self {
        let uid = nix::unistd::getuid().as_raw();
        Self {
            package_dir: package_dir.into(),
            beamline_dir: None,
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            beamline_name: None,
            display_protocol: None,
            wayland_display: None,
            x11_display: None,
            uid,
            runtime_dir: runtime_dir_for(uid),
            x11_socket_dir: PathBuf::from(DEFAULT_X11_SOCKET_DIR),
            display_services: DEFAULT_DISPLAY_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ui: UiSettings::default(),
        }
    }

    /// Snapshot the process environment and config file
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let config_path = var(ENV_CONFIG)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
        let file = load_file(&config_path)?;

        let package_dir = var(ENV_PACKAGE_DIR)
            .map(PathBuf::from)
            .or(file.paths.package_dir)
            .unwrap_or_else(default_package_dir);

        let mut cfg = Self::new(package_dir);
        cfg.beamline_dir = var(ENV_BEAMLINE_DIR)
            .map(PathBuf::from)
            .or(file.paths.beamline_dir);
        cfg.beamline_name = var(ENV_BEAMLINE_NAME);
        cfg.display_protocol = var(ENV_DISPLAY_PROTOCOL)
            .or(file.display.protocol.filter(|p| !p.trim().is_empty()));
        cfg.wayland_display = var(ENV_WAYLAND_DISPLAY);
        cfg.x11_display = var(ENV_X11_DISPLAY);
        if let Some(services) = file.compose.display_services {
            cfg.display_services = services;
        }
        if let Some(fancy) = file.ui.fancy {
            cfg.ui.fancy = fancy;
        }
        Ok(cfg)
    }

    pub fn with_beamline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.beamline_dir = Some(dir.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_beamline_name(mut self, name: impl Into<String>) -> Self {
        self.beamline_name = Some(name.into());
        self
    }

    pub fn with_display_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.display_protocol = Some(protocol.into());
        self
    }

    pub fn with_wayland_display(mut self, display: impl Into<String>) -> Self {
        self.wayland_display = Some(display.into());
        self
    }

    pub fn with_x11_display(mut self, display: impl Into<String>) -> Self {
        self.x11_display = Some(display.into());
        self
    }

    /// Also moves the runtime dir to `/run/user/<uid>`
    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = uid;
        self.runtime_dir = runtime_dir_for(uid);
        self
    }

    pub fn with_runtime_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = dir.into();
        self
    }

    pub fn with_x11_socket_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.x11_socket_dir = dir.into();
        self
    }

    pub fn with_display_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.display_services = services.into_iter().map(Into::into).collect();
        self
    }
}

fn runtime_dir_for(uid: u32) -> PathBuf {
    PathBuf::from(format!("/run/user/{}", uid))
}

/// `<prefix>/share/nbs-pods` next to the installed binary
fn default_package_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .map(|prefix| prefix.join("share").join("nbs-pods"))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_PACKAGE_DIR))
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    paths: RawPaths,
    #[serde(default)]
    display: RawDisplay,
    #[serde(default)]
    compose: RawCompose,
    #[serde(default)]
    ui: RawUi,
}

#[derive(Debug, Deserialize, Default)]
struct RawPaths {
    #[serde(default)]
    package_dir: Option<PathBuf>,
    #[serde(default)]
    beamline_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct RawDisplay {
    #[serde(default)]
    protocol: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RawCompose {
    #[serde(default)]
    display_services: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct RawUi {
    #[serde(default)]
    fancy: Option<bool>,
}

fn load_file(path: &Path) -> Result<RawConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(RawConfig::default())
        }
        Err(err) => return Err(err.into()),
    };
    toml::from_str(&raw).map_err(|err| PodsError::Config {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
