//! Display protocol detection for GUI services
//!
//! Order, first match wins:
//! 1. Explicit override (DISPLAY_PROTOCOL), returned verbatim
//! 2. WAYLAND_DISPLAY, only when `<runtime_dir>/<name>` is a live socket
//!    (an absolute name is taken as the socket path itself)
//! 3. DISPLAY, only when `<x11_socket_dir>/X<n>` is a live socket
//! 4. x11
//!
//! Nothing is cached; every call probes again.

use crate::config::PodsConfig;
use crate::fs_probe::FsProbe;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayProtocol {
    Wayland,
    X11,
    /// Unrecognised override, passed through as an opaque tag
    Other(String),
}

impl DisplayProtocol {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "wayland" => DisplayProtocol::Wayland,
            "x11" => DisplayProtocol::X11,
            other => DisplayProtocol::Other(other.to_string()),
        }
    }

    /// Tag used in `docker-compose.<tag>.yml`
    pub fn as_str(&self) -> &str {
        match self {
            DisplayProtocol::Wayland => "wayland",
            DisplayProtocol::X11 => "x11",
            DisplayProtocol::Other(tag) => tag,
        }
    }
}

impl fmt::Display for DisplayProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DisplayProtocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which rule decided the protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionSource {
    Override,
    WaylandSocket { socket: PathBuf },
    X11Socket { socket: PathBuf },
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub protocol: DisplayProtocol,
    pub source: DetectionSource,
}

pub struct DisplayProtocolDetector<'a> {
    fs: &'a dyn FsProbe,
    protocol_override: Option<String>,
    wayland_display: Option<String>,
    x11_display: Option<String>,
    runtime_dir: PathBuf,
    x11_socket_dir: PathBuf,
}

impl<'a> DisplayProtocolDetector<'a> {
    pub fn new(cfg: &PodsConfig, fs: &'a dyn FsProbe) -> Self {
        Self {
            fs,
            protocol_override: cfg.display_protocol.clone(),
            wayland_display: cfg.wayland_display.clone(),
            x11_display: cfg.x11_display.clone(),
            runtime_dir: cfg.runtime_dir.clone(),
            x11_socket_dir: cfg.x11_socket_dir.clone(),
        }
    }

    pub fn detect(&self) -> DisplayProtocol {
        self.detection().protocol
    }

    pub fn detection(&self) -> Detection {
        if let Some(tag) = self.protocol_override.as_deref().filter(|t| !t.is_empty()) {
            return Detection {
                protocol: DisplayProtocol::from_tag(tag),
                source: DetectionSource::Override,
            };
        }

        if let Some(name) = self.wayland_display.as_deref().filter(|n| !n.is_empty()) {
            let socket = self.runtime_dir.join(name);
            if self.fs.is_socket(&socket) {
                return Detection {
                    protocol: DisplayProtocol::Wayland,
                    source: DetectionSource::WaylandSocket { socket },
                };
            }
            debug!("no wayland socket at {}", socket.display());
        }

        if let Some(x11) = self.x11_display.as_deref().filter(|d| !d.is_empty()) {
            match x11_display_number(x11) {
                Some(num) => {
                    let socket = self.x11_socket_dir.join(format!("X{}", num));
                    if self.fs.is_socket(&socket) {
                        return Detection {
                            protocol: DisplayProtocol::X11,
                            source: DetectionSource::X11Socket { socket },
                        };
                    }
                    debug!("no x11 socket at {}", socket.display());
                }
                None => debug!("DISPLAY={} has no display number", x11),
            }
        }

        Detection {
            protocol: DisplayProtocol::X11,
            source: DetectionSource::Fallback,
        }
    }
}

/// `host:1.0` -> `1`
fn x11_display_number(display: &str) -> Option<&str> {
    let after_colon = display.rsplit(':').next()?;
    let num = after_colon.split('.').next()?;
    if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) {
        Some(num)
    } else {
        None
    }
}
