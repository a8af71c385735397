//! Environment handed to podman-compose
//!
//! The resolver's only output across the process boundary is a set of
//! environment variables; COMPOSE_FILE carries the chain.

use crate::compose::ResolvedChain;
use crate::config::PodsConfig;
use crate::roots::PathRoots;
use serde::Serialize;

pub const ENV_COMPOSE_FILE: &str = "COMPOSE_FILE";
pub const ENV_HOST_UID: &str = "HOST_UID";

const DEMO_BEAMLINE: &str = "demo";
const PODS_SUFFIX: &str = "-pods";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrchestrationEnv {
    pub vars: Vec<(String, String)>,
}

impl OrchestrationEnv {
    pub fn for_chain(cfg: &PodsConfig, roots: &PathRoots, chain: &ResolvedChain) -> Self {
        let vars = vec![
            (ENV_HOST_UID.to_string(), cfg.uid.to_string()),
            (
                crate::config::ENV_PACKAGE_DIR.to_string(),
                roots.package_root().to_string_lossy().into_owned(),
            ),
            (
                crate::config::ENV_BEAMLINE_DIR.to_string(),
                roots.site_root().to_string_lossy().into_owned(),
            ),
            (ENV_COMPOSE_FILE.to_string(), chain.compose_file_value()),
        ];
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `KEY=value` lines, shell-quoted where needed
    pub fn render_shell(&self) -> String {
        self.vars
            .iter()
            .map(|(k, v)| format!("{}={}", k, shell_quote(v)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Label for the beamline this installation serves
///
/// BEAMLINE_NAME if set, `demo` in demo mode, otherwise the site directory
/// name without its `-pods` suffix.
pub fn beamline_name(cfg: &PodsConfig, roots: &PathRoots) -> String {
    if let Some(name) = cfg.beamline_name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if roots.is_demo() {
        return DEMO_BEAMLINE.to_string();
    }
    let dir_name = roots
        .site_root()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match dir_name.strip_suffix(PODS_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => dir_name,
    }
}

fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-:+,=@".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
