//! Pods Common - Compose file resolution for beamline pods
//!
//! Resolves which docker-compose files apply to a service by layering a
//! site ("beamline") tree over the packaged nbs-pods distribution.
//! Everything here is read-only: no process is started, no file is written.

pub mod compose;
pub mod config;
pub mod display;
pub mod error;
pub mod fs_probe;
pub mod orchestration;
pub mod roots;
pub mod services;

pub use compose::{ChainEntry, ComposeFileResolver, ComposeLayer, ResolvedChain};
pub use config::{PodsConfig, UiSettings};
pub use display::{Detection, DetectionSource, DisplayProtocol, DisplayProtocolDetector};
pub use error::{PodsError, Result};
pub use fs_probe::{FakeFs, FsProbe, RealFs};
pub use orchestration::{beamline_name, OrchestrationEnv};
pub use roots::{Located, PathRoots, RootKind};
pub use services::{ServiceCatalog, ServiceDiscovery};

/// Separator used when handing a chain to podman-compose via COMPOSE_FILE
pub const COMPOSE_FILE_SEPARATOR: &str = ":";
