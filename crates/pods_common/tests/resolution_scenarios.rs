//! Resolution scenarios against real directory trees
//!
//! Each test builds a package tree and (optionally) a site tree under a
//! temporary directory, with real Unix sockets standing in for the Wayland
//! and X11 display servers.

use pods_common::{
    ComposeFileResolver, ComposeLayer, DisplayProtocol, DisplayProtocolDetector, PodsConfig,
    PodsError, RealFs, RootKind, ServiceDiscovery,
};
use std::fs;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Sandbox {
    root: TempDir,
    package: PathBuf,
    site: PathBuf,
    runtime: PathBuf,
    x11: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("nbs-pods");
        let site = dir.path().join("tst-pods");
        let runtime = dir.path().join("run");
        let x11 = dir.path().join("x11");
        for d in [&package, &runtime, &x11] {
            fs::create_dir_all(d).unwrap();
        }
        Self {
            root: dir,
            package,
            site,
            runtime,
            x11,
        }
    }

    fn touch(&self, root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "services: {}\n").unwrap();
        path
    }

    fn config(&self, with_site: bool) -> PodsConfig {
        let cfg = PodsConfig::new(&self.package)
            .with_runtime_dir(&self.runtime)
            .with_x11_socket_dir(&self.x11);
        if with_site {
            cfg.with_beamline_dir(&self.site)
        } else {
            cfg
        }
    }
}

#[test]
fn scenario_a_demo_mode_has_no_beamline_services() {
    let sb = Sandbox::new();
    sb.touch(&sb.package, "compose/sim/docker-compose.yml");
    sb.touch(&sb.package, "compose/beamline/det/docker-compose.yml");

    let cfg = sb.config(false);
    let discovery = ServiceDiscovery::new(&cfg, &RealFs);
    assert!(discovery.discover_beamline().is_empty());
    assert!(discovery.discover_base().contains("sim"));
}

#[test]
fn scenario_b_package_base_and_override() {
    let sb = Sandbox::new();
    let base = sb.touch(&sb.package, "compose/sim/docker-compose.yml");
    let over = sb.touch(&sb.package, "compose/sim/docker-compose.override.yml");

    // site root configured but has no sim directory at all
    fs::create_dir_all(sb.site.join("compose")).unwrap();
    let cfg = sb.config(true);
    let chain = ComposeFileResolver::new(&cfg, &RealFs)
        .resolve_chain("sim", false)
        .unwrap();
    assert_eq!(chain.paths().collect::<Vec<_>>(), vec![base.as_path(), over.as_path()]);
}

#[test]
fn scenario_c_gui_follows_live_wayland_socket() {
    let sb = Sandbox::new();
    let _wayland = UnixListener::bind(sb.runtime.join("wayland-0")).unwrap();
    let site_variant = sb.touch(&sb.site, "compose/gui/docker-compose.wayland.yml");
    sb.touch(&sb.package, "compose/gui/docker-compose.wayland.yml");
    sb.touch(&sb.package, "compose/gui/docker-compose.x11.yml");

    let cfg = sb.config(true).with_wayland_display("wayland-0");
    let chain = ComposeFileResolver::new(&cfg, &RealFs)
        .resolve_chain("gui", false)
        .unwrap();
    assert_eq!(chain.entries[0].path, site_variant);
    assert_eq!(chain.entries[0].layer, ComposeLayer::DisplayVariant);
    assert_eq!(chain.entries[0].root, RootKind::Site);
}

#[test]
fn scenario_c_regular_file_is_not_a_socket() {
    let sb = Sandbox::new();
    fs::write(sb.runtime.join("wayland-0"), "").unwrap();
    sb.touch(&sb.site, "compose/gui/docker-compose.wayland.yml");
    let x11_variant = sb.touch(&sb.package, "compose/gui/docker-compose.x11.yml");

    let cfg = sb.config(true).with_wayland_display("wayland-0");
    let chain = ComposeFileResolver::new(&cfg, &RealFs)
        .resolve_chain("gui", false)
        .unwrap();
    assert_eq!(chain.entries[0].path, x11_variant);
    assert_eq!(chain.display_protocol, Some(DisplayProtocol::X11));
}

#[test]
fn scenario_d_unknown_service() {
    let sb = Sandbox::new();
    sb.touch(&sb.package, "compose/sim/docker-compose.yml");
    let cfg = sb.config(true);
    let resolver = ComposeFileResolver::new(&cfg, &RealFs);
    for dev in [false, true] {
        match resolver.resolve_chain("foo", dev) {
            Err(PodsError::MissingBaseFile(name)) => assert_eq!(name, "foo"),
            other => panic!("expected MissingBaseFile, got {:?}", other),
        }
    }
}

#[test]
fn scenario_e_dev_mode_without_development_file() {
    let sb = Sandbox::new();
    sb.touch(&sb.package, "compose/sim/docker-compose.yml");
    sb.touch(&sb.site, "compose/sim/docker-compose.override.yml");
    let cfg = sb.config(true);
    let chain = ComposeFileResolver::new(&cfg, &RealFs)
        .resolve_chain("sim", true)
        .unwrap();
    let layers: Vec<_> = chain.entries.iter().map(|e| e.layer).collect();
    assert_eq!(layers, vec![ComposeLayer::Base, ComposeLayer::Override]);
}

#[test]
fn x11_socket_detected_when_wayland_absent() {
    let sb = Sandbox::new();
    let _x0 = UnixListener::bind(sb.x11.join("X0")).unwrap();
    let cfg = sb
        .config(false)
        .with_wayland_display("wayland-9")
        .with_x11_display(":0.0");
    assert_eq!(
        DisplayProtocolDetector::new(&cfg, &RealFs).detect(),
        DisplayProtocol::X11
    );
}

#[test]
fn detection_tracks_socket_lifetime() {
    let sb = Sandbox::new();
    let socket = sb.runtime.join("wayland-1");
    let cfg = sb.config(false).with_wayland_display("wayland-1");
    let detector = DisplayProtocolDetector::new(&cfg, &RealFs);

    assert_eq!(detector.detect(), DisplayProtocol::X11);
    let listener = UnixListener::bind(&socket).unwrap();
    assert_eq!(detector.detect(), DisplayProtocol::Wayland);
    drop(listener);
    fs::remove_file(&socket).unwrap();
    assert_eq!(detector.detect(), DisplayProtocol::X11);
}

#[test]
fn resolution_is_idempotent_and_read_only() {
    let sb = Sandbox::new();
    sb.touch(&sb.package, "compose/sim/docker-compose.yml");
    sb.touch(&sb.site, "compose/sim/docker-compose.development.yml");
    let before = snapshot(sb.root.path());

    let cfg = sb.config(true);
    let resolver = ComposeFileResolver::new(&cfg, &RealFs);
    let first = resolver.resolve_chain("sim", true).unwrap();
    let second = resolver.resolve_chain("sim", true).unwrap();
    assert_eq!(first, second);
    assert_eq!(before, snapshot(sb.root.path()));
}

#[test]
fn site_services_partition_from_base() {
    let sb = Sandbox::new();
    sb.touch(&sb.package, "compose/sim/docker-compose.yml");
    sb.touch(&sb.package, "compose/gui/docker-compose.x11.yml");
    sb.touch(&sb.site, "compose/sim/docker-compose.yml");
    sb.touch(&sb.site, "compose/motors/docker-compose.yml");
    sb.touch(&sb.site, "compose/beamline/detectors/docker-compose.yml");
    sb.touch(&sb.site, "compose/beamline/gui/docker-compose.yml");

    let cfg = sb.config(true);
    let catalog = ServiceDiscovery::new(&cfg, &RealFs).catalog();
    assert_eq!(catalog.base.iter().collect::<Vec<_>>(), vec!["gui", "sim"]);
    assert_eq!(
        catalog.beamline.iter().collect::<Vec<_>>(),
        vec!["detectors", "motors"]
    );
}

fn snapshot(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            out.push(path);
        }
    }
    out.sort();
    out
}
