//! End-to-end update checks through the gate with a mock server.

mod common;

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use common::{zip_bytes, MockServer};
use modgate::gate::{CoreOutcome, Gate, GateConfig, HostCapabilities, Transport};
use modgate::host::{RecordingHost, StaticRegistry, UPDATED_MODS_EVENT};
use modgate::log::{LogLevel, MemoryLogger};
use modgate::manager::{PackageUpdateOutcome, ZipExtractor};
use modgate::package::{InstalledPackageRecord, Platform};
use modgate::patch::PatchDocument;

const MANIFEST_URL: &str = "https://mods.test/manifest.json";

const GATEWAY: &str = "<html>\n<head>\n<script src=\"hud/main.js\"></script>\n</head>\n</html>\n";

fn manifest(bundle: bool) -> String {
    let bundle_field = if bundle {
        r#""patch_bundle_url": "https://mods.test/ui.zip","#
    } else {
        ""
    };
    format!(
        r#"{{
            "core": {{
                "name": "ModsGate",
                "version": "1.0.0",
                {}
                "url": {{ "*": "https://mods.test/core.zip" }}
            }},
            "mods": [
                {{
                    "name": "Foo",
                    "author": "someone",
                    "version": "2.0.0",
                    "url": {{ "*": "https://mods.test/$/Foo.zip", "win": "https://mods.test/win/Foo.zip" }}
                }},
                {{
                    "name": "Bar",
                    "version": "1.0.0",
                    "url": {{ "*": "https://mods.test/Bar.zip" }}
                }}
            ]
        }}"#,
        bundle_field
    )
}

struct Fixture {
    temp: TempDir,
    host: Arc<RecordingHost>,
    logger: Arc<MemoryLogger>,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let plugins = temp.path().join("plugins");
        fs::create_dir_all(plugins.join("Foo")).unwrap();
        fs::write(plugins.join("Foo/Foo.dll"), "foo 1.5.0").unwrap();
        fs::create_dir_all(plugins.join("Bar")).unwrap();
        fs::write(plugins.join("Bar/Bar.dll"), "bar 1.0.0").unwrap();

        let ui = temp.path().join("ui");
        fs::create_dir_all(ui.join("hud")).unwrap();
        fs::write(ui.join("gateway.html"), GATEWAY).unwrap();
        fs::write(ui.join("hud/main.js"), "let speed = 1;\n").unwrap();

        Self {
            temp,
            host: Arc::new(RecordingHost::new()),
            logger: Arc::new(MemoryLogger::new()),
        }
    }

    fn gate(&self, server: MockServer) -> Gate {
        let server = Arc::new(server);
        let mut config = GateConfig::new(
            MANIFEST_URL,
            self.temp.path().join("plugins"),
            self.temp.path().join("ui"),
        );
        config.manager = config.manager.with_platform(Some(Platform::Windows));

        let host = HostCapabilities {
            registry: Arc::new(StaticRegistry::new(vec![
                InstalledPackageRecord::new("Foo", "1.5.0"),
                InstalledPackageRecord::new("Bar", "1.0.0"),
            ])),
            redirector: self.host.clone(),
            events: self.host.clone(),
        };
        let transport = Transport {
            manifest: server.clone(),
            downloader: server,
            extractor: Arc::new(ZipExtractor::new()),
        };
        Gate::new(config, host, transport, self.logger.clone())
    }

    fn plugins(&self) -> std::path::PathBuf {
        self.temp.path().join("plugins")
    }

    fn ui(&self) -> std::path::PathBuf {
        self.temp.path().join("ui")
    }
}

#[tokio::test]
async fn test_outdated_package_is_swapped() {
    let fixture = Fixture::new();
    let foo_zip = zip_bytes(fixture.temp.path(), &[("Foo.dll", "foo 2.0.0")]);
    let server = MockServer::new()
        .with(MANIFEST_URL, manifest(false))
        .with("https://mods.test/2.0.0/Foo.zip", foo_zip);
    let gate = fixture.gate(server);

    let report = gate.on_load().unwrap().wait().await.unwrap();

    assert!(report.is_success(), "errors: {:?}", report.errors());
    let plugins = fixture.plugins();
    assert!(plugins.join("Foo_v1.5.0.outdated").is_dir());
    assert_eq!(
        fs::read_to_string(plugins.join("Foo_v1.5.0.outdated/Foo.dll")).unwrap(),
        "foo 1.5.0"
    );
    assert_eq!(fs::read_to_string(plugins.join("Foo/Foo.dll")).unwrap(), "foo 2.0.0");
    assert!(!plugins.join("Foo_update.zip").exists());

    // Bar is current and the core is not installed.
    assert_eq!(fs::read_to_string(plugins.join("Bar/Bar.dll")).unwrap(), "bar 1.0.0");
    let names: Vec<&str> = report.updated().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Foo"]);
    assert!(matches!(
        report.packages.iter().find(|p| p.name == "Bar").unwrap().outcome,
        Ok(PackageUpdateOutcome::UpToDate { .. })
    ));

    let events = fixture.host.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, UPDATED_MODS_EVENT);
    assert!(events[0].1.contains("\"Bar\""));
}

#[tokio::test]
async fn test_missing_download_leaves_package_alone() {
    let fixture = Fixture::new();
    let server = MockServer::new().with(MANIFEST_URL, manifest(false));
    let gate = fixture.gate(server);

    let report = gate.on_load().unwrap().wait().await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].starts_with("Foo:"));
    let plugins = fixture.plugins();
    assert_eq!(fs::read_to_string(plugins.join("Foo/Foo.dll")).unwrap(), "foo 1.5.0");
    assert!(!plugins.join("Foo_v1.5.0.outdated").exists());
    assert!(fixture.logger.contains(LogLevel::Error, "Error updating Foo"));
}

#[tokio::test]
async fn test_bundle_patches_ui_and_registers_redirect() {
    let fixture = Fixture::new();
    let js_patch = PatchDocument::make("let speed = 1;\n", "let speed = 2;\n");
    let bundle = zip_bytes(
        fixture.temp.path(),
        &[
            ("hud/main.js.patch", js_patch.to_text().as_str()),
            (
                "gateway.html.patch",
                PatchDocument::make(GATEWAY, &GATEWAY.replace("</head>", "<!-- modded -->\n</head>"))
                    .to_text()
                    .as_str(),
            ),
        ],
    );
    let server = MockServer::new()
        .with(MANIFEST_URL, manifest(true))
        .with("https://mods.test/ui.zip", bundle)
        .with(
            "https://mods.test/2.0.0/Foo.zip",
            zip_bytes(fixture.temp.path(), &[("Foo.dll", "foo 2.0.0")]),
        );
    let gate = fixture.gate(server);

    let report = gate.on_load().unwrap().wait().await.unwrap();

    match &report.core {
        Some(CoreOutcome::Bundle(Ok(bundle))) => {
            assert_eq!(bundle.documents.len(), 2);
            assert_eq!(bundle.failed_hunks(), 0);
            assert_eq!(bundle.root_replacements, Some(1));
        }
        other => panic!("unexpected core outcome {:?}", other),
    }

    let ui = fixture.ui();
    assert_eq!(fs::read_to_string(ui.join("hud/__main.js")).unwrap(), "let speed = 2;\n");
    let root = fs::read_to_string(ui.join("__gateway.html")).unwrap();
    assert!(root.contains("src=\"hud/__main.js\""));
    assert!(root.contains("<!-- modded -->"));
    assert_eq!(fs::read_to_string(ui.join("gateway.html")).unwrap(), GATEWAY);

    assert!(report.redirect_registered);
    assert_eq!(
        fixture.host.redirects(),
        vec![(ui.join("gateway.html"), ui.join("__gateway.html"))]
    );

    let cleanup = gate.on_unload();
    assert!(cleanup.is_clean());
    assert_eq!(cleanup.removed.len(), 2);
    assert!(!ui.join("__gateway.html").exists());
    assert!(!ui.join("hud/__main.js").exists());
    assert!(ui.join("hud/main.js").exists());
}

#[tokio::test]
async fn test_manifest_unreachable() {
    let fixture = Fixture::new();
    let gate = fixture.gate(MockServer::new());

    let report = gate.on_load().unwrap().wait().await.unwrap();

    assert!(report.manifest_error.is_some());
    assert!(report.packages.is_empty());
    assert!(fixture.host.events().is_empty());
    assert!(fixture.logger.contains(LogLevel::Error, "Error during update check"));
}
