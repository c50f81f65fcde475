use std::fs;
use std::path::Path;

use monorail_core::error::Error;
use monorail_core::manifest::Manifest;
use monorail_core::release::ReleaseEngine;
use monorail_core::scanner::Scanner;
use tempfile::TempDir;

fn create_test_package(dir: &Path, name: &str, manifest: serde_json::Value) {
    let pkg_dir = dir.join(name);
    fs::create_dir_all(&pkg_dir).unwrap();
    fs::write(
        pkg_dir.join("package.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

fn fixture(dir: &Path) {
    create_test_package(
        dir,
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.1.0",
            "dependencies": {"lodash": "^4.17.21"},
        }),
    );
    create_test_package(
        dir,
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.1.0",
            "dependencies": {"core": "^1.1.0"},
            "devDependencies": {"core": "^1.1.0"},
            "peerDependencies": {"core": "^1.0.0"},
        }),
    );
}

#[test]
fn test_bump_all_updates_versions_and_internal_ranges() {
    let temp_dir = TempDir::new().unwrap();
    fixture(temp_dir.path());

    let mut packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let bumps = ReleaseEngine::new(false)
        .bump_all(&mut packages, "1.2.0")
        .unwrap();

    assert_eq!(bumps.len(), 2);
    assert!(bumps
        .iter()
        .all(|b| b.old_version == "1.1.0" && b.new_version == "1.2.0"));

    let core = Manifest::load(temp_dir.path().join("core/package.json")).unwrap();
    assert_eq!(core.version, "1.2.0");
    // External ranges are untouched by a version bump.
    assert_eq!(core.dependencies["lodash"], "^4.17.21");

    let tools = Manifest::load(temp_dir.path().join("tools/package.json")).unwrap();
    assert_eq!(tools.version, "1.2.0");
    assert_eq!(tools.dependencies["core"], "^1.2.0");
    assert_eq!(tools.dev_dependencies["core"], "^1.2.0");
    assert_eq!(tools.peer_dependencies["core"], "^1.2.0");
}

#[test]
fn test_dry_run_leaves_manifests_untouched() {
    let temp_dir = TempDir::new().unwrap();
    fixture(temp_dir.path());

    let mut packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let bumps = ReleaseEngine::new(true)
        .bump_all(&mut packages, "2.0.0")
        .unwrap();

    assert_eq!(bumps.len(), 2);
    let core = Manifest::load(temp_dir.path().join("core/package.json")).unwrap();
    assert_eq!(core.version, "1.1.0");
}

#[test]
fn test_invalid_version_is_rejected_before_any_write() {
    let temp_dir = TempDir::new().unwrap();
    fixture(temp_dir.path());

    let mut packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let err = ReleaseEngine::new(false)
        .bump_all(&mut packages, "not-a-version")
        .unwrap_err();

    assert!(matches!(err, Error::InvalidVersion { .. }));
    let core = Manifest::load(temp_dir.path().join("core/package.json")).unwrap();
    assert_eq!(core.version, "1.1.0");
}
