use std::fs;
use std::path::Path;

use monorail_core::conflict::ConflictResolver;
use monorail_core::manifest::Manifest;
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

#[test]
fn test_detects_divergent_external_ranges() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.2.0",
            "dependencies": {"X": "^5.0.0"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.2.0",
            "dependencies": {"core": "^1.2.0", "X": "^4.9.0"},
        }),
    );

    let packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let conflicts = ConflictResolver::detect(&packages);

    assert_eq!(conflicts.len(), 1);
    let conflict = &conflicts[0];
    assert_eq!(conflict.name, "X");
    assert_eq!(conflict.suggested, "^5.0.0");
    assert!(conflict.confident);
    assert_eq!(conflict.usages.len(), 2);
    assert_eq!(conflict.usages["^5.0.0"], ["core"]);
    assert_eq!(conflict.usages["^4.9.0"], ["tools"]);
}

#[test]
fn test_internal_dependencies_are_not_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({"name": "core", "version": "1.0.0"}),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.0.0",
            "dependencies": {"core": "^0.9.0"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "cli",
        serde_json::json!({
            "name": "cli",
            "version": "1.0.0",
            "dependencies": {"core": "^1.0.0"},
        }),
    );

    let packages = Scanner::new(temp_dir.path()).scan().unwrap();
    assert!(ConflictResolver::detect(&packages).is_empty());
}

#[test]
fn test_peer_dependencies_are_read_only() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.0.0",
            "peerDependencies": {"react": "^17.0.0"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.0.0",
            "peerDependencies": {"react": "^18.0.0"},
        }),
    );

    let packages = Scanner::new(temp_dir.path()).scan().unwrap();
    assert!(ConflictResolver::detect(&packages).is_empty());
}

#[test]
fn test_sync_rewrites_divergent_ranges_in_place() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.2.0",
            "dependencies": {"X": "^5.0.0"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.2.0",
            "dependencies": {"X": "^4.9.0"},
            "devDependencies": {"X": "^4.8.0"},
        }),
    );

    let mut packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let conflicts = ConflictResolver::detect(&packages);
    let changes =
        ConflictResolver::apply(&mut packages, &conflicts, false).unwrap();

    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.to == "^5.0.0"));

    let reloaded = Manifest::load(temp_dir.path().join("tools/package.json")).unwrap();
    assert_eq!(reloaded.dependencies["X"], "^5.0.0");
    assert_eq!(reloaded.dev_dependencies["X"], "^5.0.0");
}

#[test]
fn test_sync_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.2.0",
            "dependencies": {"X": "^5.0.0"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.2.0",
            "dependencies": {"X": "^4.9.0"},
        }),
    );

    let mut packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let conflicts = ConflictResolver::detect(&packages);
    ConflictResolver::apply(&mut packages, &conflicts, false).unwrap();

    // A second scan must observe a converged workspace.
    let packages = Scanner::new(temp_dir.path()).scan().unwrap();
    assert!(ConflictResolver::detect(&packages).is_empty());
}

#[test]
fn test_dry_run_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.2.0",
            "dependencies": {"X": "^5.0.0"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.2.0",
            "dependencies": {"X": "^4.9.0"},
        }),
    );

    let mut packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let conflicts = ConflictResolver::detect(&packages);
    let changes =
        ConflictResolver::apply(&mut packages, &conflicts, true).unwrap();

    assert_eq!(changes.len(), 1);
    let reloaded = Manifest::load(temp_dir.path().join("tools/package.json")).unwrap();
    assert_eq!(reloaded.dependencies["X"], "^4.9.0");
}

#[test]
fn test_non_semver_ranges_fall_back_to_lexicographic() {
    let temp_dir = TempDir::new().unwrap();
    create_test_package(
        temp_dir.path(),
        "core",
        serde_json::json!({
            "name": "core",
            "version": "1.0.0",
            "dependencies": {"Y": "workspace:*"},
        }),
    );
    create_test_package(
        temp_dir.path(),
        "tools",
        serde_json::json!({
            "name": "tools",
            "version": "1.0.0",
            "dependencies": {"Y": "file:../y"},
        }),
    );

    let packages = Scanner::new(temp_dir.path()).scan().unwrap();
    let conflicts = ConflictResolver::detect(&packages);

    assert_eq!(conflicts.len(), 1);
    assert!(!conflicts[0].confident);
    assert_eq!(conflicts[0].suggested, "workspace:*");
}
