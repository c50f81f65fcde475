use monorail_core::error::Error;
use monorail_core::graph::DependencyGraph;
use monorail_core::manifest::Manifest;
use monorail_core::package::Package;

fn pkg(name: &str, deps: &[&str]) -> Package {
    let deps_map: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|d| (d.to_string(), serde_json::Value::String("^1.0.0".into())))
        .collect();
    let manifest: Manifest = serde_json::from_value(serde_json::json!({
        "name": name,
        "version": "1.0.0",
        "dependencies": deps_map,
    }))
    .unwrap();
    Package::new(
        name.into(),
        format!("{}/package.json", name).into(),
        manifest,
    )
}

fn create_test_packages() -> Vec<Package> {
    vec![
        pkg("pkg-a", &[]),
        pkg("pkg-b", &["pkg-a"]),
        pkg("pkg-c", &["pkg-b"]),
    ]
}

#[test]
fn test_topological_order() {
    let graph = DependencyGraph::build(create_test_packages()).unwrap();
    let order = graph.topological_order().unwrap();

    assert_eq!(order, vec!["pkg-a", "pkg-b", "pkg-c"]);
}

#[test]
fn test_topological_order_puts_dependencies_first() {
    let packages = vec![
        pkg("app", &["lib-a", "lib-b"]),
        pkg("lib-a", &["base"]),
        pkg("lib-b", &["base"]),
        pkg("base", &[]),
    ];
    let graph = DependencyGraph::build(packages).unwrap();
    let order = graph.topological_order().unwrap();

    let index = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(index("base") < index("lib-a"));
    assert!(index("base") < index("lib-b"));
    assert!(index("lib-a") < index("app"));
    assert!(index("lib-b") < index("app"));
}

#[test]
fn test_topological_order_is_reproducible() {
    let graph = DependencyGraph::build(create_test_packages()).unwrap();
    let first = graph.topological_order().unwrap();
    let second = graph.topological_order().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_external_dependencies_are_not_edges() {
    let packages = vec![pkg("pkg-a", &[]), pkg("pkg-b", &["pkg-a", "left-pad"])];
    let graph = DependencyGraph::build(packages).unwrap();

    let deps = graph.internal_deps("pkg-b").unwrap();
    assert_eq!(deps, ["pkg-a"]);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_internal_deps_deduplicated_across_maps() {
    let manifest: Manifest = serde_json::from_value(serde_json::json!({
        "name": "pkg-b",
        "version": "1.0.0",
        "dependencies": {"pkg-a": "^1.0.0"},
        "devDependencies": {"pkg-a": "^1.0.0"},
        "peerDependencies": {"pkg-a": "^1.0.0"},
    }))
    .unwrap();
    let packages = vec![
        pkg("pkg-a", &[]),
        Package::new("pkg-b".into(), "pkg-b/package.json".into(), manifest),
    ];
    let graph = DependencyGraph::build(packages).unwrap();

    assert_eq!(graph.internal_deps("pkg-b").unwrap(), ["pkg-a"]);
}

#[test]
fn test_self_dependency_is_rejected() {
    let result = DependencyGraph::build(vec![pkg("pkg-a", &["pkg-a"])]);
    assert!(matches!(
        result,
        Err(Error::SelfDependency { ref package }) if package == "pkg-a"
    ));
}

#[test]
fn test_circular_dependency_names_a_cycle_member() {
    let packages = vec![
        pkg("cli", &["tools"]),
        pkg("tools", &["core"]),
        pkg("core", &["cli"]),
    ];
    let graph = DependencyGraph::build(packages).unwrap();
    let err = graph.topological_order().unwrap_err();

    match err {
        Error::CircularDependency(name) => {
            assert!(
                ["cli", "tools", "core"].contains(&name.as_str()),
                "unexpected cycle member: {}",
                name
            );
        }
        other => panic!("expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_dependents() {
    let graph = DependencyGraph::build(create_test_packages()).unwrap();

    assert_eq!(graph.dependents("pkg-a").unwrap(), ["pkg-b"]);
    assert!(graph.dependents("pkg-c").unwrap().is_empty());
}

#[test]
fn test_transitive_dependents() {
    let graph = DependencyGraph::build(create_test_packages()).unwrap();

    let all = graph.transitive_dependents("pkg-a").unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.contains(&"pkg-b".to_string()));
    assert!(all.contains(&"pkg-c".to_string()));
    assert!(!all.contains(&"pkg-a".to_string()));
}

#[test]
fn test_unknown_package_lookup() {
    let graph = DependencyGraph::build(create_test_packages()).unwrap();
    let err = graph.package("nope").unwrap_err();
    assert!(matches!(err, Error::PackageNotFound { .. }));
}
