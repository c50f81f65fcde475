use monorail_core::graph::DependencyGraph;
use monorail_core::manifest::Manifest;
use monorail_core::package::Package;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];

fn pkg(name: &str, deps: &[String]) -> Package {
    let deps_map: serde_json::Map<String, serde_json::Value> = deps
        .iter()
        .map(|d| (d.clone(), serde_json::Value::String("^1.0.0".into())))
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

/// Generates an arbitrary acyclic package set: a package may only
/// depend on packages with a smaller index, so every generated graph is
/// a DAG by construction.
fn gen_packages() -> impl Strategy<Value = Vec<Package>> {
    proptest::collection::vec(any::<bool>(), 10).prop_map(|edges| {
        let mut edge_idx = 0;
        let mut packages = Vec::with_capacity(NAMES.len());
        for (i, name) in NAMES.iter().enumerate() {
            let mut deps = Vec::new();
            for dep_name in NAMES.iter().take(i) {
                if edges[edge_idx] {
                    deps.push(dep_name.to_string());
                }
                edge_idx += 1;
            }
            packages.push(pkg(name, &deps));
        }
        packages
    })
}

proptest! {
    #[test]
    fn test_dependencies_always_precede_dependents(packages in gen_packages()) {
        let graph = DependencyGraph::build(packages).unwrap();
        let order = graph.topological_order().unwrap();

        prop_assert_eq!(order.len(), NAMES.len());
        let index = |name: &str| order.iter().position(|n| n == name).unwrap();
        for name in NAMES {
            for dep in graph.internal_deps(name).unwrap() {
                prop_assert!(
                    index(dep) < index(name),
                    "{} must come before {}", dep, name
                );
            }
        }
    }

    #[test]
    fn test_order_has_no_duplicates(packages in gen_packages()) {
        let graph = DependencyGraph::build(packages).unwrap();
        let order = graph.topological_order().unwrap();

        let mut seen = std::collections::HashSet::new();
        for name in &order {
            prop_assert!(seen.insert(name.clone()), "duplicate in order: {}", name);
        }
    }

    #[test]
    fn test_levels_partition_nodes_and_respect_edges(packages in gen_packages()) {
        let graph = DependencyGraph::build(packages).unwrap();
        let levels = graph.build_levels().unwrap();

        let mut seen = std::collections::HashSet::new();
        for level in &levels {
            for name in level {
                prop_assert!(seen.insert(name.clone()), "{} leveled twice", name);
            }
        }
        prop_assert_eq!(seen.len(), graph.len());

        let level_of = |name: &str| {
            levels.iter().position(|l| l.iter().any(|n| n == name)).unwrap()
        };
        for name in NAMES {
            for dep in graph.internal_deps(name).unwrap() {
                prop_assert!(level_of(dep) < level_of(name));
            }
        }
    }
}
