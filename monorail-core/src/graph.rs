//! Dependency graph construction, cycle detection, and build leveling.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::package::Package;

/// A package together with its derived graph edges.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub package: Package,
    /// Names of dependencies that resolve to discovered packages, in
    /// declaration order, deduplicated across the three dependency maps.
    pub internal_deps: SmallVec<[String; 4]>,
    /// Reverse edges, computed after all nodes exist.
    pub dependents: Vec<String>,
}

/// Directed acyclic graph of package dependencies.
///
/// A declared dependency is internal iff its name matches a discovered
/// package; everything else is external. No partial or fuzzy matching.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: IndexMap<String, GraphNode>,
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Builds the graph from the discovered packages.
    ///
    /// Pure in-memory transformation; no side effects. Reverse edges are
    /// filled in a second pass so edge direction does not depend on
    /// discovery order.
    ///
    /// # Errors
    ///
    /// Returns an error if a package depends on itself.
    pub fn build(packages: Vec<Package>) -> Result<Self> {
        let discovered: HashSet<String> = packages.iter().map(|p| p.name.clone()).collect();

        let mut graph = DiGraph::new();
        let mut node_map = HashMap::with_capacity(packages.len());
        for package in &packages {
            let idx = graph.add_node(package.name.clone());
            node_map.insert(package.name.clone(), idx);
        }

        let mut nodes: IndexMap<String, GraphNode> = IndexMap::with_capacity(packages.len());
        for package in packages {
            let mut internal_deps: SmallVec<[String; 4]> = SmallVec::new();
            for dep_name in package.manifest.dependency_names() {
                if dep_name == package.name {
                    return Err(Error::SelfDependency {
                        package: package.name.clone(),
                    });
                }
                if discovered.contains(dep_name) {
                    internal_deps.push(dep_name.to_string());
                }
            }

            let from = node_map[&package.name];
            for dep_name in &internal_deps {
                let to = node_map.get(dep_name).ok_or_else(|| {
                    Error::UnresolvedInternalDependency {
                        package: package.name.clone(),
                        dependency: dep_name.clone(),
                    }
                })?;
                graph.add_edge(from, *to, ());
            }

            nodes.insert(
                package.name.clone(),
                GraphNode {
                    package,
                    internal_deps,
                    dependents: Vec::new(),
                },
            );
        }

        let names: Vec<String> = nodes.keys().cloned().collect();
        for name in &names {
            let idx = node_map[name];
            let dependents: Vec<String> = graph
                .neighbors_directed(idx, Direction::Incoming)
                .map(|i| graph[i].clone())
                .collect();
            if let Some(node) = nodes.get_mut(name) {
                node.dependents = dependents;
            }
        }

        Ok(Self {
            nodes,
            graph,
            node_map,
        })
    }

    /// Returns a linear order in which every package appears after all
    /// of its internal dependencies.
    ///
    /// Three-color depth-first traversal. Sibling dependencies are
    /// visited in declaration order and roots in discovery order, so
    /// the output is reproducible from the manifest contents alone.
    ///
    /// # Errors
    ///
    /// Returns `CircularDependency` naming a node on the first cycle
    /// found; no partial order is returned on failure.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = self
            .nodes
            .keys()
            .map(|name| (name.as_str(), Mark::Unvisited))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        for name in self.nodes.keys() {
            self.visit(name, &mut marks, &mut order)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<String>,
    ) -> Result<()> {
        match marks.get(name).copied().unwrap_or(Mark::Unvisited) {
            Mark::Done => return Ok(()),
            Mark::InProgress => return Err(Error::CircularDependency(name.to_string())),
            Mark::Unvisited => {}
        }

        let node = self.nodes.get(name).ok_or_else(|| self.not_found(name))?;
        marks.insert(name, Mark::InProgress);

        for dep_name in &node.internal_deps {
            if !self.nodes.contains_key(dep_name.as_str()) {
                return Err(Error::UnresolvedInternalDependency {
                    package: node.package.name.clone(),
                    dependency: dep_name.clone(),
                });
            }
            self.visit(dep_name, marks, order)?;
        }

        marks.insert(name, Mark::Done);
        order.push(name.to_string());
        Ok(())
    }

    /// Groups packages into levels of mutually independent packages.
    ///
    /// Greedy frontier: each pass collects every unleveled package whose
    /// internal dependencies are all already leveled, so every package
    /// lands in the earliest level its dependencies allow.
    ///
    /// # Errors
    ///
    /// A pass that levels zero packages while unleveled packages remain
    /// means a cycle escaped the sorter; the same cycle error is raised.
    pub fn build_levels(&self) -> Result<Vec<Vec<String>>> {
        let mut leveled: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        let mut levels: Vec<Vec<String>> = Vec::new();

        while leveled.len() < self.nodes.len() {
            let mut level: Vec<&str> = Vec::new();
            for (name, node) in &self.nodes {
                if leveled.contains(name.as_str()) {
                    continue;
                }
                if node
                    .internal_deps
                    .iter()
                    .all(|dep| leveled.contains(dep.as_str()))
                {
                    level.push(name.as_str());
                }
            }

            if level.is_empty() {
                let stuck = self
                    .nodes
                    .keys()
                    .find(|name| !leveled.contains(name.as_str()))
                    .cloned()
                    .unwrap_or_default();
                return Err(Error::CircularDependency(stuck));
            }

            leveled.extend(level.iter().copied());
            levels.push(level.into_iter().map(str::to_string).collect());
        }

        Ok(levels)
    }

    /// Retrieves a node by package name.
    pub fn node(&self, name: &str) -> Result<&GraphNode> {
        self.nodes.get(name).ok_or_else(|| self.not_found(name))
    }

    /// Retrieves a package by name.
    pub fn package(&self, name: &str) -> Result<&Package> {
        self.node(name).map(|n| &n.package)
    }

    /// Returns direct internal dependencies of a package, in
    /// declaration order.
    pub fn internal_deps(&self, name: &str) -> Result<&[String]> {
        self.node(name).map(|n| n.internal_deps.as_slice())
    }

    /// Returns direct dependents of a package.
    pub fn dependents(&self, name: &str) -> Result<&[String]> {
        self.node(name).map(|n| n.dependents.as_slice())
    }

    /// Returns all transitive dependents of a package, in breadth-first
    /// visit order, excluding the package itself.
    pub fn transitive_dependents(&self, name: &str) -> Result<Vec<String>> {
        let mut result: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: Vec<&str> = self
            .dependents(name)?
            .iter()
            .map(String::as_str)
            .collect();

        while !queue.is_empty() {
            let mut next: Vec<&str> = Vec::new();
            for current in queue {
                if !seen.insert(current) {
                    continue;
                }
                result.push(current.to_string());
                next.extend(self.dependents(current)?.iter().map(String::as_str));
            }
            queue = next;
        }

        Ok(result)
    }

    /// Returns package names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Returns all packages in the graph, in discovery order.
    pub fn packages(&self) -> Vec<&Package> {
        self.nodes.values().map(|n| &n.package).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of dependency edges in the graph.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn not_found(&self, name: &str) -> Error {
        let available: Vec<&str> = self.node_map.keys().map(String::as_str).collect();
        Error::PackageNotFound {
            name: name.to_string(),
            available: available.join(", "),
        }
    }
}
