use crate::domain::model::{FamilyGraph, Identity};
use std::collections::BTreeMap;

/// Maps every child with at least one sibling to the other children of its parent(s).
pub fn find_siblings(graph: &FamilyGraph) -> BTreeMap<Identity, Vec<Identity>> {
    let mut siblings: BTreeMap<Identity, Vec<Identity>> = BTreeMap::new();

    for node in graph.nodes.values() {
        for child in &node.children {
            for other in node.children.iter().filter(|c| *c != child) {
                let entry = siblings.entry(child.clone()).or_default();
                if !entry.contains(other) {
                    entry.push(other.clone());
                }
            }
        }
    }

    siblings
}
