use crate::domain::model::{ConsanguinityFlag, FamilyGraph, Identity, IdentityPair};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Every identity reachable from `start` by repeatedly following `step`.
///
/// `start` itself only appears if the records loop back to it.
fn closure<'g>(
    graph: &'g FamilyGraph,
    start: &Identity,
    step: impl Fn(&'g FamilyGraph, &Identity) -> &'g [Identity],
) -> HashSet<Identity> {
    let mut visited = HashSet::new();
    let mut stack: Vec<&'g Identity> = step(graph, start).iter().collect();

    while let Some(current) = stack.pop() {
        if visited.insert(current.clone()) {
            stack.extend(step(graph, current).iter());
        }
    }
    visited
}

pub fn ancestors(graph: &FamilyGraph, id: &Identity) -> HashSet<Identity> {
    closure(graph, id, |g, n| g.parents(n))
}

pub fn descendants(graph: &FamilyGraph, id: &Identity) -> HashSet<Identity> {
    closure(graph, id, |g, n| g.children(n))
}

/// Memoized ancestor/descendant closures over one graph.
pub struct KinshipIndex<'g> {
    graph: &'g FamilyGraph,
    ancestors: HashMap<Identity, HashSet<Identity>>,
    descendants: HashMap<Identity, HashSet<Identity>>,
}

impl<'g> KinshipIndex<'g> {
    pub fn new(graph: &'g FamilyGraph) -> Self {
        Self {
            graph,
            ancestors: HashMap::new(),
            descendants: HashMap::new(),
        }
    }

    pub fn ancestors(&mut self, id: &Identity) -> &HashSet<Identity> {
        let graph = self.graph;
        self.ancestors
            .entry(id.clone())
            .or_insert_with(|| ancestors(graph, id))
    }

    pub fn descendants(&mut self, id: &Identity) -> &HashSet<Identity> {
        let graph = self.graph;
        self.descendants
            .entry(id.clone())
            .or_insert_with(|| descendants(graph, id))
    }

    /// True when one of `u`, `v` descends from the other.
    pub fn in_direct_line(&mut self, u: &Identity, v: &Identity) -> bool {
        self.ancestors(u).contains(v) || self.descendants(u).contains(v)
    }
}

/// Married pairs whose partners are also ancestor and descendant of each other.
pub fn find_flagged_pairs(graph: &FamilyGraph) -> BTreeSet<ConsanguinityFlag> {
    let mut index = KinshipIndex::new(graph);
    let mut flags = BTreeSet::new();

    for (u, node) in &graph.nodes {
        for v in &node.spouses {
            if u == v {
                continue;
            }
            let pair = IdentityPair::new(u.clone(), v.clone());
            if flags.contains(&pair) {
                continue;
            }
            if index.in_direct_line(u, v) {
                tracing::warn!("Marriage between {} and {} crosses a direct line of descent", u, v);
                flags.insert(pair);
            }
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FamilyNode;

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    fn graph(links: &[(&str, &str)], marriages: &[(&str, &str)]) -> FamilyGraph {
        let mut graph = FamilyGraph::singleton(id(links.first().map(|l| l.0).unwrap_or("root")));
        let touch = |g: &mut FamilyGraph, n: &str| {
            g.nodes
                .entry(id(n))
                .or_insert_with(|| FamilyNode::new(id(n)));
        };
        for (p, c) in links {
            touch(&mut graph, p);
            touch(&mut graph, c);
            graph.nodes.get_mut(&id(p)).unwrap().children.push(id(c));
            graph.nodes.get_mut(&id(c)).unwrap().parents.push(id(p));
        }
        for (a, b) in marriages {
            touch(&mut graph, a);
            touch(&mut graph, b);
            graph.nodes.get_mut(&id(a)).unwrap().spouses.push(id(b));
            graph.nodes.get_mut(&id(b)).unwrap().spouses.push(id(a));
        }
        graph
    }

    #[test]
    fn test_closures_follow_the_whole_line() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d")], &[]);
        assert_eq!(ancestors(&g, &id("d")), HashSet::from([id("a"), id("b"), id("c")]));
        assert_eq!(descendants(&g, &id("b")), HashSet::from([id("c"), id("d")]));
        assert!(ancestors(&g, &id("a")).is_empty());
    }

    #[test]
    fn test_closure_terminates_on_cycle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")], &[]);
        let found = descendants(&g, &id("a"));
        assert_eq!(found.len(), 3);
        assert!(found.contains(&id("a")));
    }

    #[test]
    fn test_grandparent_marriage_is_flagged_once() {
        let g = graph(&[("a", "b"), ("b", "c")], &[("a", "c")]);
        let flags = find_flagged_pairs(&g);
        assert_eq!(flags.len(), 1);
        assert!(flags.contains(&IdentityPair::new(id("c"), id("a"))));
    }

    #[test]
    fn test_siblings_marrying_are_not_in_direct_line() {
        let g = graph(&[("p", "x"), ("p", "y")], &[("x", "y")]);
        assert!(find_flagged_pairs(&g).is_empty());
    }

    #[test]
    fn test_index_memoizes_closures() {
        let g = graph(&[("a", "b")], &[]);
        let mut index = KinshipIndex::new(&g);
        assert!(index.in_direct_line(&id("b"), &id("a")));
        assert!(index.in_direct_line(&id("a"), &id("b")));
        assert_eq!(index.ancestors.len(), 2);
    }
}
