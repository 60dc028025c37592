use crate::domain::model::{FamilyGraph, FamilyNode, Identity, RelationshipEdge, RelationshipKind};
use crate::domain::ports::RelationshipStore;
use crate::utils::error::Result;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Breadth-first materialization of every identity reachable from `root`
/// through accepted marriages and adoptions.
///
/// Each identity is queried and expanded exactly once, so diamonds and
/// cyclic records terminate. The graph is only returned once the traversal
/// completed; a store failure aborts the whole build.
pub async fn build_graph<S>(store: &S, root: &Identity) -> Result<FamilyGraph>
where
    S: RelationshipStore + ?Sized,
{
    let mut nodes = BTreeMap::new();
    let mut order = Vec::new();
    let mut edges = Vec::new();
    let mut seen_edges = HashSet::new();

    let mut discovered = HashSet::from([root.clone()]);
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(current) = queue.pop_front() {
        let relations = store.find_accepted_edges_by_identity(&current).await?;
        let mut node = FamilyNode::new(current.clone());

        for edge in relations {
            if !edge.is_accepted() || !edge.involves(&current) {
                continue;
            }
            if edge.a == edge.b {
                tracing::warn!("Ignoring self-referencing {:?} record on {}", edge.kind, current);
                continue;
            }

            let neighbor = match classify(&mut node, &edge) {
                Some(neighbor) => neighbor,
                None => continue,
            };
            if discovered.insert(neighbor.clone()) {
                queue.push_back(neighbor);
            }
            if seen_edges.insert(edge.clone()) {
                edges.push(edge);
            }
        }

        order.push(current.clone());
        nodes.insert(current, node);
    }

    tracing::debug!(
        "Built family graph from {}: {} identities, {} relations",
        root,
        nodes.len(),
        edges.len()
    );

    Ok(FamilyGraph {
        root: root.clone(),
        nodes,
        order,
        edges,
    })
}

/// Files `edge` into the right adjacency list of `node` and returns the
/// neighbor it leads to.
fn classify(node: &mut FamilyNode, edge: &RelationshipEdge) -> Option<Identity> {
    let (list, neighbor) = match edge.kind {
        RelationshipKind::Adoption if edge.a == node.id => (&mut node.children, &edge.b),
        RelationshipKind::Adoption => (&mut node.parents, &edge.a),
        RelationshipKind::Marriage => (&mut node.spouses, edge.other(&node.id)?),
    };
    if !list.contains(neighbor) {
        list.push(neighbor.clone());
    }
    Some(neighbor.clone())
}
