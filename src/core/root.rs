use crate::domain::model::Identity;
use crate::domain::ports::RelationshipStore;
use crate::utils::error::Result;
use std::collections::HashSet;

/// Outcome of walking adoption edges upward from a starting identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResolution {
    pub root: Identity,
    /// Set when the ascent ran into an identity it had already passed.
    pub truncated_due_to_cycle: bool,
}

/// Topmost ancestor of `start` reachable through accepted adoptions.
pub async fn resolve_root<S>(store: &S, start: &Identity) -> Result<Identity>
where
    S: RelationshipStore + ?Sized,
{
    Ok(resolve_root_detailed(store, start).await?.root)
}

pub async fn resolve_root_detailed<S>(store: &S, start: &Identity) -> Result<RootResolution>
where
    S: RelationshipStore + ?Sized,
{
    let mut current = start.clone();
    let mut visited = HashSet::from([start.clone()]);

    while let Some(edge) = store.find_accepted_adoption_by_child(&current).await? {
        let parent = edge.a;
        if visited.contains(&parent) {
            tracing::warn!(
                "Adoption cycle detected above {} (revisited {}), stopping ascent",
                current,
                parent
            );
            return Ok(RootResolution {
                root: current,
                truncated_due_to_cycle: true,
            });
        }
        visited.insert(parent.clone());
        current = parent;
    }

    tracing::debug!("Resolved root of {} to {} after {} step(s)", start, current, visited.len() - 1);
    Ok(RootResolution {
        root: current,
        truncated_due_to_cycle: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::model::RelationshipEdge;

    fn id(s: &str) -> Identity {
        Identity::new(s)
    }

    #[tokio::test]
    async fn test_resolves_to_topmost_ancestor() {
        let store = InMemoryStore::new(vec![
            RelationshipEdge::adoption("grandma", "mum"),
            RelationshipEdge::adoption("mum", "kid"),
        ]);

        let resolution = resolve_root_detailed(&store, &id("kid")).await.unwrap();
        assert_eq!(resolution.root, id("grandma"));
        assert!(!resolution.truncated_due_to_cycle);
    }

    #[tokio::test]
    async fn test_self_adoption_is_treated_as_cycle() {
        let store = InMemoryStore::new(vec![RelationshipEdge::adoption("narcissus", "narcissus")]);

        let resolution = resolve_root_detailed(&store, &id("narcissus")).await.unwrap();
        assert_eq!(resolution.root, id("narcissus"));
        assert!(resolution.truncated_due_to_cycle);
    }
}
