use crate::domain::model::{Identity, RelationshipEdge, RelationshipKind};
use crate::domain::ports::RelationshipStore;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only snapshot of relationship records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    edges: Vec<RelationshipEdge>,
}

impl InMemoryStore {
    pub fn new(edges: Vec<RelationshipEdge>) -> Self {
        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    fn accepted(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.iter().filter(|e| e.is_accepted())
    }
}

impl FromIterator<RelationshipEdge> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = RelationshipEdge>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl RelationshipStore for InMemoryStore {
    async fn find_accepted_adoption_by_child(
        &self,
        child: &Identity,
    ) -> Result<Option<RelationshipEdge>> {
        let mut matches = self
            .accepted()
            .filter(|e| e.kind == RelationshipKind::Adoption && &e.b == child);
        let first = matches.next().cloned();
        if matches.next().is_some() {
            tracing::warn!("{} has more than one accepted adoption, using the first", child);
        }
        Ok(first)
    }

    async fn find_accepted_edges_by_identity(&self, id: &Identity) -> Result<Vec<RelationshipEdge>> {
        Ok(self.accepted().filter(|e| e.involves(id)).cloned().collect())
    }

    async fn find_accepted_marriages(&self) -> Result<Vec<RelationshipEdge>> {
        Ok(self
            .accepted()
            .filter(|e| e.kind == RelationshipKind::Marriage)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RelationshipStatus;

    #[tokio::test]
    async fn test_marriage_found_from_both_endpoints() {
        let store = InMemoryStore::new(vec![RelationshipEdge::marriage("ann", "bob")]);

        let from_ann = store.find_accepted_edges_by_identity(&Identity::new("ann")).await.unwrap();
        let from_bob = store.find_accepted_edges_by_identity(&Identity::new("bob")).await.unwrap();
        assert_eq!(from_ann, from_bob);
        assert_eq!(from_ann.len(), 1);
    }

    #[tokio::test]
    async fn test_only_accepted_records_are_returned() {
        let store: InMemoryStore = vec![
            RelationshipEdge::adoption("old", "kid").with_status(RelationshipStatus::Terminated),
            RelationshipEdge::adoption("new", "kid"),
            RelationshipEdge::marriage("x", "y").with_status(RelationshipStatus::Pending),
        ]
        .into_iter()
        .collect();

        let parent = store
            .find_accepted_adoption_by_child(&Identity::new("kid"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(parent.a, Identity::new("new"));
        assert!(store.find_accepted_marriages().await.unwrap().is_empty());
    }
}
