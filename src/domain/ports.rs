use crate::domain::model::{Identity, RelationshipEdge};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Query side of the relationship store. Every method returns accepted records only.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// The accepted adoption whose child is `child`, if any.
    async fn find_accepted_adoption_by_child(&self, child: &Identity)
        -> Result<Option<RelationshipEdge>>;

    /// Accepted edges of any kind where `id` is either endpoint.
    async fn find_accepted_edges_by_identity(&self, id: &Identity) -> Result<Vec<RelationshipEdge>>;

    /// Every accepted marriage in the store.
    async fn find_accepted_marriages(&self) -> Result<Vec<RelationshipEdge>>;
}

#[async_trait]
impl<S: RelationshipStore + ?Sized> RelationshipStore for std::sync::Arc<S> {
    async fn find_accepted_adoption_by_child(
        &self,
        child: &Identity,
    ) -> Result<Option<RelationshipEdge>> {
        (**self).find_accepted_adoption_by_child(child).await
    }

    async fn find_accepted_edges_by_identity(&self, id: &Identity) -> Result<Vec<RelationshipEdge>> {
        (**self).find_accepted_edges_by_identity(id).await
    }

    async fn find_accepted_marriages(&self) -> Result<Vec<RelationshipEdge>> {
        (**self).find_accepted_marriages().await
    }
}
