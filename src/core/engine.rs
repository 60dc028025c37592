use crate::core::anniversary::collect_anniversaries;
use crate::core::builder::build_graph;
use crate::core::consanguinity::find_flagged_pairs;
use crate::core::layout::layout;
use crate::core::root::resolve_root_detailed;
use crate::core::siblings::find_siblings;
use crate::domain::model::{FamilyTree, Identity, LayoutConfig};
use crate::domain::ports::RelationshipStore;
use crate::utils::error::Result;

/// Entry point for tree requests. Holds no per-request state, so one engine
/// can serve concurrent requests.
pub struct FamilyTreeEngine<S: RelationshipStore> {
    store: S,
    config: LayoutConfig,
}

impl<S: RelationshipStore> FamilyTreeEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LayoutConfig::default())
    }

    pub fn with_config(store: S, config: LayoutConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Resolves the family root of `member`, builds the family graph from it,
    /// flags invalid marriages and lays the tree out.
    pub async fn request_family_tree(&self, member: &Identity) -> Result<FamilyTree> {
        tracing::debug!("Building family tree for {}", member);

        let resolution = resolve_root_detailed(&self.store, member).await?;
        let graph = build_graph(&self.store, &resolution.root).await?;

        let flags = find_flagged_pairs(&graph);
        let layout = layout(&graph, &resolution.root, &self.config);
        let siblings = find_siblings(&graph);
        let anniversaries = collect_anniversaries(&graph);
        let truncated = resolution.truncated_due_to_cycle || layout.truncated_due_to_cycle;

        if truncated {
            tracing::warn!("Family tree of {} was cut short by cyclic records", member);
        }
        tracing::info!(
            "Family tree for {} (root {}): {} members, {} flagged marriage(s)",
            member,
            resolution.root,
            graph.len(),
            flags.len()
        );

        Ok(FamilyTree {
            root: resolution.root,
            graph,
            layout,
            flags,
            siblings,
            anniversaries,
            truncated_due_to_cycle: truncated,
        })
    }
}
