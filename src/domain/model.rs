use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque participant reference. Only equality, hashing and ordering matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Marriage,
    Adoption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Accepted,
    Declined,
    Terminated,
    Disowned,
    Divorced,
}

/// A stored relationship record.
///
/// Marriages are undirected. Adoptions are directed: `a` is the parent and
/// `b` the child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub a: Identity,
    pub b: Identity,
    pub kind: RelationshipKind,
    pub status: RelationshipStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl RelationshipEdge {
    pub fn marriage(a: impl Into<Identity>, b: impl Into<Identity>) -> Self {
        Self::accepted(a.into(), b.into(), RelationshipKind::Marriage)
    }

    pub fn adoption(parent: impl Into<Identity>, child: impl Into<Identity>) -> Self {
        Self::accepted(parent.into(), child.into(), RelationshipKind::Adoption)
    }

    fn accepted(a: Identity, b: Identity, kind: RelationshipKind) -> Self {
        Self {
            a,
            b,
            kind,
            status: RelationshipStatus::Accepted,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: RelationshipStatus) -> Self {
        self.status = status;
        self
    }

    pub fn created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_accepted(&self) -> bool {
        self.status == RelationshipStatus::Accepted
    }

    pub fn involves(&self, id: &Identity) -> bool {
        &self.a == id || &self.b == id
    }

    /// The endpoint opposite `id`, if `id` is one of the endpoints.
    pub fn other(&self, id: &Identity) -> Option<&Identity> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }

    pub fn pair(&self) -> IdentityPair {
        IdentityPair::new(self.a.clone(), self.b.clone())
    }
}

/// Unordered pair of identities, stored sorted so `(u, v)` and `(v, u)` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityPair(Identity, Identity);

impl IdentityPair {
    pub fn new(u: Identity, v: Identity) -> Self {
        if u <= v {
            Self(u, v)
        } else {
            Self(v, u)
        }
    }
}

impl fmt::Display for IdentityPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// A married pair that is also related by ancestry.
pub type ConsanguinityFlag = IdentityPair;

/// Adjacency of one identity inside a family graph.
///
/// Each list keeps discovery order and holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyNode {
    pub id: Identity,
    pub children: Vec<Identity>,
    pub spouses: Vec<Identity>,
    pub parents: Vec<Identity>,
}

impl FamilyNode {
    pub fn new(id: Identity) -> Self {
        Self {
            id,
            children: Vec::new(),
            spouses: Vec::new(),
            parents: Vec::new(),
        }
    }
}

/// Reachable family subgraph built from a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyGraph {
    pub root: Identity,
    pub nodes: BTreeMap<Identity, FamilyNode>,
    /// Breadth-first discovery order, starting with `root`.
    pub order: Vec<Identity>,
    /// Accepted edges seen during the traversal, deduplicated.
    #[serde(skip)]
    pub edges: Vec<RelationshipEdge>,
}

impl FamilyGraph {
    pub fn singleton(root: Identity) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(root.clone(), FamilyNode::new(root.clone()));
        Self {
            order: vec![root.clone()],
            root,
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn node(&self, id: &Identity) -> Option<&FamilyNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: &Identity) -> &[Identity] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn spouses(&self, id: &Identity) -> &[Identity] {
        self.nodes.get(id).map(|n| n.spouses.as_slice()).unwrap_or(&[])
    }

    pub fn parents(&self, id: &Identity) -> &[Identity] {
        self.nodes.get(id).map(|n| n.parents.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.nodes.contains_key(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    /// Horizontal link between adjacent boxes of one row block.
    Spouse,
    /// Straight drop from a parent block to its only child.
    SingleChild,
    /// Vertical drop from the parent block midpoint to the bus row.
    ParentDrop,
    /// Horizontal bus line between the two rows.
    Bus,
    /// Vertical drop from the bus row into a child.
    ChildDrop,
    /// Relation whose endpoints were laid out apart from each other.
    CrossLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub from: Point,
    pub to: Point,
}

/// Absolute placement of every identity plus the segments joining them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    pub positions: BTreeMap<Identity, Point>,
    pub bounds: Bounds,
    pub connectors: Vec<Connector>,
    /// Adoption links skipped because they point back into the ancestry being laid out.
    pub truncated_due_to_cycle: bool,
}

impl TreeLayout {
    pub fn position(&self, id: &Identity) -> Option<Point> {
        self.positions.get(id).copied()
    }
}

/// Elapsed time since an accepted marriage or adoption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    pub pair: IdentityPair,
    pub kind: RelationshipKind,
    pub since: DateTime<Utc>,
}

/// Everything the rendering side needs to draw one family tree.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyTree {
    pub root: Identity,
    pub graph: FamilyGraph,
    pub layout: TreeLayout,
    pub flags: BTreeSet<ConsanguinityFlag>,
    pub siblings: BTreeMap<Identity, Vec<Identity>>,
    pub anniversaries: Vec<Anniversary>,
    pub truncated_due_to_cycle: bool,
}

/// Geometry settings for the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub box_size: f64,
    pub gap: f64,
    pub row_gap: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    /// Space reserved under each box for its name label.
    pub label_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            box_size: 80.0,
            gap: 40.0,
            row_gap: 120.0,
            origin_x: 50.0,
            origin_y: 50.0,
            label_height: 25.0,
        }
    }
}

impl LayoutConfig {
    pub fn new(box_size: f64, gap: f64) -> Self {
        Self {
            box_size,
            gap,
            row_gap: gap * 3.0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_graph_has_one_empty_node() {
        let graph = FamilyGraph::singleton(Identity::new("solo"));
        let node = graph.node(&Identity::new("solo")).unwrap();

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.order, vec![Identity::new("solo")]);
        assert!(node.children.is_empty() && node.spouses.is_empty() && node.parents.is_empty());
    }

    #[test]
    fn test_identity_pair_ignores_endpoint_order() {
        let forward = RelationshipEdge::marriage("x", "y").pair();
        let backward = RelationshipEdge::marriage("y", "x").pair();
        assert_eq!(forward, backward);
        assert_eq!(forward.to_string(), "x-y");
    }
}
