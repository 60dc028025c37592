//! Two-pass tree layout.
//!
//! The graph is first cut into a layout tree: every identity is claimed by
//! exactly one row block (a host plus the spouses it hosts) and every child
//! hangs under exactly one block. Claims are handed out breadth first, so a
//! contested identity lands at its shallowest position and cyclic records
//! are cut where they loop back.
//!
//! Pass 1 computes, bottom-up, how wide each block's band is and where the
//! block and its children sit inside it. Pass 2 walks top-down and assigns
//! absolute coordinates, consulting that table only. Every box of a subtree
//! stays inside its band, so sibling bands never overlap.

use crate::core::consanguinity::KinshipIndex;
use crate::domain::model::{
    Connector, ConnectorKind, FamilyGraph, Identity, IdentityPair, LayoutConfig, Point, TreeLayout,
};
use std::collections::{BTreeMap, HashSet};

/// Marriages are keyed by their sorted pair, adoptions by (parent, child).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Relation {
    Marriage(IdentityPair),
    Adoption(Identity, Identity),
}

impl Relation {
    fn marriage(u: &Identity, v: &Identity) -> Self {
        Self::Marriage(IdentityPair::new(u.clone(), v.clone()))
    }

    fn adoption(parent: &Identity, child: &Identity) -> Self {
        Self::Adoption(parent.clone(), child.clone())
    }
}

/// Widths computed for one row block during the bottom-up pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubtreeWidth {
    /// Space taken by the host and its spouses side by side.
    pub own: f64,
    /// Space taken by the block together with everything below it.
    pub subtree: f64,
}

/// Pass 1 result for one slot, offsets relative to the left edge of its band.
#[derive(Debug, Clone, Copy, Default)]
struct Extent {
    width: f64,
    /// Left edge of the host box.
    block: f64,
    /// Left edge of the children row.
    children: f64,
}

#[derive(Debug)]
struct Slot {
    id: Identity,
    spouses: Vec<Identity>,
    children: Vec<usize>,
}

impl Slot {
    fn new(id: Identity) -> Self {
        Self {
            id,
            spouses: Vec::new(),
            children: Vec::new(),
        }
    }

    fn block(&self) -> impl Iterator<Item = &Identity> {
        std::iter::once(&self.id).chain(self.spouses.iter())
    }
}

/// Layout tree of one connected part of the graph. Slot 0 is the top and a
/// child's index is always greater than its parent's.
#[derive(Debug)]
struct TreePlan {
    slots: Vec<Slot>,
    back_edge: bool,
}

impl TreePlan {
    fn build(
        graph: &FamilyGraph,
        top: &Identity,
        claimed: &mut HashSet<Identity>,
        kinship: &mut KinshipIndex<'_>,
    ) -> Self {
        let mut slots = vec![Slot::new(top.clone())];
        let mut back_edge = false;
        claimed.insert(top.clone());

        let mut next = 0;
        while next < slots.len() {
            let host = slots[next].id.clone();

            let mut spouses = Vec::new();
            for spouse in graph.spouses(&host) {
                if claimed.insert(spouse.clone()) {
                    spouses.push(spouse.clone());
                }
            }

            let mut children = Vec::new();
            for parent in std::iter::once(&host).chain(spouses.iter()) {
                for child in graph.children(parent) {
                    if claimed.insert(child.clone()) {
                        children.push(slots.len());
                        slots.push(Slot::new(child.clone()));
                    } else if kinship.descendants(child).contains(parent) {
                        tracing::warn!("Skipping adoption {} -> {}: it closes a cycle", parent, child);
                        back_edge = true;
                    }
                }
            }

            slots[next].spouses = spouses;
            slots[next].children = children;
            next += 1;
        }

        Self { slots, back_edge }
    }

    /// Relations the block connectors of this tree already draw.
    fn drawn_relations(&self, graph: &FamilyGraph, out: &mut HashSet<Relation>) {
        for slot in &self.slots {
            for spouse in &slot.spouses {
                out.insert(Relation::marriage(&slot.id, spouse));
            }
            for &c in &slot.children {
                let child = &self.slots[c].id;
                for parent in slot.block() {
                    if graph.children(parent).contains(child) {
                        out.insert(Relation::adoption(parent, child));
                    }
                }
            }
        }
    }

    fn own_width(&self, idx: usize, config: &LayoutConfig) -> f64 {
        (self.slots[idx].spouses.len() + 1) as f64 * (config.box_size + config.gap) - config.gap
    }

    fn children_width(&self, idx: usize, extents: &[Extent], config: &LayoutConfig) -> f64 {
        let children = &self.slots[idx].children;
        if children.is_empty() {
            return 0.0;
        }
        children.iter().map(|&c| extents[c].width + config.gap).sum::<f64>() - config.gap
    }

    /// Pass 1. Children always sit after their parent, so a reverse sweep
    /// sees every child before the block that hosts it.
    fn extents(&self, config: &LayoutConfig) -> Vec<Extent> {
        let mut extents = vec![Extent::default(); self.slots.len()];
        for idx in (0..self.slots.len()).rev() {
            let own = self.own_width(idx, config);
            extents[idx] = match self.slots[idx].children.as_slice() {
                // Single child: the block is centered over the child's host box,
                // and the band grows on whichever side the block overhangs.
                [only] => {
                    let child = extents[*only];
                    let block = child.block + config.box_size / 2.0 - own / 2.0;
                    let left = block.min(0.0);
                    let right = (block + own).max(child.width);
                    Extent {
                        width: right - left,
                        block: block - left,
                        children: -left,
                    }
                }
                _ => {
                    let total = self.children_width(idx, &extents, config);
                    let width = own.max(total);
                    Extent {
                        width,
                        block: (width - own) / 2.0,
                        children: (width - total) / 2.0,
                    }
                }
            };
        }
        extents
    }
}

/// Pass 2 state for one tree.
struct Placer<'p> {
    plan: &'p TreePlan,
    extents: &'p [Extent],
    config: &'p LayoutConfig,
    hosts: Vec<Point>,
}

impl<'p> Placer<'p> {
    fn new(plan: &'p TreePlan, extents: &'p [Extent], config: &'p LayoutConfig) -> Self {
        Self {
            plan,
            extents,
            config,
            hosts: vec![Point::new(0.0, 0.0); plan.slots.len()],
        }
    }

    /// Lays out slot `idx` inside the band starting at `x` on row `y`.
    fn place(&mut self, idx: usize, x: f64, y: f64) {
        let plan = self.plan;
        let extent = self.extents[idx];
        let child_y = y + self.config.box_size + self.config.row_gap;

        let mut child_x = x + extent.children;
        for &child in &plan.slots[idx].children {
            self.place(child, child_x, child_y);
            child_x += self.extents[child].width + self.config.gap;
        }

        self.hosts[idx] = Point::new(x + extent.block, y);
    }

    fn into_positions(self) -> BTreeMap<Identity, Point> {
        let step = self.config.box_size + self.config.gap;
        let mut positions = BTreeMap::new();
        for (slot, host) in self.plan.slots.iter().zip(&self.hosts) {
            for (k, id) in slot.block().enumerate() {
                positions.insert(id.clone(), Point::new(host.x + k as f64 * step, host.y));
            }
        }
        positions
    }
}

/// Per-block widths of the tree under `root`, keyed by block host.
pub fn subtree_widths(
    graph: &FamilyGraph,
    root: &Identity,
    config: &LayoutConfig,
) -> BTreeMap<Identity, SubtreeWidth> {
    let mut kinship = KinshipIndex::new(graph);
    let plan = TreePlan::build(graph, root, &mut HashSet::new(), &mut kinship);
    let extents = plan.extents(config);
    plan.slots
        .iter()
        .enumerate()
        .map(|(idx, slot)| {
            let width = SubtreeWidth {
                own: plan.own_width(idx, config),
                subtree: extents[idx].width,
            };
            (slot.id.clone(), width)
        })
        .collect()
}

/// Absolute coordinates and connector segments for every identity in `graph`.
///
/// The tree under `root` starts at the configured origin. Identities the
/// root's tree does not reach (a spouse's own parents, for instance) are laid
/// out as further trees to its right, so every node of the graph receives a
/// position. An identity absent from `graph` is laid out as a lone box.
pub fn layout(graph: &FamilyGraph, root: &Identity, config: &LayoutConfig) -> TreeLayout {
    let mut claimed = HashSet::new();
    let mut kinship = KinshipIndex::new(graph);
    let mut drawn = HashSet::new();
    let mut result = TreeLayout::default();
    let mut cursor_x = config.origin_x;
    let mut right = config.origin_x;
    let mut trees = 0;

    let mut pending = graph.order.iter();
    let mut next_top = Some(root.clone());

    while let Some(top) = next_top.take() {
        let plan = TreePlan::build(graph, &top, &mut claimed, &mut kinship);
        let extents = plan.extents(config);

        let mut placer = Placer::new(&plan, &extents, config);
        placer.place(0, cursor_x, config.origin_y);
        let positions = placer.into_positions();

        let box_right = positions
            .values()
            .map(|p| p.x + config.box_size)
            .fold(f64::MIN, f64::max);
        let bottom = positions
            .values()
            .map(|p| p.y + config.box_size + config.label_height)
            .fold(f64::MIN, f64::max);
        right = right.max(box_right).max(cursor_x + extents[0].width);
        result.bounds.height = result.bounds.height.max(bottom);

        tree_connectors(&plan, &positions, config, &mut result.connectors);
        plan.drawn_relations(graph, &mut drawn);
        result.truncated_due_to_cycle |= plan.back_edge;
        result.positions.extend(positions);
        trees += 1;

        cursor_x = right + config.gap;
        next_top = pending
            .find(|id| !claimed.contains(*id))
            .map(|id| local_top(graph, id, &claimed));
    }

    result.bounds.width = right;
    cross_links(graph, &result.positions, &drawn, config, &mut result.connectors);

    tracing::debug!(
        "Laid out {} identities in {} tree(s), bounds {}x{}",
        result.positions.len(),
        trees,
        result.bounds.width,
        result.bounds.height
    );
    result
}

/// Climbs unclaimed parents from `start` to find where its tree begins.
fn local_top(graph: &FamilyGraph, start: &Identity, claimed: &HashSet<Identity>) -> Identity {
    let mut current = start.clone();
    let mut seen = HashSet::from([start.clone()]);
    while let Some(parent) = graph
        .parents(&current)
        .iter()
        .find(|p| !claimed.contains(*p) && !seen.contains(*p))
    {
        seen.insert(parent.clone());
        current = parent.clone();
    }
    current
}

fn tree_connectors(
    plan: &TreePlan,
    positions: &BTreeMap<Identity, Point>,
    config: &LayoutConfig,
    out: &mut Vec<Connector>,
) {
    let half = config.box_size / 2.0;
    let center_top = |p: Point| Point::new(p.x + half, p.y);

    for slot in &plan.slots {
        let block: Vec<Point> = slot.block().filter_map(|id| positions.get(id).copied()).collect();
        let Some(&host) = block.first() else {
            continue;
        };

        for pair in block.windows(2) {
            out.push(Connector {
                kind: ConnectorKind::Spouse,
                from: Point::new(pair[0].x + config.box_size, pair[0].y + half),
                to: Point::new(pair[1].x, pair[1].y + half),
            });
        }

        let children: Vec<Point> = slot
            .children
            .iter()
            .filter_map(|&c| positions.get(&plan.slots[c].id).copied())
            .collect();
        if children.is_empty() {
            continue;
        }

        // Drop from between the host and its first spouse, or from the host alone.
        let mid_x = match block.get(1) {
            Some(spouse) => (host.x + spouse.x) / 2.0 + half,
            None => host.x + half,
        };
        let bottom = host.y + config.box_size;

        if let [child] = children.as_slice() {
            out.push(Connector {
                kind: ConnectorKind::SingleChild,
                from: Point::new(mid_x, bottom),
                to: center_top(*child),
            });
            continue;
        }

        let bus_y = bottom + config.row_gap / 2.0;
        let (left, right) = children
            .iter()
            .map(|c| c.x + half)
            .fold((mid_x, mid_x), |(l, r), x| (l.min(x), r.max(x)));

        out.push(Connector {
            kind: ConnectorKind::ParentDrop,
            from: Point::new(mid_x, bottom),
            to: Point::new(mid_x, bus_y),
        });
        out.push(Connector {
            kind: ConnectorKind::Bus,
            from: Point::new(left, bus_y),
            to: Point::new(right, bus_y),
        });
        for child in children {
            out.push(Connector {
                kind: ConnectorKind::ChildDrop,
                from: Point::new(child.x + half, bus_y),
                to: center_top(child),
            });
        }
    }
}

/// Straight links for relations the block structure does not already draw:
/// a marriage whose partners sit in different blocks, or an adoption whose
/// child was placed under some other block.
fn cross_links(
    graph: &FamilyGraph,
    positions: &BTreeMap<Identity, Point>,
    drawn: &HashSet<Relation>,
    config: &LayoutConfig,
    out: &mut Vec<Connector>,
) {
    let half = config.box_size / 2.0;
    let mut emitted = HashSet::new();

    for (u, node) in &graph.nodes {
        let Some(&pu) = positions.get(u) else {
            continue;
        };

        for v in &node.spouses {
            let relation = Relation::marriage(u, v);
            if drawn.contains(&relation) || !emitted.insert(relation) {
                continue;
            }
            if let Some(&pv) = positions.get(v) {
                out.push(Connector {
                    kind: ConnectorKind::CrossLink,
                    from: Point::new(pu.x + half, pu.y + half),
                    to: Point::new(pv.x + half, pv.y + half),
                });
            }
        }

        for c in &node.children {
            let relation = Relation::adoption(u, c);
            if drawn.contains(&relation) || !emitted.insert(relation) {
                continue;
            }
            if let Some(&pc) = positions.get(c) {
                out.push(Connector {
                    kind: ConnectorKind::CrossLink,
                    from: Point::new(pu.x + half, pu.y + config.box_size),
                    to: Point::new(pc.x + half, pc.y),
                });
            }
        }
    }
}
