//! Incremental segment insertion.
//!
//! Inserting a segment splits every trapezoid it crosses into a part above it
//! and a part below it, and then merges those parts along the segment wherever
//! the vertical wall that used to separate two crossed trapezoids no longer
//! reaches the segment. We walk the crossed trapezoids from left to right,
//! keeping one "upper strip" and one "lower strip" open; at each wall between
//! two crossed trapezoids, exactly one of them gets closed off and replaced.
//!
//! Nothing is written until the whole insertion is worked out: new trapezoids,
//! DAG nodes and neighbor updates are first collected in a [`Staging`] and then
//! committed in one go, so a failed assertion leaves the map untouched.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use crate::{
    dag::{Dag, Node, NodeIdx},
    dataset::{Dataset, PointIdx, SegIdx},
    geom::Side,
    locate::crossed_trapezoids,
    num::Float,
    trapezoid::{Adjacency, Boundary, Neighbor, TrapIdx, Trapezoid, Trapezoids},
};

/// A trapezoid under construction.
#[derive(Clone, Debug)]
struct Strip {
    id: TrapIdx,
    boundary: Boundary,
    adjacency: Adjacency,
}

#[derive(Debug)]
struct Staging {
    traps: BTreeMap<TrapIdx, (Boundary, Adjacency)>,
    nodes: BTreeMap<NodeIdx, Node>,
    // (outside trapezoid, its slot, new neighbor)
    relinks: Vec<(TrapIdx, Neighbor, TrapIdx)>,
    leaves: HashMap<TrapIdx, NodeIdx>,
    next_trap: usize,
    next_node: usize,
}

impl Staging {
    fn new(num_traps: usize, num_nodes: usize) -> Self {
        Staging {
            traps: BTreeMap::new(),
            nodes: BTreeMap::new(),
            relinks: Vec::new(),
            leaves: HashMap::new(),
            next_trap: num_traps,
            next_node: num_nodes,
        }
    }

    fn new_trap(&mut self) -> TrapIdx {
        self.next_trap += 1;
        TrapIdx(self.next_trap - 1)
    }

    fn new_node(&mut self) -> NodeIdx {
        self.next_node += 1;
        NodeIdx(self.next_node - 1)
    }

    /// Allocates a fresh leaf for `trap`.
    fn leaf(&mut self, trap: TrapIdx) -> NodeIdx {
        let idx = self.new_node();
        self.nodes.insert(idx, Node::Leaf(trap));
        let prev = self.leaves.insert(trap, idx);
        debug_assert!(prev.is_none());
        idx
    }

    fn stage(&mut self, strip: Strip) {
        self.traps
            .insert(strip.id, (strip.boundary, strip.adjacency));
    }

    fn relink(&mut self, outer: Option<TrapIdx>, slot: Neighbor, new: TrapIdx) {
        if let Some(outer) = outer {
            self.relinks.push((outer, slot, new));
        }
    }

    /// Turns the leaf at `slot` into X-nodes splitting off the trapezoids to the
    /// left of `left.0` and to the right of `right.0`, returning the node that
    /// should handle everything in between.
    fn replace_leaf(
        &mut self,
        slot: NodeIdx,
        left: Option<(PointIdx, TrapIdx)>,
        right: Option<(PointIdx, TrapIdx)>,
    ) -> NodeIdx {
        let mut target = slot;
        if let Some((point, trap)) = left {
            let leaf = self.leaf(trap);
            let rest = self.new_node();
            self.nodes.insert(
                target,
                Node::X {
                    point,
                    left: leaf,
                    right: rest,
                },
            );
            target = rest;
        }
        if let Some((point, trap)) = right {
            let leaf = self.leaf(trap);
            let rest = self.new_node();
            self.nodes.insert(
                target,
                Node::X {
                    point,
                    left: rest,
                    right: leaf,
                },
            );
            target = rest;
        }
        target
    }

    fn commit<F: Float>(self, traps: &mut Trapezoids<F>, dag: &mut Dag, dataset: &Dataset<F>) {
        let bbox = traps.bounding_box().clone();
        for (idx, (boundary, adjacency)) in self.traps {
            let leaf = *self
                .leaves
                .get(&idx)
                .expect("every staged trapezoid has a leaf");
            traps.put(idx, Trapezoid::new(boundary, adjacency, leaf, dataset, &bbox));
        }
        for (outer, slot, new) in self.relinks {
            traps.get_mut(outer).adjacency.set(slot, Some(new));
        }
        for (idx, node) in self.nodes {
            dag.put(idx, node);
        }
    }
}

/// Inserts the segment `seg` into the map made of `traps` and `dag`.
///
/// `seg` must not cross or overlap any segment that's already in the map, and
/// its endpoints must lie in the bounding box.
pub(crate) fn insert_segment<F: Float>(
    traps: &mut Trapezoids<F>,
    dag: &mut Dag,
    dataset: &Dataset<F>,
    seg: SegIdx,
) {
    let staging = stage(traps, dag, dataset, seg);
    trace!(
        "committing {} trapezoids and {} nodes",
        staging.traps.len(),
        staging.nodes.len()
    );
    staging.commit(traps, dag, dataset);
}

fn stage<F: Float>(traps: &Trapezoids<F>, dag: &Dag, dataset: &Dataset<F>, seg: SegIdx) -> Staging {
    let bbox = traps.bounding_box();
    let segment = dataset.ordered_segment(seg);
    let (p, q) = dataset.endpoints(seg);
    assert!(!segment.is_vertical(), "{seg:?} is vertical");
    assert!(
        bbox.contains(&segment.start) && bbox.contains(&segment.end),
        "{seg:?} sticks out of the bounding box"
    );

    let crossed = crossed_trapezoids(traps, dag, dataset, seg);
    let k = crossed.len();
    debug!("inserting {seg:?}, crossing {crossed:?}");

    let first = traps.get(crossed[0]);
    let last = traps.get(crossed[k - 1]);

    // Does the segment start on the left wall of the first trapezoid, or end on
    // the right wall of the last one?
    let overlap_left = match first.boundary().left {
        Some(left) => left == p,
        None => segment.start.x == bbox.min.x,
    };
    let overlap_right = match last.boundary().right {
        Some(right) => right == q,
        None => segment.end.x == bbox.max.x,
    };

    // Do the top and bottom of the first (resp. last) trapezoid start (resp. end)
    // at its left (resp. right) point? If so, there's nothing to link to on that
    // corner.
    let starts_at = |s: Option<SegIdx>, pt: Option<PointIdx>| {
        matches!((s, pt), (Some(s), Some(pt)) if dataset.endpoints(s).0 == pt)
    };
    let ends_at = |s: Option<SegIdx>, pt: Option<PointIdx>| {
        matches!((s, pt), (Some(s), Some(pt)) if dataset.endpoints(s).1 == pt)
    };
    let has_endpoint_tl = starts_at(first.boundary().top, first.boundary().left);
    let has_endpoint_bl = starts_at(first.boundary().bottom, first.boundary().left);
    let has_endpoint_tr = ends_at(last.boundary().top, last.boundary().right);
    let has_endpoint_br = ends_at(last.boundary().bottom, last.boundary().right);

    let mut st = Staging::new(traps.len(), dag.len());
    let upper_id = crossed[0];
    let lower_id = st.new_trap();
    let left_id = (!overlap_left).then(|| st.new_trap());
    let right_id = (!overlap_right).then(|| st.new_trap());

    let y = st.replace_leaf(
        first.leaf,
        left_id.map(|t| (p, t)),
        if k == 1 { right_id.map(|t| (q, t)) } else { None },
    );

    let mut upper = Strip {
        id: upper_id,
        boundary: Boundary {
            top: first.boundary().top,
            bottom: Some(seg),
            left: Some(p),
            right: None,
        },
        adjacency: Adjacency::default(),
    };
    let mut lower = Strip {
        id: lower_id,
        boundary: Boundary {
            top: Some(seg),
            bottom: first.boundary().bottom,
            left: Some(p),
            right: None,
        },
        adjacency: Adjacency::default(),
    };
    let mut upper_leaf = st.leaf(upper.id);
    let mut lower_leaf = st.leaf(lower.id);
    st.nodes.insert(
        y,
        Node::Y {
            segment: seg,
            above: upper_leaf,
            below: lower_leaf,
        },
    );

    match left_id {
        Some(left) => {
            let adjacency = Adjacency {
                top_left: first.adjacency.top_left,
                bottom_left: first.adjacency.bottom_left,
                top_right: Some(upper.id),
                bottom_right: Some(lower.id),
            };
            st.relink(first.adjacency.top_left, Neighbor::TopRight, left);
            st.relink(first.adjacency.bottom_left, Neighbor::BottomRight, left);
            st.stage(Strip {
                id: left,
                boundary: Boundary {
                    right: Some(p),
                    ..*first.boundary()
                },
                adjacency,
            });
            upper.adjacency.top_left = Some(left);
            lower.adjacency.bottom_left = Some(left);
        }
        None => {
            if !has_endpoint_tl {
                upper.adjacency.top_left = first.adjacency.top_left;
                st.relink(first.adjacency.top_left, Neighbor::TopRight, upper.id);
            }
            if !has_endpoint_bl {
                lower.adjacency.bottom_left = first.adjacency.bottom_left;
                st.relink(first.adjacency.bottom_left, Neighbor::BottomRight, lower.id);
            }
        }
    }

    for i in 1..k {
        let prev = traps.get(crossed[i - 1]);
        let cur = traps.get(crossed[i]);
        let r = prev
            .boundary()
            .right
            .expect("only the last crossed trapezoid can reach the bounding box");
        debug_assert_eq!(cur.boundary().left, Some(r));

        match segment.side(dataset.get_point(r)) {
            Side::Above => {
                trace!("{seg:?} passes below {r:?}: closing upper strip {:?}", upper.id);
                let next = Strip {
                    id: crossed[i],
                    boundary: Boundary {
                        top: cur.boundary().top,
                        bottom: Some(seg),
                        left: Some(r),
                        right: None,
                    },
                    adjacency: Adjacency {
                        top_left: cur.adjacency.top_left,
                        bottom_left: Some(upper.id),
                        ..Adjacency::default()
                    },
                };
                st.relink(cur.adjacency.top_left, Neighbor::TopRight, next.id);

                upper.boundary.right = Some(r);
                upper.adjacency.top_right = prev.adjacency.top_right;
                upper.adjacency.bottom_right = Some(next.id);
                st.relink(prev.adjacency.top_right, Neighbor::TopLeft, upper.id);

                upper_leaf = st.leaf(next.id);
                let closed = std::mem::replace(&mut upper, next);
                st.stage(closed);
            }
            Side::Below => {
                trace!("{seg:?} passes above {r:?}: closing lower strip {:?}", lower.id);
                let next = Strip {
                    id: crossed[i],
                    boundary: Boundary {
                        top: Some(seg),
                        bottom: cur.boundary().bottom,
                        left: Some(r),
                        right: None,
                    },
                    adjacency: Adjacency {
                        top_left: Some(lower.id),
                        bottom_left: cur.adjacency.bottom_left,
                        ..Adjacency::default()
                    },
                };
                st.relink(cur.adjacency.bottom_left, Neighbor::BottomRight, next.id);

                lower.boundary.right = Some(r);
                lower.adjacency.top_right = Some(next.id);
                lower.adjacency.bottom_right = prev.adjacency.bottom_right;
                st.relink(prev.adjacency.bottom_right, Neighbor::BottomLeft, lower.id);

                lower_leaf = st.leaf(next.id);
                let closed = std::mem::replace(&mut lower, next);
                st.stage(closed);
            }
            Side::On => panic!("{seg:?} passes through {r:?}"),
        }

        let y = if i == k - 1 {
            st.replace_leaf(cur.leaf, None, right_id.map(|t| (q, t)))
        } else {
            cur.leaf
        };
        st.nodes.insert(
            y,
            Node::Y {
                segment: seg,
                above: upper_leaf,
                below: lower_leaf,
            },
        );
    }

    upper.boundary.right = Some(q);
    lower.boundary.right = Some(q);
    match right_id {
        Some(right) => {
            upper.adjacency.top_right = Some(right);
            upper.adjacency.bottom_right = None;
            lower.adjacency.top_right = None;
            lower.adjacency.bottom_right = Some(right);

            st.relink(last.adjacency.top_right, Neighbor::TopLeft, right);
            st.relink(last.adjacency.bottom_right, Neighbor::BottomLeft, right);
            st.stage(Strip {
                id: right,
                boundary: Boundary {
                    left: Some(q),
                    ..*last.boundary()
                },
                adjacency: Adjacency {
                    top_left: Some(upper.id),
                    bottom_left: Some(lower.id),
                    top_right: last.adjacency.top_right,
                    bottom_right: last.adjacency.bottom_right,
                },
            });
        }
        None => {
            upper.adjacency.top_right = if has_endpoint_tr {
                None
            } else {
                last.adjacency.top_right
            };
            upper.adjacency.bottom_right = None;
            lower.adjacency.top_right = None;
            lower.adjacency.bottom_right = if has_endpoint_br {
                None
            } else {
                last.adjacency.bottom_right
            };
            st.relink(upper.adjacency.top_right, Neighbor::TopLeft, upper.id);
            st.relink(lower.adjacency.bottom_right, Neighbor::BottomLeft, lower.id);
        }
    }
    st.stage(upper);
    st.stage(lower);
    st
}
