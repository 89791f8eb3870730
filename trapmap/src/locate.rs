//! Point location, by walking the search DAG.

use crate::{
    dag::{Dag, Node},
    dataset::{Dataset, SegIdx},
    geom::{Point, Side},
    num::Float,
    trapezoid::{Neighbor, TrapIdx, Trapezoids},
};

// Walks from the root to a leaf. At X-nodes, queries strictly to the left of the
// node's point go left. At Y-nodes, `above` decides, given the side of `query`
// relative to the node's segment.
fn descend<F: Float>(
    dag: &Dag,
    dataset: &Dataset<F>,
    query: &Point<F>,
    mut above: impl FnMut(SegIdx, Side) -> bool,
) -> TrapIdx {
    let mut idx = dag.root();
    loop {
        match *dag.get(idx) {
            Node::X { point, left, right } => {
                idx = if query.x < dataset.get_point(point).x {
                    left
                } else {
                    right
                };
            }
            Node::Y {
                segment,
                above: a,
                below: b,
            } => {
                let side = dataset.ordered_segment(segment).side(query);
                idx = if above(segment, side) { a } else { b };
            }
            Node::Leaf(t) => return t,
        }
    }
}

/// Finds the trapezoid containing `point`.
///
/// Points on the vertical wall through a segment endpoint belong to the
/// trapezoid on the right of the wall. Panics if `point` lies on an inserted
/// segment.
pub fn locate_point<F: Float>(dag: &Dag, dataset: &Dataset<F>, point: &Point<F>) -> TrapIdx {
    descend(dag, dataset, point, |seg, side| match side {
        Side::Above => true,
        Side::Below => false,
        Side::On => panic!("query point {point:?} lies on segment {seg:?}"),
    })
}

/// Finds the trapezoid that the segment `seg` starts in, meaning the one
/// containing the part of `seg` immediately to the right of its left endpoint.
///
/// If the left endpoint is shared with an inserted segment, the right endpoint
/// breaks the tie. Panics if `seg` starts in the interior of, or runs along, an
/// inserted segment.
pub fn locate_for_insertion<F: Float>(dag: &Dag, dataset: &Dataset<F>, seg: SegIdx) -> TrapIdx {
    let (p, q) = dataset.endpoints(seg);
    let start = dataset.get_point(p);
    let end = dataset.get_point(q);

    descend(dag, dataset, start, |other, side| match side {
        Side::Above => true,
        Side::Below => false,
        Side::On => {
            let (other_start, _) = dataset.endpoints(other);
            assert_eq!(
                other_start, p,
                "{seg:?} starts in the interior of {other:?}"
            );
            match dataset.ordered_segment(other).side(end) {
                Side::Above => true,
                Side::Below => false,
                Side::On => panic!("{seg:?} overlaps {other:?}"),
            }
        }
    })
}

/// The trapezoids that the segment `seg` passes through, from left to right.
///
/// `seg` must not have been inserted yet.
pub fn crossed_trapezoids<F: Float>(
    traps: &Trapezoids<F>,
    dag: &Dag,
    dataset: &Dataset<F>,
    seg: SegIdx,
) -> Vec<TrapIdx> {
    let segment = dataset.ordered_segment(seg);
    let mut cur = locate_for_insertion(dag, dataset, seg);
    let mut ret = vec![cur];

    // A trapezoid that's unbounded on the right reaches the bounding box, so
    // the segment must end in it.
    while let Some(right) = traps.get(cur).boundary().right {
        let right = dataset.get_point(right);
        if segment.end.x <= right.x {
            break;
        }
        let slot = match segment.side(right) {
            Side::Above => Neighbor::BottomRight,
            Side::Below => Neighbor::TopRight,
            Side::On => panic!("{seg:?} passes through {right:?}"),
        };
        cur = traps
            .get(cur)
            .neighbor(slot)
            .expect("segment ran into a missing neighbor");
        ret.push(cur);
    }
    ret
}
