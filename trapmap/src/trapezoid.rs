use crate::{
    dag::NodeIdx,
    dataset::{Dataset, PointIdx, SegIdx},
    geom::{Point, Rect},
    num::Float,
};

/// An index into the trapezoid arena of a [`Trapezoids`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct TrapIdx(pub usize);

impl std::fmt::Debug for TrapIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t_{}", self.0)
    }
}

/// The four things that define a trapezoid: the segments above and below it and
/// the points whose vertical lines bound it on the left and right.
///
/// `None` stands for the corresponding edge of the bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub top: Option<SegIdx>,
    pub bottom: Option<SegIdx>,
    pub left: Option<PointIdx>,
    pub right: Option<PointIdx>,
}

/// One of the four neighbor slots of a trapezoid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Neighbor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Neighbor {
    /// The slot that points back at us from the neighbor in this slot.
    pub fn mirror(self) -> Self {
        match self {
            Neighbor::TopLeft => Neighbor::TopRight,
            Neighbor::TopRight => Neighbor::TopLeft,
            Neighbor::BottomLeft => Neighbor::BottomRight,
            Neighbor::BottomRight => Neighbor::BottomLeft,
        }
    }
}

/// The trapezoids sharing a vertical wall with a trapezoid.
///
/// The "top" slots hold the neighbors whose shared wall touches our top boundary
/// and the "bottom" slots the ones touching our bottom boundary. If a wall ends
/// at a segment endpoint lying on our top boundary then it only touches our
/// bottom boundary, and so on. With this convention, neighbors always point at
/// each other through mirrored slots: `a.top_right == Some(b)` exactly when
/// `b.top_left == Some(a)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Adjacency {
    pub top_left: Option<TrapIdx>,
    pub top_right: Option<TrapIdx>,
    pub bottom_left: Option<TrapIdx>,
    pub bottom_right: Option<TrapIdx>,
}

impl Adjacency {
    pub fn get(&self, slot: Neighbor) -> Option<TrapIdx> {
        match slot {
            Neighbor::TopLeft => self.top_left,
            Neighbor::TopRight => self.top_right,
            Neighbor::BottomLeft => self.bottom_left,
            Neighbor::BottomRight => self.bottom_right,
        }
    }

    pub fn set(&mut self, slot: Neighbor, idx: Option<TrapIdx>) {
        match slot {
            Neighbor::TopLeft => self.top_left = idx,
            Neighbor::TopRight => self.top_right = idx,
            Neighbor::BottomLeft => self.bottom_left = idx,
            Neighbor::BottomRight => self.bottom_right = idx,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Neighbor, TrapIdx)> + '_ {
        [
            Neighbor::TopLeft,
            Neighbor::TopRight,
            Neighbor::BottomLeft,
            Neighbor::BottomRight,
        ]
        .into_iter()
        .filter_map(|slot| self.get(slot).map(|idx| (slot, idx)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trapezoid<F: Float> {
    // Private so that it can't get out of sync with `corners`.
    boundary: Boundary,
    pub adjacency: Adjacency,
    /// The DAG leaf that represents this trapezoid.
    pub leaf: NodeIdx,
    // Top-left, top-right, bottom-right, bottom-left.
    corners: [Point<F>; 4],
}

impl<F: Float> Trapezoid<F> {
    pub fn new(
        boundary: Boundary,
        adjacency: Adjacency,
        leaf: NodeIdx,
        dataset: &Dataset<F>,
        bbox: &Rect<F>,
    ) -> Self {
        Trapezoid {
            boundary,
            adjacency,
            leaf,
            corners: corners(&boundary, dataset, bbox),
        }
    }

    /// The trapezoid covering the whole bounding box.
    pub fn bounding_box(bbox: &Rect<F>) -> Self {
        Trapezoid {
            boundary: Boundary::default(),
            adjacency: Adjacency::default(),
            leaf: NodeIdx::ROOT,
            corners: [
                Point::new(bbox.min.x.clone(), bbox.max.y.clone()),
                bbox.max.clone(),
                Point::new(bbox.max.x.clone(), bbox.min.y.clone()),
                bbox.min.clone(),
            ],
        }
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Replaces the boundary, recomputing the corners.
    pub fn set_boundary(&mut self, boundary: Boundary, dataset: &Dataset<F>, bbox: &Rect<F>) {
        self.boundary = boundary;
        self.corners = corners(&boundary, dataset, bbox);
    }

    /// The corners, in the order top-left, top-right, bottom-right, bottom-left.
    ///
    /// When the top and bottom meet at one end, two of these coincide.
    pub fn corners(&self) -> &[Point<F>; 4] {
        &self.corners
    }

    pub fn neighbor(&self, slot: Neighbor) -> Option<TrapIdx> {
        self.adjacency.get(slot)
    }
}

fn corners<F: Float>(b: &Boundary, dataset: &Dataset<F>, bbox: &Rect<F>) -> [Point<F>; 4] {
    let x = |p: Option<PointIdx>, default: &F| match p {
        Some(p) => dataset.get_point(p).x.clone(),
        None => default.clone(),
    };
    let y = |s: Option<SegIdx>, x: &F, default: &F| match s {
        Some(s) => dataset.ordered_segment(s).at_x(x),
        None => default.clone(),
    };
    let left = x(b.left, &bbox.min.x);
    let right = x(b.right, &bbox.max.x);
    [
        Point::new(left.clone(), y(b.top, &left, &bbox.max.y)),
        Point::new(right.clone(), y(b.top, &right, &bbox.max.y)),
        Point::new(right.clone(), y(b.bottom, &right, &bbox.min.y)),
        Point::new(left.clone(), y(b.bottom, &left, &bbox.min.y)),
    ]
}

/// The trapezoid arena.
///
/// Trapezoids are never removed (except by [`Trapezoids::clear`]); splitting a
/// trapezoid overwrites its slot with one of the pieces.
#[derive(Clone, Debug)]
pub struct Trapezoids<F: Float> {
    traps: Vec<Trapezoid<F>>,
    bounding_box: Rect<F>,
}

impl<F: Float> Trapezoids<F> {
    /// An empty arena. It needs to be seeded with the bounding box trapezoid
    /// before it's useful.
    pub fn new(bounding_box: Rect<F>) -> Self {
        Self {
            traps: Vec::new(),
            bounding_box,
        }
    }

    pub fn get(&self, idx: TrapIdx) -> &Trapezoid<F> {
        &self.traps[idx.0]
    }

    pub fn get_mut(&mut self, idx: TrapIdx) -> &mut Trapezoid<F> {
        &mut self.traps[idx.0]
    }

    pub fn append(&mut self, trap: Trapezoid<F>) -> TrapIdx {
        self.traps.push(trap);
        TrapIdx(self.traps.len() - 1)
    }

    pub fn overwrite(&mut self, idx: TrapIdx, trap: Trapezoid<F>) {
        assert!(idx.0 < self.traps.len(), "overwriting unallocated {idx:?}");
        self.traps[idx.0] = trap;
    }

    /// Writes `trap` to slot `idx`, which must be either allocated already or the
    /// next one to be allocated.
    pub(crate) fn put(&mut self, idx: TrapIdx, trap: Trapezoid<F>) {
        if idx.0 < self.traps.len() {
            self.overwrite(idx, trap);
        } else {
            let appended = self.append(trap);
            assert_eq!(appended, idx, "trapezoid slots must be filled in order");
        }
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    pub fn bounding_box(&self) -> &Rect<F> {
        &self.bounding_box
    }

    pub fn clear(&mut self) {
        self.traps.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrapIdx, &Trapezoid<F>)> {
        self.traps.iter().enumerate().map(|(i, t)| (TrapIdx(i), t))
    }
}
