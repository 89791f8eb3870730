use std::collections::HashMap;

use malachite::Rational;
use rand::{seq::SliceRandom, Rng};

use crate::{
    dag::{Dag, Node},
    dataset::{Dataset, SegIdx},
    geom::{Point, Rect, Segment},
    insert, locate,
    num::Float,
    trapezoid::{TrapIdx, Trapezoid, Trapezoids},
};

/// A trapezoidal decomposition of a bounding box by a set of non-crossing
/// segments, together with the search DAG used for locating points in it.
///
/// The map refers to points and segments by their indices in a [`Dataset`],
/// which must be passed to every method that needs geometry. Always pass the
/// same dataset.
///
/// ```
/// use ordered_float::NotNan;
/// use trapmap::{Dataset, Point, Rect, Segment, TrapezoidalMap};
///
/// let p = |x: f64, y: f64| Point::<NotNan<f64>>::from((x, y));
/// let mut dataset = Dataset::default();
/// let seg = dataset.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
///
/// let mut map = TrapezoidalMap::new(Rect::new(p(0.0, 0.0), p(10.0, 10.0)));
/// map.insert_segment(seg, &dataset);
///
/// let above = map.locate_point(&p(5.0, 7.0), &dataset);
/// assert_eq!(map.trapezoid(above).boundary().bottom, Some(seg));
/// ```
#[derive(Clone, Debug)]
pub struct TrapezoidalMap<F: Float> {
    trapezoids: Trapezoids<F>,
    dag: Dag,
}

impl<F: Float> TrapezoidalMap<F> {
    /// A map with no segments: just one trapezoid, covering the bounding box.
    pub fn new(bounding_box: Rect<F>) -> Self {
        let mut ret = TrapezoidalMap {
            trapezoids: Trapezoids::new(bounding_box),
            dag: Dag::default(),
        };
        ret.init();
        ret
    }

    /// Seeds an empty map with the bounding box trapezoid and its leaf.
    ///
    /// Only needed after [`TrapezoidalMap::clear`].
    pub fn init(&mut self) {
        assert!(
            self.trapezoids.is_empty() && self.dag.is_empty(),
            "map is already initialized"
        );
        let trap = Trapezoid::bounding_box(self.trapezoids.bounding_box());
        let t = self.trapezoids.append(trap);
        let n = self.dag.append(Node::Leaf(t));
        debug_assert_eq!(self.trapezoids.get(t).leaf, n);
    }

    /// Removes everything, including the bounding box trapezoid.
    pub fn clear(&mut self) {
        self.trapezoids.clear();
        self.dag.clear();
    }

    /// Builds a map out of all the segments in a dataset, inserting them in a
    /// random order.
    ///
    /// The expected size of the DAG is linear in the number of segments and the
    /// expected query time is logarithmic, whatever the segments are.
    pub fn build<R: Rng + ?Sized>(dataset: &Dataset<F>, bounding_box: Rect<F>, rng: &mut R) -> Self {
        let mut segs: Vec<SegIdx> = dataset.segment_indices().collect();
        segs.shuffle(rng);

        let mut ret = Self::new(bounding_box);
        for seg in segs {
            ret.insert_segment(seg, dataset);
        }
        ret
    }

    /// Inserts a segment.
    ///
    /// The segment must not cross, overlap or touch the interior of any segment
    /// that was already inserted, and no two distinct points in the map may have
    /// the same `x` coordinate. Breaking these rules panics (or, in some cases
    /// that aren't detected, produces a broken map).
    pub fn insert_segment(&mut self, seg: SegIdx, dataset: &Dataset<F>) {
        assert!(!self.trapezoids.is_empty(), "map needs to be initialized");
        insert::insert_segment(&mut self.trapezoids, &mut self.dag, dataset, seg);
    }

    /// Inserts a segment by value. It needs to be registered in `dataset`.
    pub fn insert(&mut self, segment: &Segment<F>, dataset: &Dataset<F>) -> SegIdx {
        let seg = dataset
            .find_segment(segment)
            .expect("segment isn't registered");
        self.insert_segment(seg, dataset);
        seg
    }

    /// Finds the trapezoid containing `point`.
    ///
    /// Panics if `point` lies on an inserted segment. `point` must be inside the
    /// bounding box; this is only checked in debug builds.
    pub fn locate_point(&self, point: &Point<F>, dataset: &Dataset<F>) -> TrapIdx {
        debug_assert!(
            self.bounding_box().contains(point),
            "query point {point:?} is outside the bounding box"
        );
        locate::locate_point(&self.dag, dataset, point)
    }

    /// The trapezoids that inserting `seg` would split, from left to right.
    pub fn crossed_trapezoids(&self, seg: SegIdx, dataset: &Dataset<F>) -> Vec<TrapIdx> {
        locate::crossed_trapezoids(&self.trapezoids, &self.dag, dataset, seg)
    }

    pub fn trapezoid(&self, idx: TrapIdx) -> &Trapezoid<F> {
        self.trapezoids.get(idx)
    }

    pub fn trapezoids(&self) -> &Trapezoids<F> {
        &self.trapezoids
    }

    pub fn dag(&self) -> &Dag {
        &self.dag
    }

    pub fn bounding_box(&self) -> &Rect<F> {
        self.trapezoids.bounding_box()
    }

    /// Checks that the trapezoids and the DAG agree with each other and with
    /// the geometry, panicking if not.
    pub fn check_invariants(&self, dataset: &Dataset<F>) {
        let bbox = self.bounding_box();

        let mut leaf_counts = HashMap::new();
        for (_, node) in self.dag.iter() {
            if let Node::Leaf(t) = node {
                assert!(t.0 < self.trapezoids.len(), "leaf for unknown {t:?}");
                *leaf_counts.entry(*t).or_insert(0) += 1;
            }
        }

        for (idx, trap) in self.trapezoids.iter() {
            assert_eq!(
                self.dag.get(trap.leaf),
                &Node::Leaf(idx),
                "{idx:?} has the wrong leaf"
            );
            assert_eq!(leaf_counts.get(&idx), Some(&1), "{idx:?} has extra leaves");

            for (slot, other) in trap.adjacency.iter() {
                assert_eq!(
                    self.trapezoids.get(other).neighbor(slot.mirror()),
                    Some(idx),
                    "{idx:?} has {other:?} as a neighbor, but not the other way around"
                );
            }

            let b = trap.boundary();
            let left = b.left.map_or(&bbox.min.x, |p| &dataset.get_point(p).x);
            let right = b.right.map_or(&bbox.max.x, |p| &dataset.get_point(p).x);
            assert!(left < right, "{idx:?} has no width");

            // Compare the top and bottom in the middle, exactly.
            let mid = (left.to_exact() + right.to_exact()) / Rational::from(2);
            let y = |s: Option<SegIdx>, edge: &F| match s {
                Some(s) => dataset.ordered_segment(s).to_exact().at_x(&mid),
                None => edge.to_exact(),
            };
            assert!(
                y(b.top, &bbox.max.y) > y(b.bottom, &bbox.min.y),
                "{idx:?} is upside down"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::NotNan;
    use rand::SeedableRng;

    type F = NotNan<f64>;

    fn p(x: f64, y: f64) -> Point<F> {
        Point::from((x, y))
    }

    fn bbox() -> Rect<F> {
        Rect::new(p(0.0, 0.0), p(10.0, 10.0))
    }

    #[test]
    fn empty() {
        let ds = Dataset::default();
        let map = TrapezoidalMap::new(bbox());
        map.check_invariants(&ds);
        assert_eq!(map.locate_point(&p(5.0, 5.0), &ds), TrapIdx(0));
        assert_eq!(map.trapezoids().len(), 1);
        assert_eq!(
            map.trapezoid(TrapIdx(0)).corners(),
            &[p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 0.0)]
        );
    }

    #[test]
    fn query_above_and_below() {
        let mut ds = Dataset::default();
        let segs = [
            ds.add_segment(Segment::new(p(1.0, 1.0), p(4.0, 2.0))),
            ds.add_segment(Segment::new(p(3.0, 6.0), p(7.0, 5.0))),
            ds.add_segment(Segment::new(p(9.0, 3.0), p(5.0, 1.5))),
        ];
        let mut map = TrapezoidalMap::new(bbox());
        for &s in &segs {
            map.insert_segment(s, &ds);
            map.check_invariants(&ds);
        }

        let eps = NotNan::new(1e-6).unwrap();
        for &s in &segs {
            let seg = ds.ordered_segment(s);
            let mid = Point::new(
                (seg.start.x + seg.end.x) / NotNan::new(2.0).unwrap(),
                (seg.start.y + seg.end.y) / NotNan::new(2.0).unwrap(),
            );
            let above = map.locate_point(&Point::new(mid.x, mid.y + eps), &ds);
            let below = map.locate_point(&Point::new(mid.x, mid.y - eps), &ds);
            assert_ne!(above, below);
            assert_eq!(map.trapezoid(above).boundary().bottom, Some(s));
            assert_eq!(map.trapezoid(below).boundary().top, Some(s));
        }
    }

    #[test]
    fn idempotent_queries() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
        let mut map = TrapezoidalMap::new(bbox());
        map.insert_segment(s, &ds);

        for q in [p(5.0, 7.0), p(1.0, 1.0), p(9.5, 0.5), p(8.0, 1.0)] {
            assert_eq!(map.locate_point(&q, &ds), map.locate_point(&q, &ds));
        }
    }

    #[test]
    fn point_on_wall_goes_right() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
        let mut map = TrapezoidalMap::new(bbox());
        map.insert_segment(s, &ds);

        let t = map.locate_point(&p(2.0, 5.0), &ds);
        assert_eq!(map.trapezoid(t).boundary().bottom, Some(s));
        let t = map.locate_point(&p(8.0, 5.0), &ds);
        assert_eq!(map.trapezoid(t).boundary().bottom, None);
        assert_eq!(map.trapezoid(t).boundary().left, ds.find_point(&p(8.0, 8.0)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside the bounding box")]
    fn query_outside_bbox() {
        let map = TrapezoidalMap::new(bbox());
        map.locate_point(&p(11.0, 5.0), &Dataset::default());
    }

    #[test]
    fn query_on_bbox_edge() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
        let mut map = TrapezoidalMap::new(bbox());
        map.insert_segment(s, &ds);

        let t = map.locate_point(&p(10.0, 0.0), &ds);
        assert_eq!(map.trapezoid(t).boundary().left, ds.find_point(&p(8.0, 8.0)));
        let t = map.locate_point(&p(0.0, 10.0), &ds);
        assert_eq!(map.trapezoid(t).boundary().right, ds.find_point(&p(2.0, 2.0)));
    }

    #[test]
    #[should_panic(expected = "lies on segment")]
    fn query_on_segment() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
        let mut map = TrapezoidalMap::new(bbox());
        map.insert_segment(s, &ds);
        map.locate_point(&p(5.0, 5.0), &ds);
    }

    #[test]
    fn insert_by_value() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(8.0, 8.0), p(2.0, 2.0)));
        let mut map = TrapezoidalMap::new(bbox());
        // Either orientation finds the registered segment.
        assert_eq!(map.insert(&Segment::new(p(2.0, 2.0), p(8.0, 8.0)), &ds), s);
        assert_eq!(map.trapezoids().len(), 4);
    }

    #[test]
    #[should_panic(expected = "isn't registered")]
    fn insert_unregistered() {
        let ds = Dataset::default();
        let mut map = TrapezoidalMap::new(bbox());
        map.insert(&Segment::new(p(2.0, 2.0), p(8.0, 8.0)), &ds);
    }

    #[test]
    fn clear_and_init() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
        let mut map = TrapezoidalMap::new(bbox());
        map.insert_segment(s, &ds);

        map.clear();
        assert!(map.trapezoids().is_empty());
        assert!(map.dag().is_empty());
        map.init();
        map.check_invariants(&ds);
        assert_eq!(map.locate_point(&p(5.0, 5.0), &ds), TrapIdx(0));
    }

    #[test]
    #[should_panic(expected = "needs to be initialized")]
    fn insert_after_clear() {
        let mut ds = Dataset::default();
        let s = ds.add_segment(Segment::new(p(2.0, 2.0), p(8.0, 8.0)));
        let mut map = TrapezoidalMap::new(bbox());
        map.clear();
        map.insert_segment(s, &ds);
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn double_init() {
        let mut map = TrapezoidalMap::new(bbox());
        map.init();
    }

    #[test]
    fn build_polygon() {
        let mut ds = Dataset::default();
        let segs = ds.add_points(
            [p(1.0, 1.0), p(6.0, 2.0), p(9.0, 7.0), p(4.0, 9.0), p(2.0, 5.0)],
            true,
        );
        let bbox = Rect::around(ds.points(), NotNan::new(0.5).unwrap());
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let map = TrapezoidalMap::build(&ds, bbox, &mut rng);
        map.check_invariants(&ds);

        // Apart from the leftmost one, each trapezoid has a point on its left wall
        // and lies either above all the segments starting there or just below one
        // of them.
        assert_eq!(map.trapezoids().len(), 5 + 5 + 1);

        // Somewhere inside the polygon, bounded by its segments above and below.
        let inside = map.trapezoid(map.locate_point(&p(5.0, 5.0), &ds));
        assert!(segs.contains(&inside.boundary().top.unwrap()));
        assert!(segs.contains(&inside.boundary().bottom.unwrap()));
    }

    #[test]
    fn build_is_order_independent() {
        let mut ds = Dataset::default();
        ds.add_points([p(1.0, 1.0), p(3.0, 4.0), p(5.0, 2.0), p(7.0, 6.0)], false);
        ds.add_segment(Segment::new(p(2.0, 8.0), p(8.0, 9.0)));
        let queries = [p(4.0, 5.0), p(6.0, 1.0), p(0.5, 9.5), p(7.5, 8.0)];

        let located = |seed: u64| {
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            let map = TrapezoidalMap::build(&ds, bbox(), &mut rng);
            map.check_invariants(&ds);
            queries
                .iter()
                .map(|q| *map.trapezoid(map.locate_point(q, &ds)).boundary())
                .collect::<Vec<_>>()
        };
        let expected = located(0);
        for seed in 1..10 {
            assert_eq!(located(seed), expected);
        }
    }
}
