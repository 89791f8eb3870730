use std::collections::HashMap;

use crate::{
    geom::{Point, Segment},
    num::Float,
};

/// An index into the point arena of a [`Dataset`].
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct PointIdx(pub usize);

impl std::fmt::Debug for PointIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p_{}", self.0)
    }
}

/// An index into the segment arena of a [`Dataset`].
///
/// Throughout this library, we refer to segments and points by their index
/// instead of by value. (Of course, this index-as-identifier breaks down if there
/// are multiple `Dataset`s in flight. Just be careful not to mix them up.)
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// The points and segments that a trapezoidal map is built from.
///
/// Points are deduplicated, so two segments sharing an endpoint share its
/// [`PointIdx`]. Segments are stored with the orientation they were added with,
/// and registering the same segment twice (in either orientation) returns the
/// original index.
#[derive(Debug, Clone)]
pub struct Dataset<F: Float> {
    points: Vec<Point<F>>,
    point_ids: HashMap<Point<F>, PointIdx>,
    segments: Vec<(PointIdx, PointIdx)>,
    // Keyed by the endpoints in increasing order.
    segment_ids: HashMap<(PointIdx, PointIdx), SegIdx>,
}

impl<F: Float> Default for Dataset<F> {
    fn default() -> Self {
        Self {
            points: Default::default(),
            point_ids: Default::default(),
            segments: Default::default(),
            segment_ids: Default::default(),
        }
    }
}

fn key(a: PointIdx, b: PointIdx) -> (PointIdx, PointIdx) {
    (a.min(b), a.max(b))
}

impl<F: Float> Dataset<F> {
    pub fn add_point(&mut self, p: Point<F>) -> PointIdx {
        if let Some(idx) = self.point_ids.get(&p) {
            return *idx;
        }
        let idx = PointIdx(self.points.len());
        self.points.push(p.clone());
        self.point_ids.insert(p, idx);
        idx
    }

    /// Registers a segment (and its endpoints).
    ///
    /// Panics if the two endpoints are the same point.
    pub fn add_segment(&mut self, segment: Segment<F>) -> SegIdx {
        let a = self.add_point(segment.start);
        let b = self.add_point(segment.end);
        assert_ne!(a, b, "degenerate segment");

        *self.segment_ids.entry(key(a, b)).or_insert_with(|| {
            self.segments.push((a, b));
            SegIdx(self.segments.len() - 1)
        })
    }

    /// Adds the segments of a polyline through the given points, closing it up
    /// if `closed` is true.
    pub fn add_points<P: Into<Point<F>>>(
        &mut self,
        ps: impl IntoIterator<Item = P>,
        closed: bool,
    ) -> Vec<SegIdx> {
        let ps: Vec<Point<F>> = ps.into_iter().map(|p| p.into()).collect();
        let mut ret = Vec::new();
        for pair in ps.windows(2) {
            ret.push(self.add_segment(Segment::new(pair[0].clone(), pair[1].clone())));
        }
        if closed && ps.len() > 2 {
            let first = ps[0].clone();
            let last = ps[ps.len() - 1].clone();
            ret.push(self.add_segment(Segment::new(last, first)));
        }
        ret
    }

    pub fn find_point(&self, p: &Point<F>) -> Option<PointIdx> {
        self.point_ids.get(p).copied()
    }

    /// Looks up a segment by its endpoints, in either orientation.
    pub fn find_segment(&self, segment: &Segment<F>) -> Option<SegIdx> {
        let a = self.find_point(&segment.start)?;
        let b = self.find_point(&segment.end)?;
        self.segment_ids.get(&key(a, b)).copied()
    }

    pub fn get_point(&self, idx: PointIdx) -> &Point<F> {
        &self.points[idx.0]
    }

    /// The segment, with the orientation it was registered with.
    pub fn get_segment(&self, idx: SegIdx) -> Segment<F> {
        let (a, b) = self.segments[idx.0];
        Segment::new(self.get_point(a).clone(), self.get_point(b).clone())
    }

    /// The endpoints of a segment, ordered from left to right.
    pub fn endpoints(&self, idx: SegIdx) -> (PointIdx, PointIdx) {
        let (a, b) = self.segments[idx.0];
        if self.get_point(a).x > self.get_point(b).x {
            (b, a)
        } else {
            (a, b)
        }
    }

    /// The segment, ordered from left to right.
    pub fn ordered_segment(&self, idx: SegIdx) -> Segment<F> {
        self.get_segment(idx).ordered()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point<F>> {
        self.points.iter()
    }

    pub fn segment_indices(&self) -> impl Iterator<Item = SegIdx> {
        (0..self.segments.len()).map(SegIdx)
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }
}
