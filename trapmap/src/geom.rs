use std::cmp::Ordering;

use malachite::Rational;
use ordered_float::NotNan;

use crate::num::Float;

// Points are sorted by `x` and then by `y`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> std::fmt::Debug for Point<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl<F: Float> Point<F> {
    pub fn new(x: F, y: F) -> Self {
        Point { x, y }
    }

    pub fn to_exact(&self) -> Point<Rational> {
        Point {
            x: self.x.to_exact(),
            y: self.y.to_exact(),
        }
    }
}

impl<F: Float> From<(F, F)> for Point<F> {
    fn from((x, y): (F, F)) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point<NotNan<f64>> {
    fn from((x, y): (f64, f64)) -> Self {
        Self {
            x: x.try_into().unwrap(),
            y: y.try_into().unwrap(),
        }
    }
}

/// Where a point lies relative to the line through a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
    On,
}

/// A line segment, stored with the orientation it was given.
///
/// Most of the trapezoidal map only makes sense for segments whose `start` is
/// strictly to the left of their `end`; see [`Segment::ordered`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Segment<F: Float> {
    pub start: Point<F>,
    pub end: Point<F>,
}

impl<F: Float> std::fmt::Debug for Segment<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.start, self.end)
    }
}

impl<F: Float> Segment<F> {
    pub fn new(start: Point<F>, end: Point<F>) -> Self {
        Segment { start, end }
    }

    /// Returns this segment with its endpoints ordered from left to right.
    pub fn ordered(self) -> Self {
        if self.start.x > self.end.x {
            Segment {
                start: self.end,
                end: self.start,
            }
        } else {
            self
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start.x < self.end.x
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Which side of this segment's supporting line the point `p` is on.
    ///
    /// The segment must be ordered, so that "above" means "to the left when walking
    /// from `start` to `end`".
    pub fn side(&self, p: &Point<F>) -> Side {
        debug_assert!(self.is_ordered());
        match F::orient2d(&self.start, &self.end, p) {
            Ordering::Greater => Side::Above,
            Ordering::Less => Side::Below,
            Ordering::Equal => Side::On,
        }
    }

    /// Our `y` coordinate at the given `x` coordinate, extending the segment to a
    /// line if `x` is out of range.
    ///
    /// Panics on vertical segments.
    pub fn at_x(&self, x: &F) -> F {
        assert!(!self.is_vertical());

        let t = (x.clone() - &self.start.x) / (self.end.x.clone() - &self.start.x);
        self.start.y.clone() + t * (self.end.y.clone() - &self.start.y)
    }

    pub fn to_exact(&self) -> Segment<Rational> {
        Segment {
            start: self.start.to_exact(),
            end: self.end.to_exact(),
        }
    }
}

/// An axis-aligned rectangle, given by its bottom-left and top-right corners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rect<F: Float> {
    pub min: Point<F>,
    pub max: Point<F>,
}

impl<F: Float> Rect<F> {
    pub fn new(min: Point<F>, max: Point<F>) -> Self {
        assert!(min.x < max.x && min.y < max.y, "empty bounding box");
        Rect { min, max }
    }

    /// The smallest rectangle containing all the points, grown by `padding` on
    /// every side.
    ///
    /// Panics if there are no points, or if `padding` isn't positive.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a Point<F>>, padding: F) -> Self {
        assert!(padding > F::from_f32(0.0));
        let mut points = points.into_iter();
        let first = points.next().expect("no points to bound");
        let (mut min, mut max) = (first.clone(), first.clone());
        for p in points {
            min.x = min.x.min(p.x.clone());
            min.y = min.y.min(p.y.clone());
            max.x = max.x.max(p.x.clone());
            max.y = max.y.max(p.y.clone());
        }
        Rect::new(
            Point::new(min.x - &padding, min.y - &padding),
            Point::new(max.x + &padding, max.y + &padding),
        )
    }

    /// Is `p` inside this rectangle or on its boundary?
    pub fn contains(&self, p: &Point<F>) -> bool {
        (&self.min.x..=&self.max.x).contains(&&p.x) && (&self.min.y..=&self.max.y).contains(&&p.y)
    }
}
