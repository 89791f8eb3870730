//! Trapezoidal maps: point location among non-crossing line segments.
//!
//! A [`TrapezoidalMap`] cuts a bounding box into trapezoids by shooting vertical
//! walls up and down from every segment endpoint, and keeps a search DAG that
//! finds the trapezoid containing a query point in expected logarithmic time.
//! Segments are added one at a time; [`TrapezoidalMap::build`] adds them in a
//! random order, which is what makes the expected bounds hold.

mod dag;
mod dataset;
mod geom;
mod insert;
mod locate;
mod map;
mod num;
mod trapezoid;

pub use dag::{Dag, Node, NodeIdx};
pub use dataset::{Dataset, PointIdx, SegIdx};
pub use geom::{Point, Rect, Segment, Side};
pub use map::TrapezoidalMap;
pub use num::Float;
pub use trapezoid::{Adjacency, Boundary, Neighbor, TrapIdx, Trapezoid, Trapezoids};
