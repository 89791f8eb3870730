//! A thin abstraction over the different numerical types we support.

use std::{cmp::Ordering, hash::Hash};

use malachite::Rational;
use ordered_float::NotNan;

use crate::geom::Point;

/// A trait for abstracting over the properties we need from numerical types.
///
/// This is implemented for `NotNan<f64>`, `NotNan<f32>`, and `malachite::Rational`.
pub trait Float:
    Sized
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::Mul<Self, Output = Self>
    + std::ops::Div<Self, Output = Self>
    + std::ops::Neg<Output = Self>
    + for<'a> std::ops::Add<&'a Self, Output = Self>
    + for<'a> std::ops::Sub<&'a Self, Output = Self>
    + for<'a> std::ops::Mul<&'a Self, Output = Self>
    + for<'a> std::ops::Div<&'a Self, Output = Self>
    + Clone
    + std::fmt::Debug
    + Ord
    + Eq
    + Hash
    + 'static
{
    fn from_f32(x: f32) -> Self;

    fn to_exact(&self) -> Rational;

    /// The sign of the cross product `(b - a) x (c - a)`.
    ///
    /// `Greater` means that `a`, `b`, `c` turn counter-clockwise, i.e. `c` is to the
    /// left of the line from `a` to `b`. This must be exact: all the combinatorial
    /// decisions in the trapezoidal map are made by this predicate.
    ///
    /// The default implementation just does the arithmetic in `Self`, which is
    /// only correct for exact types.
    fn orient2d(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering {
        let lhs = (b.x.clone() - &a.x) * (c.y.clone() - &a.y);
        let rhs = (b.y.clone() - &a.y) * (c.x.clone() - &a.x);
        lhs.cmp(&rhs)
    }
}

impl Float for Rational {
    fn from_f32(x: f32) -> Self {
        Rational::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.clone()
    }
}

fn robust_orient2d(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Ordering {
    let coord = |(x, y): (f64, f64)| robust::Coord { x, y };
    let det = robust::orient2d(coord(a), coord(b), coord(c));
    // Finite inputs give a finite determinant.
    det.partial_cmp(&0.0).unwrap()
}

impl Float for NotNan<f32> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(x).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn orient2d(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering {
        // Widening to f64 is exact.
        let wide = |p: &Point<Self>| (f64::from(p.x.into_inner()), f64::from(p.y.into_inner()));
        robust_orient2d(wide(a), wide(b), wide(c))
    }
}

impl Float for NotNan<f64> {
    fn from_f32(x: f32) -> Self {
        NotNan::try_from(f64::from(x)).unwrap()
    }

    fn to_exact(&self) -> Rational {
        self.into_inner().try_into().unwrap()
    }

    fn orient2d(a: &Point<Self>, b: &Point<Self>, c: &Point<Self>) -> Ordering {
        let raw = |p: &Point<Self>| (p.x.into_inner(), p.y.into_inner());
        robust_orient2d(raw(a), raw(b), raw(c))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p<F: Float>(x: f32, y: f32) -> Point<F> {
        Point::new(F::from_f32(x), F::from_f32(y))
    }

    fn check_basic_orientations<F: Float>() {
        let a = p::<F>(0.0, 0.0);
        let b = p::<F>(4.0, 1.0);
        assert_eq!(F::orient2d(&a, &b, &p(1.0, 3.0)), Ordering::Greater);
        assert_eq!(F::orient2d(&a, &b, &p(1.0, -3.0)), Ordering::Less);
        assert_eq!(F::orient2d(&a, &b, &p(8.0, 2.0)), Ordering::Equal);
    }

    #[test]
    fn basic_orientations() {
        check_basic_orientations::<NotNan<f64>>();
        check_basic_orientations::<NotNan<f32>>();
        check_basic_orientations::<Rational>();
    }

    #[test]
    fn nearly_collinear() {
        // `c` is one ulp above the line through `a` and `b`.
        let a = p::<NotNan<f64>>(0.5, 0.5);
        let b = p::<NotNan<f64>>(12.0, 12.0);
        let c = Point::new(
            NotNan::new(24.0).unwrap(),
            NotNan::new(f64::from_bits(24.0f64.to_bits() + 1)).unwrap(),
        );
        let exact = Rational::orient2d(&a.to_exact(), &b.to_exact(), &c.to_exact());
        assert_eq!(exact, Ordering::Greater);
        assert_eq!(NotNan::<f64>::orient2d(&a, &b, &c), exact);
    }

    proptest! {
        #[test]
        fn f64_agrees_with_exact(
            ax in -1e6..1e6f64, ay in -1e6..1e6f64,
            bx in -1e6..1e6f64, by in -1e6..1e6f64,
            cx in -1e6..1e6f64, cy in -1e6..1e6f64,
        ) {
            let pt = |x: f64, y: f64| Point::new(NotNan::new(x).unwrap(), NotNan::new(y).unwrap());
            let (a, b, c) = (pt(ax, ay), pt(bx, by), pt(cx, cy));
            prop_assert_eq!(
                NotNan::<f64>::orient2d(&a, &b, &c),
                Rational::orient2d(&a.to_exact(), &b.to_exact(), &c.to_exact())
            );
        }
    }
}
