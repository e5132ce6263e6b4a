// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection math for drag classification.
//!
//! A drag is measured as a translation in card-local pixels. Before it is
//! compared against [`SwipeDirection`] vectors it is normalized into the same
//! `[-1, 1]` plane the directions live on: a drag of half the card's width to
//! the right becomes `(1, 0)`, exactly the [`SwipeDirection::Right`] point.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Size, Vec2};
//! use understory_swipe_deck::geometry::{closest_direction, completion_fraction};
//! use understory_swipe_deck::{DirectionSet, SwipeDirection};
//!
//! let card = Size::new(200.0, 300.0);
//! let drag = Vec2::new(-30.0, 4.0);
//!
//! let direction = closest_direction(drag, card, DirectionSet::HORIZONTAL).unwrap();
//! assert_eq!(direction, SwipeDirection::Left);
//!
//! // 30px of a 100px half-width is 30% of the way to a committed swipe.
//! let fraction = completion_fraction(drag, card, direction);
//! assert!((fraction - 0.3).abs() < 1e-9);
//! ```

use kurbo::{Line, Point, Rect, Size, Vec2};

use crate::direction::{DirectionSet, SwipeDirection};

/// The region of the normalized plane that counts as "not yet committed".
///
/// A projected drag that leaves this rectangle has travelled at least a full
/// swipe in its direction.
pub const REFERENCE_RECT: Rect = Rect::new(-1.0, -1.0, 1.0, 1.0);

/// Normalizes a pixel drag against a card size into the `[-1, 1]` plane.
///
/// Returns `None` when either extent is not positive.
#[must_use]
pub fn normalized_drag(drag: Vec2, size: Size) -> Option<Vec2> {
    if !(size.width > 0.0 && size.height > 0.0) {
        return None;
    }
    // The plane spans two units per axis.
    Some(Vec2::new(
        2.0 * drag.x / size.width,
        2.0 * drag.y / size.height,
    ))
}

/// Scalar projection of `v` onto `onto`.
///
/// Returns `0.0` when `onto` has zero length.
#[must_use]
pub fn scalar_projection(v: Vec2, onto: Vec2) -> f64 {
    let len = onto.length();
    if len == 0.0 {
        return 0.0;
    }
    v.dot(onto) / len
}

/// The point on the line through the origin and `onto` closest to `v`.
#[must_use]
pub fn scalar_projection_point(v: Vec2, onto: Vec2) -> Point {
    let len = onto.length();
    if len == 0.0 {
        return Point::ORIGIN;
    }
    let r = scalar_projection(v, onto) / len;
    (onto * r).to_point()
}

/// Intersection of the infinite lines through `a` and `b`.
///
/// Returns `None` for parallel lines and for degenerate (zero-length) lines.
#[must_use]
pub fn line_intersection(a: Line, b: Line) -> Option<Point> {
    let (p1, p2) = (a.p0, a.p1);
    let (p3, p4) = (b.p0, b.p1);

    let d = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if d == 0.0 {
        return None;
    }
    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / d;
    Some(p1 + (p2 - p1) * ua)
}

/// Angle, in radians, of the vector from `from` to `to`.
#[must_use]
pub fn bearing(from: Point, to: Point) -> f64 {
    (to - from).atan2()
}

/// The four edges of [`REFERENCE_RECT`]: top, left, bottom, right.
#[must_use]
pub fn reference_perimeter() -> [Line; 4] {
    let r = REFERENCE_RECT;
    let top_left = Point::new(r.x0, r.y0);
    let top_right = Point::new(r.x1, r.y0);
    let bottom_left = Point::new(r.x0, r.y1);
    let bottom_right = Point::new(r.x1, r.y1);
    [
        Line::new(top_left, top_right),
        Line::new(top_left, bottom_left),
        Line::new(bottom_left, bottom_right),
        Line::new(top_right, bottom_right),
    ]
}

/// Finds the allowed direction closest to a drag.
///
/// The drag is normalized against `size` and compared by Euclidean distance
/// to each allowed direction's point. Ties go to the direction that comes
/// first in [`SwipeDirection::ALL`]. Returns `None` when `allowed` is empty
/// or `size` is degenerate.
#[must_use]
pub fn closest_direction(drag: Vec2, size: Size, allowed: DirectionSet) -> Option<SwipeDirection> {
    let normalized = normalized_drag(drag, size)?.to_point();
    let mut closest: Option<(f64, SwipeDirection)> = None;
    for direction in allowed.directions() {
        let distance = direction.point().distance(normalized);
        match closest {
            Some((best, _)) if distance >= best => {}
            _ => closest = Some((distance, direction)),
        }
    }
    closest.map(|(_, direction)| direction)
}

/// How far a drag has travelled toward a committed swipe in `direction`.
///
/// The normalized drag is projected onto the direction's vector. If the
/// projected point lies outside [`REFERENCE_RECT`] (or on its far edges) the
/// result is `1.0`. Otherwise it is the ratio of the point's distance from
/// the origin to the distance of the nearest perimeter crossing along the same
/// line. A zero drag yields `0.0`.
#[must_use]
pub fn completion_fraction(drag: Vec2, size: Size, direction: SwipeDirection) -> f64 {
    let Some(normalized) = normalized_drag(drag, size) else {
        return 0.0;
    };
    let swipe_point = scalar_projection_point(normalized, direction.vector());

    if !REFERENCE_RECT.contains(swipe_point) {
        return 1.0;
    }

    let center_distance = swipe_point.distance(Point::ORIGIN);
    let target = Line::new(swipe_point, Point::ORIGIN);
    reference_perimeter()
        .into_iter()
        .filter_map(|edge| line_intersection(target, edge))
        .map(|hit| center_distance / hit.distance(Point::ORIGIN))
        .fold(None, |min: Option<f64>, ratio| {
            Some(min.map_or(ratio, |m| m.min(ratio)))
        })
        .unwrap_or(0.0)
}
