// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swipe directions on the normalized card plane.
//!
//! Every direction maps to a point on the `[-1, 1] × [-1, 1]` plane whose
//! coordinates are each one of `-1`, `0` or `1`. The plane uses screen
//! orientation: `x` grows to the right and `y` grows downward, so
//! [`SwipeDirection::Up`] is `(0, -1)`.
//!
//! Directions are used in two roles:
//! - as a constraint, through [`DirectionSet`], naming which directions the
//!   current card may be swiped in;
//! - as a classification, naming which allowed direction a drag most resembles
//!   (see [`crate::geometry::closest_direction`]).

use kurbo::{Point, Vec2};

use crate::geometry;

/// A direction a card can be swiped in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Toward negative `x`.
    Left,
    /// Toward positive `x`.
    Right,
    /// Toward negative `y`.
    Up,
    /// Toward positive `y`.
    Down,
    /// Toward negative `x` and negative `y`.
    TopLeft,
    /// Toward positive `x` and negative `y`.
    TopRight,
    /// Toward negative `x` and positive `y`.
    BottomLeft,
    /// Toward positive `x` and positive `y`.
    BottomRight,
}

impl SwipeDirection {
    /// All directions, in declaration order.
    ///
    /// This order is also the tie-break order used when two directions are
    /// equally close to a drag.
    pub const ALL: [Self; 8] = [
        Self::Left,
        Self::Right,
        Self::Up,
        Self::Down,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Returns the direction's point on the normalized plane, as a vector from the origin.
    #[must_use]
    pub const fn vector(self) -> Vec2 {
        let (x, y) = match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::TopLeft => (-1.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::BottomLeft => (-1.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Vec2::new(x, y)
    }

    /// Returns the direction's point on the normalized plane.
    #[must_use]
    pub const fn point(self) -> Point {
        let v = self.vector();
        Point::new(v.x, v.y)
    }

    /// Bearing, in radians, from this direction's point back to the plane origin.
    #[must_use]
    pub fn bearing(self) -> f64 {
        geometry::bearing(self.point(), Point::ORIGIN)
    }

    /// Returns `true` for [`Left`](Self::Left) and [`Right`](Self::Right).
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// The single-direction set containing only `self`.
    #[must_use]
    pub const fn as_set(self) -> DirectionSet {
        match self {
            Self::Left => DirectionSet::LEFT,
            Self::Right => DirectionSet::RIGHT,
            Self::Up => DirectionSet::UP,
            Self::Down => DirectionSet::DOWN,
            Self::TopLeft => DirectionSet::TOP_LEFT,
            Self::TopRight => DirectionSet::TOP_RIGHT,
            Self::BottomLeft => DirectionSet::BOTTOM_LEFT,
            Self::BottomRight => DirectionSet::BOTTOM_RIGHT,
        }
    }
}

bitflags::bitflags! {
    /// A set of [`SwipeDirection`]s.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DirectionSet: u8 {
        /// [`SwipeDirection::Left`].
        const LEFT         = 0b0000_0001;
        /// [`SwipeDirection::Right`].
        const RIGHT        = 0b0000_0010;
        /// [`SwipeDirection::Up`].
        const UP           = 0b0000_0100;
        /// [`SwipeDirection::Down`].
        const DOWN         = 0b0000_1000;
        /// [`SwipeDirection::TopLeft`].
        const TOP_LEFT     = 0b0001_0000;
        /// [`SwipeDirection::TopRight`].
        const TOP_RIGHT    = 0b0010_0000;
        /// [`SwipeDirection::BottomLeft`].
        const BOTTOM_LEFT  = 0b0100_0000;
        /// [`SwipeDirection::BottomRight`].
        const BOTTOM_RIGHT = 0b1000_0000;

        /// Left and right.
        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        /// Up and down.
        const VERTICAL = Self::UP.bits() | Self::DOWN.bits();
        /// The four corners.
        const DIAGONAL = Self::TOP_LEFT.bits()
            | Self::TOP_RIGHT.bits()
            | Self::BOTTOM_LEFT.bits()
            | Self::BOTTOM_RIGHT.bits();
    }
}

impl Default for DirectionSet {
    fn default() -> Self {
        Self::HORIZONTAL
    }
}

impl DirectionSet {
    /// Returns `true` if `direction` is a member of the set.
    #[must_use]
    pub const fn allows(self, direction: SwipeDirection) -> bool {
        self.contains(direction.as_set())
    }

    /// Iterates the member directions in declaration order.
    pub fn directions(self) -> impl Iterator<Item = SwipeDirection> {
        SwipeDirection::ALL
            .into_iter()
            .filter(move |direction| self.allows(*direction))
    }
}

impl From<SwipeDirection> for DirectionSet {
    fn from(direction: SwipeDirection) -> Self {
        direction.as_set()
    }
}

impl FromIterator<SwipeDirection> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = SwipeDirection>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, direction| set | direction.as_set())
    }
}
