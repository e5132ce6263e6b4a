// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for drag classification and completion.

use kurbo::{Size, Vec2};
use proptest::prelude::*;
use understory_swipe_deck::geometry::{
    closest_direction, completion_fraction, normalized_drag, scalar_projection_point,
};
use understory_swipe_deck::{DirectionSet, SwipeDirection};

fn direction_set() -> impl Strategy<Value = DirectionSet> {
    any::<u8>().prop_map(|bits| {
        SwipeDirection::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << i) != 0)
            .map(|(_, direction)| direction)
            .collect()
    })
}

fn direction() -> impl Strategy<Value = SwipeDirection> {
    prop::sample::select(SwipeDirection::ALL.to_vec())
}

fn card_size() -> impl Strategy<Value = Size> {
    (10.0..800.0f64, 10.0..800.0f64).prop_map(|(w, h)| Size::new(w, h))
}

proptest! {
    #[test]
    fn closest_direction_is_allowed_and_nearest(
        dx in -1000.0..1000.0f64,
        dy in -1000.0..1000.0f64,
        size in card_size(),
        allowed in direction_set(),
    ) {
        let drag = Vec2::new(dx, dy);
        let result = closest_direction(drag, size, allowed);
        if allowed.is_empty() {
            prop_assert!(result.is_none());
        } else {
            let best = result.expect("non-empty set yields a direction");
            prop_assert!(allowed.allows(best));
            let point = normalized_drag(drag, size).unwrap().to_point();
            let distance = best.point().distance(point);
            for other in allowed.directions() {
                prop_assert!(distance <= other.point().distance(point));
            }
        }
    }

    #[test]
    fn completion_fraction_saturates_at_the_perimeter(
        dx in -1000.0..1000.0f64,
        dy in -1000.0..1000.0f64,
        size in card_size(),
        direction in direction(),
    ) {
        let drag = Vec2::new(dx, dy);
        let fraction = completion_fraction(drag, size, direction);
        prop_assert!((0.0..=1.0).contains(&fraction), "fraction {fraction} out of range");

        let normalized = normalized_drag(drag, size).unwrap();
        let p = scalar_projection_point(normalized, direction.vector());
        let margin = 1e-9;
        let strictly_inside = p.x.abs() < 1.0 - margin && p.y.abs() < 1.0 - margin;
        let outside = p.x.abs() > 1.0 || p.y.abs() > 1.0;
        if strictly_inside {
            prop_assert!(fraction < 1.0, "inside point {p:?} gave {fraction}");
        }
        if outside {
            prop_assert_eq!(fraction, 1.0);
        }
    }

    #[test]
    fn completion_fraction_grows_along_the_direction(
        t in 0.0..0.99f64,
        size in card_size(),
        direction in direction(),
    ) {
        // A drag exactly along the direction vector, scaled back to pixels.
        let v = direction.vector();
        let drag = Vec2::new(v.x * t * size.width / 2.0, v.y * t * size.height / 2.0);
        let fraction = completion_fraction(drag, size, direction);
        prop_assert!((fraction - t).abs() < 1e-9, "expected {t}, got {fraction}");
    }
}

#[test]
fn zero_drag_has_no_progress() {
    let size = Size::new(200.0, 300.0);
    for direction in SwipeDirection::ALL {
        assert_eq!(completion_fraction(Vec2::ZERO, size, direction), 0.0);
    }
}
