// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking layout for the visible window.
//!
//! A layout maps a depth in the visible window to a rectangle in deck-local
//! coordinates. Depth `0` is the front card. Cards are never laid out at the
//! rectangle's size directly: every card keeps the front card's size and is
//! shrunk onto its rectangle with a scale transform (see
//! [`background_card_parameters`]), so card content only ever sees one size.

use kurbo::{Affine, Rect, Size};

/// Maps window depth to a deck-local rectangle.
///
/// Implement this to replace the default [`StackLayout`].
pub trait CardLayout {
    /// Rectangle for the card at `depth` in a deck of `bounds` showing up to
    /// `visible_count` cards.
    fn frame_for_card(&self, depth: usize, bounds: Size, visible_count: usize) -> Rect;
}

/// Cascading stack: each background card shrinks by `scale_percent` and
/// peeks out `top_margin` below the card in front of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackLayout {
    /// Vertical offset between consecutive cards.
    pub top_margin: f64,
    /// Per-depth scale factor.
    pub scale_percent: f64,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self {
            top_margin: 4.0,
            scale_percent: 0.95,
        }
    }
}

impl CardLayout for StackLayout {
    fn frame_for_card(&self, depth: usize, bounds: Size, visible_count: usize) -> Rect {
        let top_offset = self.top_margin * visible_count.saturating_sub(1) as f64;
        let base_height = bounds.height - top_offset;
        let mut frame = Rect::new(0.0, 0.0, bounds.width, base_height);
        let mut factor = 1.0;
        for _ in 0..depth {
            factor *= self.scale_percent;
            let width = bounds.width * factor;
            let height = base_height * factor;
            let x = (bounds.width - width) / 2.0;
            let y = frame.height() - height + frame.y0 + self.top_margin;
            frame = Rect::new(x, y, x + width, y + height);
        }
        frame
    }
}

/// A card's layout frame and transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardPlacement {
    /// Front-card-sized frame.
    pub frame: Rect,
    /// Scale shrinking the frame onto the target rectangle.
    pub transform: Affine,
}

/// Places a front-card-sized frame at `target`'s origin and scales it onto `target`.
#[must_use]
pub fn background_card_parameters(target: Rect, top: Rect) -> CardPlacement {
    let frame = Rect::from_origin_size(target.origin(), top.size());
    let sx = if top.width() != 0.0 {
        target.width() / top.width()
    } else {
        1.0
    };
    let sy = if top.height() != 0.0 {
        target.height() / top.height()
    } else {
        1.0
    };
    CardPlacement {
        frame,
        transform: Affine::scale_non_uniform(sx, sy),
    }
}

/// Linear interpolation between two rectangles, corner by corner.
#[must_use]
pub fn lerp_rect(from: Rect, to: Rect, t: f64) -> Rect {
    Rect::new(
        from.x0 + (to.x0 - from.x0) * t,
        from.y0 + (to.y0 - from.y0) * t,
        from.x1 + (to.x1 - from.x1) * t,
        from.y1 + (to.y1 - from.y1) * t,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Rect, b: Rect) -> bool {
        (a.x0 - b.x0).abs() < 1e-9
            && (a.y0 - b.y0).abs() < 1e-9
            && (a.x1 - b.x1).abs() < 1e-9
            && (a.y1 - b.y1).abs() < 1e-9
    }

    #[test]
    fn front_card_fills_width_minus_stack_offset() {
        let frame = StackLayout::default().frame_for_card(0, Size::new(200.0, 308.0), 3);
        assert_eq!(frame, Rect::new(0.0, 0.0, 200.0, 300.0));
    }

    #[test]
    fn background_cards_cascade() {
        let layout = StackLayout::default();
        let bounds = Size::new(200.0, 308.0);
        let first = layout.frame_for_card(1, bounds, 3);
        assert!(approx(first, Rect::new(5.0, 19.0, 195.0, 304.0)), "{first:?}");
        let second = layout.frame_for_card(2, bounds, 3);
        let expected = Rect::new(9.75, 37.25, 190.25, 308.0);
        assert!(approx(second, expected), "{second:?}");
    }

    #[test]
    fn single_card_has_no_stack_offset() {
        let frame = StackLayout::default().frame_for_card(0, Size::new(100.0, 100.0), 1);
        assert_eq!(frame.height(), 100.0);
    }

    #[test]
    fn background_parameters_keep_top_size() {
        let top = Rect::new(0.0, 0.0, 200.0, 300.0);
        let target = Rect::new(5.0, 19.0, 195.0, 304.0);
        let placement = background_card_parameters(target, top);
        assert_eq!(placement.frame, Rect::new(5.0, 19.0, 205.0, 319.0));
        let local = Rect::from_origin_size(kurbo::Point::ORIGIN, top.size());
        let visual = (Affine::translate(target.origin().to_vec2()) * placement.transform)
            .transform_rect_bbox(local);
        assert!(approx(visual, target), "{visual:?}");
    }

    #[test]
    fn degenerate_top_does_not_divide_by_zero() {
        let placement = background_card_parameters(Rect::new(1.0, 1.0, 2.0, 2.0), Rect::ZERO);
        assert_eq!(placement.transform, Affine::IDENTITY);
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(lerp_rect(a, b, 0.0), a);
        assert_eq!(lerp_rect(a, b, 1.0), b);
        assert_eq!(lerp_rect(a, b, 0.5), Rect::new(5.0, 10.0, 20.0, 25.0));
    }
}
