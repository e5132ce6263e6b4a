// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag feedback drawn over a card.

use crate::direction::SwipeDirection;

/// Feedback layer drawn over a card's content while it is dragged.
///
/// The card owns the overlay's opacity (see
/// [`DraggableCard::overlay_alpha`](crate::card::DraggableCard::overlay_alpha))
/// and forwards drag feedback through these hooks so an implementation can
/// swap imagery per direction (for example a "like" stamp for
/// [`SwipeDirection::Right`]). Both hooks default to doing nothing.
///
/// `()` is the overlay type for decks without overlays.
pub trait Overlay {
    /// The direction the drag currently resolves to, if any.
    fn set_direction(&mut self, direction: Option<SwipeDirection>) {
        let _ = direction;
    }

    /// Drag progress toward the swipe threshold, in `[0, 1]`.
    fn update_progress(&mut self, progress: f64) {
        let _ = progress;
    }
}

impl Overlay for () {}
