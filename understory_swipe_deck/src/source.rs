// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-side traits: where cards come from and who hears about them.

use crate::card::DragSpeed;
use crate::direction::{DirectionSet, SwipeDirection};
use crate::overlay::Overlay;

/// Supplies card content to a deck.
///
/// Indices are absolute positions in the host's data sequence.
pub trait DeckDataSource {
    /// Content materialized for one card (a view handle, a model, or anything else).
    type Content;
    /// Overlay type; use `()` when cards have no overlay.
    type Overlay: Overlay;

    /// Total number of cards in the sequence.
    fn number_of_cards(&self) -> usize;

    /// Content for the card at `index`.
    fn content_for_card(&mut self, index: usize) -> Self::Content;

    /// Overlay for the card at `index`. Defaults to none.
    fn overlay_for_card(&mut self, index: usize) -> Option<Self::Overlay> {
        let _ = index;
        None
    }

    /// How fast swiped cards fly off.
    fn drag_speed(&self) -> DragSpeed {
        DragSpeed::Default
    }
}

/// Receives deck notifications and answers policy questions.
///
/// Every method has a default, so implementors override only what they need.
/// Policy questions take `&self`; notifications take `&mut self`.
/// `()` is the do-nothing delegate.
pub trait DeckDelegate {
    /// Directions the card at `index` may be swiped in. Defaults to left and right.
    fn allowed_directions(&self, index: usize) -> DirectionSet {
        let _ = index;
        DirectionSet::HORIZONTAL
    }

    /// Whether the card at `index` may commit a swipe toward `direction`.
    fn should_swipe(&self, index: usize, direction: SwipeDirection) -> bool {
        let _ = (index, direction);
        true
    }

    /// Whether the card at `index` may be dragged.
    fn should_drag(&self, index: usize) -> bool {
        let _ = index;
        true
    }

    /// The card at `index` was swiped toward `direction`.
    fn did_swipe(&mut self, index: usize, direction: SwipeDirection) {
        let _ = (index, direction);
    }

    /// The last card was swiped away.
    fn did_run_out_of_cards(&mut self) {}

    /// The card at `index` was tapped.
    fn did_select(&mut self, index: usize) {
        let _ = index;
    }

    /// Whether a fresh load plays the appear animation.
    fn should_apply_appear_animation(&self) -> bool {
        true
    }

    /// Whether background cards follow the front card's drag.
    fn should_move_background_card(&self) -> bool {
        true
    }

    /// Whether background cards are drawn semi-transparent.
    fn should_transparentize_next_card(&self) -> bool {
        true
    }

    /// The front card was dragged `percentage` (in `[0, 100]`) toward `direction`.
    fn dragged(&mut self, percentage: f64, direction: SwipeDirection) {
        let _ = (percentage, direction);
    }

    /// The front card was released short of a swipe and is returning to rest.
    fn did_reset_card(&mut self) {}

    /// Completion fraction a drag must reach to commit. `None` means `1.0`.
    fn swipe_threshold_ratio_margin(&self) -> Option<f64> {
        None
    }

    /// The card at `index` became the front card.
    fn did_show(&mut self, index: usize) {
        let _ = index;
    }

    /// A pan began on the card at `index`.
    fn pan_began(&mut self, index: usize) {
        let _ = index;
    }

    /// A pan on the card at `index` was resolved.
    fn pan_finished(&mut self, index: usize) {
        let _ = index;
    }
}

impl DeckDelegate for () {}
