// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index-range edits: insert, remove, and reload parts of the sequence.
//!
//! The host edits its data first, then calls the matching method with the
//! affected half-open range of data-source indices. Only indices that fall in
//! the visible window touch materialized cards.
//!
//! The card that was in front stays in front when the edit happens entirely
//! before it: [`current_index`](CardDeck::current_index) shifts by the number
//! of indices inserted or removed below it.

use core::ops::Range;

use smallvec::SmallVec;

use super::{CardDeck, Completion, DeckOwner, place, placement_keyframe};
use crate::animator::{Animator, Keyframe};
use crate::card::CardId;
use crate::direction::SwipeDirection;
use crate::error::DeckError;
use crate::layout::{CardLayout, background_card_parameters};
use crate::source::{DeckDataSource, DeckDelegate};

impl<S, D, A, L> CardDeck<S, D, A, L>
where
    S: DeckDataSource,
    D: DeckDelegate,
    A: Animator,
    L: CardLayout,
{
    /// Materializes cards for newly inserted indices.
    ///
    /// Inserted cards inside the window take their stacked depth; cards
    /// pushed past the window are evicted. With `animated`, inserted cards
    /// fade in and evicted cards fade out. A drag on a front card that gets
    /// pushed back is cancelled and the card resets.
    ///
    /// The data source must now report the previous count plus `range.len()`;
    /// a mismatch is handled per [`DeckConfig::count_mismatch`](crate::DeckConfig::count_mismatch).
    pub fn insert_card_at_index_range(
        &mut self,
        range: Range<usize>,
        animated: bool,
    ) -> Result<(), DeckError> {
        let previous = self.count;
        let inserted_len = range.len();
        tracing::debug!(?range, animated, "insert cards");

        if range.start < self.current_index {
            self.current_index += inserted_len;
        } else {
            self.insert_visible_cards(range, animated);
        }

        self.count = self.source.number_of_cards();
        self.config
            .count_mismatch
            .check(previous + inserted_len, self.count)
    }

    fn insert_visible_cards(&mut self, range: Range<usize>, animated: bool) {
        // A card displaced from the front can no longer receive its pan.
        if range.contains(&self.current_index) {
            self.cancel_front_drag();
        }
        let window = self.current_index..self.current_index + self.cap();
        let (opaque, background) = (self.config.alpha_opaque, self.background_alpha());
        let mut inserted: SmallVec<[(CardId, f64); 4]> = SmallVec::new();
        for index in range.filter(|index| window.contains(index)) {
            let depth = index - self.current_index;
            if depth > self.visible.len() {
                tracing::trace!(index, "insertion past the materialized tail skipped");
                continue;
            }
            let placement = self.placement(depth);
            let mut card = self.create_card(index, placement.frame);
            place(&mut card, placement);
            let alpha = if depth == 0 { opaque } else { background };
            card.geometry_mut().alpha = alpha;
            inserted.push((card.id(), alpha));
            self.visible.insert(depth, card);
        }
        if inserted.is_empty() {
            return;
        }
        for (depth, card) in self.visible.iter_mut().enumerate() {
            card.geometry_mut().interactive = depth == 0;
        }

        let cap = self.cap();
        if self.visible.len() > cap {
            let evicted: SmallVec<[_; 4]> = self.visible.drain(cap..).collect();
            if animated {
                let faded: SmallVec<[(CardId, f64); 4]> = evicted
                    .iter()
                    .map(|card| (card.id(), card.geometry().alpha))
                    .collect();
                let ids = faded.iter().map(|&(id, _)| id).collect();
                let transparent = self.config.alpha_transparent;
                for mut card in evicted {
                    card.detach();
                    let geometry = card.geometry_mut();
                    geometry.alpha = transparent;
                    geometry.interactive = false;
                    self.departing.push(card);
                }
                let id = self.schedule(Completion::CardsRemoved(ids));
                self.animator.apply_removal_animation(id, &faded);
            }
        }

        self.relevel_background_cards(animated);

        if animated {
            self.animating = true;
            let id = self.schedule(Completion::Inserted);
            self.animator.apply_insertion_animation(id, &inserted);
        }
    }

    fn relevel_background_cards(&mut self, animated: bool) {
        let top = self.frame_for_card(0);
        let mut tracks: SmallVec<[(CardId, Keyframe, Keyframe); 4]> = SmallVec::new();
        for depth in 1..self.visible.len() {
            let placement = background_card_parameters(self.frame_for_card(depth), top);
            let card = &mut self.visible[depth];
            let from = placement_keyframe(card);
            place(card, placement);
            tracks.push((card.id(), from, placement_keyframe(card)));
        }
        if animated && !tracks.is_empty() {
            let id = self.animation_id();
            self.animator.reset_background_cards(id, &tracks);
        }
    }

    /// Drops cards for removed indices and refills the window.
    ///
    /// Removed cards inside the window fly off to the right when `animated`;
    /// otherwise they disappear at once. Removed cards emit no events.
    ///
    /// The data source must now report the previous count minus `range.len()`;
    /// a mismatch is handled per [`DeckConfig::count_mismatch`](crate::DeckConfig::count_mismatch).
    pub fn remove_card_in_index_range(
        &mut self,
        range: Range<usize>,
        animated: bool,
    ) -> Result<(), DeckError> {
        let previous = self.count;
        let removed_len = range.len();
        tracing::debug!(?range, animated, "remove cards");

        let current = self.current_index;
        let below = range.end.min(current).saturating_sub(range.start.min(current));
        let window_end = current + self.visible.len();
        let params = self.owner_params();
        let mut released_drag = false;
        for index in range.filter(|index| (current..window_end).contains(index)).rev() {
            let mut card = self.visible.remove(index - current);
            released_drag |= card.is_dragging();
            card.detach();
            card.geometry_mut().interactive = false;
            if !animated {
                continue;
            }
            let owner = DeckOwner {
                delegate: &self.delegate,
                index,
                params,
            };
            let response = card.swipe(SwipeDirection::Right, &owner);
            if let Some(transition) = response.transition {
                let card_id = card.id();
                self.departing.push(card);
                let id = self.schedule(Completion::CardSwipedOff(card_id));
                self.animator.apply_swipe_animation(id, card_id, &transition);
            }
        }
        if released_drag {
            self.lower_gate();
        }
        self.current_index -= below;

        self.count = self.source.number_of_cards();
        let fits = self.cap().min(self.count.saturating_sub(self.current_index));
        if self.visible.len() < fits {
            let missing = fits - self.visible.len();
            self.load_missing_cards(missing);
        }
        self.layout_deck();
        let (opaque, background) = (self.config.alpha_opaque, self.background_alpha());
        for (depth, card) in self.visible.iter_mut().enumerate() {
            let geometry = card.geometry_mut();
            geometry.alpha = if depth == 0 { opaque } else { background };
            geometry.interactive = depth == 0;
            geometry.hidden = false;
        }

        self.config
            .count_mismatch
            .check(previous.saturating_sub(removed_len), self.count)
    }

    /// Re-fetches content for materialized cards in `range`, in place.
    pub fn reload_cards_in_index_range(&mut self, range: Range<usize>) {
        let current = self.current_index;
        let window_end = current + self.visible.len();
        for index in range.filter(|index| (current..window_end).contains(index)) {
            self.configure_card(index - current);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Rect;

    use crate::error::{DeckError, MismatchHandling};
    use crate::{CardDeck, DeckConfig, DeckDataSource};

    struct Numbers(Vec<u32>);

    impl DeckDataSource for Numbers {
        type Content = u32;
        type Overlay = ();

        fn number_of_cards(&self) -> usize {
            self.0.len()
        }

        fn content_for_card(&mut self, index: usize) -> u32 {
            self.0[index]
        }
    }

    fn deck(items: u32) -> CardDeck<Numbers> {
        let config = DeckConfig {
            count_mismatch: MismatchHandling::Error,
            ..DeckConfig::default()
        };
        let mut deck = CardDeck::with_config(Numbers((0..items).collect()), (), config);
        deck.set_bounds(Rect::new(0.0, 0.0, 200.0, 300.0));
        deck.reload();
        while let Some(animation) = deck.animator_mut().pop() {
            deck.animation_finished(animation.id, true);
        }
        deck
    }

    fn contents(deck: &CardDeck<Numbers>) -> Vec<u32> {
        deck.cards().iter().map(|card| *card.content()).collect()
    }

    #[test]
    fn insert_before_window_shifts_current_index() {
        let mut deck = deck(5);
        deck.source_mut().0.remove(0);
        deck.remove_card_in_index_range(0..1, false).unwrap();
        assert_eq!(contents(&deck), [1, 2, 3]);

        // Swipe once so that index 0 lies behind the window.
        deck.swipe(crate::SwipeDirection::Left, false);
        while let Some(animation) = deck.animator_mut().pop() {
            deck.animation_finished(animation.id, true);
        }
        assert_eq!(deck.current_index(), 1);

        deck.source_mut().0.insert(0, 99);
        deck.insert_card_at_index_range(0..1, true).unwrap();
        assert_eq!(deck.current_index(), 2, "front card keeps its identity");
        assert_eq!(contents(&deck), [2, 3, 4]);
    }

    #[test]
    fn unreported_insert_is_a_count_mismatch() {
        let mut deck = deck(5);
        let err = deck.insert_card_at_index_range(1..2, false).unwrap_err();
        assert_eq!(err, DeckError::CountMismatch { expected: 6, actual: 5 });
    }

    #[test]
    fn reload_range_reconfigures_only_materialized_cards() {
        let mut deck = deck(5);
        let ids: Vec<_> = deck.cards().iter().map(|card| card.id()).collect();
        deck.source_mut().0[1] = 10;
        deck.source_mut().0[4] = 40;
        deck.reload_cards_in_index_range(1..5);
        assert_eq!(contents(&deck), [0, 10, 2]);
        let after: Vec<_> = deck.cards().iter().map(|card| card.id()).collect();
        assert_eq!(ids, after);
    }
}
