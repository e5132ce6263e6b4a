// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deck configuration.

use core::time::Duration;

use crate::card::DragConstants;
use crate::error::MismatchHandling;

/// Tunable deck behavior.
///
/// All fields are public; start from [`DeckConfig::default`] and override what
/// you need.
///
/// ```
/// use understory_swipe_deck::DeckConfig;
///
/// let config = DeckConfig {
///     count_of_visible_cards: 2,
///     pass_taps_through_when_empty: true,
///     ..DeckConfig::default()
/// };
/// assert_eq!(config.alpha_semi_transparent, 0.7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeckConfig {
    /// Maximum number of materialized cards.
    pub count_of_visible_cards: usize,
    /// Opacity of the front card.
    pub alpha_opaque: f64,
    /// Opacity of a card fading in from nothing.
    pub alpha_transparent: f64,
    /// Opacity of background cards when the delegate asks for transparentizing.
    pub alpha_semi_transparent: f64,
    /// Drag transform constants pushed onto every configured card.
    pub drag: DragConstants,
    /// Duration of the deck appear animation.
    pub appearance_animation_duration: Duration,
    /// Duration of background-card reflows after a swipe or revert.
    pub background_card_frame_animation_duration: Duration,
    /// If `true`, [`hit_test`](crate::CardDeck::hit_test) reports nothing for an empty deck.
    pub pass_taps_through_when_empty: bool,
    /// Extra travel beyond the deck edge for swiped cards.
    ///
    /// `None` uses the larger of the deck's width and height.
    pub off_screen_space: Option<f64>,
    /// What to do when an index-range edit disagrees with the data source count.
    pub count_mismatch: MismatchHandling,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            count_of_visible_cards: 3,
            alpha_opaque: 1.0,
            alpha_transparent: 0.0,
            alpha_semi_transparent: 0.7,
            drag: DragConstants::default(),
            appearance_animation_duration: Duration::from_millis(800),
            background_card_frame_animation_duration: Duration::from_millis(200),
            pass_taps_through_when_empty: false,
            off_screen_space: None,
            count_mismatch: MismatchHandling::DebugAssert,
        }
    }
}
