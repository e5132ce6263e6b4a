// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for deck integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]
#![allow(unreachable_pub, reason = "shared test helpers")]

use kurbo::Rect;
use understory_swipe_deck::{
    CardDeck, DeckConfig, DeckDataSource, DeckDelegate, DirectionSet, DragSpeed, SwipeDirection,
};

pub const BOUNDS: Rect = Rect::new(0.0, 0.0, 200.0, 308.0);

#[derive(Debug)]
pub struct Items {
    pub items: Vec<u32>,
    pub speed: DragSpeed,
}

impl Items {
    pub fn new(len: u32) -> Self {
        Self {
            items: (0..len).collect(),
            speed: DragSpeed::Default,
        }
    }
}

impl DeckDataSource for Items {
    type Content = u32;
    type Overlay = ();

    fn number_of_cards(&self) -> usize {
        self.items.len()
    }

    fn content_for_card(&mut self, index: usize) -> u32 {
        self.items[index]
    }

    fn drag_speed(&self) -> DragSpeed {
        self.speed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Note {
    Swiped(usize, SwipeDirection),
    Shown(usize),
    RanOut,
    Selected(usize),
    Reset,
    PanBegan(usize),
    PanFinished(usize),
    Dragged(f64, SwipeDirection),
}

#[derive(Debug)]
pub struct Recorder {
    pub notes: Vec<Note>,
    pub allowed: DirectionSet,
    pub veto: bool,
    pub threshold: Option<f64>,
    pub transparentize: bool,
    pub appear: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            allowed: DirectionSet::HORIZONTAL,
            veto: false,
            threshold: None,
            transparentize: true,
            appear: true,
        }
    }
}

impl Recorder {
    /// Notes other than drag progress.
    pub fn structural(&self) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|note| !matches!(note, Note::Dragged(..)))
            .cloned()
            .collect()
    }
}

impl DeckDelegate for Recorder {
    fn allowed_directions(&self, _index: usize) -> DirectionSet {
        self.allowed
    }

    fn should_swipe(&self, _index: usize, _direction: SwipeDirection) -> bool {
        !self.veto
    }

    fn did_swipe(&mut self, index: usize, direction: SwipeDirection) {
        self.notes.push(Note::Swiped(index, direction));
    }

    fn did_run_out_of_cards(&mut self) {
        self.notes.push(Note::RanOut);
    }

    fn did_select(&mut self, index: usize) {
        self.notes.push(Note::Selected(index));
    }

    fn should_apply_appear_animation(&self) -> bool {
        self.appear
    }

    fn should_transparentize_next_card(&self) -> bool {
        self.transparentize
    }

    fn dragged(&mut self, percentage: f64, direction: SwipeDirection) {
        self.notes.push(Note::Dragged(percentage, direction));
    }

    fn did_reset_card(&mut self) {
        self.notes.push(Note::Reset);
    }

    fn swipe_threshold_ratio_margin(&self) -> Option<f64> {
        self.threshold
    }

    fn did_show(&mut self, index: usize) {
        self.notes.push(Note::Shown(index));
    }

    fn pan_began(&mut self, index: usize) {
        self.notes.push(Note::PanBegan(index));
    }

    fn pan_finished(&mut self, index: usize) {
        self.notes.push(Note::PanFinished(index));
    }
}

pub type Deck = CardDeck<Items, Recorder>;

/// Reports every queued and interrupted animation until nothing is left.
pub fn settle(deck: &mut Deck) {
    loop {
        let interrupted = deck.animator_mut().take_interrupted();
        let progressed = !interrupted.is_empty();
        for id in interrupted {
            deck.animation_finished(id, false);
        }
        match deck.animator_mut().pop() {
            Some(animation) => deck.animation_finished(animation.id, true),
            None if !progressed => break,
            None => {}
        }
    }
}

/// A settled deck over `len` items with no notes recorded yet.
pub fn deck_with(source: Items, recorder: Recorder, config: DeckConfig) -> Deck {
    let mut deck = CardDeck::with_config(source, recorder, config);
    deck.set_bounds(BOUNDS);
    deck.reload();
    settle(&mut deck);
    deck.delegate_mut().notes.clear();
    deck
}

pub fn deck(len: u32) -> Deck {
    deck_with(Items::new(len), Recorder::default(), DeckConfig::default())
}

pub fn contents(deck: &Deck) -> Vec<u32> {
    deck.cards().iter().map(|card| *card.content()).collect()
}

/// Checks the resting-state window invariants.
pub fn assert_window(deck: &Deck) {
    assert!(!deck.is_animating(), "deck should be at rest");
    let cap = deck.config().count_of_visible_cards;
    let expected = cap.min(deck.count_of_cards() - deck.current_index());
    assert_eq!(deck.visible_len(), expected, "window length");
    for (depth, card) in deck.cards().iter().enumerate() {
        assert_eq!(
            card.geometry().interactive,
            depth == 0,
            "only the front card is interactive (depth {depth})"
        );
        assert!(!card.geometry().hidden, "card at depth {depth} is hidden");
        assert_eq!(
            Some(card.content()),
            deck.source().items.get(deck.current_index() + depth),
            "card at depth {depth} shows the wrong index"
        );
    }
}
