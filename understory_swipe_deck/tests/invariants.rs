// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Random operation sequences keep the window consistent with the data.
//!
//! Drags may stay open across other operations, and animations are only
//! reported some of the time, so edits and resets land on decks that are
//! still mid-gesture or mid-animation.

mod common;

use common::{Deck, Items, Recorder, assert_window, deck_with, settle};
use kurbo::{Point, Vec2};
use proptest::prelude::*;
use understory_swipe_deck::{
    CardId, DeckConfig, DragSpeed, MismatchHandling, PanPhase, SwipeDirection,
};

#[derive(Clone, Debug)]
enum Op {
    Swipe(SwipeDirection, bool),
    Revert,
    RevertFrom(SwipeDirection),
    Drag(f64, f64),
    BeginDrag(f64, f64),
    MoveDrag(f64, f64),
    EndDrag,
    CancelDrag,
    Reload,
    Reset,
    ReplaceSource(u32),
    Insert(usize, bool),
    Remove(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    let direction = prop::sample::select(SwipeDirection::ALL.to_vec());
    let translation = (-400.0..400.0f64, -400.0..400.0f64);
    prop_oneof![
        3 => (direction.clone(), any::<bool>()).prop_map(|(d, force)| Op::Swipe(d, force)),
        1 => Just(Op::Revert),
        1 => direction.prop_map(Op::RevertFrom),
        1 => translation.clone().prop_map(|(x, y)| Op::Drag(x, y)),
        2 => translation.clone().prop_map(|(x, y)| Op::BeginDrag(x, y)),
        1 => translation.prop_map(|(x, y)| Op::MoveDrag(x, y)),
        2 => Just(Op::EndDrag),
        1 => Just(Op::CancelDrag),
        1 => Just(Op::Reload),
        1 => Just(Op::Reset),
        1 => (0u32..6).prop_map(Op::ReplaceSource),
        2 => (any::<usize>(), any::<bool>()).prop_map(|(at, animated)| Op::Insert(at, animated)),
        2 => (any::<usize>(), any::<bool>()).prop_map(|(at, animated)| Op::Remove(at, animated)),
    ]
}

fn front(deck: &Deck) -> Option<CardId> {
    deck.front_card().map(|card| card.id())
}

fn begin(deck: &mut Deck, x: f64, y: f64) {
    let Some(card) = front(deck) else {
        return;
    };
    deck.pan(
        card,
        PanPhase::Began {
            location: Point::new(100.0, 200.0),
        },
    );
    deck.pan(
        card,
        PanPhase::Changed {
            translation: Vec2::new(x, y),
        },
    );
}

fn finish(deck: &mut Deck, phase: PanPhase) {
    if let Some(card) = front(deck) {
        deck.pan(card, phase);
    }
}

fn apply(deck: &mut Deck, op: &Op, next_item: &mut u32) {
    match *op {
        Op::Swipe(direction, force) => deck.swipe(direction, force),
        Op::Revert => deck.revert_action(),
        Op::RevertFrom(direction) => deck.revert_action_from(direction),
        Op::Drag(x, y) => {
            begin(deck, x, y);
            finish(deck, PanPhase::Ended);
        }
        Op::BeginDrag(x, y) => begin(deck, x, y),
        Op::MoveDrag(x, y) => finish(
            deck,
            PanPhase::Changed {
                translation: Vec2::new(x, y),
            },
        ),
        Op::EndDrag => finish(deck, PanPhase::Ended),
        Op::CancelDrag => finish(deck, PanPhase::Cancelled),
        Op::Reload => deck.reload(),
        Op::Reset => deck.reset_current_card_index(),
        Op::ReplaceSource(len) => {
            let items = (0..len).map(|_| {
                *next_item += 1;
                *next_item
            });
            let source = Items {
                items: items.collect(),
                speed: DragSpeed::Default,
            };
            deck.set_data_source(source);
        }
        Op::Insert(at, animated) => {
            let at = at % (deck.source().items.len() + 1);
            *next_item += 1;
            deck.source_mut().items.insert(at, *next_item);
            deck.insert_card_at_index_range(at..at + 1, animated)
                .expect("count matches the edit");
        }
        Op::Remove(at, animated) => {
            let len = deck.source().items.len();
            if len == 0 {
                return;
            }
            let at = at % len;
            deck.source_mut().items.remove(at);
            deck.remove_card_in_index_range(at..at + 1, animated)
                .expect("count matches the edit");
        }
    }
}

fn is_dragging(deck: &Deck) -> bool {
    deck.front_card().is_some_and(|card| card.is_dragging())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn window_tracks_the_data_source(
        len in 0u32..8,
        steps in prop::collection::vec((op(), any::<bool>()), 1..32),
    ) {
        let config = DeckConfig {
            count_mismatch: MismatchHandling::Error,
            ..DeckConfig::default()
        };
        let mut deck = deck_with(Items::new(len), Recorder::default(), config);
        let mut next_item = 1000;
        for (op, report) in &steps {
            apply(&mut deck, op, &mut next_item);
            prop_assert!(deck.current_index() <= deck.count_of_cards());
            prop_assert!(deck.visible_len() <= deck.config().count_of_visible_cards);
            if *report {
                settle(&mut deck);
                if !is_dragging(&deck) {
                    assert_window(&deck);
                    prop_assert!(deck.departing_cards().is_empty());
                }
            }
        }

        // Whatever happened, letting go and reporting every animation
        // returns the deck to rest.
        finish(&mut deck, PanPhase::Ended);
        settle(&mut deck);
        prop_assert!(!is_dragging(&deck));
        assert_window(&deck);
        prop_assert!(deck.departing_cards().is_empty());

        let before = deck.current_index();
        let had_front = deck.front_card().is_some();
        deck.swipe(SwipeDirection::Right, true);
        if had_front {
            prop_assert_eq!(deck.current_index(), before + 1, "gate is down at rest");
        }
        settle(&mut deck);
        assert_window(&deck);
    }
}
