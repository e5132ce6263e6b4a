// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Swipe Deck: a headless swipeable card deck.
//!
//! This crate models a stack of cards that the user drags and releases,
//! either committing a directional swipe or snapping back. It owns the
//! interaction logic and the geometry, and leaves rendering, gesture
//! recognition, and timing to the host.
//!
//! The core concepts are:
//!
//! - [`SwipeDirection`] and [`DirectionSet`]: the eight directions a card can
//!   leave in, and sets of them used as per-card constraints.
//! - [`geometry`]: projection math that classifies a drag
//!   ([`geometry::closest_direction`]) and measures its progress toward a
//!   committed swipe ([`geometry::completion_fraction`]).
//! - [`DraggableCard`]: one card's drag state machine. It turns gesture phases
//!   into a transform and a commit-or-reset decision.
//! - [`CardDeck`]: the controller. It keeps a window of materialized cards,
//!   routes input to the front card, and sequences every transition through
//!   an [`Animator`].
//!
//! Host frameworks are responsible for:
//!
//! - Supplying content through [`DeckDataSource`] and reacting through
//!   [`DeckDelegate`].
//! - Forwarding pan phases ([`CardDeck::pan`]) and taps ([`CardDeck::tap`]).
//! - Presenting [`Animation`]s and reporting each one back through
//!   [`CardDeck::animation_finished`].
//! - Drawing [`CardDeck::display_order`] using each card's
//!   [`CardGeometry`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Vec2};
//! use understory_swipe_deck::{CardDeck, DeckDataSource, PanPhase};
//!
//! struct Photos(usize);
//!
//! impl DeckDataSource for Photos {
//!     type Content = usize;
//!     type Overlay = ();
//!     fn number_of_cards(&self) -> usize { self.0 }
//!     fn content_for_card(&mut self, index: usize) -> usize { index }
//! }
//!
//! let mut deck = CardDeck::new(Photos(5), ());
//! deck.set_bounds(Rect::new(0.0, 0.0, 320.0, 480.0));
//! deck.reload();
//! while let Some(animation) = deck.animator_mut().pop() {
//!     deck.animation_finished(animation.id, true);
//! }
//!
//! // Drag the front card fully off to the right and let go.
//! let front = deck.front_card().unwrap().id();
//! deck.pan(front, PanPhase::Began { location: Point::new(160.0, 100.0) });
//! deck.pan(front, PanPhase::Changed { translation: Vec2::new(400.0, 0.0) });
//! deck.pan(front, PanPhase::Ended);
//!
//! assert_eq!(deck.current_index(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod animator;
pub mod card;
mod config;
mod deck;
mod direction;
mod error;
pub mod geometry;
pub mod layout;
mod overlay;
mod source;

pub use animator::{Animation, AnimationId, AnimationQueue, AnimationTarget, Animator, Keyframe};
pub use card::{
    CardEvent, CardGeometry, CardId, DragConstants, DragPhase, DragSpeed, DraggableCard, PanPhase,
};
pub use config::DeckConfig;
pub use deck::{CardDeck, DeckAppearance, DeckHit};
pub use direction::{DirectionSet, SwipeDirection};
pub use error::{DeckError, MismatchHandling};
pub use layout::{CardLayout, StackLayout};
pub use overlay::Overlay;
pub use source::{DeckDataSource, DeckDelegate};
