// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deck controller: the windowed stack of materialized cards.
//!
//! A [`CardDeck`] keeps at most
//! [`count_of_visible_cards`](crate::DeckConfig::count_of_visible_cards) cards
//! materialized, front to back, starting at [`current_index`](CardDeck::current_index)
//! of the host's data sequence. It owns every card's geometry, routes
//! gesture phases to the front card, and drives an [`Animator`] for each
//! transition.
//!
//! ## Event loop
//!
//! The deck is single-threaded and never waits. An operation that animates
//! writes the destination state into the model immediately, hands the motion
//! to the animator, and raises an internal `animating` gate. The gate drops
//! only when the host reports the animation through
//! [`animation_finished`](CardDeck::animation_finished). While the gate is up,
//! [`swipe`](CardDeck::swipe), [`revert_action`](CardDeck::revert_action) and
//! new pans are ignored and layout passes are suppressed.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Rect;
//! use understory_swipe_deck::{CardDeck, DeckDataSource, SwipeDirection};
//!
//! struct Words(Vec<&'static str>);
//!
//! impl DeckDataSource for Words {
//!     type Content = &'static str;
//!     type Overlay = ();
//!     fn number_of_cards(&self) -> usize { self.0.len() }
//!     fn content_for_card(&mut self, index: usize) -> &'static str { self.0[index] }
//! }
//!
//! let mut deck = CardDeck::new(Words(vec!["a", "b", "c", "d"]), ());
//! deck.set_bounds(Rect::new(0.0, 0.0, 300.0, 400.0));
//! deck.reload();
//! assert_eq!(deck.visible_len(), 3);
//!
//! // Drain the appear animation the way a host's frame loop would.
//! while let Some(animation) = deck.animator_mut().pop() {
//!     deck.animation_finished(animation.id, true);
//! }
//!
//! deck.swipe(SwipeDirection::Right, false);
//! assert_eq!(deck.current_index(), 1);
//! assert_eq!(deck.content_for_card(1), Some(&"b"));
//! ```

mod edits;

use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use hashbrown::HashMap;
use kurbo::{Affine, Point, Rect, Size};
use smallvec::SmallVec;

use crate::animator::{AnimationId, AnimationQueue, AnimationTarget, Animator, Keyframe};
use crate::card::{
    CardEvent, CardId, CardOwner, CardResponse, CardTransition, DragPhase, DraggableCard, PanPhase,
    off_screen_transform,
};
use crate::config::DeckConfig;
use crate::direction::{DirectionSet, SwipeDirection};
use crate::layout::{CardLayout, CardPlacement, StackLayout, background_card_parameters, lerp_rect};
use crate::overlay::Overlay;
use crate::source::{DeckDataSource, DeckDelegate};

/// Whole-deck presentation state animated by the appear animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeckAppearance {
    /// Deck-wide transform about the deck origin.
    pub transform: Affine,
    /// Deck-wide opacity.
    pub alpha: f64,
    /// Whether the deck accepts input.
    pub interactive: bool,
}

impl Default for DeckAppearance {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            interactive: true,
        }
    }
}

/// Result of [`CardDeck::hit_test`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeckHit {
    /// A materialized card, topmost first.
    Card(CardId),
    /// The deck background.
    Deck,
}

#[derive(Clone, Debug)]
enum Completion {
    Appeared,
    AfterSwipe {
        swiped_index: usize,
        direction: SwipeDirection,
    },
    Reverted,
    BackgroundReset,
    Inserted,
    CardReset(CardId),
    CardSwipedOff(CardId),
    CardsRemoved(SmallVec<[CardId; 4]>),
}

impl Completion {
    /// Whether this completion keeps the `animating` gate up until it fires.
    fn holds_gate(&self) -> bool {
        matches!(
            self,
            Self::Appeared
                | Self::AfterSwipe { .. }
                | Self::Reverted
                | Self::BackgroundReset
                | Self::Inserted
        )
    }
}

#[derive(Clone, Copy)]
struct OwnerParams {
    container: Size,
    space: f64,
    duration: Duration,
}

/// [`CardOwner`] view of the deck for the card at `index`.
struct DeckOwner<'a, D> {
    delegate: &'a D,
    index: usize,
    params: OwnerParams,
}

impl<D: DeckDelegate> CardOwner for DeckOwner<'_, D> {
    fn allowed_directions(&self) -> DirectionSet {
        self.delegate.allowed_directions(self.index)
    }

    fn container_size(&self) -> Size {
        self.params.container
    }

    fn should_swipe(&self, direction: SwipeDirection) -> bool {
        self.delegate.should_swipe(self.index, direction)
    }

    fn should_drag(&self) -> bool {
        self.delegate.should_drag(self.index)
    }

    fn swipe_duration(&self) -> Duration {
        self.params.duration
    }

    fn swipe_threshold_ratio(&self) -> Option<f64> {
        self.delegate.swipe_threshold_ratio_margin()
    }

    fn off_screen_space(&self) -> f64 {
        self.params.space
    }
}

fn place<C, O: Overlay>(card: &mut DraggableCard<C, O>, placement: CardPlacement) {
    let geometry = card.geometry_mut();
    geometry.frame = placement.frame;
    geometry.transform = placement.transform;
    geometry.anchor = Point::ORIGIN;
}

fn placement_keyframe<C, O: Overlay>(card: &DraggableCard<C, O>) -> Keyframe {
    let geometry = card.geometry();
    Keyframe::placement(geometry.frame, geometry.transform)
}

/// A swipeable card deck.
///
/// `S` supplies content, `D` receives notifications (`()` for none), `A`
/// presents animations and `L` stacks the visible window.
///
/// See the [module documentation](self) for the event-loop contract.
pub struct CardDeck<S: DeckDataSource, D = (), A = AnimationQueue, L = StackLayout> {
    source: S,
    delegate: D,
    animator: A,
    layout: L,
    config: DeckConfig,
    bounds: Rect,
    visible: Vec<DraggableCard<S::Content, S::Overlay>>,
    departing: Vec<DraggableCard<S::Content, S::Overlay>>,
    pending: HashMap<AnimationId, Completion>,
    next_card_id: u64,
    next_animation_id: u64,
    appearance: DeckAppearance,
    animating: bool,
    current_index: usize,
    count: usize,
}

impl<S: DeckDataSource, D, A, L> fmt::Debug for CardDeck<S, D, A, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDeck")
            .field("current_index", &self.current_index)
            .field("count", &self.count)
            .field("visible", &self.visible.len())
            .field("departing", &self.departing.len())
            .field("pending", &self.pending.len())
            .field("animating", &self.animating)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<S: DeckDataSource, D: DeckDelegate> CardDeck<S, D> {
    /// Creates an empty deck with default configuration, recording animator
    /// and stack layout.
    ///
    /// Nothing is materialized until [`reload`](Self::reload).
    pub fn new(source: S, delegate: D) -> Self {
        Self::with_config(source, delegate, DeckConfig::default())
    }

    /// Like [`new`](Self::new), with explicit configuration.
    pub fn with_config(source: S, delegate: D, config: DeckConfig) -> Self {
        Self::from_parts(source, delegate, AnimationQueue::new(), StackLayout::default(), config)
    }
}

impl<S, D, A, L> CardDeck<S, D, A, L>
where
    S: DeckDataSource,
    D: DeckDelegate,
    A: Animator,
    L: CardLayout,
{
    /// Creates an empty deck from explicit parts.
    pub fn from_parts(source: S, delegate: D, animator: A, layout: L, config: DeckConfig) -> Self {
        Self {
            source,
            delegate,
            animator,
            layout,
            config,
            bounds: Rect::ZERO,
            visible: Vec::new(),
            departing: Vec::new(),
            pending: HashMap::new(),
            next_card_id: 0,
            next_animation_id: 0,
            appearance: DeckAppearance::default(),
            animating: false,
            current_index: 0,
            count: 0,
        }
    }

    // --- accessors ---

    /// Absolute index of the front card.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Card count last reported by the data source.
    #[must_use]
    pub fn count_of_cards(&self) -> usize {
        self.count
    }

    /// Number of materialized cards.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Materialized cards, front to back.
    #[must_use]
    pub fn cards(&self) -> &[DraggableCard<S::Content, S::Overlay>] {
        &self.visible
    }

    /// The front card.
    #[must_use]
    pub fn front_card(&self) -> Option<&DraggableCard<S::Content, S::Overlay>> {
        self.visible.first()
    }

    /// Looks up a materialized or departing card.
    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&DraggableCard<S::Content, S::Overlay>> {
        self.visible
            .iter()
            .chain(self.departing.iter())
            .find(|card| card.id() == id)
    }

    /// Cards that left the window and are still animating out.
    #[must_use]
    pub fn departing_cards(&self) -> &[DraggableCard<S::Content, S::Overlay>] {
        &self.departing
    }

    /// Every card to draw, back to front.
    pub fn display_order(&self) -> impl Iterator<Item = &DraggableCard<S::Content, S::Overlay>> + '_ {
        self.visible.iter().rev().chain(self.departing.iter())
    }

    /// Content of the card at absolute `index`, if it is materialized.
    #[must_use]
    pub fn content_for_card(&self, index: usize) -> Option<&S::Content> {
        let depth = index.checked_sub(self.current_index)?;
        self.visible.get(depth).map(DraggableCard::content)
    }

    /// Returns `true` while an animation gates deck operations.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Returns `true` when every card has been swiped.
    #[must_use]
    pub fn is_run_out_of_cards(&self) -> bool {
        self.current_index >= self.count
    }

    /// Deck-wide presentation state.
    #[must_use]
    pub fn appearance(&self) -> DeckAppearance {
        self.appearance
    }

    /// Deck rectangle in host coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// The data source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the data source.
    ///
    /// Structural changes must be followed by the matching index-range edit
    /// or [`reload`](Self::reload).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The delegate.
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Mutable access to the delegate.
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// The animator.
    #[must_use]
    pub fn animator(&self) -> &A {
        &self.animator
    }

    /// Mutable access to the animator.
    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    /// The stacking layout.
    #[must_use]
    pub fn layout(&self) -> &L {
        &self.layout
    }

    // --- geometry ---

    /// Stacked rectangle for window depth `depth`, in host coordinates.
    #[must_use]
    pub fn frame_for_card(&self, depth: usize) -> Rect {
        self.layout.frame_for_card(depth, self.bounds.size(), self.config.count_of_visible_cards)
            + self.bounds.origin().to_vec2()
    }

    fn placement(&self, depth: usize) -> CardPlacement {
        let top = self.frame_for_card(0);
        if depth == 0 {
            CardPlacement {
                frame: top,
                transform: Affine::IDENTITY,
            }
        } else {
            background_card_parameters(self.frame_for_card(depth), top)
        }
    }

    /// Updates the deck rectangle and re-lays out unless something is in flight.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        if self.is_busy() {
            tracing::trace!("layout suppressed while animating");
        } else {
            self.layout_deck();
        }
    }

    /// Snaps every materialized card onto its stacked position.
    pub fn layout_deck(&mut self) {
        for depth in 0..self.visible.len() {
            let placement = self.placement(depth);
            place(&mut self.visible[depth], placement);
        }
    }

    /// Moves background cards `percentage` (in `[0, 100]`) of the way toward
    /// the next shallower stack position, without animating.
    pub fn move_other_cards_with_percentage(&mut self, percentage: f64) {
        if self.visible.len() <= 1 {
            return;
        }
        let fraction = percentage / 100.0;
        let top = self.frame_for_card(0);
        let transparentize = self.delegate.should_transparentize_next_card();
        let (semi, opaque) = (self.config.alpha_semi_transparent, self.config.alpha_opaque);
        for depth in 1..self.visible.len() {
            let target = lerp_rect(self.frame_for_card(depth), self.frame_for_card(depth - 1), fraction);
            let placement = background_card_parameters(target, top);
            let card = &mut self.visible[depth];
            place(card, placement);
            if transparentize && depth == 1 {
                card.geometry_mut().alpha = semi + (opaque - semi) * fraction;
            }
        }
    }

    // --- loading ---

    /// Synchronizes the window with the data source.
    ///
    /// - No cards: clears the deck.
    /// - Nothing materialized yet: builds the window and plays the appear
    ///   animation if the delegate asks for it.
    /// - Window can grow: materializes only the missing tail.
    /// - Otherwise: re-fetches content for every materialized card in place,
    ///   after dropping cards past a shrunken count.
    ///
    /// Ignored while animating, including while the front card is dragged.
    pub fn reload(&mut self) {
        if self.animating {
            tracing::trace!("reload ignored while animating");
            return;
        }
        let count = self.source.number_of_cards();
        if count == 0 {
            tracing::debug!("reload: data source is empty, clearing");
            self.clear();
            self.count = 0;
            return;
        }
        self.count = count;
        self.current_index = self.current_index.min(count);

        let fits = self.cap().min(count - self.current_index);
        if self.visible.len() > fits {
            tracing::debug!(dropped = self.visible.len() - fits, "reload: count shrank");
            self.visible.truncate(fits);
        }

        if count > self.current_index + self.visible.len() {
            if self.visible.is_empty() {
                tracing::debug!(current = self.current_index, count, "reload: fresh build");
                self.setup_deck();
                self.layout_deck();
                if self.delegate.should_apply_appear_animation() {
                    self.apply_appear_animation();
                }
                return;
            }
            let missing = self.cap().saturating_sub(self.visible.len());
            if missing > 0 {
                tracing::debug!(missing, "reload: loading missing cards");
                self.load_missing_cards(missing);
                return;
            }
        }
        tracing::debug!(visible = self.visible.len(), "reload: reconfiguring in place");
        for depth in 0..self.visible.len() {
            self.configure_card(depth);
        }
    }

    /// Drops every card and rebuilds from the first card.
    ///
    /// Runs even while animating: in-flight animations and any drag are
    /// abandoned.
    pub fn reset_current_card_index(&mut self) {
        self.clear();
        self.reload();
    }

    /// Replaces the data source and rebuilds the window, keeping the current
    /// index where the new source allows it. Returns the old source.
    ///
    /// Like [`reset_current_card_index`](Self::reset_current_card_index), this
    /// abandons in-flight animations and any drag.
    pub fn set_data_source(&mut self, source: S) -> S {
        let old = core::mem::replace(&mut self.source, source);
        self.drop_window();
        self.reload();
        old
    }

    fn clear(&mut self) {
        self.drop_window();
        self.current_index = 0;
    }

    /// Drops every card and pending completion and lowers the gate.
    fn drop_window(&mut self) {
        if !self.pending.is_empty() || self.animating {
            tracing::debug!(
                pending = self.pending.len(),
                animating = self.animating,
                "abandoning in-flight animations"
            );
        }
        for card in self.visible.drain(..).chain(self.departing.drain(..)) {
            self.animator.cancel(AnimationTarget::Card(card.id()));
            self.animator.cancel(AnimationTarget::Overlay(card.id()));
        }
        self.animator.cancel(AnimationTarget::Deck);
        self.pending.clear();
        self.appearance = DeckAppearance::default();
        self.animating = false;
    }

    /// Lowers the gate unless a gating completion is still pending or the
    /// front card is mid-drag.
    fn lower_gate(&mut self) {
        let held = self.pending.values().any(Completion::holds_gate)
            || self.visible.first().is_some_and(DraggableCard::is_dragging);
        if held {
            tracing::trace!("gate stays up");
        } else {
            self.animating = false;
        }
    }

    /// Cancels a drag in progress on the front card, routing the reset
    /// through the usual response handling.
    fn cancel_front_drag(&mut self) {
        let index = self.current_index;
        let params = self.owner_params();
        let Some(front) = self.visible.first_mut() else {
            return;
        };
        if !front.is_dragging() {
            return;
        }
        let id = front.id();
        tracing::debug!(card = %id, "cancelling drag on displaced front card");
        let owner = DeckOwner {
            delegate: &self.delegate,
            index,
            params,
        };
        let response = front.cancel_pan(&owner);
        self.handle_response(id, index, response);
    }

    fn cap(&self) -> usize {
        self.config.count_of_visible_cards
    }

    fn background_alpha(&self) -> f64 {
        if self.delegate.should_transparentize_next_card() {
            self.config.alpha_semi_transparent
        } else {
            self.config.alpha_opaque
        }
    }

    fn is_busy(&self) -> bool {
        self.animating || self.visible.first().is_some_and(DraggableCard::is_dragging)
    }

    fn owner_params(&self) -> OwnerParams {
        let container = self.bounds.size();
        OwnerParams {
            container,
            space: self
                .config
                .off_screen_space
                .unwrap_or(container.width.max(container.height)),
            duration: self.source.drag_speed().duration(),
        }
    }

    fn animation_id(&mut self) -> AnimationId {
        let id = AnimationId::new(self.next_animation_id);
        self.next_animation_id += 1;
        id
    }

    fn schedule(&mut self, completion: Completion) -> AnimationId {
        let id = self.animation_id();
        self.pending.insert(id, completion);
        id
    }

    fn create_card(&mut self, index: usize, frame: Rect) -> DraggableCard<S::Content, S::Overlay> {
        let content = self.source.content_for_card(index);
        let overlay = self.source.overlay_for_card(index);
        let id = CardId::new(self.next_card_id);
        self.next_card_id += 1;
        DraggableCard::new(id, frame, content, overlay, self.config.drag)
    }

    fn configure_card(&mut self, depth: usize) {
        let index = self.current_index + depth;
        let content = self.source.content_for_card(index);
        let overlay = self.source.overlay_for_card(index);
        let drag = self.config.drag;
        if let Some(card) = self.visible.get_mut(depth) {
            card.configure(content, overlay);
            card.set_constants(drag);
        }
    }

    fn setup_deck(&mut self) {
        if self.count <= self.current_index {
            return;
        }
        let needed = self.cap().min(self.count - self.current_index);
        let top = self.frame_for_card(0);
        let (opaque, background) = (self.config.alpha_opaque, self.background_alpha());
        for depth in 0..needed {
            let mut card = self.create_card(self.current_index + depth, top);
            let geometry = card.geometry_mut();
            geometry.interactive = depth == 0;
            geometry.alpha = if depth == 0 { opaque } else { background };
            self.visible.push(card);
        }
        self.delegate.did_show(self.current_index);
    }

    fn load_missing_cards(&mut self, missing: usize) {
        let available = self.count - (self.current_index + self.visible.len());
        let background = self.background_alpha();
        for _ in 0..missing.min(available) {
            let depth = self.visible.len();
            let placement = self.placement(depth);
            let mut card = self.create_card(self.current_index + depth, placement.frame);
            place(&mut card, placement);
            let geometry = card.geometry_mut();
            geometry.alpha = background;
            geometry.interactive = false;
            self.visible.push(card);
        }
    }

    fn apply_appear_animation(&mut self) {
        self.appearance = DeckAppearance {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            interactive: false,
        };
        self.animating = true;
        let id = self.schedule(Completion::Appeared);
        let delay = self.source.drag_speed().duration();
        self.animator
            .animate_appearance(id, self.config.appearance_animation_duration, delay);
    }

    // --- commands ---

    /// Swipes the front card off toward `direction`.
    ///
    /// Ignored while animating, with no front card, or while the front card is
    /// being dragged or settling. Unless `force` is set the direction must also be
    /// allowed, and accepted by [`DeckDelegate::should_swipe`].
    pub fn swipe(&mut self, direction: SwipeDirection, force: bool) {
        if self.animating {
            tracing::trace!(?direction, "swipe ignored while animating");
            return;
        }
        let Some(front) = self.visible.first() else {
            tracing::trace!(?direction, "swipe ignored on empty deck");
            return;
        };
        if front.phase() != DragPhase::Idle {
            tracing::trace!(?direction, phase = ?front.phase(), "swipe ignored while card is busy");
            return;
        }
        let index = self.current_index;
        if !force
            && !(self.delegate.allowed_directions(index).allows(direction)
                && self.delegate.should_swipe(index, direction))
        {
            tracing::trace!(?direction, index, "swipe vetoed");
            return;
        }

        self.animating = true;
        let background = self.background_alpha();
        if let Some(next) = self.visible.get_mut(1) {
            next.geometry_mut().alpha = background;
        }
        let owner = DeckOwner {
            delegate: &self.delegate,
            index,
            params: self.owner_params(),
        };
        let front = &mut self.visible[0];
        let response = front.swipe(direction, &owner);
        let id = front.id();
        front.detach();
        self.handle_response(id, index, response);
    }

    /// Brings the previous card back with a fade.
    pub fn revert_action(&mut self) {
        self.revert(None);
    }

    /// Brings the previous card back, flying in from `direction`'s off-screen point.
    pub fn revert_action_from(&mut self, direction: SwipeDirection) {
        self.revert(Some(direction));
    }

    fn revert(&mut self, direction: Option<SwipeDirection>) {
        if self.current_index == 0 || self.animating {
            tracing::trace!(current = self.current_index, "revert ignored");
            return;
        }
        if self.visible.len() >= self.cap() {
            self.visible.pop();
        }
        self.current_index -= 1;
        tracing::debug!(index = self.current_index, ?direction, "revert");

        let top = self.frame_for_card(0);
        let mut card = self.create_card(self.current_index, top);
        let opaque = self.config.alpha_opaque;
        let geometry = card.geometry_mut();
        geometry.alpha = opaque;
        geometry.interactive = true;
        let id = card.id();
        self.visible.insert(0, card);

        self.animating = true;
        let params = self.owner_params();
        let off_screen = direction.map(|d| off_screen_transform(d, params.container, params.space));
        let completion = self.schedule(Completion::Reverted);
        self.animator
            .apply_reverse_animation(completion, id, off_screen, opaque, params.duration);

        let background = self.background_alpha();
        let duration = self.config.background_card_frame_animation_duration;
        for depth in 1..self.visible.len() {
            let placement = self.placement(depth);
            let animation = self.animation_id();
            let card = &mut self.visible[depth];
            let from = placement_keyframe(card);
            place(card, placement);
            let geometry = card.geometry_mut();
            geometry.alpha = background;
            geometry.interactive = false;
            let to = placement_keyframe(card);
            let card_id = card.id();
            self.animator
                .apply_scale_animation(animation, card_id, from, to, duration);
        }
    }

    // --- host input ---

    /// Whether a pan may begin on `card`.
    #[must_use]
    pub fn should_begin_pan(&self, card: CardId) -> bool {
        if self.animating || !self.appearance.interactive {
            return false;
        }
        let Some(front) = self.visible.first() else {
            return false;
        };
        if front.id() != card || !front.geometry().interactive {
            return false;
        }
        let owner = DeckOwner {
            delegate: &self.delegate,
            index: self.current_index,
            params: self.owner_params(),
        };
        front.should_begin_pan(&owner)
    }

    /// Forwards a pan phase to `card`. Only the interactive front card responds.
    pub fn pan(&mut self, card: CardId, phase: PanPhase) {
        let is_front = self
            .visible
            .first()
            .is_some_and(|front| front.id() == card && front.geometry().interactive);
        if !is_front {
            tracing::trace!(%card, "pan ignored on non-front card");
            return;
        }
        if matches!(phase, PanPhase::Began { .. }) && !self.should_begin_pan(card) {
            tracing::trace!(%card, "pan refused");
            return;
        }
        let index = self.current_index;
        let owner = DeckOwner {
            delegate: &self.delegate,
            index,
            params: self.owner_params(),
        };
        let response = self.visible[0].handle_pan(phase, &owner);
        self.handle_response(card, index, response);
    }

    /// Forwards a tap on `card`. `on_control` is set when the touch landed on
    /// an interactive child control.
    pub fn tap(&mut self, card: CardId, on_control: bool) {
        let Some(front) = self.visible.first_mut() else {
            return;
        };
        if front.id() != card || !front.geometry().interactive {
            tracing::trace!(%card, "tap ignored on non-front card");
            return;
        }
        let response = front.tap(on_control);
        let index = self.current_index;
        self.handle_response(card, index, response);
    }

    /// Finds what lies under `point` (host coordinates).
    ///
    /// Cards are tested front to back against their transformed bounds. An
    /// empty deck reports nothing when
    /// [`pass_taps_through_when_empty`](DeckConfig::pass_taps_through_when_empty)
    /// is set.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<DeckHit> {
        if self.visible.is_empty() && self.config.pass_taps_through_when_empty {
            return None;
        }
        let card = self
            .visible
            .iter()
            .filter(|card| !card.geometry().hidden)
            .find(|card| card.geometry().visual_bounds().contains(point));
        match card {
            Some(card) => Some(DeckHit::Card(card.id())),
            None if self.bounds.contains(point) => Some(DeckHit::Deck),
            None => None,
        }
    }

    /// Reports that animation `id` ended. `finished` is `false` if it was cut
    /// short. Unknown and repeated ids are ignored.
    pub fn animation_finished(&mut self, id: AnimationId, finished: bool) {
        let Some(completion) = self.pending.remove(&id) else {
            tracing::trace!(%id, "untracked animation finished");
            return;
        };
        tracing::trace!(%id, finished, ?completion, "animation finished");
        match completion {
            Completion::Appeared => {
                self.appearance.interactive = true;
                self.lower_gate();
            }
            Completion::AfterSwipe {
                swiped_index,
                direction,
            } => {
                if let Some(last) = self.visible.last_mut() {
                    last.geometry_mut().hidden = false;
                }
                self.lower_gate();
                self.delegate.did_swipe(swiped_index, direction);
                self.delegate.did_show(self.current_index);
            }
            Completion::Reverted => {
                self.lower_gate();
                self.delegate.did_show(self.current_index);
            }
            Completion::BackgroundReset => {
                self.lower_gate();
                let background = self.background_alpha();
                for card in self.visible.iter_mut().skip(1) {
                    card.geometry_mut().alpha = background;
                }
            }
            Completion::Inserted => self.lower_gate(),
            Completion::CardReset(card) => {
                if let Some(card) = self.visible.iter_mut().find(|c| c.id() == card) {
                    card.finish_reset();
                }
            }
            Completion::CardSwipedOff(card) => self.departing.retain(|c| c.id() != card),
            Completion::CardsRemoved(cards) => {
                self.departing.retain(|c| !cards.contains(&c.id()));
            }
        }
    }

    // --- card responses ---

    fn handle_response(&mut self, card: CardId, index: usize, response: CardResponse) {
        if response.cancel_animations {
            self.animator.cancel(AnimationTarget::Card(card));
            self.animator.cancel(AnimationTarget::Overlay(card));
        }
        if let Some(transition) = response.transition {
            match transition {
                CardTransition::SwipeOff { .. } => {
                    let id = self.schedule(Completion::CardSwipedOff(card));
                    self.animator.apply_swipe_animation(id, card, &transition);
                }
                CardTransition::Reset { .. } => {
                    let id = self.schedule(Completion::CardReset(card));
                    self.animator.apply_card_reset_animation(id, card, &transition);
                }
            }
        }
        for event in response.events {
            match event {
                CardEvent::PanBegan => self.delegate.pan_began(index),
                CardEvent::PanFinished => self.delegate.pan_finished(index),
                CardEvent::Dragged {
                    percentage,
                    direction,
                } => self.card_dragged(percentage, direction),
                CardEvent::Swiped(direction) => self.swiped_action(card, direction),
                CardEvent::Reset => self.card_was_reset(),
                CardEvent::Tapped => self.delegate.did_select(index),
            }
        }
    }

    fn card_dragged(&mut self, percentage: f64, direction: SwipeDirection) {
        self.animating = true;
        if self.delegate.should_move_background_card() {
            self.move_other_cards_with_percentage(percentage);
        }
        self.delegate.dragged(percentage, direction);
    }

    fn card_was_reset(&mut self) {
        if self.visible.len() > 1 {
            self.animating = true;
            let top = self.frame_for_card(0);
            let transparentize = self.delegate.should_transparentize_next_card();
            let semi = self.config.alpha_semi_transparent;
            let mut tracks: SmallVec<[(CardId, Keyframe, Keyframe); 4]> = SmallVec::new();
            for depth in 1..self.visible.len() {
                let placement = background_card_parameters(self.frame_for_card(depth), top);
                let card = &mut self.visible[depth];
                let mut from = placement_keyframe(card);
                from.alpha = Some(card.geometry().alpha);
                place(card, placement);
                if transparentize && depth == 1 {
                    card.geometry_mut().alpha = semi;
                }
                let mut to = placement_keyframe(card);
                to.alpha = Some(card.geometry().alpha);
                tracks.push((card.id(), from, to));
            }
            let id = self.schedule(Completion::BackgroundReset);
            self.animator.reset_background_cards(id, &tracks);
        } else {
            self.lower_gate();
        }
        self.delegate.did_reset_card();
    }

    fn swiped_action(&mut self, card: CardId, direction: SwipeDirection) {
        if self.visible.first().map(DraggableCard::id) != Some(card) {
            tracing::warn!(%card, "swipe reported by a card that is not in front");
            return;
        }
        self.animating = true;
        let mut swiped = self.visible.remove(0);
        swiped.detach();
        swiped.geometry_mut().interactive = false;
        self.departing.push(swiped);

        self.current_index += 1;
        let swiped_index = self.current_index - 1;
        tracing::debug!(index = swiped_index, ?direction, "card swiped");

        if self.visible.len() < self.cap() && self.current_index + self.visible.len() < self.count {
            self.load_next_card();
        }

        if self.visible.is_empty() {
            self.lower_gate();
            tracing::debug!("ran out of cards");
            self.delegate.did_swipe(swiped_index, direction);
            self.delegate.did_run_out_of_cards();
        } else {
            self.animate_cards_after_loading(Completion::AfterSwipe {
                swiped_index,
                direction,
            });
        }
    }

    fn load_next_card(&mut self) {
        let depth = self.visible.len();
        let placement = self.placement(depth);
        let mut card = self.create_card(self.current_index + depth, placement.frame);
        place(&mut card, placement);
        card.geometry_mut().hidden = true;
        self.visible.push(card);
    }

    fn animate_cards_after_loading(&mut self, completion: Completion) {
        let transparentize = self.delegate.should_transparentize_next_card();
        let (semi, opaque) = (self.config.alpha_semi_transparent, self.config.alpha_opaque);
        let duration = self.config.background_card_frame_animation_duration;
        let mut completion = Some(completion);
        for depth in 0..self.visible.len() {
            let placement = self.placement(depth);
            let id = self.visible[depth].id();
            self.animator.cancel(AnimationTarget::Card(id));

            let card = &mut self.visible[depth];
            let from = placement_keyframe(card);
            let previous_alpha = card.geometry().alpha;
            place(card, placement);
            let geometry = card.geometry_mut();
            geometry.interactive = depth == 0;
            if depth != 0 {
                if transparentize {
                    geometry.alpha = semi;
                }
            } else {
                geometry.alpha = opaque;
            }
            let to = placement_keyframe(card);

            let animation = match completion.take().filter(|_| depth == 0) {
                Some(completion) => self.schedule(completion),
                None => self.animation_id(),
            };
            if depth == 0 && transparentize {
                let fade = self.animation_id();
                self.animator
                    .apply_alpha_animation(fade, id, previous_alpha, opaque);
            }
            self.animator
                .apply_scale_animation(animation, id, from, to, duration);
        }
    }
}
