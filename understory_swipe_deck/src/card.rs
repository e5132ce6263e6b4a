// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draggable card: one card's content, geometry, and drag state machine.
//!
//! A [`DraggableCard`] converts pan gesture phases into a transform and a
//! commit-or-reset decision. It never talks to its owner through a stored
//! reference. Questions go through a [`CardOwner`] passed into each call, and
//! everything the owner needs to react to comes back as a [`CardResponse`].
//!
//! ## State machine
//!
//! ```text
//! Idle --begin_pan--> Dragging --end_pan--> Settling --finish_reset--> Idle
//!   \                                        ^
//!    `------------------swipe---------------'
//! ```
//!
//! A card that settles through a swipe never returns to `Idle`; its owner
//! removes it once the swipe-off animation completes.
//!
//! ## Minimal example
//!
//! ```
//! use core::time::Duration;
//! use kurbo::{Point, Rect, Size, Vec2};
//! use understory_swipe_deck::card::{CardEvent, CardId, CardOwner, DragConstants, DraggableCard};
//! use understory_swipe_deck::DirectionSet;
//!
//! struct Owner;
//! impl CardOwner for Owner {
//!     fn allowed_directions(&self) -> DirectionSet { DirectionSet::HORIZONTAL }
//!     fn container_size(&self) -> Size { Size::new(200.0, 300.0) }
//! }
//!
//! let frame = Rect::new(0.0, 0.0, 200.0, 300.0);
//! let mut card: DraggableCard<&str> =
//!     DraggableCard::new(CardId::new(1), frame, "hello", None, DragConstants::default());
//!
//! card.begin_pan(Point::new(100.0, 50.0), &Owner);
//! let response = card.update_pan(Vec2::new(60.0, 0.0), &Owner);
//! assert!(matches!(response.events[0], CardEvent::Dragged { .. }));
//!
//! // 60px of a 100px half-width does not reach the default 1.0 threshold.
//! let response = card.end_pan(&Owner);
//! assert_eq!(response.events[0], CardEvent::Reset);
//! ```

use core::f64::consts::{FRAC_PI_4, PI};
use core::fmt;
use core::time::Duration;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::animator::Keyframe;
use crate::direction::{DirectionSet, SwipeDirection};
use crate::geometry::{closest_direction, completion_fraction};
use crate::overlay::Overlay;

/// Identifier for a card materialized by a deck.
///
/// Identifiers are never reused within one deck, so a stale `CardId` held by
/// a host simply stops matching any card.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(u64);

impl CardId {
    /// Creates an identifier from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// How long a swipe-off animation takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DragSpeed {
    /// Two seconds.
    Slow,
    /// One and a half seconds.
    Moderate,
    /// 0.8 seconds.
    #[default]
    Default,
    /// 0.4 seconds.
    Fast,
}

impl DragSpeed {
    /// The swipe animation duration for this speed.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(2000),
            Self::Moderate => Duration::from_millis(1500),
            Self::Default => Duration::from_millis(800),
            Self::Fast => Duration::from_millis(400),
        }
    }
}

/// Constants shaping the transform applied while a card is dragged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragConstants {
    /// Upper bound on rotation strength (drag width fractions).
    pub rotation_max: f64,
    /// Rotation, in radians, at full rotation strength.
    pub rotation_angle: f64,
    /// Smallest scale a dragged card shrinks to.
    pub scale_min: f64,
}

impl Default for DragConstants {
    fn default() -> Self {
        Self {
            rotation_max: 1.0,
            rotation_angle: PI / 10.0,
            scale_min: 0.8,
        }
    }
}

/// Geometric and interaction state of a card.
///
/// `frame` is the card's layout rectangle in deck coordinates. Background
/// cards keep a top-card-sized frame and are shrunk by `transform`, so
/// content is always laid out at one intrinsic size.
///
/// `transform` is applied in card-local coordinates, pivoting around
/// `anchor`. The anchor starts at the card origin and moves to the touch
/// point when a drag begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardGeometry {
    /// Layout rectangle in deck coordinates.
    pub frame: Rect,
    /// Visual transform in card-local coordinates about `anchor`.
    pub transform: Affine,
    /// Transform pivot in card-local coordinates.
    pub anchor: Point,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Whether the card is hidden from display.
    pub hidden: bool,
    /// Whether the card accepts gestures.
    pub interactive: bool,
}

impl CardGeometry {
    /// Creates geometry at `frame` with identity transform, fully opaque and interactive.
    #[must_use]
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            transform: Affine::IDENTITY,
            anchor: Point::ORIGIN,
            alpha: 1.0,
            hidden: false,
            interactive: true,
        }
    }

    /// Maps card-local coordinates into deck coordinates.
    #[must_use]
    pub fn world_transform(&self) -> Affine {
        let pivot = self.frame.origin().to_vec2() + self.anchor.to_vec2();
        Affine::translate(pivot) * self.transform * Affine::translate(-self.anchor.to_vec2())
    }

    /// Bounding box of the transformed card in deck coordinates.
    #[must_use]
    pub fn visual_bounds(&self) -> Rect {
        let local = Rect::from_origin_size(Point::ORIGIN, self.frame.size());
        self.world_transform().transform_rect_bbox(local)
    }

    /// Snapshot of the animatable properties.
    #[must_use]
    pub fn keyframe(&self) -> Keyframe {
        Keyframe {
            frame: Some(self.frame),
            transform: Some(self.transform),
            alpha: Some(self.alpha),
        }
    }
}

/// Phase of a card's drag state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DragPhase {
    /// At rest.
    #[default]
    Idle,
    /// A pan gesture is in progress.
    Dragging,
    /// A settle animation (reset or swipe-off) is in flight.
    Settling,
}

/// Per-gesture drag bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    translation: Vec2,
    phase: DragPhase,
    touch: Point,
    vertical_sign: f64,
}

impl Default for DragState {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            phase: DragPhase::Idle,
            touch: Point::ORIGIN,
            vertical_sign: 1.0,
        }
    }
}

impl DragState {
    /// Starts a gesture at `touch` (card-local) on a card of `size`.
    ///
    /// The rotation sign is fixed for the whole gesture: touches in the lower
    /// half rotate the opposite way to touches in the upper half.
    pub fn start(&mut self, touch: Point, size: Size) {
        self.translation = Vec2::ZERO;
        self.phase = DragPhase::Dragging;
        self.touch = touch;
        self.vertical_sign = if touch.y >= size.height / 2.0 { -1.0 } else { 1.0 };
    }

    /// Records the gesture's cumulative translation.
    pub fn update(&mut self, translation: Vec2) {
        if self.phase == DragPhase::Dragging {
            self.translation = translation;
        }
    }

    /// Ends the gesture, leaving the state settling.
    pub fn end(&mut self) {
        self.phase = DragPhase::Settling;
    }

    /// Returns to rest and clears the gesture.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Cumulative translation of the current gesture.
    #[must_use]
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Card-local point where the gesture began.
    #[must_use]
    pub fn touch(&self) -> Point {
        self.touch
    }

    /// `1.0` for upper-half touches, `-1.0` for lower-half touches.
    #[must_use]
    pub fn vertical_sign(&self) -> f64 {
        self.vertical_sign
    }
}

/// Gesture phases forwarded by the host's pan recognizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanPhase {
    /// The pan began at a card-local location.
    Began {
        /// Card-local touch location.
        location: Point,
    },
    /// The pan moved; `translation` is cumulative since `Began`.
    Changed {
        /// Cumulative translation in card-local pixels.
        translation: Vec2,
    },
    /// The user lifted their finger.
    Ended,
    /// The recognizer was cancelled or failed.
    Cancelled,
}

/// Notifications a card emits for its owner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CardEvent {
    /// A pan gesture began.
    PanBegan,
    /// A pan gesture ended and was resolved.
    PanFinished,
    /// The card was dragged `percentage` (in `[0, 100]`) toward `direction`.
    Dragged {
        /// Progress toward a full swipe, in percent.
        percentage: f64,
        /// Direction the drag resolves to.
        direction: SwipeDirection,
    },
    /// The card committed a swipe.
    Swiped(SwipeDirection),
    /// The card is returning to rest.
    Reset,
    /// The card was tapped.
    Tapped,
}

/// Settle animation a card asks its owner to play.
///
/// The card has already moved its own model state to the `to` values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CardTransition {
    /// Fly off-screen.
    SwipeOff {
        /// Transform at the start of the animation.
        from: Affine,
        /// Off-screen transform.
        to: Affine,
        /// Overlay opacity `(from, to)` when the overlay should fade in with the motion.
        overlay: Option<(f64, f64)>,
        /// Animation duration.
        duration: Duration,
    },
    /// Spring back to the identity transform and fade the overlay out.
    Reset {
        /// Transform at the start of the animation.
        from: Affine,
        /// Overlay opacity at the start of the animation.
        overlay_from: f64,
    },
}

/// Everything a card call produced for its owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardResponse {
    /// Notifications, in emission order.
    pub events: SmallVec<[CardEvent; 2]>,
    /// Settle animation to play, if any.
    pub transition: Option<CardTransition>,
    /// In-flight animations on this card should be cancelled first.
    pub cancel_animations: bool,
}

impl CardResponse {
    /// Returns `true` if the call produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.transition.is_none() && !self.cancel_animations
    }
}

/// Capability interface a card queries while handling a gesture.
///
/// All methods except [`allowed_directions`](Self::allowed_directions) and
/// [`container_size`](Self::container_size) have defaults.
pub trait CardOwner {
    /// Directions this card may be swiped in.
    fn allowed_directions(&self) -> DirectionSet;

    /// Size of the container the card flies out of.
    fn container_size(&self) -> Size;

    /// Whether a resolved drag direction may commit.
    fn should_swipe(&self, direction: SwipeDirection) -> bool {
        let _ = direction;
        true
    }

    /// Whether a pan may begin at all.
    fn should_drag(&self) -> bool {
        true
    }

    /// Duration of the swipe-off animation.
    fn swipe_duration(&self) -> Duration {
        DragSpeed::Default.duration()
    }

    /// Completion fraction needed to commit. `None` or `0` means `1.0`.
    fn swipe_threshold_ratio(&self) -> Option<f64> {
        None
    }

    /// Extra distance beyond the container edge a swiped card travels.
    fn off_screen_space(&self) -> f64 {
        let size = self.container_size();
        size.width.max(size.height)
    }
}

/// Translation a card swiped in `direction` travels to leave the container.
#[must_use]
pub fn off_screen_point(direction: SwipeDirection, container: Size, space: f64) -> Vec2 {
    let v = direction.vector();
    let x = v.x * (container.width + space);
    if direction.is_horizontal() {
        Vec2::new(x, 0.5 * container.height)
    } else {
        Vec2::new(x, v.y * (container.height + space))
    }
}

/// Rotation applied to a card flying off in `direction` from an explicit swipe.
#[must_use]
pub fn off_screen_rotation(direction: SwipeDirection) -> f64 {
    direction.bearing() / 2.0 - FRAC_PI_4
}

/// Full off-screen transform for an explicit swipe (or its reverse).
#[must_use]
pub fn off_screen_transform(direction: SwipeDirection, container: Size, space: f64) -> Affine {
    Affine::translate(off_screen_point(direction, container, space))
        * Affine::rotate(off_screen_rotation(direction))
}

fn threshold(owner: &dyn CardOwner) -> f64 {
    match owner.swipe_threshold_ratio() {
        Some(ratio) if ratio != 0.0 => ratio,
        _ => 1.0,
    }
}

/// One card of a deck: content, optional overlay, geometry, and drag state.
#[derive(Clone, Debug)]
pub struct DraggableCard<C, O = ()> {
    id: CardId,
    content: C,
    overlay: Option<O>,
    overlay_alpha: f64,
    overlay_direction: Option<SwipeDirection>,
    geometry: CardGeometry,
    drag: DragState,
    constants: DragConstants,
    attached: bool,
}

impl<C, O: Overlay> DraggableCard<C, O> {
    /// Creates an idle, attached card at `frame`.
    pub fn new(
        id: CardId,
        frame: Rect,
        content: C,
        overlay: Option<O>,
        constants: DragConstants,
    ) -> Self {
        Self {
            id,
            content,
            overlay,
            overlay_alpha: 0.0,
            overlay_direction: None,
            geometry: CardGeometry::new(frame),
            drag: DragState::default(),
            constants,
            attached: true,
        }
    }

    /// The card's identifier.
    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// The card's content.
    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Mutable access to the card's content.
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// The card's overlay, if any.
    #[must_use]
    pub fn overlay(&self) -> Option<&O> {
        self.overlay.as_ref()
    }

    /// Current overlay opacity.
    #[must_use]
    pub fn overlay_alpha(&self) -> f64 {
        self.overlay_alpha
    }

    /// Direction the overlay is currently showing feedback for.
    #[must_use]
    pub fn overlay_direction(&self) -> Option<SwipeDirection> {
        self.overlay_direction
    }

    /// Current geometry.
    #[must_use]
    pub fn geometry(&self) -> &CardGeometry {
        &self.geometry
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut CardGeometry {
        &mut self.geometry
    }

    /// Current drag bookkeeping.
    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.drag.phase()
    }

    /// Returns `true` while a pan gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.phase() == DragPhase::Dragging
    }

    /// Drag constants in effect.
    #[must_use]
    pub fn constants(&self) -> DragConstants {
        self.constants
    }

    /// Replaces the drag constants.
    pub fn set_constants(&mut self, constants: DragConstants) {
        self.constants = constants;
    }

    /// Returns `false` once the owner link has been severed.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Severs the owner link. A detached card still animates but emits no events.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Replaces content and overlay. The new overlay starts fully transparent.
    pub fn configure(&mut self, content: C, overlay: Option<O>) {
        self.content = content;
        self.overlay = overlay;
        self.overlay_alpha = 0.0;
        self.overlay_direction = None;
    }

    /// Whether a pan gesture may begin on this card.
    #[must_use]
    pub fn should_begin_pan(&self, owner: &dyn CardOwner) -> bool {
        owner.should_drag()
    }

    /// Dispatches one gesture phase.
    pub fn handle_pan(&mut self, phase: PanPhase, owner: &dyn CardOwner) -> CardResponse {
        match phase {
            PanPhase::Began { location } => self.begin_pan(location, owner),
            PanPhase::Changed { translation } => self.update_pan(translation, owner),
            PanPhase::Ended => self.end_pan(owner),
            PanPhase::Cancelled => self.cancel_pan(owner),
        }
    }

    /// Starts a drag at the card-local `location`.
    pub fn begin_pan(&mut self, location: Point, owner: &dyn CardOwner) -> CardResponse {
        let _ = owner;
        let mut response = CardResponse {
            cancel_animations: true,
            ..CardResponse::default()
        };
        self.geometry.anchor = location;
        self.drag.start(location, self.geometry.frame.size());
        self.emit(&mut response, CardEvent::PanBegan);
        response
    }

    /// Follows the drag to a new cumulative translation.
    pub fn update_pan(&mut self, translation: Vec2, owner: &dyn CardOwner) -> CardResponse {
        let mut response = CardResponse::default();
        if !self.is_dragging() {
            return response;
        }
        self.drag.update(translation);
        self.geometry.transform = self.drag_transform();

        let (direction, fraction) = self.resolve(owner);
        self.update_overlay(fraction, direction, threshold(owner));
        if let Some(direction) = direction {
            let percentage = (100.0 * fraction).abs().min(100.0);
            self.emit(&mut response, CardEvent::Dragged { percentage, direction });
        }
        response
    }

    /// Ends the drag, committing or resetting.
    pub fn end_pan(&mut self, owner: &dyn CardOwner) -> CardResponse {
        let mut response = CardResponse::default();
        if !self.is_dragging() {
            return response;
        }
        let (direction, fraction) = self.resolve(owner);
        match direction {
            Some(direction)
                if owner.should_swipe(direction)
                    && fraction >= threshold(owner)
                    && owner.allowed_directions().allows(direction) =>
            {
                self.commit_drag(direction, owner, &mut response);
            }
            _ => self.reset(&mut response),
        }
        self.emit(&mut response, CardEvent::PanFinished);
        response
    }

    /// Abandons the drag without a commit check.
    pub fn cancel_pan(&mut self, owner: &dyn CardOwner) -> CardResponse {
        let _ = owner;
        let mut response = CardResponse::default();
        if self.is_dragging() {
            self.reset(&mut response);
        }
        response
    }

    /// Handles a tap. Taps landing on an interactive child control are ignored.
    pub fn tap(&mut self, on_control: bool) -> CardResponse {
        let mut response = CardResponse::default();
        if !on_control {
            self.emit(&mut response, CardEvent::Tapped);
        }
        response
    }

    /// Swipes the card off without a gesture.
    ///
    /// Only legal while idle; otherwise the response is empty.
    pub fn swipe(&mut self, direction: SwipeDirection, owner: &dyn CardOwner) -> CardResponse {
        let mut response = CardResponse::default();
        if self.phase() != DragPhase::Idle {
            return response;
        }
        self.set_overlay_direction(Some(direction));
        let from = self.geometry.transform;
        let to = off_screen_transform(direction, owner.container_size(), owner.off_screen_space());
        let overlay = self.overlay.is_some().then_some((self.overlay_alpha, 1.0));
        if overlay.is_some() {
            self.overlay_alpha = 1.0;
        }
        self.geometry.transform = to;
        self.drag.end();
        self.emit(&mut response, CardEvent::Swiped(direction));
        response.transition = Some(CardTransition::SwipeOff {
            from,
            to,
            overlay,
            duration: owner.swipe_duration(),
        });
        response
    }

    /// Completes a reset settle. Ignored unless the card is still settling.
    pub fn finish_reset(&mut self) {
        if self.phase() == DragPhase::Settling {
            self.drag.clear();
            self.geometry.transform = Affine::IDENTITY;
        }
    }

    fn drag_transform(&self) -> Affine {
        let translation = self.drag.translation();
        let width = self.geometry.frame.width();
        let max = self.constants.rotation_max;
        let strength = if width > 0.0 {
            (translation.x / width).min(max).max(-max)
        } else {
            0.0
        };
        let angle = self.drag.vertical_sign() * self.constants.rotation_angle * strength;
        let scale_min = self.constants.scale_min;
        let scale = (1.0 - (1.0 - scale_min) * strength.abs()).max(scale_min);
        Affine::scale(scale) * Affine::rotate(angle) * Affine::translate(translation)
    }

    fn resolve(&self, owner: &dyn CardOwner) -> (Option<SwipeDirection>, f64) {
        let translation = self.drag.translation();
        let size = self.geometry.frame.size();
        let direction = closest_direction(translation, size, owner.allowed_directions());
        let fraction = direction.map_or(0.0, |d| completion_fraction(translation, size, d));
        (direction, fraction)
    }

    fn update_overlay(&mut self, fraction: f64, direction: Option<SwipeDirection>, threshold: f64) {
        self.set_overlay_direction(direction);
        let progress = (fraction / threshold).clamp(0.0, 1.0);
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.update_progress(progress);
            self.overlay_alpha = progress;
        }
    }

    fn set_overlay_direction(&mut self, direction: Option<SwipeDirection>) {
        self.overlay_direction = direction;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_direction(direction);
        }
    }

    fn commit_drag(
        &mut self,
        direction: SwipeDirection,
        owner: &dyn CardOwner,
        response: &mut CardResponse,
    ) {
        self.set_overlay_direction(Some(direction));
        if self.overlay.is_some() {
            self.overlay_alpha = 1.0;
        }
        let from = self.geometry.transform;
        let point = off_screen_point(direction, owner.container_size(), owner.off_screen_space());
        let to = Affine::translate(point);
        self.geometry.transform = to;
        self.drag.end();
        self.emit(response, CardEvent::Swiped(direction));
        response.transition = Some(CardTransition::SwipeOff {
            from,
            to,
            overlay: None,
            duration: owner.swipe_duration(),
        });
    }

    fn reset(&mut self, response: &mut CardResponse) {
        self.emit(response, CardEvent::Reset);
        response.cancel_animations = true;
        response.transition = Some(CardTransition::Reset {
            from: self.geometry.transform,
            overlay_from: self.overlay_alpha,
        });
        self.geometry.transform = Affine::IDENTITY;
        self.overlay_alpha = 0.0;
        self.drag.end();
    }

    fn emit(&self, response: &mut CardResponse, event: CardEvent) {
        if self.attached {
            response.events.push(event);
        }
    }
}
