// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation descriptions and the animator seam.
//!
//! The deck never interpolates anything itself. Every visual transition is
//! described as an [`Animation`]: a set of [`Track`]s, each moving one target
//! from a [`Keyframe`] to another, sharing one duration. The deck has already
//! written the destination values into its model when it hands an animation
//! over; the animator only has to present the motion.
//!
//! Each animation the deck cares about carries an [`AnimationId`]. The host
//! reports back through [`CardDeck::animation_finished`](crate::CardDeck::animation_finished)
//! exactly once per id, with `finished = false` if the animation was cut short.
//!
//! [`AnimationQueue`] is the default [`Animator`]: it records animations in
//! scheduling order for a host (or a test) to drain.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use kurbo::{Affine, Rect};
use smallvec::SmallVec;

use crate::card::{CardId, CardTransition};

/// Identifier of a scheduled animation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(u64);

impl AnimationId {
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

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

/// What a track animates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimationTarget {
    /// The deck as a whole (see [`CardDeck::appearance`](crate::CardDeck::appearance)).
    Deck,
    /// A card's geometry.
    Card(CardId),
    /// A card's overlay opacity.
    Overlay(CardId),
}

/// Animatable properties. `None` leaves a property alone.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Keyframe {
    /// Layout frame.
    pub frame: Option<Rect>,
    /// Visual transform.
    pub transform: Option<Affine>,
    /// Opacity.
    pub alpha: Option<f64>,
}

impl Keyframe {
    /// A keyframe touching only opacity.
    #[must_use]
    pub const fn alpha(alpha: f64) -> Self {
        Self {
            frame: None,
            transform: None,
            alpha: Some(alpha),
        }
    }

    /// A keyframe touching only the transform.
    #[must_use]
    pub const fn transform(transform: Affine) -> Self {
        Self {
            frame: None,
            transform: Some(transform),
            alpha: None,
        }
    }

    /// A keyframe touching frame and transform.
    #[must_use]
    pub const fn placement(frame: Rect, transform: Affine) -> Self {
        Self {
            frame: Some(frame),
            transform: Some(transform),
            alpha: None,
        }
    }
}

/// Timing curve.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Curve {
    /// Constant speed.
    Linear,
    /// Slow start and end.
    #[default]
    EaseInOut,
    /// Damped spring.
    Spring {
        /// Damping ratio; `1.0` is critically damped.
        damping_ratio: f64,
        /// Initial velocity in units of the animated distance per second.
        initial_velocity: f64,
    },
}

/// One target's motion within an animation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Track {
    /// What moves.
    pub target: AnimationTarget,
    /// Starting values.
    pub from: Keyframe,
    /// Ending values (already written into the model).
    pub to: Keyframe,
    /// Timing curve.
    pub curve: Curve,
}

/// A batch of tracks sharing one duration and completion.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    /// Completion identifier.
    pub id: AnimationId,
    /// Tracks, all running together.
    pub tracks: SmallVec<[Track; 2]>,
    /// Running time.
    pub duration: Duration,
    /// Delay before the tracks start.
    pub delay: Duration,
}

/// Alpha fade duration.
pub const ALPHA_DURATION: Duration = Duration::from_millis(200);
/// Batch fade-in duration for inserted cards.
pub const INSERTION_DURATION: Duration = Duration::from_millis(200);
/// Batch fade-out duration for evicted cards.
pub const REMOVAL_DURATION: Duration = Duration::from_millis(50);
/// Background reflow duration after a reset or insertion.
pub const BACKGROUND_RESET_DURATION: Duration = Duration::from_millis(200);
/// Fade-in duration for a revert with no direction.
pub const REVERT_FADE_DURATION: Duration = Duration::from_millis(1000);
/// Spring-back duration for a card that did not commit.
pub const CARD_RESET_DURATION: Duration = Duration::from_millis(200);
/// Starting scale of the deck appear animation.
pub const APPEARANCE_START_SCALE: f64 = 0.1;

/// Spring used to return a card to rest.
pub const CARD_RESET_SPRING: Curve = Curve::Spring {
    damping_ratio: 0.5,
    initial_velocity: 40.0,
};

/// Presents deck animations.
///
/// Only [`play`](Self::play) and [`cancel`](Self::cancel) are required. The
/// remaining methods describe each deck transition and can be overridden to
/// restyle one of them (for example, a springier
/// [`apply_scale_animation`](Self::apply_scale_animation)) while keeping the
/// rest.
pub trait Animator {
    /// Starts an animation.
    fn play(&mut self, animation: Animation);

    /// Cuts every track for `target` short.
    ///
    /// An animation left with no tracks must still be reported to the deck,
    /// with `finished = false`.
    fn cancel(&mut self, target: AnimationTarget);

    /// Deck appear animation: scale up from 10% and fade in.
    fn animate_appearance(&mut self, id: AnimationId, duration: Duration, delay: Duration) {
        self.play(single(
            id,
            Track {
                target: AnimationTarget::Deck,
                from: Keyframe {
                    frame: None,
                    transform: Some(Affine::scale(APPEARANCE_START_SCALE)),
                    alpha: Some(0.0),
                },
                to: Keyframe {
                    frame: None,
                    transform: Some(Affine::IDENTITY),
                    alpha: Some(1.0),
                },
                curve: Curve::EaseInOut,
            },
            duration,
            delay,
        ));
    }

    /// Brings a reverted card back in.
    ///
    /// With `off_screen` the card flies in from that transform over
    /// `duration`; without it the card only fades in over
    /// [`REVERT_FADE_DURATION`].
    fn apply_reverse_animation(
        &mut self,
        id: AnimationId,
        card: CardId,
        off_screen: Option<Affine>,
        alpha: f64,
        duration: Duration,
    ) {
        let mut tracks = SmallVec::new();
        tracks.push(Track {
            target: AnimationTarget::Card(card),
            from: Keyframe::alpha(0.0),
            to: Keyframe::alpha(alpha),
            curve: Curve::EaseInOut,
        });
        let duration = match off_screen {
            Some(from) => {
                tracks.push(Track {
                    target: AnimationTarget::Card(card),
                    from: Keyframe::transform(from),
                    to: Keyframe::transform(Affine::IDENTITY),
                    curve: Curve::EaseInOut,
                });
                duration
            }
            None => REVERT_FADE_DURATION,
        };
        self.play(Animation {
            id,
            tracks,
            duration,
            delay: Duration::ZERO,
        });
    }

    /// Moves a card to a new frame and scale.
    fn apply_scale_animation(
        &mut self,
        id: AnimationId,
        card: CardId,
        from: Keyframe,
        to: Keyframe,
        duration: Duration,
    ) {
        self.play(single(
            id,
            Track {
                target: AnimationTarget::Card(card),
                from,
                to,
                curve: Curve::EaseInOut,
            },
            duration,
            Duration::ZERO,
        ));
    }

    /// Fades a card to `to`.
    fn apply_alpha_animation(&mut self, id: AnimationId, card: CardId, from: f64, to: f64) {
        self.play(single(
            id,
            Track {
                target: AnimationTarget::Card(card),
                from: Keyframe::alpha(from),
                to: Keyframe::alpha(to),
                curve: Curve::EaseInOut,
            },
            ALPHA_DURATION,
            Duration::ZERO,
        ));
    }

    /// Fades freshly inserted cards in from transparent to their resting opacity.
    fn apply_insertion_animation(&mut self, id: AnimationId, cards: &[(CardId, f64)]) {
        self.play(Animation {
            id,
            tracks: cards
                .iter()
                .map(|&(card, alpha)| Track {
                    target: AnimationTarget::Card(card),
                    from: Keyframe::alpha(0.0),
                    to: Keyframe::alpha(alpha),
                    curve: Curve::EaseInOut,
                })
                .collect(),
            duration: INSERTION_DURATION,
            delay: Duration::ZERO,
        });
    }

    /// Fades evicted cards out from their current opacity.
    fn apply_removal_animation(&mut self, id: AnimationId, cards: &[(CardId, f64)]) {
        self.play(Animation {
            id,
            tracks: cards
                .iter()
                .map(|&(card, alpha)| Track {
                    target: AnimationTarget::Card(card),
                    from: Keyframe::alpha(alpha),
                    to: Keyframe::alpha(0.0),
                    curve: Curve::EaseInOut,
                })
                .collect(),
            duration: REMOVAL_DURATION,
            delay: Duration::ZERO,
        });
    }

    /// Settles background cards back onto the resting stack.
    fn reset_background_cards(&mut self, id: AnimationId, cards: &[(CardId, Keyframe, Keyframe)]) {
        self.play(Animation {
            id,
            tracks: cards
                .iter()
                .map(|&(card, from, to)| Track {
                    target: AnimationTarget::Card(card),
                    from,
                    to,
                    curve: Curve::Linear,
                })
                .collect(),
            duration: BACKGROUND_RESET_DURATION,
            delay: Duration::ZERO,
        });
    }

    /// Flies a card off-screen.
    fn apply_swipe_animation(&mut self, id: AnimationId, card: CardId, transition: &CardTransition) {
        let CardTransition::SwipeOff {
            from,
            to,
            overlay,
            duration,
        } = *transition
        else {
            return;
        };
        let mut tracks = SmallVec::new();
        tracks.push(Track {
            target: AnimationTarget::Card(card),
            from: Keyframe::transform(from),
            to: Keyframe::transform(to),
            curve: Curve::EaseInOut,
        });
        if let Some((start, end)) = overlay {
            tracks.push(Track {
                target: AnimationTarget::Overlay(card),
                from: Keyframe::alpha(start),
                to: Keyframe::alpha(end),
                curve: Curve::EaseInOut,
            });
        }
        self.play(Animation {
            id,
            tracks,
            duration,
            delay: Duration::ZERO,
        });
    }

    /// Springs a card back to rest and fades its overlay out.
    fn apply_card_reset_animation(
        &mut self,
        id: AnimationId,
        card: CardId,
        transition: &CardTransition,
    ) {
        let CardTransition::Reset { from, overlay_from } = *transition else {
            return;
        };
        let mut tracks = SmallVec::new();
        tracks.push(Track {
            target: AnimationTarget::Card(card),
            from: Keyframe::transform(from),
            to: Keyframe::transform(Affine::IDENTITY),
            curve: CARD_RESET_SPRING,
        });
        tracks.push(Track {
            target: AnimationTarget::Overlay(card),
            from: Keyframe::alpha(overlay_from),
            to: Keyframe::alpha(0.0),
            curve: Curve::EaseInOut,
        });
        self.play(Animation {
            id,
            tracks,
            duration: CARD_RESET_DURATION,
            delay: Duration::ZERO,
        });
    }
}

fn single(id: AnimationId, track: Track, duration: Duration, delay: Duration) -> Animation {
    let mut tracks = SmallVec::new();
    tracks.push(track);
    Animation {
        id,
        tracks,
        duration,
        delay,
    }
}

/// Recording animator.
///
/// Animations queue up in scheduling order. A host pops them, presents them,
/// and reports each completion back to the deck. Cancelled animations that
/// lose all their tracks move to an interrupted list, which the host must
/// also report (with `finished = false`).
///
/// ```
/// use core::time::Duration;
/// use understory_swipe_deck::animator::{AnimationId, AnimationQueue, AnimationTarget, Animator};
/// use understory_swipe_deck::card::CardId;
///
/// let mut queue = AnimationQueue::new();
/// queue.apply_alpha_animation(AnimationId::new(1), CardId::new(4), 0.7, 1.0);
/// queue.cancel(AnimationTarget::Card(CardId::new(4)));
///
/// assert!(queue.is_empty());
/// assert_eq!(queue.take_interrupted(), [AnimationId::new(1)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AnimationQueue {
    running: VecDeque<Animation>,
    interrupted: Vec<AnimationId>,
}

impl AnimationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the oldest running animation.
    pub fn pop(&mut self) -> Option<Animation> {
        self.running.pop_front()
    }

    /// Takes the ids of animations emptied by [`cancel`](Animator::cancel).
    pub fn take_interrupted(&mut self) -> Vec<AnimationId> {
        core::mem::take(&mut self.interrupted)
    }

    /// Number of running animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Returns `true` if nothing is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Iterates running animations, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Animation> + '_ {
        self.running.iter()
    }

    /// Running tracks that move `target`.
    pub fn tracks_for(&self, target: AnimationTarget) -> impl Iterator<Item = &Track> + '_ {
        self.running
            .iter()
            .flat_map(|animation| animation.tracks.iter())
            .filter(move |track| track.target == target)
    }
}

impl Animator for AnimationQueue {
    fn play(&mut self, animation: Animation) {
        tracing::trace!(id = %animation.id, tracks = animation.tracks.len(), "play");
        self.running.push_back(animation);
    }

    fn cancel(&mut self, target: AnimationTarget) {
        let interrupted = &mut self.interrupted;
        self.running.retain_mut(|animation| {
            let before = animation.tracks.len();
            animation.tracks.retain(|track| track.target != target);
            if before > 0 && animation.tracks.is_empty() {
                interrupted.push(animation.id);
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: CardId = CardId::new(1);
    const OTHER: CardId = CardId::new(2);

    #[test]
    fn reverse_without_direction_is_a_slow_fade() {
        let mut queue = AnimationQueue::new();
        queue.apply_reverse_animation(AnimationId::new(1), CARD, None, 1.0, Duration::from_millis(400));
        let animation = queue.pop().unwrap();
        assert_eq!(animation.duration, REVERT_FADE_DURATION);
        assert_eq!(animation.tracks.len(), 1);
        assert_eq!(animation.tracks[0].to, Keyframe::alpha(1.0));
    }

    #[test]
    fn directional_reverse_uses_swipe_duration() {
        let mut queue = AnimationQueue::new();
        let off = Affine::translate((-500.0, 150.0));
        queue.apply_reverse_animation(AnimationId::new(1), CARD, Some(off), 1.0, Duration::from_millis(400));
        let animation = queue.pop().unwrap();
        assert_eq!(animation.duration, Duration::from_millis(400));
        assert_eq!(animation.tracks[1].from, Keyframe::transform(off));
        assert_eq!(animation.tracks[1].to, Keyframe::transform(Affine::IDENTITY));
    }

    #[test]
    fn card_reset_uses_spring() {
        let mut queue = AnimationQueue::new();
        let transition = CardTransition::Reset {
            from: Affine::translate((30.0, 0.0)),
            overlay_from: 0.4,
        };
        queue.apply_card_reset_animation(AnimationId::new(3), CARD, &transition);
        let animation = queue.pop().unwrap();
        assert_eq!(animation.duration, CARD_RESET_DURATION);
        assert_eq!(animation.tracks[0].curve, CARD_RESET_SPRING);
        assert_eq!(animation.tracks[1].target, AnimationTarget::Overlay(CARD));
    }

    #[test]
    fn swipe_animation_ignores_reset_transitions() {
        let mut queue = AnimationQueue::new();
        let transition = CardTransition::Reset {
            from: Affine::IDENTITY,
            overlay_from: 0.0,
        };
        queue.apply_swipe_animation(AnimationId::new(1), CARD, &transition);
        assert!(queue.is_empty());
    }

    #[test]
    fn cancel_strips_tracks_and_reports_emptied_animations() {
        let mut queue = AnimationQueue::new();
        queue.apply_removal_animation(AnimationId::new(1), &[(CARD, 0.7), (OTHER, 0.7)]);
        queue.apply_alpha_animation(AnimationId::new(2), CARD, 0.7, 1.0);

        queue.cancel(AnimationTarget::Card(CARD));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.take_interrupted(), [AnimationId::new(2)]);
        let survivor = queue.pop().unwrap();
        assert_eq!(survivor.id, AnimationId::new(1));
        assert_eq!(survivor.tracks.len(), 1);
        assert_eq!(survivor.tracks[0].target, AnimationTarget::Card(OTHER));
        assert!(queue.take_interrupted().is_empty(), "interrupted list drains");
    }

    #[test]
    fn tracks_for_filters_by_target() {
        let mut queue = AnimationQueue::new();
        queue.apply_insertion_animation(AnimationId::new(1), &[(CARD, 1.0), (OTHER, 0.7)]);
        let tracks: Vec<_> = queue.tracks_for(AnimationTarget::Card(OTHER)).collect();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].to, Keyframe::alpha(0.7));
    }
}
