//! Transition animator interface and a timed slide implementation.
//!
//! The visibility tracker only triggers slides and polls for completion;
//! progress is driven by the animator's own per-frame tick.

use ahash::AHashMap;
use glam::{Mat4, Vec3};
use tessera_common::ChunkId;

use crate::batch::Pass;

/// Vertical distance a cell slides when entering or leaving the window.
pub const SLIDE_DEPTH: f32 = 100.0;

/// Duration of an enter or exit slide in seconds.
pub const SLIDE_DURATION: f32 = 1.5;

/// One animatable sub-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationTarget {
    /// Owning cell
    pub chunk: ChunkId,
    /// Land or water sub-batch
    pub pass: Pass,
}

impl AnimationTarget {
    /// Land sub-batch of a cell.
    #[must_use]
    pub const fn land(chunk: ChunkId) -> Self {
        Self {
            chunk,
            pass: Pass::Land,
        }
    }

    /// Water sub-batch of a cell.
    #[must_use]
    pub const fn water(chunk: ChunkId) -> Self {
        Self {
            chunk,
            pass: Pass::Water,
        }
    }
}

/// Time-driven placement animations for sub-batches.
pub trait TransitionAnimator {
    /// Resets the placement of a target to identity.
    fn reset_transform(&mut self, target: AnimationTarget);

    /// Moves a target immediately by `offset`.
    fn displace(&mut self, target: AnimationTarget, offset: Vec3);

    /// Starts a translation by `offset` over `duration` seconds.
    ///
    /// Registering on a target with an animation in flight replaces it,
    /// starting from the target's current placement.
    fn animate_translate(&mut self, target: AnimationTarget, offset: Vec3, duration: f32);

    /// Whether the target still has an animation in flight.
    fn has_animation(&self, target: AnimationTarget) -> bool;

    /// Drops any animation on the target, leaving its placement where it is.
    fn remove_animation(&mut self, target: AnimationTarget);

    /// Current placement of the target.
    fn transform(&self, target: AnimationTarget) -> Mat4;
}

/// Easing curve for slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideEasing {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Ease out (slow end).
    EaseOut,
    /// Smooth step (Hermite interpolation).
    SmoothStep,
}

impl SlideEasing {
    /// Applies the easing function to a normalized time value.
    #[must_use]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slide {
    from: Vec3,
    to: Vec3,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    translation: Vec3,
    slide: Option<Slide>,
}

/// Animator that slides targets linearly (or eased) over fixed durations.
#[derive(Debug, Default)]
pub struct SlideAnimator {
    placements: AHashMap<AnimationTarget, Placement>,
    easing: SlideEasing,
}

impl SlideAnimator {
    /// Creates an animator with linear slides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an animator with the given easing.
    #[must_use]
    pub fn with_easing(easing: SlideEasing) -> Self {
        Self {
            placements: AHashMap::new(),
            easing,
        }
    }

    /// Advances every slide by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let easing = self.easing;
        for placement in self.placements.values_mut() {
            let Some(slide) = placement.slide.as_mut() else {
                continue;
            };
            slide.elapsed += dt;
            let progress = if slide.duration > 0.0 {
                slide.elapsed / slide.duration
            } else {
                1.0
            };
            placement.translation = slide.from.lerp(slide.to, easing.apply(progress));
            if progress >= 1.0 {
                placement.translation = slide.to;
                placement.slide = None;
            }
        }
    }

    /// Number of slides in flight.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.placements.values().filter(|p| p.slide.is_some()).count()
    }

    /// Current translation of a target.
    #[must_use]
    pub fn translation(&self, target: AnimationTarget) -> Vec3 {
        self.placements
            .get(&target)
            .map_or(Vec3::ZERO, |p| p.translation)
    }
}

impl TransitionAnimator for SlideAnimator {
    fn reset_transform(&mut self, target: AnimationTarget) {
        let placement = self.placements.entry(target).or_default();
        placement.translation = Vec3::ZERO;
        placement.slide = None;
    }

    fn displace(&mut self, target: AnimationTarget, offset: Vec3) {
        self.placements.entry(target).or_default().translation += offset;
    }

    fn animate_translate(&mut self, target: AnimationTarget, offset: Vec3, duration: f32) {
        let placement = self.placements.entry(target).or_default();
        let from = placement.translation;
        if duration <= 0.0 {
            placement.translation = from + offset;
            placement.slide = None;
            return;
        }
        placement.slide = Some(Slide {
            from,
            to: from + offset,
            elapsed: 0.0,
            duration,
        });
    }

    fn has_animation(&self, target: AnimationTarget) -> bool {
        self.placements
            .get(&target)
            .is_some_and(|p| p.slide.is_some())
    }

    fn remove_animation(&mut self, target: AnimationTarget) {
        if let Some(placement) = self.placements.get_mut(&target) {
            placement.slide = None;
        }
    }

    fn transform(&self, target: AnimationTarget) -> Mat4 {
        Mat4::from_translation(self.translation(target))
    }
}
