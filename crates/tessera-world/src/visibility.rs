//! Camera-centred visibility window tracking.
//!
//! The tracker keeps the set of batches eligible for drawing equal to the
//! `(2r+1)²` window of cells around the camera's cell. Work is proportional to
//! the window, not the world: when the camera stays inside its previous cell
//! the update returns immediately, and otherwise only the difference between
//! the old and new windows is touched.
//!
//! ## Exit latching
//!
//! A cell leaving the window is not dropped at once. It moves to the pending
//! removal list and keeps being drawn while its exit slide plays; it is
//! removed from the active set only once the animator reports the slide
//! finished. Completion is polled, not signalled, so removal can lag by up to
//! one slide duration.

use ahash::AHashSet;
use glam::Vec3;
use tessera_common::{CellCoord, ChunkId};
use tracing::{debug, trace};

use crate::animator::{AnimationTarget, TransitionAnimator, SLIDE_DEPTH, SLIDE_DURATION};
use crate::grid::ChunkGrid;

/// Outcome of one visibility update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityUpdate {
    /// Camera is still inside its previous cell; nothing was recomputed.
    Unchanged,
    /// Camera is outside the field; the previous state was kept.
    OutsideField,
    /// The window moved.
    Moved {
        /// Cell now containing the camera
        center: ChunkId,
        /// Cells that entered the window, in window order
        entered: Vec<ChunkId>,
        /// Cells that left the window
        exited: Vec<ChunkId>,
        /// Pending removals whose exit slide finished this update
        reaped: Vec<ChunkId>,
    },
}

/// Tracks which cells are in the camera window and which are drawable.
#[derive(Debug)]
pub struct VisibilityTracker {
    radius: u32,
    previous_chunk: Option<ChunkId>,
    window: Vec<CellCoord>,
    current_ids: AHashSet<ChunkId>,
    previous_ids: Option<AHashSet<ChunkId>>,
    active: Vec<ChunkId>,
    pending_removal: Vec<ChunkId>,
}

impl VisibilityTracker {
    /// Creates a tracker for a window of `radius` cells around the camera.
    #[must_use]
    pub fn new(radius: u32) -> Self {
        let side = (2 * radius + 1) as usize;
        Self {
            radius,
            previous_chunk: None,
            window: Vec::with_capacity(side * side),
            current_ids: AHashSet::with_capacity(side * side),
            previous_ids: None,
            active: Vec::with_capacity(side * side),
            pending_removal: Vec::new(),
        }
    }

    /// Window radius in cells.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Number of window slots, `(2r+1)²`, including out-of-grid slots.
    #[must_use]
    pub const fn window_capacity(&self) -> usize {
        let side = (2 * self.radius + 1) as usize;
        side * side
    }

    /// Cell the camera occupied at the last window change.
    #[must_use]
    pub const fn current_chunk(&self) -> Option<ChunkId> {
        self.previous_chunk
    }

    /// Window coordinates from the last change, including out-of-grid slots.
    #[must_use]
    pub fn window(&self) -> &[CellCoord] {
        &self.window
    }

    /// In-grid cells of the current window.
    #[must_use]
    pub fn window_ids(&self) -> &AHashSet<ChunkId> {
        &self.current_ids
    }

    /// Batches eligible for drawing, in admission order.
    ///
    /// Includes cells still sliding out of view.
    #[must_use]
    pub fn active(&self) -> &[ChunkId] {
        &self.active
    }

    /// Cells sliding out of view, awaiting removal.
    #[must_use]
    pub fn pending_removal(&self) -> &[ChunkId] {
        &self.pending_removal
    }

    /// Checks whether a cell is drawable.
    #[must_use]
    pub fn is_active(&self, id: ChunkId) -> bool {
        self.active.contains(&id)
    }

    /// Brings the window in line with the camera position.
    ///
    /// With `animate` set, entering cells rise from below and exiting cells
    /// sink away; otherwise cells appear and disappear at once.
    pub fn update(
        &mut self,
        grid: &ChunkGrid,
        camera: Vec3,
        animate: bool,
        animator: &mut dyn TransitionAnimator,
    ) -> VisibilityUpdate {
        if let Some(info) = self.previous_chunk.and_then(|id| grid.info(id)) {
            if info.contains_xz(camera.x, camera.z) {
                trace!("Camera still in {}", info.id);
                return VisibilityUpdate::Unchanged;
            }
        }

        let mut reaped = self.reap(grid, animator);

        let Some(center) = grid.locate(camera.x, camera.z) else {
            trace!(
                "Camera at ({:.1}, {:.1}) outside field, keeping window",
                camera.x,
                camera.z
            );
            return VisibilityUpdate::OutsideField;
        };

        let shape = grid.shape();
        let center_coord = shape.coord_of(center);
        let r = self.radius as i32;
        self.window.clear();
        self.current_ids.clear();
        for d_column in -r..=r {
            for d_row in -r..=r {
                let coord = center_coord.offset(d_column, d_row);
                self.window.push(coord);
                if let Some(id) = shape.id_of(coord) {
                    self.current_ids.insert(id);
                }
            }
        }

        let mut entered = Vec::new();
        for coord in &self.window {
            let Some(id) = shape.id_of(*coord) else {
                continue;
            };
            match &self.previous_ids {
                None => {
                    if !self.active.contains(&id) {
                        self.active.push(id);
                    }
                    settle(grid, id, animator);
                    entered.push(id);
                }
                Some(previous) if !previous.contains(&id) => {
                    if let Some(pos) = self.pending_removal.iter().position(|p| *p == id) {
                        // Still sliding out: rescind the removal and rise again.
                        self.pending_removal.swap_remove(pos);
                        for target in targets(grid, id) {
                            animator.remove_animation(target);
                            animator.reset_transform(target);
                        }
                    } else if !self.active.contains(&id) {
                        self.active.push(id);
                    }
                    if animate {
                        start_rise(grid, id, animator);
                    } else {
                        settle(grid, id, animator);
                    }
                    entered.push(id);
                }
                Some(_) => {}
            }
        }

        let mut exited = Vec::new();
        if let Some(previous) = &self.previous_ids {
            let mut leaving: Vec<ChunkId> = previous
                .iter()
                .filter(|id| !self.current_ids.contains(*id))
                .copied()
                .collect();
            leaving.sort_unstable();
            for id in leaving {
                if !self.pending_removal.contains(&id) {
                    self.pending_removal.push(id);
                }
                if animate {
                    for target in targets(grid, id) {
                        animator.animate_translate(
                            target,
                            Vec3::new(0.0, -SLIDE_DEPTH, 0.0),
                            SLIDE_DURATION,
                        );
                    }
                }
                exited.push(id);
            }
        }

        self.previous_ids = Some(self.current_ids.clone());
        self.previous_chunk = Some(center);

        if !animate {
            reaped.extend(self.reap(grid, animator));
        }

        debug!(
            "Window moved to {}: {} entered, {} exited, {} active, {} sliding out",
            center,
            entered.len(),
            exited.len(),
            self.active.len(),
            self.pending_removal.len()
        );

        VisibilityUpdate::Moved {
            center,
            entered,
            exited,
            reaped,
        }
    }

    /// Drops pending removals whose exit slides have finished.
    fn reap(&mut self, grid: &ChunkGrid, animator: &dyn TransitionAnimator) -> Vec<ChunkId> {
        let mut reaped = Vec::new();
        self.pending_removal.retain(|&id| {
            let sliding = targets(grid, id).any(|t| animator.has_animation(t));
            if !sliding {
                reaped.push(id);
            }
            sliding
        });
        if !reaped.is_empty() {
            self.active.retain(|id| !reaped.contains(id));
        }
        reaped
    }

    /// Clears all window state, returning the cells that were active.
    pub fn clear(&mut self) -> Vec<ChunkId> {
        self.previous_chunk = None;
        self.previous_ids = None;
        self.window.clear();
        self.current_ids.clear();
        self.pending_removal.clear();
        std::mem::take(&mut self.active)
    }
}

/// Animation targets of a cell: land always, water when present.
pub(crate) fn targets(grid: &ChunkGrid, id: ChunkId) -> impl Iterator<Item = AnimationTarget> {
    let water = grid.batch(id).is_some_and(|b| b.has_water());
    std::iter::once(AnimationTarget::land(id))
        .chain(water.then(|| AnimationTarget::water(id)))
}

/// Puts a cell back at its resting placement.
fn settle(grid: &ChunkGrid, id: ChunkId, animator: &mut dyn TransitionAnimator) {
    for target in targets(grid, id) {
        animator.reset_transform(target);
    }
}

fn start_rise(grid: &ChunkGrid, id: ChunkId, animator: &mut dyn TransitionAnimator) {
    for target in targets(grid, id) {
        animator.reset_transform(target);
        animator.displace(target, Vec3::new(0.0, -SLIDE_DEPTH, 0.0));
        animator.animate_translate(target, Vec3::new(0.0, SLIDE_DEPTH, 0.0), SLIDE_DURATION);
    }
}
