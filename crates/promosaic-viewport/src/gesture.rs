//! Pointer events and in-progress gesture state.

use promosaic_core::{InteractionMode, Path, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::ViewportMapper;

/// Pointer phase delivered by the host input feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Pointer pressed.
    Down,
    /// Pointer dragged.
    Move,
    /// Pointer released.
    Up,
}

/// One discrete pointer event in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Event phase.
    pub kind: PointerKind,
    /// View-space horizontal position.
    pub x: f32,
    /// View-space vertical position.
    pub y: f32,
}

impl PointerEvent {
    /// Creates an event.
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }

    /// Event position truncated to whole view pixels.
    pub fn point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Effect of one event on the gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureUpdate {
    /// The event did not change anything.
    Ignored,
    /// The view-space selection outline moved.
    RectPreview(Rect),
    /// The in-progress path gained a vertex.
    PathExtended,
    /// A grid drag finished; carries the image-space rect.
    CommitRect(Rect),
    /// A path stroke finished; carries the image-space path.
    CommitPath(Path),
}

#[derive(Debug, Clone, Default)]
enum GestureState {
    #[default]
    Idle,
    Dragging {
        start: Point,
        outline: Rect,
    },
    Stroking {
        path: Path,
    },
}

/// State machine turning pointer events into selections.
///
/// Grid drags clamp every point onto the image rect, so a drag leaving the
/// image still yields a rect inside it. Path strokes ignore points outside the
/// image rect.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    /// Creates an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one event.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        mode: InteractionMode,
        mapper: &ViewportMapper,
    ) -> GestureUpdate {
        match mode {
            InteractionMode::Grid => self.handle_grid(event, mapper),
            InteractionMode::Path => self.handle_path(event, mapper),
        }
    }

    /// View-space outline of the grid drag in progress.
    pub fn preview_rect(&self) -> Option<Rect> {
        match &self.state {
            GestureState::Dragging { outline, .. } => Some(*outline),
            _ => None,
        }
    }

    /// Image-space path of the stroke in progress.
    pub fn pending_path(&self) -> Option<&Path> {
        match &self.state {
            GestureState::Stroking { path } => Some(path),
            _ => None,
        }
    }

    /// Returns `true` while a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Abandons the gesture in progress.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    fn handle_grid(&mut self, event: PointerEvent, mapper: &ViewportMapper) -> GestureUpdate {
        let image_rect = mapper.image_rect();
        let point = image_rect.clamp_point(event.point());

        if let GestureState::Dragging { start, outline } = &mut self.state {
            let current = Rect::from_corners(*start, point);
            if event.kind == PointerKind::Up {
                self.state = GestureState::Idle;
                return GestureUpdate::CommitRect(mapper.view_rect_to_image(current));
            }
            *outline = current;
            return GestureUpdate::RectPreview(current);
        }

        if event.kind == PointerKind::Up {
            return GestureUpdate::Ignored;
        }

        let outline = Rect::from_corners(point, point);
        self.state = GestureState::Dragging {
            start: point,
            outline,
        };
        GestureUpdate::RectPreview(outline)
    }

    fn handle_path(&mut self, event: PointerEvent, mapper: &ViewportMapper) -> GestureUpdate {
        if event.kind == PointerKind::Up {
            return match std::mem::take(&mut self.state) {
                GestureState::Stroking { mut path } => {
                    // Release point closes the stroke when it lands inside.
                    if let Some(point) = mapper.view_to_image(event.point()) {
                        if path.points().last() != Some(&point) {
                            path.line_to(point);
                        }
                    }
                    GestureUpdate::CommitPath(path)
                }
                _ => GestureUpdate::Ignored,
            };
        }

        let Some(point) = mapper.view_to_image(event.point()) else {
            return GestureUpdate::Ignored;
        };

        if event.kind == PointerKind::Move {
            if let GestureState::Stroking { path } = &mut self.state {
                path.line_to(point);
                return GestureUpdate::PathExtended;
            }
        }

        self.state = GestureState::Stroking {
            path: Path::starting_at(point),
        };
        GestureUpdate::PathExtended
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for gesture state transitions.

    use super::*;

    fn mapper() -> ViewportMapper {
        // Image rect (0,50)-(400,250) at ratio 0.5.
        ViewportMapper::fit(400, 300, 800, 400, 0).expect("image should fit")
    }

    fn event(kind: PointerKind, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(kind, x, y)
    }

    #[test]
    fn grid_drag_commits_image_space_rect() {
        let mut tracker = GestureTracker::new();
        let mapper = mapper();

        tracker.handle(event(PointerKind::Down, 10.0, 60.0), InteractionMode::Grid, &mapper);
        let update = tracker.handle(event(PointerKind::Move, 50.0, 100.0), InteractionMode::Grid, &mapper);
        assert_eq!(update, GestureUpdate::RectPreview(Rect::new(10, 60, 50, 100)));
        assert_eq!(tracker.preview_rect(), Some(Rect::new(10, 60, 50, 100)));

        let update = tracker.handle(event(PointerKind::Up, 50.0, 100.0), InteractionMode::Grid, &mapper);
        assert_eq!(update, GestureUpdate::CommitRect(Rect::new(20, 20, 100, 100)));
        assert!(!tracker.is_active());
    }

    #[test]
    fn path_points_outside_image_are_dropped() {
        let mut tracker = GestureTracker::new();
        let mapper = mapper();

        tracker.handle(event(PointerKind::Down, 10.0, 60.0), InteractionMode::Path, &mapper);
        let outside = tracker.handle(event(PointerKind::Move, 10.0, 10.0), InteractionMode::Path, &mapper);
        assert_eq!(outside, GestureUpdate::Ignored);
        tracker.handle(event(PointerKind::Move, 20.0, 70.0), InteractionMode::Path, &mapper);

        let update = tracker.handle(event(PointerKind::Up, 0.0, 0.0), InteractionMode::Path, &mapper);
        assert_eq!(
            update,
            GestureUpdate::CommitPath(Path::from_points(vec![Point::new(20, 20), Point::new(40, 40)]))
        );
    }

    #[test]
    fn path_release_inside_image_closes_the_stroke() {
        let mut tracker = GestureTracker::new();
        let mapper = mapper();

        tracker.handle(event(PointerKind::Down, 10.0, 60.0), InteractionMode::Path, &mapper);
        let update = tracker.handle(event(PointerKind::Up, 30.0, 80.0), InteractionMode::Path, &mapper);
        assert_eq!(
            update,
            GestureUpdate::CommitPath(Path::from_points(vec![Point::new(20, 20), Point::new(60, 60)]))
        );
    }

    #[test]
    fn path_move_without_down_starts_a_stroke() {
        let mut tracker = GestureTracker::new();
        let mapper = mapper();

        tracker.handle(event(PointerKind::Down, 5.0, 5.0), InteractionMode::Path, &mapper);
        assert!(tracker.pending_path().is_none());

        tracker.handle(event(PointerKind::Move, 100.0, 100.0), InteractionMode::Path, &mapper);
        assert_eq!(tracker.pending_path().map(Path::len), Some(1));
    }

    #[test]
    fn release_without_gesture_is_ignored() {
        let mut tracker = GestureTracker::new();
        let mapper = mapper();
        for mode in [InteractionMode::Grid, InteractionMode::Path] {
            let update = tracker.handle(event(PointerKind::Up, 10.0, 60.0), mode, &mapper);
            assert_eq!(update, GestureUpdate::Ignored);
        }
    }
}
