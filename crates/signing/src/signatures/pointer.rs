//! Input normalization.
//!
//! Pointer and touch events both arrive in viewport coordinates. They are
//! reduced to one surface-local [`StrokePoint`] shape by [`normalize_input`]
//! and then routed onto the same three drawing commands, so the two input
//! sources never diverge in behavior.

use super::{
    aggregate::StrokePoint,
    inputs::{InputEvent, PointerInput, SurfaceRect, Touch, TouchInput},
    Command,
};

/// Anything that carries a viewport position
pub trait ViewportPosition {
    fn client_position(&self) -> (f32, f32);
}

impl ViewportPosition for PointerInput {
    fn client_position(&self) -> (f32, f32) {
        (self.client_x, self.client_y)
    }
}

impl ViewportPosition for Touch {
    fn client_position(&self) -> (f32, f32) {
        (self.client_x, self.client_y)
    }
}

/// Translate a viewport sample into surface-local coordinates.
pub fn normalize_input<P: ViewportPosition>(sample: &P, rect: &SurfaceRect) -> StrokePoint {
    let (client_x, client_y) = sample.client_position();
    StrokePoint::new(client_x - rect.left, client_y - rect.top)
}

/// Result of routing one raw event
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Routed {
    pub command: Option<Command>,
    /// The host must cancel the default scroll/zoom handling for this event
    pub prevent_default: bool,
}

impl Routed {
    fn ignored() -> Self {
        Self::default()
    }

    fn command(command: Command) -> Self {
        Self {
            command: Some(command),
            prevent_default: false,
        }
    }

    fn touch(command: Option<Command>) -> Self {
        Self {
            command,
            prevent_default: true,
        }
    }
}

/// Maps raw pointer and touch events to drawing commands.
///
/// Only one touch point drives a stroke: the first one of the touch-start
/// that began it. Other fingers are ignored until that touch lifts.
#[derive(Clone, Debug)]
pub struct InputRouter {
    rect: SurfaceRect,
    active_touch: Option<i64>,
}

impl InputRouter {
    pub fn new(rect: SurfaceRect) -> Self {
        Self {
            rect,
            active_touch: None,
        }
    }

    /// Move the surface origin; an in-progress touch stays tracked.
    pub fn relocate(&mut self, left: f32, top: f32) {
        self.rect.left = left;
        self.rect.top = top;
    }

    pub fn active_touch(&self) -> Option<i64> {
        self.active_touch
    }

    pub fn route(&mut self, event: &InputEvent) -> Routed {
        match event {
            InputEvent::PointerDown(input) => Routed::command(Command::BeginStroke {
                point: normalize_input(input, &self.rect),
            }),

            InputEvent::PointerMove(input) => Routed::command(Command::ExtendStroke {
                point: normalize_input(input, &self.rect),
            }),

            InputEvent::PointerUp(_) => Routed::command(Command::EndStroke),

            InputEvent::TouchStart(input) => self.touch_start(input),

            InputEvent::TouchMove(input) => match self.tracked(input) {
                Some(touch) => Routed::touch(Some(Command::ExtendStroke {
                    point: normalize_input(touch, &self.rect),
                })),
                None => self.untracked(),
            },

            InputEvent::TouchEnd(input) | InputEvent::TouchCancel(input) => {
                if !self.lifts_tracked(input) {
                    return self.untracked();
                }
                self.active_touch = None;
                Routed::touch(Some(Command::EndStroke))
            }
        }
    }

    /// The tracked touch lifted: either it is listed as changed, or the event
    /// lists no changed touches and the tracked one is no longer down.
    fn lifts_tracked(&self, input: &TouchInput) -> bool {
        let Some(active) = self.active_touch else {
            return false;
        };

        self.tracked(input).is_some()
            || (input.changed_touches.is_empty() && !input.is_down(active))
    }

    fn touch_start(&mut self, input: &TouchInput) -> Routed {
        if self.active_touch.is_some() {
            tracing::debug!("Ignoring additional touch while a stroke is active");
            return Routed::touch(None);
        }

        let Some(first) = input.changed_touches.first() else {
            return Routed::ignored();
        };

        self.active_touch = Some(first.identifier);
        Routed::touch(Some(Command::BeginStroke {
            point: normalize_input(first, &self.rect),
        }))
    }

    fn tracked<'a>(&self, input: &'a TouchInput) -> Option<&'a Touch> {
        let active = self.active_touch?;
        input
            .changed_touches
            .iter()
            .find(|touch| touch.identifier == active)
    }

    // Events for other fingers still get their gesture suppressed while a
    // stroke is live, or the page would scroll under the pen.
    fn untracked(&self) -> Routed {
        if self.active_touch.is_some() {
            Routed::touch(None)
        } else {
            Routed::ignored()
        }
    }
}
