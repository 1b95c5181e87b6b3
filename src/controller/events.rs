//! Change notifications emitted by [`TrackedControls`](super::TrackedControls).
//!
//! Payloads borrow the state machine's internal buffers, which are reused
//! from tick to tick. A consumer that wants to keep an event past the
//! callback copies it with [`ControllerEvent::to_owned_event`].

use crate::controller::input::ButtonState;

// Button event payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonEventDetail<'a> {
    pub id: usize,
    pub state: &'a ButtonState,
}

// Axis event payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisMoveDetail<'a> {
    pub axis: &'a [f32],
    /// Parallel to `axis`: which components moved this tick.
    pub changed: &'a [bool],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerEvent<'a> {
    AxisMove(AxisMoveDetail<'a>),
    ButtonChanged(ButtonEventDetail<'a>),
    ButtonDown(ButtonEventDetail<'a>),
    ButtonUp(ButtonEventDetail<'a>),
    TouchStart(ButtonEventDetail<'a>),
    TouchEnd(ButtonEventDetail<'a>),
}

impl ControllerEvent<'_> {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AxisMove(_) => "axismove",
            Self::ButtonChanged(_) => "buttonchanged",
            Self::ButtonDown(_) => "buttondown",
            Self::ButtonUp(_) => "buttonup",
            Self::TouchStart(_) => "touchstart",
            Self::TouchEnd(_) => "touchend",
        }
    }

    pub fn button(&self) -> Option<&ButtonEventDetail<'_>> {
        match self {
            Self::AxisMove(_) => None,
            Self::ButtonChanged(detail)
            | Self::ButtonDown(detail)
            | Self::ButtonUp(detail)
            | Self::TouchStart(detail)
            | Self::TouchEnd(detail) => Some(detail),
        }
    }

    /// Copies the payload out of the shared buffers.
    pub fn to_owned_event(&self) -> OwnedControllerEvent {
        match self {
            Self::AxisMove(detail) => OwnedControllerEvent::AxisMove {
                axis: detail.axis.to_vec(),
                changed: detail.changed.to_vec(),
            },
            _ => {
                let (id, state) = self
                    .button()
                    .map(|detail| (detail.id, *detail.state))
                    .unwrap_or_default();
                OwnedControllerEvent::Button {
                    name: self.name(),
                    id,
                    state,
                }
            }
        }
    }
}

/// A [`ControllerEvent`] that owns its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum OwnedControllerEvent {
    AxisMove { axis: Vec<f32>, changed: Vec<bool> },
    Button {
        name: &'static str,
        id: usize,
        state: ButtonState,
    },
}

impl OwnedControllerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AxisMove { .. } => "axismove",
            Self::Button { name, .. } => *name,
        }
    }
}
