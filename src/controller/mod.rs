//! Controller subsystem for tracked input sources
//!
//! Binds a component to one input source and turns its snapshots into
//! change events:
//!
//! 1. [`input`] - Per-tick source snapshots supplied by the host
//! 2. [`matcher`] - Selection of the source a component binds to
//! 3. [`tracked_controls`] - Button/axis state machine and its settings
//! 4. [`gamepad_source`] - Connected gilrs gamepads as input sources
//!
//! # Architecture
//!
//! ```text
//! Gamepads ──► GamepadSources ──► [InputSource] ──► TrackedControls ──► ControllerEvent
//!                                                    (matcher, state)
//! ```

pub mod events;
pub mod gamepad_source;
pub mod input;
pub mod matcher;
pub mod pose;
pub mod tracked_controls;

pub use events::{AxisMoveDetail, ButtonEventDetail, ControllerEvent, OwnedControllerEvent};
pub use gamepad_source::{GamepadSources, SourceError};
pub use input::{
    ButtonState, Frame, GamepadSnapshot, Handedness, HandednessParseError, InputSource,
    SourceHandle,
};
pub use matcher::{ControllerMatcher, MatchCriteria, ProfileMatcher};
pub use pose::{Pose, Transform};
pub use tracked_controls::{ControlsSettings, TrackedControls};
