use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::controller::pose::Pose;

// Button state, both as read from a device and as remembered between ticks
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ButtonState {
    pub pressed: bool,
    pub touched: bool,
    /// Analog value in `[0, 1]`.
    pub value: f32,
}

impl ButtonState {
    pub fn new(pressed: bool, touched: bool, value: f32) -> Self {
        Self {
            pressed,
            touched,
            value,
        }
    }
}

// Which hand a source is held in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown handedness: {0}")]
pub struct HandednessParseError(String);

impl FromStr for Handedness {
    type Err = HandednessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(HandednessParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Host-assigned identity of an input source, stable while it stays connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceHandle(pub usize);

// Button and axis readings of one tick
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub buttons: Vec<ButtonState>,
    pub axes: Vec<f32>,
}

/// One visible input source, as reported by the host for the current tick.
///
/// Sources are consumed, never owned: the host rebuilds the list every tick
/// and the state machine re-resolves its binding against it.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSource {
    pub handle: SourceHandle,
    /// Profile identifiers, most specific first.
    pub profiles: Vec<String>,
    pub handedness: Handedness,
    /// Hand-tracking source rather than a handheld gamepad.
    pub hand_tracking: bool,
    pub gamepad: Option<GamepadSnapshot>,
    pub pose: Option<Pose>,
}

impl InputSource {
    /// A handheld source with buttons and axes.
    pub fn gamepad(handle: SourceHandle, profiles: Vec<String>, snapshot: GamepadSnapshot) -> Self {
        Self {
            handle,
            profiles,
            handedness: Handedness::None,
            hand_tracking: false,
            gamepad: Some(snapshot),
            pose: None,
        }
    }

    /// A tracked hand. Carries no gamepad.
    pub fn hand(handle: SourceHandle, profiles: Vec<String>, handedness: Handedness) -> Self {
        Self {
            handle,
            profiles,
            handedness,
            hand_tracking: true,
            gamepad: None,
            pose: None,
        }
    }

    #[must_use]
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    #[must_use]
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn primary_profile(&self) -> Option<&str> {
        self.profiles.first().map(String::as_str)
    }
}

/// Per-tick rendering context. Absent when no frame is being rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub has_reference_space: bool,
}

impl Frame {
    pub fn new(has_reference_space: bool) -> Self {
        Self {
            has_reference_space,
        }
    }
}
