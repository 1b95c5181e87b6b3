use gilrs::{Axis, Button, Event, Gamepad, Gilrs};
use tracing::{debug, error, info};

use crate::controller::input::{ButtonState, GamepadSnapshot, InputSource, SourceHandle};

/// Profile shared by every gamepad with the standard layout.
pub const STANDARD_PROFILE: &str = "standard-gamepad";

// Buttons in standard gamepad order
const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

// Axes in standard gamepad order, Y pointing down
const STANDARD_AXES: [(Axis, f32); 4] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
];

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Joystick deadzone {0} is outside [0, 1)")]
    InvalidDeadzone(f32),
}

/// Connected gamepads, read as input sources once per tick.
pub struct GamepadSources {
    gilrs: Gilrs,
    deadzone: f32,
}

impl GamepadSources {
    pub fn new(deadzone: f32) -> Result<Self, SourceError> {
        let deadzone = check_deadzone(deadzone)?;
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SourceError::Initialization(e.to_string()));
            }
        };

        for (id, gamepad) in gilrs.gamepads() {
            info!("  ID: {}, Name: {}, UUID: {:?}", id, gamepad.name(), gamepad.uuid());
        }
        Ok(Self { gilrs, deadzone })
    }

    /// Drains pending gilrs events and snapshots every connected gamepad.
    pub fn poll(&mut self) -> Vec<InputSource> {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            debug!("Processing gilrs event from {}: {:?}", id, event);
        }

        self.gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, gamepad)| {
                InputSource::gamepad(
                    SourceHandle(usize::from(id)),
                    profiles(gamepad.name()),
                    self.snapshot(&gamepad),
                )
            })
            .collect()
    }

    fn snapshot(&self, gamepad: &Gamepad<'_>) -> GamepadSnapshot {
        let buttons = STANDARD_BUTTONS
            .iter()
            .map(|&button| {
                let pressed = gamepad.is_pressed(button);
                let value = gamepad
                    .button_data(button)
                    .map_or(if pressed { 1.0 } else { 0.0 }, |data| data.value());
                // No touch sensors on gamepads: any travel counts as touch
                ButtonState::new(pressed, pressed || value > 0.0, value)
            })
            .collect();
        let axes = STANDARD_AXES
            .iter()
            .map(|&(axis, sign)| sign * apply_deadzone(gamepad.value(axis), self.deadzone))
            .collect();
        GamepadSnapshot { buttons, axes }
    }
}

/// Profile list for a device: its name as a lowercase slug, then the
/// standard profile.
fn profiles(name: &str) -> Vec<String> {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        vec![STANDARD_PROFILE.to_string()]
    } else {
        vec![slug, STANDARD_PROFILE.to_string()]
    }
}

fn check_deadzone(deadzone: f32) -> Result<f32, SourceError> {
    if (0.0..1.0).contains(&deadzone) {
        Ok(deadzone)
    } else {
        Err(SourceError::InvalidDeadzone(deadzone))
    }
}

// Zero inside the deadzone, rescaled to the full range outside it
fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}
