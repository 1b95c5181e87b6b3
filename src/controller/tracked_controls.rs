use tracing::{info, warn};

use crate::controller::events::{AxisMoveDetail, ButtonEventDetail, ControllerEvent};
use crate::controller::input::{
    ButtonState, Frame, GamepadSnapshot, Handedness, HandednessParseError, InputSource,
    SourceHandle,
};
use crate::controller::matcher::{ControllerMatcher, MatchCriteria, ProfileMatcher};
use crate::controller::pose::Transform;
use crate::property::{Properties, PropertyDecl};

// Tracked controls settings, the configuration surface of the component
#[derive(Clone, Debug, PartialEq)]
pub struct ControlsSettings {
    pub id: String,
    /// Position among matching sources; -1 leaves it unset.
    pub controller: i32,
    pub auto_hide: bool,
    /// `""` for any hand, otherwise `left`, `right` or `none`.
    pub hand: String,
    pub hand_tracking_enabled: bool,
    pub iterate_controller_profiles: bool,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            id: String::new(),
            controller: -1,
            auto_hide: true,
            hand: String::new(),
            hand_tracking_enabled: false,
            iterate_controller_profiles: false,
        }
    }
}

impl ControlsSettings {
    /// Property declarations backing the settings.
    pub fn schema() -> Vec<PropertyDecl> {
        vec![
            PropertyDecl::new("id", "string", ""),
            PropertyDecl::new("controller", "int", -1_i64),
            PropertyDecl::new("autoHide", "boolean", true),
            PropertyDecl::new("hand", "string", ""),
            PropertyDecl::new("handTrackingEnabled", "boolean", false),
            PropertyDecl::new("iterateControllerProfiles", "boolean", false),
        ]
    }

    /// Reads settings from parsed properties; anything missing keeps its
    /// default.
    pub fn from_properties(properties: &Properties) -> Self {
        let defaults = Self::default();
        Self {
            id: properties.get_str("id").map_or(defaults.id, str::to_string),
            controller: properties
                .get_int("controller")
                .and_then(|index| i32::try_from(index).ok())
                .unwrap_or(defaults.controller),
            auto_hide: properties.get_bool("autoHide").unwrap_or(defaults.auto_hide),
            hand: properties.get_str("hand").map_or(defaults.hand, str::to_string),
            hand_tracking_enabled: properties
                .get_bool("handTrackingEnabled")
                .unwrap_or(defaults.hand_tracking_enabled),
            iterate_controller_profiles: properties
                .get_bool("iterateControllerProfiles")
                .unwrap_or(defaults.iterate_controller_profiles),
        }
    }

    /// Requested handedness, `Ok(None)` for any hand.
    pub fn handedness(&self) -> Result<Option<Handedness>, HandednessParseError> {
        if self.hand.is_empty() {
            return Ok(None);
        }
        self.hand.parse().map(Some)
    }

    pub fn criteria(&self, hand: Option<Handedness>) -> MatchCriteria<'_> {
        MatchCriteria {
            id: &self.id,
            hand,
            index: self.controller,
            iterate_profiles: self.iterate_controller_profiles,
            hand_tracking: self.hand_tracking_enabled,
        }
    }
}

// Resolved once per settings change; an unknown hand matches any hand
fn resolve_hand(settings: &ControlsSettings) -> Option<Handedness> {
    settings.handedness().unwrap_or_else(|e| {
        warn!("{}, matching any hand", e);
        None
    })
}

/// Binds to one input source and turns its per-tick snapshots into change
/// events.
///
/// Button and axis state only ever reflects the latest snapshot; the state
/// is cleared whenever the component binds to a source, so a source that
/// reconnects (or a different one that takes its place) starts fresh.
#[derive(Debug)]
pub struct TrackedControls<M = ProfileMatcher> {
    settings: ControlsSettings,
    hand: Option<Handedness>,
    matcher: M,

    // Source bound during the last tick
    bound: Option<SourceHandle>,

    // Per button index, created on first sight
    buttons: Vec<ButtonState>,

    // Last axis reading and the per-component change flags, reused every tick
    axis: Vec<f32>,
    changed_axes: Vec<bool>,

    transform: Transform,
    visible: bool,
}

impl TrackedControls<ProfileMatcher> {
    pub fn new(settings: ControlsSettings) -> Self {
        Self::with_matcher(settings, ProfileMatcher)
    }
}

impl<M: ControllerMatcher> TrackedControls<M> {
    pub fn with_matcher(settings: ControlsSettings, matcher: M) -> Self {
        info!("Creating tracked controls with settings: {:?}", settings);
        Self {
            hand: resolve_hand(&settings),
            settings,
            matcher,
            bound: None,
            buttons: Vec::new(),
            axis: Vec::new(),
            changed_axes: Vec::new(),
            transform: Transform::default(),
            visible: true,
        }
    }

    pub fn settings(&self) -> &ControlsSettings {
        &self.settings
    }

    /// Replaces the settings. The binding is re-resolved on the next tick.
    pub fn update_settings(&mut self, settings: ControlsSettings) {
        self.hand = resolve_hand(&settings);
        self.settings = settings;
    }

    /// Handedness the matcher asks for, `None` for any hand.
    pub fn hand(&self) -> Option<Handedness> {
        self.hand
    }

    pub fn bound(&self) -> Option<SourceHandle> {
        self.bound
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn button(&self, id: usize) -> Option<&ButtonState> {
        self.buttons.get(id)
    }

    pub fn axis(&self) -> &[f32] {
        &self.axis
    }

    /// Runs one tick against the sources visible right now.
    ///
    /// Emits, per button index in ascending order, `buttondown`/`buttonup`,
    /// then `touchstart`/`touchend`, then one `buttonchanged` if anything
    /// about the button changed; finally at most one `axismove`.
    pub fn tick<F>(&mut self, sources: &[InputSource], frame: Option<&Frame>, mut emit: F)
    where
        F: FnMut(ControllerEvent<'_>),
    {
        let source = self
            .matcher
            .find_match(sources, &self.settings.criteria(self.hand));
        self.rebind(source.map(|source| source.handle));

        if self.settings.auto_hide {
            self.visible = source.is_some();
        }

        let Some(source) = source else {
            return;
        };
        let Some(frame) = frame else {
            return;
        };
        if !frame.has_reference_space || source.hand_tracking {
            return;
        }

        if let Some(pose) = &source.pose {
            self.transform = pose.decompose();
        }
        let Some(gamepad) = &source.gamepad else {
            return;
        };
        self.update_buttons(gamepad, &mut emit);
        self.update_axes(gamepad, &mut emit);
    }

    fn rebind(&mut self, handle: Option<SourceHandle>) {
        if handle == self.bound {
            return;
        }
        match (self.bound, handle) {
            (_, Some(next)) => {
                info!("Tracked controls bound to source {:?}", next);
                self.buttons.clear();
                self.axis.clear();
                self.changed_axes.clear();
            }
            (Some(previous), None) => info!("Tracked controls lost source {:?}", previous),
            (None, None) => {}
        }
        self.bound = handle;
    }

    fn update_buttons<F>(&mut self, gamepad: &GamepadSnapshot, emit: &mut F)
    where
        F: FnMut(ControllerEvent<'_>),
    {
        for (id, reading) in gamepad.buttons.iter().enumerate() {
            if self.buttons.len() <= id {
                self.buttons.resize(id + 1, ButtonState::default());
            }

            // All three run: each one emits and updates on its own.
            let pressed = self.handle_press(id, reading, emit);
            let touched = self.handle_touch(id, reading, emit);
            let value = self.handle_value(id, reading);

            if pressed || touched || value {
                emit(ControllerEvent::ButtonChanged(ButtonEventDetail {
                    id,
                    state: &self.buttons[id],
                }));
            }
        }
    }

    fn handle_press<F>(&mut self, id: usize, reading: &ButtonState, emit: &mut F) -> bool
    where
        F: FnMut(ControllerEvent<'_>),
    {
        if self.buttons[id].pressed == reading.pressed {
            return false;
        }
        let detail = ButtonEventDetail {
            id,
            state: &self.buttons[id],
        };
        emit(if reading.pressed {
            ControllerEvent::ButtonDown(detail)
        } else {
            ControllerEvent::ButtonUp(detail)
        });
        self.buttons[id].pressed = reading.pressed;
        true
    }

    fn handle_touch<F>(&mut self, id: usize, reading: &ButtonState, emit: &mut F) -> bool
    where
        F: FnMut(ControllerEvent<'_>),
    {
        if self.buttons[id].touched == reading.touched {
            return false;
        }
        let detail = ButtonEventDetail {
            id,
            state: &self.buttons[id],
        };
        emit(if reading.touched {
            ControllerEvent::TouchStart(detail)
        } else {
            ControllerEvent::TouchEnd(detail)
        });
        self.buttons[id].touched = reading.touched;
        true
    }

    fn handle_value(&mut self, id: usize, reading: &ButtonState) -> bool {
        if self.buttons[id].value == reading.value {
            return false;
        }
        self.buttons[id].value = reading.value;
        true
    }

    fn update_axes<F>(&mut self, gamepad: &GamepadSnapshot, emit: &mut F)
    where
        F: FnMut(ControllerEvent<'_>),
    {
        self.changed_axes.clear();
        let mut changed = false;
        for (i, value) in gamepad.axes.iter().enumerate() {
            let moved = self.axis.get(i).copied().unwrap_or(0.0) != *value;
            self.changed_axes.push(moved);
            changed |= moved;
        }
        if !changed {
            return;
        }

        self.axis.clear();
        self.axis.extend_from_slice(&gamepad.axes);
        emit(ControllerEvent::AxisMove(AxisMoveDetail {
            axis: &self.axis,
            changed: &self.changed_axes,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::OwnedControllerEvent;
    use crate::controller::pose::Pose;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    const FRAME: Frame = Frame {
        has_reference_space: true,
    };

    fn pad(handle: usize, buttons: Vec<ButtonState>, axes: Vec<f32>) -> InputSource {
        InputSource::gamepad(
            SourceHandle(handle),
            vec!["generic-gamepad".into()],
            GamepadSnapshot { buttons, axes },
        )
    }

    fn run(
        controls: &mut TrackedControls,
        sources: &[InputSource],
        frame: Option<&Frame>,
    ) -> Vec<OwnedControllerEvent> {
        let mut events = Vec::new();
        controls.tick(sources, frame, |event| events.push(event.to_owned_event()));
        events
    }

    fn names(events: &[OwnedControllerEvent]) -> Vec<&'static str> {
        events.iter().map(OwnedControllerEvent::name).collect()
    }

    #[test]
    fn press_touch_and_value_in_one_snapshot() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        run(&mut controls, &[pad(0, vec![ButtonState::default()], vec![])], Some(&FRAME));

        let events = run(
            &mut controls,
            &[pad(0, vec![ButtonState::new(true, true, 0.5)], vec![])],
            Some(&FRAME),
        );
        assert_eq!(names(&events), ["buttondown", "touchstart", "buttonchanged"]);
        assert_eq!(
            events.last(),
            Some(&OwnedControllerEvent::Button {
                name: "buttonchanged",
                id: 0,
                state: ButtonState::new(true, true, 0.5),
            })
        );
        assert_eq!(controls.button(0), Some(&ButtonState::new(true, true, 0.5)));
    }

    #[test]
    fn value_only_change_emits_buttonchanged() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let events = run(
            &mut controls,
            &[pad(0, vec![ButtonState::new(false, false, 0.25)], vec![])],
            Some(&FRAME),
        );
        assert_eq!(names(&events), ["buttonchanged"]);
        assert!(run(
            &mut controls,
            &[pad(0, vec![ButtonState::new(false, false, 0.25)], vec![])],
            Some(&FRAME)
        )
        .is_empty());
    }

    #[test]
    fn release_and_untouch() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let held = ButtonState::new(true, true, 1.0);
        run(&mut controls, &[pad(0, vec![held], vec![])], Some(&FRAME));
        let events = run(
            &mut controls,
            &[pad(0, vec![ButtonState::default()], vec![])],
            Some(&FRAME),
        );
        assert_eq!(names(&events), ["buttonup", "touchend", "buttonchanged"]);
    }

    #[test]
    fn buttons_are_reported_in_index_order() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let down = ButtonState::new(true, false, 1.0);
        let events = run(
            &mut controls,
            &[pad(0, vec![ButtonState::default(), down, down], vec![])],
            Some(&FRAME),
        );
        let ids: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                OwnedControllerEvent::Button { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, [1, 1, 2, 2]);
    }

    #[test]
    fn axis_changes() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        assert!(run(&mut controls, &[pad(0, vec![], vec![0.0, 0.0])], Some(&FRAME)).is_empty());
        assert!(run(&mut controls, &[pad(0, vec![], vec![0.0, 0.0])], Some(&FRAME)).is_empty());

        let events = run(&mut controls, &[pad(0, vec![], vec![0.3, 0.0])], Some(&FRAME));
        assert_eq!(
            events,
            [OwnedControllerEvent::AxisMove {
                axis: vec![0.3, 0.0],
                changed: vec![true, false],
            }]
        );
        assert_eq!(controls.axis(), [0.3, 0.0]);

        let events = run(&mut controls, &[pad(0, vec![], vec![-1.0, 1.0])], Some(&FRAME));
        assert_eq!(events.len(), 1, "one axismove however many components move");
    }

    #[test]
    fn guards_skip_processing() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let pressed = pad(0, vec![ButtonState::new(true, true, 1.0)], vec![0.5]);

        assert!(run(&mut controls, &[pressed.clone()], None).is_empty());
        let no_space = Frame::new(false);
        assert!(run(&mut controls, &[pressed.clone()], Some(&no_space)).is_empty());
        assert_eq!(controls.button(0), None);
        assert!(run(&mut controls, &[], Some(&FRAME)).is_empty());

        let hand = InputSource::hand(SourceHandle(3), vec!["generic-hand".into()], Handedness::Left);
        let mut hands = TrackedControls::new(ControlsSettings {
            hand_tracking_enabled: true,
            ..ControlsSettings::default()
        });
        assert!(run(&mut hands, &[hand], Some(&FRAME)).is_empty());
        assert_eq!(hands.bound(), Some(SourceHandle(3)));
    }

    #[test]
    fn auto_hide_follows_binding() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        run(&mut controls, &[], Some(&FRAME));
        assert!(!controls.visible());
        run(&mut controls, &[pad(0, vec![], vec![])], None);
        assert!(controls.visible());

        let mut pinned = TrackedControls::new(ControlsSettings {
            auto_hide: false,
            ..ControlsSettings::default()
        });
        run(&mut pinned, &[], Some(&FRAME));
        assert!(pinned.visible());
    }

    #[test]
    fn rebinding_resets_state() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let held = ButtonState::new(true, true, 1.0);
        run(&mut controls, &[pad(0, vec![held], vec![0.5])], Some(&FRAME));
        assert_eq!(controls.bound(), Some(SourceHandle(0)));

        run(&mut controls, &[], Some(&FRAME));
        assert_eq!(controls.bound(), None);

        let events = run(&mut controls, &[pad(7, vec![held], vec![0.5])], Some(&FRAME));
        assert_eq!(controls.bound(), Some(SourceHandle(7)));
        assert_eq!(
            names(&events),
            ["buttondown", "touchstart", "buttonchanged", "axismove"]
        );
    }

    #[test]
    fn pose_is_copied_into_transform() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let source = pad(0, vec![], vec![]).with_pose(Pose::from_translation(0.1, 1.5, -0.3));
        run(&mut controls, &[source], Some(&FRAME));
        assert_eq!(controls.transform().position, [0.1, 1.5, -0.3]);
    }

    #[test]
    fn pose_is_copied_without_gamepad() {
        let mut controls = TrackedControls::new(ControlsSettings::default());
        let source = InputSource {
            gamepad: None,
            ..pad(0, vec![], vec![])
        }
        .with_pose(Pose::from_translation(2.0, 0.0, 1.0));
        assert!(run(&mut controls, &[source], Some(&FRAME)).is_empty());
        assert_eq!(controls.transform().position, [2.0, 0.0, 1.0]);
    }

    #[derive(Clone, Default)]
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn unknown_hand_warns_once_per_settings() {
        let warnings = WarnCounter::default();
        let subscriber = tracing_subscriber::registry().with(warnings.clone());

        tracing::subscriber::with_default(subscriber, || {
            let settings = ControlsSettings {
                hand: "middle".into(),
                ..ControlsSettings::default()
            };
            assert!(settings.handedness().is_err());

            let mut controls = TrackedControls::new(settings.clone());
            let sources = [pad(0, vec![], vec![]).with_handedness(Handedness::Left)];
            for _ in 0..10 {
                run(&mut controls, &sources, Some(&FRAME));
            }
            assert_eq!(controls.hand(), None);
            assert_eq!(controls.bound(), Some(SourceHandle(0)));
            assert_eq!(warnings.0.load(Ordering::SeqCst), 1);

            controls.update_settings(settings);
            run(&mut controls, &sources, Some(&FRAME));
            assert_eq!(warnings.0.load(Ordering::SeqCst), 2);

            controls.update_settings(ControlsSettings {
                hand: "right".into(),
                ..ControlsSettings::default()
            });
            assert_eq!(controls.hand(), Some(Handedness::Right));
            run(&mut controls, &sources, Some(&FRAME));
            assert_eq!(controls.bound(), None);
            assert_eq!(warnings.0.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn settings_from_properties() {
        use crate::property::{NoResources, Schema, TypeRegistry};

        let registry = TypeRegistry::with_builtins().seal();
        let mut schema = Schema::new(&registry, ControlsSettings::schema()).unwrap();
        let props = schema.parse_attribute(
            &NoResources,
            "id: oculus-touch; hand: right; controller: 2; autoHide: false",
        );
        let settings = ControlsSettings::from_properties(&props);
        assert_eq!(settings.id, "oculus-touch");
        assert_eq!(settings.handedness(), Ok(Some(Handedness::Right)));
        assert_eq!(settings.controller, 2);
        assert!(!settings.auto_hide);
        assert!(!settings.iterate_controller_profiles);

        let defaults = ControlsSettings::from_properties(&schema.parse_attribute(&NoResources, ""));
        assert_eq!(defaults, ControlsSettings::default());
    }
}
