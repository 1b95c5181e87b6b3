//! Selection of the one input source a component binds to.

use crate::controller::input::{Handedness, InputSource};

/// What a component asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchCriteria<'a> {
    /// Profile identifier, matched as a prefix. Empty matches any profile.
    pub id: &'a str,
    /// Required handedness; `None` means any hand.
    pub hand: Option<Handedness>,
    /// Position among matching sources, used only when `hand` is unset.
    /// Negative values mean "first".
    pub index: i32,
    /// Test every declared profile, not just the primary one.
    pub iterate_profiles: bool,
    /// Match hand-tracking sources instead of gamepads.
    pub hand_tracking: bool,
}

/// Picks at most one source for the given criteria.
pub trait ControllerMatcher {
    fn find_match<'s>(
        &self,
        sources: &'s [InputSource],
        criteria: &MatchCriteria<'_>,
    ) -> Option<&'s InputSource>;
}

/// Default matcher: profile prefix, then handedness or position.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileMatcher;

impl ControllerMatcher for ProfileMatcher {
    fn find_match<'s>(
        &self,
        sources: &'s [InputSource],
        criteria: &MatchCriteria<'_>,
    ) -> Option<&'s InputSource> {
        let mut candidates = sources
            .iter()
            .filter(|source| source.hand_tracking == criteria.hand_tracking)
            .filter(|source| profile_matches(source, criteria));

        match criteria.hand {
            Some(hand) => candidates.find(|source| source.handedness == hand),
            None => candidates.nth(usize::try_from(criteria.index).unwrap_or(0)),
        }
    }
}

fn profile_matches(source: &InputSource, criteria: &MatchCriteria<'_>) -> bool {
    if criteria.iterate_profiles {
        source
            .profiles
            .iter()
            .any(|profile| profile.starts_with(criteria.id))
    } else {
        source
            .primary_profile()
            .is_some_and(|profile| profile.starts_with(criteria.id))
    }
}
