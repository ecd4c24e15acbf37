//! Indicator states and the settle transition.
//!
//! Changing state is not instant. The current pattern first fades out, and
//! only after a settle delay does the new state take over and draw its own
//! pattern:
//!
//! ```text
//!              set_state(b)                  now ≥ due_ms
//!   Settled ──────────────────► Settling{b} ─────────────► Settled   (state = b)
//!      ▲                          │    ▲
//!      │  set_state(state)        │    │ set_state(c), c ≠ b
//!      └──────────────────────────┘    └──── restarts with a new token
//! ```
//!
//! Each transition carries a token. A newer `set_state` replaces the pending
//! transition outright, so only the latest request ever commits.

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;

/// Default time between starting a transition and committing it.
pub const SETTLE_DELAY_MS: f64 = 500.0;

/// What the indicator is telling the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    #[default]
    Idle,
    Thinking,
    Responding,
    Error,
    Success,
    Notification,
}

impl IndicatorState {
    pub const ALL: [IndicatorState; 6] = [
        IndicatorState::Idle,
        IndicatorState::Thinking,
        IndicatorState::Responding,
        IndicatorState::Error,
        IndicatorState::Success,
        IndicatorState::Notification,
    ];

    /// Parse a state name. Unknown names fall back to [`IndicatorState::Idle`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "thinking" => Self::Thinking,
            "responding" => Self::Responding,
            "error" => Self::Error,
            "success" => Self::Success,
            "notification" => Self::Notification,
            _ => Self::Idle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Thinking => "thinking",
            Self::Responding => "responding",
            Self::Error => "error",
            Self::Success => "success",
            Self::Notification => "notification",
        }
    }

    /// The pattern drawn when this state commits.
    pub fn pattern(self) -> Pattern {
        match self {
            Self::Idle => Pattern::Idle,
            Self::Thinking => Pattern::Thinking,
            Self::Responding => Pattern::Smiley,
            Self::Error => Pattern::Error,
            Self::Success => Pattern::Success,
            Self::Notification => Pattern::Notification,
        }
    }
}

impl std::fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an indicator is in its state change.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transition {
    /// No change pending.
    #[default]
    Settled,
    /// Fading out; `target` commits once the clock reaches `due_ms`.
    Settling {
        target: IndicatorState,
        token: u64,
        due_ms: f64,
    },
}

impl Transition {
    pub fn is_settling(&self) -> bool {
        matches!(self, Self::Settling { .. })
    }

    pub fn target(&self) -> Option<IndicatorState> {
        match self {
            Self::Settling { target, .. } => Some(*target),
            Self::Settled => None,
        }
    }

    /// The pending target if the transition is due at `now_ms`.
    pub fn due(&self, now_ms: f64) -> Option<IndicatorState> {
        match *self {
            Self::Settling { target, due_ms, .. } if now_ms >= due_ms => Some(target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_round_trip() {
        for state in IndicatorState::ALL {
            assert_eq!(IndicatorState::from_name(state.name()), state);
        }
        assert_eq!(IndicatorState::from_name("sleeping"), IndicatorState::Idle);
        assert_eq!(IndicatorState::from_name(" Thinking"), IndicatorState::Thinking);
    }

    #[test]
    fn responding_shows_a_smiley() {
        assert_eq!(IndicatorState::Responding.pattern(), Pattern::Smiley);
        assert_eq!(IndicatorState::Idle.pattern(), Pattern::Idle);
        assert_eq!(IndicatorState::Error.pattern(), Pattern::Error);
    }

    #[test]
    fn settling_is_due_at_deadline() {
        let t = Transition::Settling {
            target: IndicatorState::Success,
            token: 1,
            due_ms: 500.0,
        };
        assert!(t.is_settling());
        assert_eq!(t.target(), Some(IndicatorState::Success));
        assert_eq!(t.due(499.9), None);
        assert_eq!(t.due(500.0), Some(IndicatorState::Success));
        assert_eq!(Transition::Settled.due(1e9), None);
    }
}
