//! Environment step and the transition handed to agents.
use super::Env;

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`.
///
/// An environment emits a [`Step`] object at every interaction step.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// The environment reached a terminal state.
    pub is_terminated: bool,

    /// The environment ended the episode because of its own step limit.
    pub is_truncated: bool,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }

    /// A step reporting both a terminal state and a step-limit truncation.
    #[inline]
    pub fn is_contradictory(&self) -> bool {
        self.is_terminated && self.is_truncated
    }
}

/// A transition `(o_t, a_t, r_t, o_t+1)` passed to [`Agent::update`].
///
/// Exactly one of the following holds: the episode continues, it reached a
/// natural terminal (`is_terminated`), or it was cut without reaching one
/// (`is_truncated`).
///
/// [`Agent::update`]: crate::Agent::update
pub struct Transition<E: Env> {
    /// Observation before the action.
    pub obs: E::Obs,

    /// Action.
    pub act: E::Act,

    /// Reward.
    pub reward: f32,

    /// Observation after the action.
    pub next_obs: E::Obs,

    /// The episode ended in a terminal state.
    pub is_terminated: bool,

    /// The episode was cut by a step limit or the timestep budget.
    pub is_truncated: bool,
}

impl<E: Env> Transition<E> {
    /// Multiplier of the bootstrapped value of `next_obs`.
    ///
    /// `0.0` at a terminal state, `1.0` otherwise, including truncation.
    pub fn bootstrap_mask(&self) -> f32 {
        if self.is_terminated {
            0.0
        } else {
            1.0
        }
    }

    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
