use crate::LinkId;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A traffic light controlling a stop line on a link.
#[derive(Clone, Debug)]
pub struct TrafficLight {
    /// The link the stop line is on.
    link_id: LinkId,
    /// The position of the stop line, in m.
    pos: f64,
    /// The current state.
    state: LightState,
}

/// The state of a traffic light.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightState {
    Red,
    Amber,
    Green,
}

impl TrafficLight {
    /// Creates a new traffic light, initially red.
    pub(crate) fn new(link_id: LinkId, pos: f64) -> Self {
        Self {
            link_id,
            pos,
            state: LightState::Red,
        }
    }

    /// The link the stop line is on.
    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    /// The position of the stop line, in m.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The current state.
    pub fn state(&self) -> LightState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LightState) {
        self.state = state;
    }
}
