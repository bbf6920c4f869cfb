use crate::{ConflictId, TrafficLightId, VehicleId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A perceptual focus competing for the driver's attention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    Front,
    Rear,
    Left,
    Right,
    InVehicle,
    /// The approach towards a group of conflicts, keyed by its nearest conflict.
    Conflict(ConflictId),
}

/// An object the driver perceives through one of the channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PerceivedObject {
    Vehicle(VehicleId),
    Conflict(ConflictId),
    TrafficLight(TrafficLightId),
}
