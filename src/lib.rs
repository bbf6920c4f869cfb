pub use conflict::{Conflict, ConflictAttributes, ConflictType};
pub use error::{Error, Result};
pub use light::{LightState, TrafficLight};
pub use link::{Link, LinkAttributes};
pub use network::Network;
pub use node::Node;
pub use parameters::{ParameterSet, ParameterType};
pub use perception::{LanePerception, PerceivedVehicle};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::{DistancedObject, Interval};
pub use vehicle::{Vehicle, VehicleAttributes};

mod conflict;
mod error;
mod light;
mod link;
pub mod mental;
mod network;
mod node;
mod parameters;
mod perception;
mod simulation;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Node].
    pub struct NodeId;
    /// Unique ID of a [Link].
    pub struct LinkId;
    /// Unique ID of a [Conflict].
    pub struct ConflictId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
    /// Unique ID of a [TrafficLight].
    pub struct TrafficLightId;
}

type NodeSet = SlotMap<NodeId, Node>;
type LinkSet = SlotMap<LinkId, Link>;
type ConflictSet = SlotMap<ConflictId, Conflict>;
type LightSet = SlotMap<TrafficLightId, TrafficLight>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
