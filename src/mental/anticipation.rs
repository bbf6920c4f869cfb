use super::channel::{Channel, PerceivedObject};
use super::ChannelMental;
use crate::perception::{LanePerception, PerceivedVehicle};
use crate::{ConflictId, Result};

/// The surroundings as the driver believes them to be.
///
/// Every vehicle is perceived with the delay of the channel it was assigned to in
/// the last mental update, and its motion since then is anticipated at constant
/// speed. A vehicle without a channel is perceived through the channel its query
/// naturally belongs to.
pub struct DelayedPerception<'a> {
    perception: LanePerception<'a>,
    mental: &'a ChannelMental,
}

impl<'a> DelayedPerception<'a> {
    /// Creates a delayed view of the current perception.
    pub fn new(perception: LanePerception<'a>, mental: &'a ChannelMental) -> Self {
        Self { perception, mental }
    }

    /// The undelayed perception.
    pub fn perception(&self) -> &LanePerception<'a> {
        &self.perception
    }

    /// The leader on the ego's path.
    pub fn leader(&self) -> Result<Option<PerceivedVehicle>> {
        let leader = self.perception.leader()?;
        Ok(leader.map(|v| self.delay(&v, Channel::Front)))
    }

    /// The follower behind the ego.
    pub fn follower(&self) -> Result<Option<PerceivedVehicle>> {
        let follower = self.perception.follower()?;
        Ok(follower.map(|v| self.delay(&v, Channel::Rear)))
    }

    /// The nearest vehicle approaching the given conflict from the other link.
    pub fn conflicting_vehicle(&self, conflict_id: ConflictId) -> Result<Option<PerceivedVehicle>> {
        let channel = self
            .mental
            .channel_of(PerceivedObject::Conflict(conflict_id))
            .unwrap_or(Channel::Conflict(conflict_id));
        let vehicle = self.perception.conflicting_vehicle(conflict_id)?;
        Ok(vehicle.map(|v| self.delay(&v, channel)))
    }

    /// The first vehicle on the other branch of a split.
    pub fn vehicle_beyond_split(&self, conflict_id: ConflictId) -> Result<Option<PerceivedVehicle>> {
        let vehicle = self.perception.vehicle_beyond_split(conflict_id)?;
        Ok(vehicle.map(|v| self.delay(&v, Channel::Front)))
    }

    fn delay(&self, vehicle: &PerceivedVehicle, fallback: Channel) -> PerceivedVehicle {
        let channel = self
            .mental
            .channel_of(PerceivedObject::Vehicle(vehicle.id))
            .unwrap_or(fallback);
        let delay = self.mental.channel_perception_delay(channel);
        self.perception.delayed(vehicle, delay)
    }
}
