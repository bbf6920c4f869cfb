use super::channel::Channel;
use crate::parameters::ParameterType;
use crate::perception::LanePerception;
use crate::util::DistancedObject;
use crate::{ConflictId, Result, TrafficLightId};

/// The highest demand a single task may have.
const MAX_DEMAND: f64 = 0.999;

/// A unit of mental demand, attached to the channel it's perceived through.
///
/// Tasks are regenerated at every perception update.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelTask {
    /// Following the leader on the ego's lane.
    CarFollowing,
    /// Approaching the nearest traffic light.
    TrafficLight { light: DistancedObject<TrafficLightId> },
    /// Approaching a group of conflicts which share their upstream approach.
    /// The conflicts are ordered nearest first.
    ConflictGroup {
        channel: Channel,
        conflicts: Vec<DistancedObject<ConflictId>>,
    },
    /// Following the first vehicle on the other branch of a split.
    SplitCarFollowing { split: DistancedObject<ConflictId> },
    /// Social pressure from a tailgating follower.
    Socio,
    /// Scanning a channel for anything unexpected.
    Scan { channel: Channel },
}

impl ChannelTask {
    /// A stable identifier of the kind of task.
    pub fn id(&self) -> &'static str {
        match self {
            Self::CarFollowing => "car-following",
            Self::TrafficLight { .. } => "traffic-light",
            Self::ConflictGroup { .. } => "conflicts",
            Self::SplitCarFollowing { .. } => "split-car-following",
            Self::Socio => "socio",
            Self::Scan { .. } => "scan",
        }
    }

    /// The channel the task is perceived through.
    pub fn channel(&self) -> Channel {
        match self {
            Self::CarFollowing | Self::TrafficLight { .. } | Self::SplitCarFollowing { .. } => {
                Channel::Front
            }
            Self::Socio => Channel::Rear,
            Self::ConflictGroup { channel, .. } | Self::Scan { channel } => *channel,
        }
    }

    /// Computes the task demand, which is always in `[0, 1)`.
    pub fn demand(&self, perception: &LanePerception) -> Result<f64> {
        let params = perception.parameters();
        let speed = perception.ego_speed();

        match self {
            Self::CarFollowing => {
                let h = params.get(ParameterType::HExp)?;
                let gap = perception.leader()?.map(|leader| leader.distance);
                Ok(car_following_demand(gap, speed, h))
            }
            Self::TrafficLight { light } => {
                let h_ego = params.get(ParameterType::HEgo)?;
                Ok(f64::min(MAX_DEMAND, decay(approach_time(light.distance, speed), h_ego)))
            }
            Self::ConflictGroup { conflicts, .. } => {
                let h_ego = params.get(ParameterType::HEgo)?;
                let h_conf = params.get(ParameterType::HConf)?;
                let ego_time = conflicts
                    .first()
                    .map(|c| approach_time(c.distance, speed))
                    .unwrap_or(f64::INFINITY);

                let mut conflict_time = f64::INFINITY;
                for conflict in conflicts {
                    if let Some(vehicle) = perception.conflicting_vehicle(conflict.object)? {
                        let time = if vehicle.is_parallel() {
                            0.0
                        } else {
                            approach_time(vehicle.distance, vehicle.speed)
                        };
                        conflict_time = conflict_time.min(time);
                    }
                }

                // exp(-min(a, b)) == max(exp(-a), exp(-b))
                let demand = f64::max(decay(ego_time, h_ego), decay(conflict_time, h_conf));
                Ok(f64::min(MAX_DEMAND, demand))
            }
            Self::SplitCarFollowing { split } => {
                let h = params.get(ParameterType::HExp)?;
                let gap = perception
                    .vehicle_beyond_split(split.object)?
                    .map(|leader| leader.distance + f64::max(split.distance, 0.0));
                Ok(car_following_demand(gap, speed, h))
            }
            Self::Socio => {
                let Some(follower) = perception.follower()? else {
                    return Ok(0.0);
                };
                let socio = params.get(ParameterType::Socio)?;
                let rho = perception
                    .vehicle(follower.id)
                    .parameters()
                    .get_optional(ParameterType::Rho)
                    .unwrap_or(0.0);
                Ok(f64::min(MAX_DEMAND, rho * socio))
            }
            Self::Scan { .. } => {
                let demand = params.get(ParameterType::TdScan)?;
                Ok(f64::min(MAX_DEMAND, demand))
            }
        }
    }
}

/// The car-following task demand for a leader at the given net gap, if there is one.
///
/// # Parameters
/// * `gap` - The net distance to the leader in m, or `None` without a leader
/// * `speed` - The ego speed in m/s
/// * `h` - The headway decay time in s
pub fn car_following_demand(gap: Option<f64>, speed: f64, h: f64) -> f64 {
    match gap {
        Some(gap) => f64::min(MAX_DEMAND, decay(approach_time(gap, speed), h)),
        None => 0.0,
    }
}

/// The time needed to cover `distance` at `speed`; zero when already there,
/// infinite when not moving.
fn approach_time(distance: f64, speed: f64) -> f64 {
    if distance <= 0.0 {
        0.0
    } else if speed <= 0.0 {
        f64::INFINITY
    } else {
        distance / speed
    }
}

/// Exponential decay `exp(-time / h)`, which is 1 at zero time and 0 at infinite time.
fn decay(time: f64, h: f64) -> f64 {
    if time <= 0.0 {
        1.0
    } else {
        (-time / h).exp()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn car_following_demand_decays_with_headway() {
        assert_eq!(car_following_demand(None, 10.0, 4.0), 0.0);
        assert_approx_eq!(car_following_demand(Some(40.0), 10.0, 4.0), (-1.0f64).exp());
        assert_eq!(car_following_demand(Some(0.0), 10.0, 4.0), MAX_DEMAND);
    }

    #[test]
    fn stationary_vehicle_never_arrives() {
        assert_eq!(approach_time(25.0, 0.0), f64::INFINITY);
        assert_eq!(decay(f64::INFINITY, 2.49), 0.0);
        assert_eq!(car_following_demand(Some(25.0), 0.0, 4.0), 0.0);
    }

    #[test]
    fn zero_decay_time_gives_no_demand_until_arrival() {
        assert_eq!(decay(1.0, 0.0), 0.0);
        assert_eq!(decay(0.0, 0.0), 1.0);
    }

    #[test]
    fn tasks_are_attached_to_their_channel() {
        assert_eq!(ChannelTask::CarFollowing.channel(), Channel::Front);
        assert_eq!(ChannelTask::Socio.channel(), Channel::Rear);
        let scan = ChannelTask::Scan {
            channel: Channel::Left,
        };
        assert_eq!(scan.channel(), Channel::Left);
        assert_eq!(scan.id(), "scan");
    }
}
