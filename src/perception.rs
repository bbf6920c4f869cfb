//! Perception of the surroundings of a single vehicle.

use crate::network::Network;
use crate::parameters::{ParameterSet, ParameterType};
use crate::util::{DistancedObject, Interval};
use crate::vehicle::Vehicle;
use crate::{ConflictId, Error, LinkId, Result, TrafficLightId, VehicleId, VehicleSet};
use smallvec::{smallvec, SmallVec};

/// Another vehicle as perceived from the ego vehicle or a reference point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerceivedVehicle {
    /// The ID of the perceived vehicle.
    pub id: VehicleId,
    /// The net distance to the reference point in m.
    /// Negative if the vehicle already overlaps it.
    pub distance: f64,
    /// The velocity of the perceived vehicle in m/s.
    pub speed: f64,
    /// Whether the vehicle drives towards the reference point, so that
    /// its distance shrinks as it moves.
    pub approaching: bool,
}

impl PerceivedVehicle {
    /// Whether the vehicle is alongside the reference point, i.e. physically on it.
    pub fn is_parallel(&self) -> bool {
        self.distance < 0.0
    }
}

/// A snapshot of what the ego vehicle can perceive, valid for one update.
pub struct LanePerception<'a> {
    time: f64,
    ego: &'a Vehicle,
    link_id: LinkId,
    network: &'a Network,
    vehicles: &'a VehicleSet,
}

impl<'a> LanePerception<'a> {
    /// Creates the perception of the given vehicle at simulation time `time`.
    pub fn new(
        time: f64,
        ego_id: VehicleId,
        network: &'a Network,
        vehicles: &'a VehicleSet,
    ) -> Result<Self> {
        let ego = vehicles
            .get(ego_id)
            .ok_or(Error::MissingPerception("ego vehicle"))?;
        let link_id = ego.link_id().ok_or(Error::MissingPerception("ego link"))?;
        Ok(Self {
            time,
            ego,
            link_id,
            network,
            vehicles,
        })
    }

    /// The simulation time of the perception, in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The perceiving vehicle.
    pub fn ego(&self) -> &'a Vehicle {
        self.ego
    }

    /// The ego vehicle's speed in m/s.
    pub fn ego_speed(&self) -> f64 {
        self.ego.vel()
    }

    /// The ego driver's parameters.
    pub fn parameters(&self) -> &'a ParameterSet {
        self.ego.parameters()
    }

    /// The road network.
    pub fn network(&self) -> &'a Network {
        self.network
    }

    /// Gets another vehicle by ID.
    pub fn vehicle(&self, vehicle_id: VehicleId) -> &'a Vehicle {
        &self.vehicles[vehicle_id]
    }

    /// The links on the ego's path within `range`, each paired with the distance
    /// from the ego's front to the start of the link. The current link comes first,
    /// with a negative distance. Beyond the route, the path continues over a link's
    /// only successor.
    pub fn links_ahead(&self, range: f64) -> SmallVec<[(LinkId, f64); 8]> {
        let mut out: SmallVec<[_; 8]> = smallvec![(self.link_id, -self.ego.pos_front())];
        let mut route = self.ego.route().iter().skip(1).copied();
        let mut link_id = self.link_id;
        let mut offset = self.network.link(link_id).length() - self.ego.pos_front();

        while offset <= range {
            let next = route.next().or_else(|| match self.network.links_out(link_id) {
                [only] => Some(*only),
                _ => None,
            });
            let Some(next) = next else {
                break;
            };
            out.push((next, offset));
            offset += self.network.link(next).length();
            link_id = next;
        }

        out
    }

    /// The nearest vehicle ahead on the ego's path.
    pub fn leader(&self) -> Result<Option<PerceivedVehicle>> {
        let range = self.parameters().get(ParameterType::Lookahead)?;
        let ego = self.ego;

        for (link_id, offset) in self.links_ahead(range) {
            let leader = self
                .network
                .link(link_id)
                .vehicles()
                .iter()
                .map(|id| &self.vehicles[*id])
                .filter(|v| v.id() != ego.id())
                .find(|v| link_id != self.link_id || v.pos_mid() > ego.pos_mid());
            if let Some(v) = leader {
                let distance = offset + v.pos_rear();
                return Ok((distance <= range).then(|| self.perceive(v, distance, false)));
            }
        }

        Ok(None)
    }

    /// The nearest vehicle behind the ego, possibly on an upstream link.
    pub fn follower(&self) -> Result<Option<PerceivedVehicle>> {
        let range = self.parameters().get(ParameterType::Lookback)?;
        let pos = self.ego.pos_rear();
        Ok(self.nearest_upstream(self.link_id, pos, pos, range))
    }

    /// The conflicts on the ego's path which it has not yet passed, nearest first.
    pub fn conflicts_ahead(&self) -> Result<Vec<DistancedObject<ConflictId>>> {
        let range = self.parameters().get(ParameterType::Lookahead)?;
        let mut out = vec![];

        for (link_id, offset) in self.links_ahead(range) {
            for conflict_id in self.network.link(link_id).conflicts() {
                let conflict = self.network.conflict(*conflict_id);
                let distance = offset + conflict.pos();
                if distance > range {
                    break;
                }
                if distance + conflict.length() > 0.0 {
                    out.push(DistancedObject::new(distance, *conflict_id));
                }
            }
        }

        out.sort();
        Ok(out)
    }

    /// The traffic lights on the ego's path ahead of its front, nearest first.
    pub fn traffic_lights_ahead(&self) -> Result<Vec<DistancedObject<TrafficLightId>>> {
        let range = self.parameters().get(ParameterType::Lookahead)?;
        let ahead = Interval::new(0.0, range);
        let mut out = self
            .links_ahead(range)
            .into_iter()
            .flat_map(|(link_id, offset)| {
                self.network
                    .link(link_id)
                    .lights()
                    .iter()
                    .map(move |id| DistancedObject::new(offset + self.network.light(*id).pos(), *id))
            })
            .filter(|light| ahead.contains(light.distance))
            .collect::<Vec<_>>();
        out.sort();
        Ok(out)
    }

    /// The nearest vehicle approaching the given conflict from the other link,
    /// i.e. upstream of the paired conflict and not yet clear of it.
    pub fn conflicting_vehicle(&self, conflict_id: ConflictId) -> Result<Option<PerceivedVehicle>> {
        let range = self.parameters().get(ParameterType::Lookahead)?;
        let other = self
            .network
            .conflict(self.network.conflict(conflict_id).other());
        let extent = other.extent();
        Ok(self.nearest_upstream(other.link_id(), extent.min, extent.max, range))
    }

    /// The first vehicle on the other branch of a split, with its distance from the split.
    pub fn vehicle_beyond_split(&self, conflict_id: ConflictId) -> Result<Option<PerceivedVehicle>> {
        let range = self.parameters().get(ParameterType::Lookahead)?;
        let other = self
            .network
            .conflict(self.network.conflict(conflict_id).other());
        Ok(self.nearest_downstream(other.link_id(), other.pos(), range))
    }

    /// How a vehicle is believed to be after perceiving it `delay` seconds ago,
    /// and anticipating its motion since then at constant speed.
    pub fn delayed(&self, vehicle: &PerceivedVehicle, delay: f64) -> PerceivedVehicle {
        let other = &self.vehicles[vehicle.id];
        let (odometer, speed) = other.motion_at(self.time - delay);
        let error = odometer + speed * delay - other.odometer();
        let distance = if vehicle.approaching {
            vehicle.distance - error
        } else {
            vehicle.distance + error
        };
        PerceivedVehicle {
            distance,
            speed,
            ..*vehicle
        }
    }

    fn perceive(&self, vehicle: &Vehicle, distance: f64, approaching: bool) -> PerceivedVehicle {
        PerceivedVehicle {
            id: vehicle.id(),
            distance,
            speed: vehicle.vel(),
            approaching,
        }
    }

    /// Finds the nearest vehicle on this and preceding links whose rear has not passed `clear`.
    ///
    /// # Parameters
    /// * `link_id` - The link to search
    /// * `pos` - The reference position on the link; distances are measured to it
    /// * `clear` - Vehicles with their rear beyond this position are ignored
    /// * `range` - The maximum search distance upstream of `pos`
    fn nearest_upstream(
        &self,
        link_id: LinkId,
        pos: f64,
        clear: f64,
        range: f64,
    ) -> Option<PerceivedVehicle> {
        let link = self.network.link(link_id);
        let found = link
            .vehicles()
            .iter()
            .rev()
            .map(|id| &self.vehicles[*id])
            .filter(|v| v.id() != self.ego.id())
            .find(|v| v.pos_rear() < clear);
        if let Some(v) = found {
            let distance = pos - v.pos_front();
            return (distance <= range).then(|| self.perceive(v, distance, true));
        }

        // Limit search distance
        if pos >= range {
            return None;
        }

        self.network
            .links_in(link_id)
            .iter()
            .filter_map(|up| {
                let length = self.network.link(*up).length();
                self.nearest_upstream(*up, pos + length, clear + length, range)
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Finds the first vehicle on this and succeeding links with its rear beyond `pos`.
    fn nearest_downstream(&self, link_id: LinkId, pos: f64, range: f64) -> Option<PerceivedVehicle> {
        let link = self.network.link(link_id);
        let found = link
            .vehicles()
            .iter()
            .map(|id| &self.vehicles[*id])
            .filter(|v| v.id() != self.ego.id())
            .find(|v| v.pos_rear() >= pos);
        if let Some(v) = found {
            let distance = v.pos_rear() - pos;
            return (distance <= range).then(|| self.perceive(v, distance, false));
        }

        // Limit search distance
        if link.length() - pos >= range {
            return None;
        }

        self.network
            .links_out(link_id)
            .iter()
            .filter_map(|down| self.nearest_downstream(*down, pos - link.length(), range))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
