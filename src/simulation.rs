use crate::conflict::ConflictAttributes;
use crate::light::LightState;
use crate::link::LinkAttributes;
use crate::mental::{ChannelMental, DelayedPerception};
use crate::network::Network;
use crate::parameters::{ParameterSet, ParameterType};
use crate::perception::LanePerception;
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{
    ConflictId, Error, LinkId, NodeId, Result, TrafficLightId, VehicleId, VehicleSet,
};
use log::warn;
use rand_distr::Distribution;
use slotmap::SecondaryMap;

/// Update the mental model of every vehicle at least once per this interval.
const PERCEPTION_UPDATE_SEC: f64 = 0.5; // s

/// A traffic simulation in which every driver divides attention over its perception channels.
#[derive(Default)]
pub struct Simulation {
    /// The road network.
    network: Network,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The mental model of each vehicle.
    mentals: SecondaryMap<VehicleId, ChannelMental>,
    /// The current frame of simulation.
    frame: usize,
    /// The simulation time in s.
    time: f64,
    /// The time since the last perception update in s.
    perception_update: f64,
}

impl Simulation {
    /// Creates a new simulation.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a node to the network.
    pub fn add_node(&mut self) -> NodeId {
        self.network.add_node()
    }

    /// Adds a link to the network.
    pub fn add_link(&mut self, attributes: &LinkAttributes) -> LinkId {
        self.network.add_link(attributes)
    }

    /// Specifies that two links cross, merge or split.
    /// Returns the conflicts on each of the links.
    pub fn add_conflict(&mut self, attributes: &ConflictAttributes) -> [ConflictId; 2] {
        self.network.add_conflict(attributes)
    }

    /// Adds a traffic light with its stop line at `pos` on the given link.
    pub fn add_traffic_light(&mut self, link_id: LinkId, pos: f64) -> TrafficLightId {
        self.network.add_traffic_light(link_id, pos)
    }

    /// Sets the state of a traffic light.
    pub fn set_traffic_light_state(&mut self, light_id: TrafficLightId, state: LightState) {
        self.network.set_traffic_light_state(light_id, state);
    }

    /// Adds a vehicle to the simulation.
    ///
    /// # Parameters
    /// * `attributes` - The vehicle's attributes
    /// * `link` - The link the vehicle starts on
    /// * `pos` - The position of the centre of the vehicle along the link, in m
    pub fn add_vehicle(&mut self, attributes: &VehicleAttributes, link: LinkId, pos: f64) -> VehicleId {
        let vehicle_id = self.vehicles.insert_with_key(|id| {
            let mut vehicle = Vehicle::new(id, attributes);
            vehicle.set_location(link, pos);
            vehicle.record(self.time);
            vehicle
        });
        self.network
            .link_mut(link)
            .insert_vehicle(&self.vehicles, vehicle_id);
        self.mentals
            .insert(vehicle_id, ChannelMental::new(attributes.tasks));
        vehicle_id
    }

    /// Removes a vehicle from the simulation.
    pub fn remove_vehicle(&mut self, id: VehicleId) {
        let vehicle = self.vehicles.remove(id);
        if let Some(vehicle) = vehicle {
            if let Some(link_id) = vehicle.link_id() {
                self.network.link_mut(link_id).remove_vehicle(vehicle.id());
            }
        }
        self.mentals.remove(id);
    }

    /// Sets the links the vehicle follows after its current link.
    pub fn set_vehicle_route(&mut self, vehicle_id: VehicleId, route: &[LinkId]) {
        self.vehicles[vehicle_id].set_route(route);
    }

    /// Sets the velocity of a vehicle in m/s.
    pub fn set_vehicle_velocity(&mut self, vehicle_id: VehicleId, vel: f64) {
        self.vehicles[vehicle_id].set_velocity(vel);
    }

    /// Gets a mutable reference to the behavioural parameters of a vehicle's driver.
    pub fn vehicle_parameters_mut(&mut self, vehicle_id: VehicleId) -> &mut ParameterSet {
        self.vehicles[vehicle_id].parameters_mut()
    }

    /// Randomly assigns a sensitivity to social pressure to each driver,
    /// which is sampled from a normal distribution and clamped to `[0, 1]`.
    pub fn randomise_socio(&mut self, mean: f64, stddev: f64) -> Result<()> {
        let mut rand = rand::thread_rng();
        let distr = rand_distr::Normal::new(mean, stddev).map_err(|_| Error::InvalidParameter {
            parameter: ParameterType::Socio,
            value: stddev,
        })?;
        for (_, vehicle) in &mut self.vehicles {
            let socio = distr.sample(&mut rand).clamp(0.0, 1.0);
            vehicle.parameters_mut().set(ParameterType::Socio, socio)?;
        }
        Ok(())
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Vehicles keep their velocity. Fails if the mental model of any vehicle
    /// can't be updated; see [Self::update_perception].
    pub fn step(&mut self, dt: f64) -> Result<()> {
        self.time += dt;
        self.integrate(dt);
        self.advance_vehicles();
        self.network.sort_vehicles(&self.vehicles);
        self.frame += 1;
        self.perception_update += dt;

        if self.perception_update >= PERCEPTION_UPDATE_SEC {
            self.perception_update = 0.0;
            self.update_perception()?;
        }
        Ok(())
    }

    /// Updates the mental model of every vehicle from its current perception.
    ///
    /// A vehicle whose update fails keeps its previous mental state, and doesn't
    /// affect the other vehicles. Returns the first failure once all vehicles
    /// have been updated.
    pub fn update_perception(&mut self) -> Result<()> {
        let mut result = Ok(());
        for (vehicle_id, mental) in &mut self.mentals {
            let update = LanePerception::new(self.time, vehicle_id, &self.network, &self.vehicles)
                .and_then(|perception| mental.update(&perception));
            if let Err(err) = update {
                warn!("Mental update of vehicle {:?} failed: {}", vehicle_id, err);
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Gets the current perception of a vehicle.
    pub fn perception(&self, vehicle_id: VehicleId) -> Result<LanePerception<'_>> {
        LanePerception::new(self.time, vehicle_id, &self.network, &self.vehicles)
    }

    /// Gets the perception of a vehicle as delayed by its mental model.
    pub fn delayed_perception(&self, vehicle_id: VehicleId) -> Result<DelayedPerception<'_>> {
        let perception = self.perception(vehicle_id)?;
        Ok(DelayedPerception::new(perception, &self.mentals[vehicle_id]))
    }

    /// Gets the mental model of a vehicle.
    pub fn mental(&self, vehicle_id: VehicleId) -> &ChannelMental {
        &self.mentals[vehicle_id]
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the simulation time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the road network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    /// Integrates the positions of all vehicles and records their motion.
    fn integrate(&mut self, dt: f64) {
        for (_, vehicle) in &mut self.vehicles {
            vehicle.integrate(dt);
            vehicle.record(self.time);
        }
    }

    /// Find vehicles that have advanced their link and either move them
    /// to their new link or remove them from the simulation.
    fn advance_vehicles(&mut self) {
        let mut advanced = vec![];
        let mut exited = vec![];

        for (vehicle_id, vehicle) in &mut self.vehicles {
            let Some(link_id) = vehicle.link_id() else {
                continue;
            };

            if vehicle.advance(&self.network) {
                self.network.link_mut(link_id).remove_vehicle(vehicle_id);
                if let Some(link_id) = vehicle.link_id() {
                    // Vehicle is now on a new link
                    advanced.push((vehicle_id, link_id));
                } else {
                    // Vehicle has exited the simulation
                    exited.push(vehicle_id);
                }
            }
        }

        for (vehicle_id, link_id) in advanced {
            self.network
                .link_mut(link_id)
                .insert_vehicle(&self.vehicles, vehicle_id);
        }

        for vehicle_id in exited {
            self.vehicles.remove(vehicle_id);
            self.mentals.remove(vehicle_id);
        }
    }
}
