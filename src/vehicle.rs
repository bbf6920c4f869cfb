use crate::mental::TaskSettings;
use crate::network::Network;
use crate::parameters::ParameterSet;
use crate::{LinkId, VehicleId};
use std::collections::VecDeque;

/// The motion history retained for delayed perception of a vehicle, in s.
const HISTORY_SEC: f64 = 2.0;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// Half the vehicle's length in m.
    half_len: f64,
    /// The longitudinal position along the current link, in m.
    pos: f64,
    /// The velocity in m/s.
    vel: f64,
    /// The total distance travelled, in m.
    odometer: f64,
    /// Past states, oldest first.
    history: VecDeque<MotionSample>,
    /// The vehicle's route, including the link it's currently on.
    route: Vec<LinkId>,
    /// The driver's behavioural parameters.
    params: ParameterSet,
}

/// The motion of a vehicle at a moment in time.
#[derive(Clone, Copy, Debug)]
struct MotionSample {
    /// The simulation time in s.
    time: f64,
    /// The distance travelled up to `time`, in m.
    odometer: f64,
    /// The velocity held since the previous sample, in m/s.
    vel: f64,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    /// The vehicle length in m.
    pub length: f64,
    /// The initial velocity in m/s.
    pub velocity: f64,
    /// The tasks the driver's mental model considers.
    pub tasks: TaskSettings,
}

impl Vehicle {
    /// Creates a new vehicle with default parameters.
    pub(crate) fn new(id: VehicleId, attributes: &VehicleAttributes) -> Self {
        Self {
            id,
            half_len: 0.5 * attributes.length,
            pos: 0.0,
            vel: attributes.velocity,
            odometer: 0.0,
            history: VecDeque::new(),
            route: vec![],
            params: ParameterSet::with_defaults(),
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    /// The ID of the link the vehicle is currently travelling on.
    pub fn link_id(&self) -> Option<LinkId> {
        self.route.first().copied()
    }

    /// The vehicle's route, starting with the link it's currently on.
    pub fn route(&self) -> &[LinkId] {
        &self.route
    }

    /// The longitudinal position of the centre of the vehicle in m.
    pub fn pos_mid(&self) -> f64 {
        self.pos
    }

    /// The longitudinal position of the rear of the vehicle in m.
    pub fn pos_rear(&self) -> f64 {
        self.pos - self.half_len
    }

    /// The longitudinal position of the front of the vehicle in m.
    pub fn pos_front(&self) -> f64 {
        self.pos + self.half_len
    }

    /// The vehicle's velocity in m/s.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The driver's behavioural parameters.
    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    pub(crate) fn set_velocity(&mut self, vel: f64) {
        self.vel = f64::max(vel, 0.0);
    }

    /// Integrates the vehicle's position at its current velocity.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    pub(crate) fn integrate(&mut self, dt: f64) {
        self.pos += self.vel * dt;
        self.odometer += self.vel * dt;
    }

    /// Records the current motion at the given time, and forgets samples
    /// that are no longer needed.
    pub(crate) fn record(&mut self, time: f64) {
        let sample = MotionSample {
            time,
            odometer: self.odometer,
            vel: self.vel,
        };
        match self.history.back_mut() {
            Some(last) if last.time >= time => *last = sample,
            _ => self.history.push_back(sample),
        }
        while self.history.len() > 1 && self.history[1].time <= time - HISTORY_SEC {
            self.history.pop_front();
        }
    }

    /// The distance travelled and the velocity at a past time, interpolated
    /// between the recorded samples. Times before the retained history give
    /// the oldest sample.
    pub(crate) fn motion_at(&self, time: f64) -> (f64, f64) {
        let idx = self.history.partition_point(|s| s.time <= time);
        let before = idx.checked_sub(1).and_then(|i| self.history.get(i));
        match (before, self.history.get(idx)) {
            (Some(a), Some(b)) => {
                let t = (time - a.time) / (b.time - a.time);
                (a.odometer + t * (b.odometer - a.odometer), b.vel)
            }
            (Some(a), None) => (a.odometer + a.vel * (time - a.time), a.vel),
            (None, Some(b)) => (b.odometer, b.vel),
            (None, None) => (self.odometer, self.vel),
        }
    }

    /// The total distance travelled, in m.
    pub fn odometer(&self) -> f64 {
        self.odometer
    }

    /// Checks whether the vehicle has travelled past the end of its current link,
    /// and if so, advances it to the next link on its route if there is one.
    /// Returns `true` iff the vehicle left its link.
    pub(crate) fn advance(&mut self, network: &Network) -> bool {
        if let Some(link_id) = self.route.first() {
            let length = network.link(*link_id).length();
            if length < self.pos {
                self.route.remove(0);
                self.pos -= length;
                return true;
            }
        }
        false
    }

    /// Sets the vehicle's position in the network.
    /// This also clears the vehicle's route.
    pub(crate) fn set_location(&mut self, link: LinkId, pos: f64) {
        self.route = vec![link];
        self.pos = pos;
    }

    /// Sets the links the vehicle follows after its current link.
    pub(crate) fn set_route(&mut self, route: &[LinkId]) {
        self.route.truncate(1);
        self.route.extend(route);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn vehicle(velocity: f64) -> Vehicle {
        let attributes = VehicleAttributes {
            length: 4.0,
            velocity,
            tasks: TaskSettings::default(),
        };
        Vehicle::new(VehicleId::default(), &attributes)
    }

    #[test]
    fn motion_is_interpolated_between_samples() {
        let mut veh = vehicle(10.0);
        veh.record(0.0);
        veh.integrate(0.5);
        veh.record(0.5);
        veh.set_velocity(2.0);
        veh.integrate(0.5);
        veh.record(1.0);

        let (odometer, vel) = veh.motion_at(0.25);
        assert_approx_eq!(odometer, 2.5);
        assert_eq!(vel, 10.0);

        let (odometer, vel) = veh.motion_at(0.75);
        assert_approx_eq!(odometer, 5.5);
        assert_eq!(vel, 2.0);

        assert_eq!(veh.motion_at(-1.0), (0.0, 10.0));
    }

    #[test]
    fn old_samples_are_forgotten() {
        let mut veh = vehicle(10.0);
        for i in 0..=40 {
            veh.record(0.1 * i as f64);
            veh.integrate(0.1);
        }
        assert!(veh.history.len() < 30);
        assert!(veh.history[0].time <= 4.0 - HISTORY_SEC);
    }
}
