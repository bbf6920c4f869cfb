//! Tests of the tasks that don't form conflict groups: splits, social pressure and traffic lights.

use assert_approx_eq::assert_approx_eq;
use traffic_attention::mental::{Channel, PerceivedObject, TaskSettings};
use traffic_attention::{
    ConflictAttributes, ConflictType, Error, LightState, LinkAttributes, LinkId, NodeId,
    ParameterType, Simulation, VehicleAttributes, VehicleId,
};

const NO_TASKS: TaskSettings = TaskSettings {
    car_following: false,
    traffic_lights: false,
    conflicts: false,
    social: false,
    scan: false,
};

fn add_link(sim: &mut Simulation, start: NodeId, end: NodeId, length: f64) -> LinkId {
    sim.add_link(&LinkAttributes {
        start,
        end,
        length,
    })
}

fn add_vehicle(sim: &mut Simulation, tasks: TaskSettings, link: LinkId, pos: f64) -> VehicleId {
    let attributes = VehicleAttributes {
        length: 4.0,
        velocity: 10.0,
        tasks,
    };
    sim.add_vehicle(&attributes, link, pos)
}

#[test]
fn split_is_followed_on_the_front_channel() {
    let mut sim = Simulation::new();
    let [s0, s1, s2, s3] = [(); 4].map(|_| sim.add_node());
    let approach = add_link(&mut sim, s0, s1, 100.0);
    let left = add_link(&mut sim, s1, s2, 100.0);
    let right = add_link(&mut sim, s1, s3, 100.0);
    let [split, _] = sim.add_conflict(&ConflictAttributes {
        conflict_type: ConflictType::Split,
        links: [left, right],
        positions: [0.0, 0.0],
        length: 10.0,
    });

    let settings = TaskSettings {
        conflicts: true,
        ..NO_TASKS
    };
    let ego = add_vehicle(&mut sim, settings, approach, 50.0);
    sim.set_vehicle_route(ego, &[left]);
    let other = add_vehicle(&mut sim, NO_TASKS, right, 30.0);
    sim.update_perception().unwrap();

    let mental = sim.mental(ego);
    assert_eq!(mental.channels(), &[Channel::Front]);
    assert_eq!(
        mental.channel_of(PerceivedObject::Conflict(split)),
        Some(Channel::Front)
    );
    assert_eq!(
        mental.channel_of(PerceivedObject::Vehicle(other)),
        Some(Channel::Front)
    );

    // 48 m to the split plus 28 m beyond it, at 10 m/s
    assert_approx_eq!(mental.demand(Channel::Front), (-7.6f64 / 4.0).exp());
}

struct Platoon {
    sim: Simulation,
    ego: VehicleId,
    follower: VehicleId,
}

/// An ego vehicle with a follower 6 m behind it.
fn platoon() -> Platoon {
    let mut sim = Simulation::new();
    let [a, b] = [(); 2].map(|_| sim.add_node());
    let link = add_link(&mut sim, a, b, 200.0);
    let settings = TaskSettings {
        social: true,
        ..NO_TASKS
    };
    let ego = add_vehicle(&mut sim, settings, link, 100.0);
    let follower = add_vehicle(&mut sim, NO_TASKS, link, 90.0);
    Platoon { sim, ego, follower }
}

#[test]
fn social_pressure_scales_with_follower_rho() {
    let mut platoon = platoon();
    let sim = &mut platoon.sim;
    sim.vehicle_parameters_mut(platoon.ego)
        .set(ParameterType::Socio, 0.5)
        .unwrap();
    sim.vehicle_parameters_mut(platoon.follower)
        .set(ParameterType::Rho, 0.4)
        .unwrap();

    let perception = sim.perception(platoon.ego).unwrap();
    let follower = perception.follower().unwrap().unwrap();
    assert_eq!(follower.id, platoon.follower);
    assert_approx_eq!(follower.distance, 6.0);

    sim.update_perception().unwrap();
    let mental = sim.mental(platoon.ego);
    assert_eq!(mental.channels(), &[Channel::Rear]);
    assert_approx_eq!(mental.demand(Channel::Rear), 0.2);
    assert_eq!(
        mental.channel_of(PerceivedObject::Vehicle(platoon.follower)),
        Some(Channel::Rear)
    );
}

#[test]
fn follower_without_rho_exerts_no_pressure() {
    let mut platoon = platoon();
    let sim = &mut platoon.sim;
    sim.vehicle_parameters_mut(platoon.ego)
        .set(ParameterType::Socio, 0.5)
        .unwrap();

    sim.update_perception().unwrap();
    assert_eq!(sim.mental(platoon.ego).demand(Channel::Rear), 0.0);
}

#[test]
fn missing_socio_fails_only_with_a_follower() {
    let mut platoon = platoon();
    let sim = &mut platoon.sim;
    assert_eq!(
        sim.update_perception(),
        Err(Error::MissingParameter(ParameterType::Socio))
    );
    assert!(sim.mental(platoon.ego).channels().is_empty());

    sim.remove_vehicle(platoon.follower);
    sim.update_perception().unwrap();
    assert_eq!(sim.mental(platoon.ego).channels(), &[Channel::Rear]);
    assert_eq!(sim.mental(platoon.ego).demand(Channel::Rear), 0.0);
}

#[test]
fn randomised_socio_stays_in_range() {
    let mut platoon = platoon();
    let sim = &mut platoon.sim;
    sim.randomise_socio(0.5, 0.3).unwrap();
    for vehicle in sim.iter_vehicles() {
        let socio = vehicle.parameters().get(ParameterType::Socio).unwrap();
        assert!((0.0..=1.0).contains(&socio));
    }
    assert!(sim.randomise_socio(0.5, -1.0).is_err());
}

#[test]
fn traffic_light_ahead_is_approached_on_the_front_channel() {
    let mut sim = Simulation::new();
    let [a, b] = [(); 2].map(|_| sim.add_node());
    let link = add_link(&mut sim, a, b, 200.0);
    let light = sim.add_traffic_light(link, 72.0);
    let settings = TaskSettings {
        traffic_lights: true,
        ..NO_TASKS
    };
    let ego = add_vehicle(&mut sim, settings, link, 20.0);
    sim.update_perception().unwrap();

    let mental = sim.mental(ego);
    assert_eq!(
        mental.channel_of(PerceivedObject::TrafficLight(light)),
        Some(Channel::Front)
    );
    // 50 m to the stop line at 10 m/s
    assert_approx_eq!(mental.demand(Channel::Front), (-5.0f64 / 4.46).exp());
}

#[test]
fn green_light_makes_no_demand() {
    let mut sim = Simulation::new();
    let [a, b] = [(); 2].map(|_| sim.add_node());
    let link = add_link(&mut sim, a, b, 200.0);
    let light = sim.add_traffic_light(link, 72.0);
    let settings = TaskSettings {
        traffic_lights: true,
        ..NO_TASKS
    };
    let ego = add_vehicle(&mut sim, settings, link, 20.0);

    sim.set_traffic_light_state(light, LightState::Green);
    sim.update_perception().unwrap();
    let mental = sim.mental(ego);
    assert!(mental.channels().is_empty());
    assert_eq!(
        mental.channel_of(PerceivedObject::TrafficLight(light)),
        Some(Channel::Front)
    );

    sim.set_traffic_light_state(light, LightState::Amber);
    sim.update_perception().unwrap();
    assert_approx_eq!(sim.mental(ego).demand(Channel::Front), (-5.0f64 / 4.46).exp());
}

#[test]
fn nearest_light_that_is_not_green_sets_the_demand() {
    let mut sim = Simulation::new();
    let [a, b] = [(); 2].map(|_| sim.add_node());
    let link = add_link(&mut sim, a, b, 200.0);
    let near = sim.add_traffic_light(link, 72.0);
    let far = sim.add_traffic_light(link, 122.0);
    let settings = TaskSettings {
        traffic_lights: true,
        ..NO_TASKS
    };
    let ego = add_vehicle(&mut sim, settings, link, 20.0);
    sim.set_traffic_light_state(near, LightState::Green);
    sim.update_perception().unwrap();

    let mental = sim.mental(ego);
    assert_eq!(
        mental.channel_of(PerceivedObject::TrafficLight(far)),
        Some(Channel::Front)
    );
    // 100 m to the far stop line at 10 m/s
    assert_approx_eq!(mental.demand(Channel::Front), (-10.0f64 / 4.46).exp());
}
