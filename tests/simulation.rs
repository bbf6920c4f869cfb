//! Tests that drive vehicles through the simulation.

use assert_approx_eq::assert_approx_eq;
use traffic_attention::mental::{Channel, PerceivedObject, TaskSettings};
use traffic_attention::{
    Error, LinkAttributes, LinkId, ParameterType, Simulation, VehicleAttributes, VehicleId,
};

/// Creates a simulation with a chain of links of the given lengths.
fn chain(lengths: &[f64]) -> (Simulation, Vec<LinkId>) {
    let mut sim = Simulation::new();
    let mut start = sim.add_node();
    let mut links = vec![];
    for length in lengths {
        let end = sim.add_node();
        links.push(sim.add_link(&LinkAttributes {
            start,
            end,
            length: *length,
        }));
        start = end;
    }
    (sim, links)
}

fn add_vehicle(sim: &mut Simulation, link: LinkId, pos: f64) -> VehicleId {
    let attributes = VehicleAttributes {
        length: 5.0,
        velocity: 10.0,
        tasks: TaskSettings::default(),
    };
    sim.add_vehicle(&attributes, link, pos)
}

/// Test that a vehicle's position increases monotonically.
#[test]
fn vehicle_drives_forward() {
    let (mut sim, links) = chain(&[100.0]);
    let veh = add_vehicle(&mut sim, links[0], 0.0);

    let mut pos = sim.get_vehicle(veh).pos_mid();
    for _ in 0..50 {
        sim.step(0.1).unwrap();
        let next_pos = sim.get_vehicle(veh).pos_mid();
        assert!(next_pos > pos);
        pos = next_pos;
    }
    assert_eq!(sim.frame(), 50);
}

#[test]
fn vehicle_follows_route_then_exits() {
    let (mut sim, links) = chain(&[100.0, 100.0]);
    let veh = add_vehicle(&mut sim, links[0], 95.0);
    sim.set_vehicle_route(veh, &[links[1]]);

    sim.step(1.0).unwrap();
    assert_eq!(sim.get_vehicle(veh).link_id(), Some(links[1]));
    assert_eq!(sim.network().link(links[1]).vehicles(), &[veh]);
    assert!(sim.network().link(links[0]).vehicles().is_empty());

    sim.step(10.0).unwrap();
    assert_eq!(sim.iter_vehicles().count(), 0);
    assert!(sim.network().link(links[1]).vehicles().is_empty());
}

#[test]
fn mental_models_update_periodically() {
    let (mut sim, links) = chain(&[500.0]);
    let veh = add_vehicle(&mut sim, links[0], 0.0);
    let leader = add_vehicle(&mut sim, links[0], 40.0);
    sim.set_vehicle_velocity(leader, 12.0);

    sim.step(0.25).unwrap();
    assert!(sim.mental(veh).channels().is_empty());

    sim.step(0.25).unwrap();
    let mental = sim.mental(veh);
    assert_eq!(mental.channels(), &[Channel::Front, Channel::Rear]);
    assert!(mental.demand(Channel::Front) > mental.demand(Channel::Rear));
    assert!(mental.task_saturation() > 0.0);
}

#[test]
fn overtaken_vehicle_is_reordered() {
    let (mut sim, links) = chain(&[500.0]);
    let slow = add_vehicle(&mut sim, links[0], 20.0);
    let fast = add_vehicle(&mut sim, links[0], 10.0);
    sim.set_vehicle_velocity(slow, 0.0);

    sim.step(2.0).unwrap();
    assert_eq!(sim.network().link(links[0]).vehicles(), &[slow, fast]);
    let perception = sim.perception(slow).unwrap();
    assert_eq!(perception.leader().unwrap().map(|v| v.id), Some(fast));
}

#[test]
fn missing_parameter_fails_the_update() {
    let (mut sim, links) = chain(&[100.0]);
    let veh = add_vehicle(&mut sim, links[0], 0.0);
    sim.vehicle_parameters_mut(veh)
        .reset(ParameterType::Lookahead);

    assert_eq!(
        sim.step(0.5),
        Err(Error::MissingParameter(ParameterType::Lookahead))
    );
}

#[test]
fn failed_update_leaves_other_vehicles_updated() {
    let (mut sim, links) = chain(&[200.0]);
    let good = add_vehicle(&mut sim, links[0], 0.0);
    let bad = add_vehicle(&mut sim, links[0], 100.0);
    sim.vehicle_parameters_mut(bad)
        .reset(ParameterType::Lookahead);

    assert_eq!(
        sim.step(0.5),
        Err(Error::MissingParameter(ParameterType::Lookahead))
    );
    assert_eq!(sim.mental(good).channels(), &[Channel::Front, Channel::Rear]);
    assert!(sim.mental(bad).channels().is_empty());
}

#[test]
fn delayed_leader_is_anticipated_at_constant_speed() {
    let (mut sim, links) = chain(&[500.0]);
    let ego = add_vehicle(&mut sim, links[0], 0.0);
    let leader = add_vehicle(&mut sim, links[0], 50.0);

    sim.step(0.5).unwrap();
    sim.step(0.5).unwrap();
    assert_approx_eq!(sim.time(), 1.0);

    // Nothing changed within the delay, so anticipation is exact
    let delayed = sim.delayed_perception(ego).unwrap();
    let believed = delayed.leader().unwrap().unwrap();
    let actual = delayed.perception().leader().unwrap().unwrap();
    assert_eq!(believed.id, leader);
    assert_approx_eq!(believed.distance, actual.distance);
    assert_approx_eq!(believed.speed, 10.0);

    // The leader brakes to a stop between two updates
    sim.set_vehicle_velocity(leader, 0.0);
    sim.step(0.25).unwrap();
    let mental = sim.mental(ego);
    assert_approx_eq!(
        mental.perception_delay(PerceivedObject::Vehicle(leader)).unwrap(),
        0.32
    );

    let delayed = sim.delayed_perception(ego).unwrap();
    let actual = delayed.perception().leader().unwrap().unwrap();
    assert_approx_eq!(actual.distance, 42.5);
    assert_eq!(actual.speed, 0.0);

    // Seen 0.32 s ago at 10 m/s, the leader is believed 2.5 m further away
    let believed = delayed.leader().unwrap().unwrap();
    assert_approx_eq!(believed.distance, 45.0);
    assert_approx_eq!(believed.speed, 10.0);
}
