use crate::conflict::{Conflict, ConflictAttributes};
use crate::light::{LightState, TrafficLight};
use crate::link::{Link, LinkAttributes};
use crate::node::Node;
use crate::{
    ConflictId, ConflictSet, LightSet, LinkId, LinkSet, NodeId, NodeSet, TrafficLightId, VehicleSet,
};

/// The road network: nodes, the links between them, and the objects on the links.
#[derive(Clone, Default)]
pub struct Network {
    nodes: NodeSet,
    links: LinkSet,
    conflicts: ConflictSet,
    lights: LightSet,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a node to the network.
    pub fn add_node(&mut self) -> NodeId {
        self.nodes.insert_with_key(Node::new)
    }

    /// Adds a link between two existing nodes.
    pub fn add_link(&mut self, attributes: &LinkAttributes) -> LinkId {
        assert!(attributes.length > 0.0, "Link length must be positive");
        let link_id = self
            .links
            .insert_with_key(|id| Link::new(id, attributes));
        self.nodes[attributes.start].add_link_out(link_id);
        self.nodes[attributes.end].add_link_in(link_id);
        link_id
    }

    /// Adds a pair of conflicts, one on each of the conflicting links.
    /// Returns the IDs of the conflicts in the order of `attributes.links`.
    pub fn add_conflict(&mut self, attributes: &ConflictAttributes) -> [ConflictId; 2] {
        let a = self
            .conflicts
            .insert_with_key(|id| Conflict::new(id, attributes, 0, ConflictId::default()));
        let b = self
            .conflicts
            .insert_with_key(|id| Conflict::new(id, attributes, 1, a));
        self.conflicts[a].set_other(b);
        self.links[attributes.links[0]].add_conflict(&self.conflicts, a);
        self.links[attributes.links[1]].add_conflict(&self.conflicts, b);
        [a, b]
    }

    /// Adds a traffic light with its stop line at `pos` on the given link.
    pub fn add_traffic_light(&mut self, link_id: LinkId, pos: f64) -> TrafficLightId {
        let light_id = self.lights.insert(TrafficLight::new(link_id, pos));
        self.links[link_id].add_light(light_id);
        light_id
    }

    /// Sets the state of a traffic light.
    pub fn set_traffic_light_state(&mut self, light_id: TrafficLightId, state: LightState) {
        self.lights[light_id].set_state(state);
    }

    /// Gets a reference to the node with the given ID.
    pub fn node(&self, node_id: NodeId) -> &Node {
        &self.nodes[node_id]
    }

    /// Gets a reference to the link with the given ID.
    pub fn link(&self, link_id: LinkId) -> &Link {
        &self.links[link_id]
    }

    /// Gets a reference to the conflict with the given ID.
    pub fn conflict(&self, conflict_id: ConflictId) -> &Conflict {
        &self.conflicts[conflict_id]
    }

    /// Gets a reference to the traffic light with the given ID.
    pub fn light(&self, light_id: TrafficLightId) -> &TrafficLight {
        &self.lights[light_id]
    }

    /// The links that precede the given link.
    pub fn links_in(&self, link_id: LinkId) -> &[LinkId] {
        self.nodes[self.links[link_id].start()].links_in()
    }

    /// The links that succeed the given link.
    pub fn links_out(&self, link_id: LinkId) -> &[LinkId] {
        self.nodes[self.links[link_id].end()].links_out()
    }

    /// Returns an iterator over all the links in the network.
    pub fn iter_links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Returns an iterator over all the conflicts in the network.
    pub fn iter_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.values()
    }

    pub(crate) fn link_mut(&mut self, link_id: LinkId) -> &mut Link {
        &mut self.links[link_id]
    }

    /// Restores the ordering of the vehicles on every link after they have moved.
    pub(crate) fn sort_vehicles(&mut self, vehicles: &VehicleSet) {
        for link in self.links.values_mut() {
            link.sort_vehicles(vehicles);
        }
    }
}
