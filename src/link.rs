use crate::{ConflictId, ConflictSet, LinkId, NodeId, TrafficLightId, VehicleId, VehicleSet};

/// A link represents a single lane of traffic between two nodes.
#[derive(Clone, Debug)]
pub struct Link {
    /// The link ID.
    id: LinkId,
    /// The node the link starts at.
    start: NodeId,
    /// The node the link ends at.
    end: NodeId,
    /// The length of the link in m.
    length: f64,
    /// The conflicts on the link, ordered by position.
    conflicts: Vec<ConflictId>,
    /// The traffic lights on the link.
    lights: Vec<TrafficLightId>,
    /// The vehicles on the link, ordered by position.
    vehicles: Vec<VehicleId>,
}

/// The attributes of a link.
#[derive(Clone, Copy, Debug)]
pub struct LinkAttributes {
    /// The node the link starts at.
    pub start: NodeId,
    /// The node the link ends at.
    pub end: NodeId,
    /// The length of the link in m.
    pub length: f64,
}

impl Link {
    /// Creates a new link.
    pub(crate) fn new(id: LinkId, attribs: &LinkAttributes) -> Self {
        Self {
            id,
            start: attribs.start,
            end: attribs.end,
            length: attribs.length,
            conflicts: vec![],
            lights: vec![],
            vehicles: vec![],
        }
    }

    /// Gets the link's ID.
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// The node the link starts at.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The node the link ends at.
    pub fn end(&self) -> NodeId {
        self.end
    }

    /// Gets the length of the link in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The conflicts on the link, ordered by position.
    pub fn conflicts(&self) -> &[ConflictId] {
        &self.conflicts
    }

    /// The traffic lights on the link.
    pub fn lights(&self) -> &[TrafficLightId] {
        &self.lights
    }

    /// The vehicles on the link, ordered from upstream to downstream.
    pub fn vehicles(&self) -> &[VehicleId] {
        &self.vehicles
    }

    /// Adds a conflict, keeping the conflicts ordered by position.
    pub(crate) fn add_conflict(&mut self, conflicts: &ConflictSet, id: ConflictId) {
        let pos = conflicts[id].pos();
        let idx = self
            .conflicts
            .iter()
            .position(|c| conflicts[*c].pos() > pos)
            .unwrap_or(self.conflicts.len());
        self.conflicts.insert(idx, id);
    }

    /// Adds a traffic light.
    pub(crate) fn add_light(&mut self, id: TrafficLightId) {
        self.lights.push(id);
    }

    /// Inserts the vehicle with the given ID into the link.
    pub(crate) fn insert_vehicle(&mut self, vehicles: &VehicleSet, id: VehicleId) {
        let veh_pos = vehicles[id].pos_mid();
        let idx = self
            .vehicles
            .iter()
            .map(|id| vehicles[*id].pos_mid())
            .position(|pos| pos > veh_pos)
            .unwrap_or(self.vehicles.len());
        self.vehicles.insert(idx, id);
    }

    /// Removes the vehicle with the given ID from the link.
    pub(crate) fn remove_vehicle(&mut self, id: VehicleId) {
        if let Some(idx) = self.vehicles.iter().rposition(|v| *v == id) {
            self.vehicles.remove(idx);
        }
    }

    /// Restores the ordering of the vehicles after they have moved.
    pub(crate) fn sort_vehicles(&mut self, vehicles: &VehicleSet) {
        self.vehicles
            .sort_by(|a, b| vehicles[*a].pos_mid().total_cmp(&vehicles[*b].pos_mid()));
    }
}
