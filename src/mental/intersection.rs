//! Grouping of the conflicts ahead by their shared upstream approach.

use super::channel::{Channel, PerceivedObject};
use super::supplier::TaskSet;
use super::task::ChannelTask;
use crate::network::Network;
use crate::parameters::ParameterType;
use crate::perception::LanePerception;
use crate::util::DistancedObject;
use crate::{ConflictId, LinkId, NodeId, Result};
use itertools::Itertools;
use log::debug;
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// A set of conflicts whose conflicting traffic comes from a common approach.
#[derive(Clone, Debug, Default)]
pub struct ConflictGroup {
    /// The conflicts in the group, nearest first.
    pub conflicts: BTreeSet<DistancedObject<ConflictId>>,
    /// The nodes upstream of any of the conflicts.
    pub nodes: BTreeSet<NodeId>,
}

impl ConflictGroup {
    fn absorb(&mut self, other: ConflictGroup) {
        self.conflicts.extend(other.conflicts);
        self.nodes.extend(other.nodes);
    }
}

/// Finds the nodes upstream of a conflict, against the direction of travel.
///
/// Branches are followed into merging links, but a branch is abandoned at a node
/// from which another link diverges, without including that node.
///
/// # Parameters
/// * `network` - The road network
/// * `link_id` - The link the conflict is on
/// * `distance` - The distance from the conflict to the end of the link, negative
///   if the conflict lies before the end of the link
/// * `x0` - The maximum distance upstream of the conflict to search
pub fn upstream_nodes(network: &Network, link_id: LinkId, distance: f64, x0: f64) -> BTreeSet<NodeId> {
    let mut nodes = BTreeSet::new();
    walk_upstream(network, link_id, distance, x0, &mut nodes);
    nodes
}

fn walk_upstream(
    network: &Network,
    link_id: LinkId,
    distance: f64,
    x0: f64,
    nodes: &mut BTreeSet<NodeId>,
) {
    let link = network.link(link_id);
    let next_distance = distance + link.length();
    if next_distance > x0 {
        return;
    }

    let start = network.node(link.start());
    if start.links_out().iter().any(|other| *other != link_id) {
        return;
    }

    nodes.insert(start.id());
    for up in start.links_in() {
        walk_upstream(network, *up, next_distance, x0, nodes);
    }
}

/// The upstream nodes of the conflicting approach to the given conflict.
fn conflicting_approach(network: &Network, conflict_id: ConflictId, x0: f64) -> BTreeSet<NodeId> {
    let other = network.conflict(network.conflict(conflict_id).other());
    let length = network.link(other.link_id()).length();
    upstream_nodes(network, other.link_id(), other.pos() - length, x0)
}

/// Partitions the conflicts into groups whose conflicting approaches share an upstream node,
/// directly or through other conflicts.
///
/// # Parameters
/// * `network` - The road network
/// * `conflicts` - The conflicts on the ego's path, nearest first
/// * `x0` - The maximum distance upstream of a conflict to search
pub fn group_conflicts(
    network: &Network,
    conflicts: &[DistancedObject<ConflictId>],
    x0: f64,
) -> Vec<ConflictGroup> {
    let mut groups: Vec<ConflictGroup> = vec![];

    for conflict in conflicts {
        let nodes = conflicting_approach(network, conflict.object, x0);
        let matches: SmallVec<[usize; 4]> = groups
            .iter()
            .positions(|group| !group.nodes.is_disjoint(&nodes))
            .collect();

        let Some((&first, rest)) = matches.split_first() else {
            groups.push(ConflictGroup {
                conflicts: BTreeSet::from([*conflict]),
                nodes,
            });
            continue;
        };

        // Indices are ascending, so removing from the back keeps `first` valid
        for &idx in rest.iter().rev() {
            let bridged = groups.remove(idx);
            debug!(
                "Conflict {:?} bridges groups of {} and {} conflicts",
                conflict.object,
                groups[first].conflicts.len(),
                bridged.conflicts.len()
            );
            groups[first].absorb(bridged);
        }
        let group = &mut groups[first];
        group.conflicts.insert(*conflict);
        group.nodes.extend(nodes);
    }

    groups
}

/// Adds the tasks of the conflicts ahead, and maps the conflicts and the vehicles
/// approaching them to channels.
///
/// Split conflicts become car-following tasks on the front channel. Each remaining
/// group becomes a conflict task and a scan task on the channel of its nearest conflict.
pub(crate) fn supply_conflict_tasks(perception: &LanePerception, tasks: &mut TaskSet) -> Result<()> {
    let network = perception.network();
    let x0 = perception.parameters().get(ParameterType::Lookahead)?;
    let conflicts = perception.conflicts_ahead()?;

    for group in group_conflicts(network, &conflicts, x0) {
        let mut remaining = Vec::with_capacity(group.conflicts.len());

        for conflict in group.conflicts {
            if !network.conflict(conflict.object).is_split() {
                remaining.push(conflict);
                continue;
            }
            tasks.map(PerceivedObject::Conflict(conflict.object), Channel::Front);
            if let Some(leader) = perception.vehicle_beyond_split(conflict.object)? {
                tasks.map(PerceivedObject::Vehicle(leader.id), Channel::Front);
            }
            tasks.push(ChannelTask::SplitCarFollowing { split: conflict });
        }

        let Some(nearest) = remaining.first() else {
            continue;
        };
        let channel = Channel::Conflict(nearest.object);
        for conflict in &remaining {
            tasks.map(PerceivedObject::Conflict(conflict.object), channel);
            if let Some(vehicle) = perception.conflicting_vehicle(conflict.object)? {
                tasks.map(PerceivedObject::Vehicle(vehicle.id), channel);
            }
        }
        tasks.push(ChannelTask::ConflictGroup {
            channel,
            conflicts: remaining,
        });
        tasks.push(ChannelTask::Scan { channel });
    }

    Ok(())
}
