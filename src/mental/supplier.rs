use super::channel::{Channel, PerceivedObject};
use super::intersection::supply_conflict_tasks;
use super::task::ChannelTask;
use crate::light::LightState;
use crate::perception::LanePerception;
use crate::Result;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Selects which tasks a driver's mental model considers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaskSettings {
    /// Following the leader.
    pub car_following: bool,
    /// Approaching traffic lights that aren't green.
    pub traffic_lights: bool,
    /// Approaching conflicts, including splits.
    pub conflicts: bool,
    /// Social pressure from the follower.
    pub social: bool,
    /// Scanning ahead and behind.
    pub scan: bool,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            car_following: true,
            traffic_lights: false,
            conflicts: true,
            social: false,
            scan: true,
        }
    }
}

/// The tasks supplied in one perception update, with the channel of every perceived object.
#[derive(Clone, Debug, Default)]
pub struct TaskSet {
    tasks: Vec<ChannelTask>,
    objects: HashMap<PerceivedObject, Channel>,
}

impl TaskSet {
    /// The supplied tasks.
    pub fn tasks(&self) -> &[ChannelTask] {
        &self.tasks
    }

    /// The channel of each perceived object.
    pub fn objects(&self) -> &HashMap<PerceivedObject, Channel> {
        &self.objects
    }

    pub(crate) fn push(&mut self, task: ChannelTask) {
        self.tasks.push(task);
    }

    /// Maps an object to a channel. An object keeps the first channel it's mapped to.
    pub(crate) fn map(&mut self, object: PerceivedObject, channel: Channel) {
        self.objects.entry(object).or_insert(channel);
    }

    pub(crate) fn into_parts(self) -> (Vec<ChannelTask>, HashMap<PerceivedObject, Channel>) {
        (self.tasks, self.objects)
    }
}

/// Supplies the tasks enabled by `settings` for the current perception.
pub fn supply_tasks(settings: &TaskSettings, perception: &LanePerception) -> Result<TaskSet> {
    let mut tasks = TaskSet::default();

    if settings.car_following {
        if let Some(leader) = perception.leader()? {
            tasks.map(PerceivedObject::Vehicle(leader.id), Channel::Front);
        }
        tasks.push(ChannelTask::CarFollowing);
    }

    if settings.traffic_lights {
        let lights = perception.traffic_lights_ahead()?;
        for light in &lights {
            tasks.map(PerceivedObject::TrafficLight(light.object), Channel::Front);
        }
        let network = perception.network();
        let stopping = lights
            .iter()
            .find(|light| network.light(light.object).state() != LightState::Green);
        if let Some(light) = stopping {
            tasks.push(ChannelTask::TrafficLight { light: *light });
        }
    }

    if settings.conflicts {
        supply_conflict_tasks(perception, &mut tasks)?;
    }

    if settings.social {
        if let Some(follower) = perception.follower()? {
            tasks.map(PerceivedObject::Vehicle(follower.id), Channel::Rear);
        }
        tasks.push(ChannelTask::Socio);
    }

    if settings.scan {
        tasks.push(ChannelTask::Scan {
            channel: Channel::Front,
        });
        tasks.push(ChannelTask::Scan {
            channel: Channel::Rear,
        });
    }

    Ok(tasks)
}
