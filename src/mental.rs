//! The driver's mental model: tasks compete for attention over perception channels.

pub use anticipation::DelayedPerception;
pub use attention::AttentionMatrix;
pub use channel::{Channel, PerceivedObject};
pub use intersection::{group_conflicts, upstream_nodes, ConflictGroup};
pub use supplier::{supply_tasks, TaskSet, TaskSettings};
pub use task::{car_following_demand, ChannelTask};

use crate::parameters::ParameterType;
use crate::perception::LanePerception;
use crate::util::Interval;
use crate::{Error, Result};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

mod anticipation;
mod attention;
mod channel;
mod intersection;
mod supplier;
mod task;

/// The largest demand a channel may have after combining its tasks.
/// Demands closer to 1 make the attention matrix ill-conditioned.
const MAX_CHANNEL_DEMAND: f64 = 0.999999;

/// The mental model of a single driver.
///
/// Every update supplies the current tasks, combines their demand per channel,
/// and divides the driver's attention over the channels. Perceived objects are
/// then delayed according to how poorly their channel is attended.
#[derive(Clone, Debug)]
pub struct ChannelMental {
    /// The tasks the driver considers.
    settings: TaskSettings,
    /// The channels of the last update, in the order of the attention matrix.
    channels: Vec<Channel>,
    /// The division of attention in the last update.
    matrix: AttentionMatrix,
    /// The channel each perceived object was assigned to in the last update.
    objects: HashMap<PerceivedObject, Channel>,
    /// The perception delay of a fully attended and an unattended channel, in s.
    tau: Interval<f64>,
}

/// A read-only copy of the state of a [ChannelMental], for inspection and logging.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttentionSnapshot {
    pub channels: Vec<Channel>,
    pub demand: Vec<f64>,
    pub attention: Vec<f64>,
    pub anticipation_reliance: Vec<f64>,
}

impl ChannelMental {
    /// Creates a mental model that hasn't perceived anything yet.
    pub fn new(settings: TaskSettings) -> Self {
        let tau_min = ParameterType::TauMin.default_value().unwrap_or(0.0);
        let tau_max = ParameterType::TauMax.default_value().unwrap_or(tau_min);
        Self {
            settings,
            channels: vec![],
            matrix: AttentionMatrix::default(),
            objects: HashMap::new(),
            tau: Interval::new(tau_min, tau_max),
        }
    }

    /// The tasks the driver considers.
    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    /// Updates the mental state from the current perception.
    /// On error, the state of the previous update is retained.
    pub fn update(&mut self, perception: &LanePerception) -> Result<()> {
        let params = perception.parameters();
        let tau = Interval::new(
            params.get(ParameterType::TauMin)?,
            params.get(ParameterType::TauMax)?,
        );

        let (tasks, objects) = supply_tasks(&self.settings, perception)?.into_parts();

        // Tasks on the same channel combine as independent demands
        let mut idle = BTreeMap::<Channel, f64>::new();
        for task in &tasks {
            let demand = task.demand(perception)?;
            trace!(
                "Task {} on {:?} has demand {:.3}",
                task.id(),
                task.channel(),
                demand
            );
            *idle.entry(task.channel()).or_insert(1.0) *= 1.0 - demand;
        }

        let (channels, demand): (Vec<_>, Vec<_>) = idle
            .into_iter()
            .map(|(channel, idle)| (channel, channel_demand(idle)))
            .unzip();
        let matrix = AttentionMatrix::new(&demand)?;

        debug!(
            "Vehicle {:?} divides attention over {} channels at task saturation {:.3}",
            perception.ego().id(),
            channels.len(),
            demand.iter().sum::<f64>()
        );

        self.channels = channels;
        self.matrix = matrix;
        self.objects = objects;
        self.tau = tau;
        Ok(())
    }

    /// The channels of the last update.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// The channel the object was assigned to in the last update.
    pub fn channel_of(&self, object: PerceivedObject) -> Option<Channel> {
        self.objects.get(&object).copied()
    }

    fn index_of(&self, channel: Channel) -> Option<usize> {
        self.channels.iter().position(|c| *c == channel)
    }

    /// The task demand of a channel; zero if the channel has no tasks.
    pub fn demand(&self, channel: Channel) -> f64 {
        self.index_of(channel)
            .map_or(0.0, |i| self.matrix.demand(i))
    }

    /// The fraction of time spent on a channel.
    pub fn attention(&self, channel: Channel) -> f64 {
        self.index_of(channel)
            .map_or(0.0, |i| self.matrix.attention(i))
    }

    /// The demand of a channel that is not met by attention.
    pub fn anticipation_reliance(&self, channel: Channel) -> f64 {
        self.index_of(channel)
            .map_or(0.0, |i| self.matrix.anticipation_reliance(i))
    }

    /// The anticipation reliance of a channel relative to its demand.
    /// A channel without tasks is not attended at all.
    pub fn deterioration(&self, channel: Channel) -> f64 {
        self.index_of(channel)
            .map_or(1.0, |i| self.matrix.deterioration(i))
    }

    /// The perception delay of the channel, which grows with its deterioration.
    pub fn channel_perception_delay(&self, channel: Channel) -> f64 {
        self.tau.lerp(self.deterioration(channel).clamp(0.0, 1.0))
    }

    /// The perception delay of an object, in s.
    ///
    /// Fails if the object was not assigned a channel in the last update.
    pub fn perception_delay(&self, object: PerceivedObject) -> Result<f64> {
        let channel = self
            .channel_of(object)
            .ok_or(Error::UnmappedObject(object))?;
        Ok(self.channel_perception_delay(channel))
    }

    /// The summed demand of all channels.
    pub fn task_saturation(&self) -> f64 {
        self.matrix.demands().iter().sum()
    }

    /// Copies the state of the last update.
    pub fn snapshot(&self) -> AttentionSnapshot {
        AttentionSnapshot {
            channels: self.channels.clone(),
            demand: self.matrix.demands().to_vec(),
            attention: self.matrix.attentions().to_vec(),
            anticipation_reliance: self.matrix.anticipation_reliances().to_vec(),
        }
    }
}

/// The demand of a channel given the product of `1 - d` over its tasks.
fn channel_demand(idle: f64) -> f64 {
    f64::min(1.0 - idle, MAX_CHANNEL_DEMAND)
}

impl Default for ChannelMental {
    fn default() -> Self {
        Self::new(TaskSettings::default())
    }
}
