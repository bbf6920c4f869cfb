use crate::util::Interval;
use crate::{ConflictId, LinkId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The geometric relation between two conflicting links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConflictType {
    /// The links cross each other.
    Crossing,
    /// The links converge into one.
    Merge,
    /// The links diverge from a common origin.
    Split,
}

/// One side of a conflict between two links.
///
/// Conflicts come in pairs, one on each of the conflicting links,
/// each referring to the other through [Conflict::other].
#[derive(Clone, Debug)]
pub struct Conflict {
    /// The conflict ID.
    id: ConflictId,
    /// The link the conflict is on.
    link_id: LinkId,
    /// The longitudinal position of the start of the conflict, in m.
    pos: f64,
    /// The length of the conflict area along the link, in m.
    length: f64,
    /// The kind of conflict.
    conflict_type: ConflictType,
    /// The conflict on the other link.
    other: ConflictId,
}

/// The attributes of a conflict pair.
#[derive(Clone, Copy, Debug)]
pub struct ConflictAttributes {
    /// The kind of conflict.
    pub conflict_type: ConflictType,
    /// The two conflicting links.
    pub links: [LinkId; 2],
    /// The position where the conflict starts on each link, in m.
    pub positions: [f64; 2],
    /// The length of the conflict area, in m.
    pub length: f64,
}

impl Conflict {
    /// Creates one side of a conflict pair.
    pub(crate) fn new(
        id: ConflictId,
        attribs: &ConflictAttributes,
        side: usize,
        other: ConflictId,
    ) -> Self {
        Self {
            id,
            link_id: attribs.links[side],
            pos: attribs.positions[side],
            length: attribs.length,
            conflict_type: attribs.conflict_type,
            other,
        }
    }

    /// Gets the conflict's ID.
    pub fn id(&self) -> ConflictId {
        self.id
    }

    /// The link the conflict is on.
    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    /// The longitudinal position of the start of the conflict, in m.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The length of the conflict area, in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The longitudinal extent of the conflict along its link.
    pub fn extent(&self) -> Interval<f64> {
        Interval::new(self.pos, self.pos + self.length)
    }

    /// The kind of conflict.
    pub fn conflict_type(&self) -> ConflictType {
        self.conflict_type
    }

    /// Whether this is a split conflict.
    pub fn is_split(&self) -> bool {
        self.conflict_type == ConflictType::Split
    }

    /// The paired conflict on the other link.
    pub fn other(&self) -> ConflictId {
        self.other
    }

    pub(crate) fn set_other(&mut self, other: ConflictId) {
        self.other = other;
    }
}
