use super::{BidId, RequestId};

/// A set of (bid, request) pairs that share one acceptance cap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FairnessGroup(Vec<(BidId, RequestId)>);

impl FairnessGroup {
    /// The pairs in this group, in the order they were listed
    pub fn pairs(&self) -> &[(BidId, RequestId)] {
        &self.0
    }

    /// The number of pairs in this group
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the group lists no pairs
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(BidId, RequestId)> for FairnessGroup {
    fn from_iter<I: IntoIterator<Item = (BidId, RequestId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The content of a fairness file: the time horizon and the groups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fairness {
    /// The number of discrete timeslots `T`
    pub horizon: u32,
    /// The groups, in file order
    pub groups: Vec<FairnessGroup>,
}
