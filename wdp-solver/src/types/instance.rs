use super::{Bid, BidId, Fairness, FairnessGroup, RequestId};

/// The reasons an auction instance can be rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InstanceError {
    /// A fairness group names a (bid, request) pair that does not exist
    #[error("fairness group {group} references bid {bid}, request {request}, which does not exist")]
    Reference {
        /// The offending group
        group: usize,
        /// The bid it referenced
        bid: BidId,
        /// The request it referenced
        request: RequestId,
    },

    /// The fairness constant must be a finite fraction in [0, 1]
    #[error("fairness constant {0} is not within [0, 1]")]
    FairnessConst(f64),
}

/// A fully loaded, validated auction.
///
/// The instance is immutable once constructed; building and solving only ever
/// borrow it.
#[derive(Debug, Clone)]
pub struct Instance {
    bids: Vec<Bid>,
    fairness: Fairness,
    fairness_const: f64,
    cap: u64,
}

impl Instance {
    /// Validate the bids against the fairness groups and derive the density cap.
    pub fn new(
        bids: Vec<Bid>,
        fairness: Fairness,
        fairness_const: f64,
    ) -> Result<Self, InstanceError> {
        if !fairness_const.is_finite() || !(0.0..=1.0).contains(&fairness_const) {
            return Err(InstanceError::FairnessConst(fairness_const));
        }

        for (group, pairs) in fairness.groups.iter().enumerate() {
            for &(bid, request) in pairs.pairs() {
                let exists = bids
                    .get(bid)
                    .is_some_and(|b| request < b.requests().len());
                if !exists {
                    return Err(InstanceError::Reference {
                        group,
                        bid,
                        request,
                    });
                }
            }
        }

        // Both factors are non-negative, so flooring leaves a non-negative integer
        let cap = (fairness.horizon as f64 * fairness_const).floor() as u64;

        Ok(Self {
            bids,
            fairness,
            fairness_const,
            cap,
        })
    }

    /// An instance without any fairness groups
    pub fn without_fairness(bids: Vec<Bid>) -> Self {
        Self {
            bids,
            fairness: Fairness::default(),
            fairness_const: 0.0,
            cap: 0,
        }
    }

    /// The bids, indexed by their bid id
    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// The fairness groups, indexed by their group id
    pub fn groups(&self) -> &[FairnessGroup] {
        &self.fairness.groups
    }

    /// The number of timeslots `T`
    pub fn horizon(&self) -> u32 {
        self.fairness.horizon
    }

    /// The configured fraction of the horizon a group may be served
    pub fn fairness_const(&self) -> f64 {
        self.fairness_const
    }

    /// The density cap `floor(T * fairness_const)`
    pub fn cap(&self) -> u64 {
        self.cap
    }

    /// Iterate over every (bid, request) pair with its utility
    pub fn pairs(&self) -> impl Iterator<Item = (BidId, RequestId, u64)> + '_ {
        self.bids.iter().enumerate().flat_map(|(bid_id, bid)| {
            bid.requests()
                .iter()
                .enumerate()
                .map(move |(request_id, request)| (bid_id, request_id, request.utility()))
        })
    }
}
