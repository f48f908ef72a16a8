use crate::Set;
use std::fmt;

/// An indivisible slot resource.
///
/// The scenario generator packs a grid cell and a timeslot into this integer;
/// the engine never looks inside it and only compares or hashes it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Item(pub u64);

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Item {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The largest utility a request may carry.
///
/// Utilities enter the objective as `f64`, which represents every integer up to
/// 2^53 exactly.
pub const MAX_UTILITY: u64 = 1 << 53;

/// The reasons a request can be rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The same item is listed more than once
    #[error("item {0} appears more than once in the request")]
    DuplicateItem(Item),

    /// The utility cannot be represented exactly in the objective
    #[error("utility {0} exceeds the largest supported utility {max}", max = MAX_UTILITY)]
    Utility(u64),
}

/// One all-or-nothing alternative of a bid: a bundle of items and the utility
/// gained if every one of them is allocated to the bid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Request {
    items: Set<Item>,
    utility: u64,
}

impl Request {
    /// Creates a new request, rejecting repeated items and utilities above
    /// [`MAX_UTILITY`].
    pub fn new(
        items: impl IntoIterator<Item = impl Into<Item>>,
        utility: u64,
    ) -> Result<Self, RequestError> {
        if utility > MAX_UTILITY {
            return Err(RequestError::Utility(utility));
        }
        let mut set = Set::default();
        for item in items.into_iter().map(Into::into) {
            if !set.insert(item) {
                return Err(RequestError::DuplicateItem(item));
            }
        }
        Ok(Self {
            items: set,
            utility,
        })
    }

    /// The items this request claims, in the order they were listed
    pub fn items(&self) -> &Set<Item> {
        &self.items
    }

    /// The utility earned if this request is satisfied
    pub fn utility(&self) -> u64 {
        self.utility
    }
}

/// An XOR bid: at most one of its requests may be honored.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Bid {
    requests: Vec<Request>,
}

impl Bid {
    /// Creates a bid from its alternatives, keeping their order
    pub fn new<I: IntoIterator<Item = Request>>(requests: I) -> Self {
        Self {
            requests: requests.into_iter().collect(),
        }
    }

    /// The alternatives of this bid
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Every item referenced by any alternative, each listed once in first-seen order
    pub fn items(&self) -> Set<Item> {
        self.requests
            .iter()
            .flat_map(|request| request.items.iter().copied())
            .collect()
    }
}

impl FromIterator<Request> for Bid {
    fn from_iter<I: IntoIterator<Item = Request>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_item() {
        assert_eq!(
            Request::new([1u64, 2, 1], 4),
            Err(RequestError::DuplicateItem(Item(1)))
        );
    }

    #[test]
    fn test_utility_bound() {
        assert_eq!(Request::new([1u64], MAX_UTILITY).unwrap().utility(), MAX_UTILITY);
        assert_eq!(
            Request::new([1u64], u64::MAX),
            Err(RequestError::Utility(u64::MAX))
        );
    }

    #[test]
    fn test_bid_items_deduplicated() {
        let bid = Bid::new([
            Request::new([3u64, 1], 5).unwrap(),
            Request::new([1u64, 2], 7).unwrap(),
        ]);
        let items = bid.items().into_iter().collect::<Vec<_>>();
        assert_eq!(items, vec![Item(3), Item(1), Item(2)]);
    }
}
