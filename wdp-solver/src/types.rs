mod bid;
pub use bid::*;

mod fairness;
pub use fairness::*;

mod instance;
pub use instance::*;

mod outcome;
pub use outcome::*;

/// The position of a bid within the loaded auction
pub type BidId = usize;

/// The position of a request within its bid
pub type RequestId = usize;
