#![warn(missing_docs)]
//! Winner determination for combinatorial airspace slot auctions.
//!
//! Each bid is a list of mutually exclusive requests ("XOR bids"), each request
//! claiming a bundle of indivisible slot items. The engine builds a binary
//! program that accepts at most one request per bid, never books an item twice,
//! respects optional fairness caps, and maximizes the total accepted utility.
//! The program is handed to a [`Backend`], and the solution is read back into a
//! per-bid [`Report`].

/**
 * These are the core data types the engine operates on.
 */
mod types;
pub use types::*;

/**
 * These are implementations of the optimization backend.
 */
mod impls;
pub use impls::*;

/// Parsers for the bid and fairness files
pub mod io;

mod program;
pub use program::*;

mod model;
pub use model::*;

mod fairness;
pub use fairness::add_fairness_constraints;

mod extract;
pub use extract::extract;

mod auction;
pub use auction::SolveSettings;

/// Export of a built program to standard optimization formats
pub mod export;

/// Run configuration for an auction
#[cfg(feature = "serde")]
pub mod config;

// We use non-std collections here for their ordering semantics and performance
/// An insertion-ordered map, used wherever iteration order must be reproducible
pub type Map<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;
/// An insertion-ordered set, used wherever iteration order must be reproducible
pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
