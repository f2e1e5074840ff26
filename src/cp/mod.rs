//! Constraint-satisfaction core.
//!
//! Builds one model per relaxation level and searches it.
//!
//! # Components
//!
//! - [`TimetableCpBuilder`]: lesson table, domains, capacity check and
//!   constraint registry for a level
//! - [`SearchEngine`]: backtracking search with static MRV ordering and
//!   forward checking, yielding solutions lazily through [`Solutions`]
//! - [`Deadline`]: cooperative time limit shared by search and drivers
//!
//! # Reference
//! - Dechter (2003), "Constraint Processing", Ch. 5-6
//! - Russell & Norvig (2021), "Artificial Intelligence: A Modern Approach", Ch. 6

mod builder;
mod deadline;
mod search;

pub use builder::{TimetableCpBuilder, TimetableModel};
pub use deadline::Deadline;
pub use search::{SearchEngine, SearchStats, SearchStatus, Solutions};
