//! Shared identifier, calendar, and collection types.

pub mod collections;
pub mod identifiers;
pub mod month;

pub use identifiers::{ProjectId, TaskId};
pub use month::MonthKey;
