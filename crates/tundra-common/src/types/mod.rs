//! Core types for TundraDB.

mod ids;

pub use ids::PageId;
