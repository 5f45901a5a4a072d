//! # tundra-common
//!
//! Common types and constants for TundraDB.
//!
//! This crate provides the foundational pieces shared across TundraDB
//! components:
//!
//! - **Types**: the core page identifier (`PageId`)
//! - **Constants**: page-size limits and buffer-pool sizing defaults
//!
//! ## Example
//!
//! ```rust
//! use tundra_common::types::PageId;
//!
//! let page = PageId::new(42);
//! assert!(page.is_valid());
//! assert_eq!(page.next(), PageId::new(43));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use types::PageId;
