//! Shared foundational types used across the Kiln build core.
//!
//! This crate provides content hashing, unit-of-work identifiers, and the
//! internal error type used to report violated invariants.

#![warn(missing_docs)]

pub mod hash;
pub mod result;
pub mod work_id;

pub use hash::ContentHash;
pub use result::{InternalError, KilnResult};
pub use work_id::WorkId;
