//! Execution history for incremental builds.
//!
//! This crate captures the state a unit of work observed before it ran,
//! persists the state it left behind after a successful run, and compares the
//! two to explain why a unit of work is (or is not) up-to-date:
//!
//! - [`Fingerprinter`] resolves file trees and hashes their contents.
//! - [`HistoryStore`] keeps one validated binary record per unit of work.
//! - [`ChangeDetector`] turns a before/after comparison into ordered,
//!   human-readable change messages.

#![warn(missing_docs)]

pub mod changes;
pub mod error;
pub mod fingerprint;
pub mod origin;
pub mod state;
pub mod store;

pub use changes::{ChangeDetectionResult, ChangeDetector};
pub use error::HistoryError;
pub use fingerprint::{FileCollectionFingerprint, Fingerprinter, PropertyFingerprints};
pub use origin::{BuildInvocationId, OriginMetadata};
pub use state::{AfterPreviousExecutionState, BeforeExecutionState, InputValues};
pub use store::HistoryStore;
