//! Snapshots of a unit of work's inputs and outputs.

use std::collections::BTreeMap;

use kiln_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::fingerprint::PropertyFingerprints;
use crate::origin::OriginMetadata;

/// Hashed scalar input values, keyed by property name.
pub type InputValues = BTreeMap<String, ContentHash>;

/// What a unit of work looks like right before it would run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeforeExecutionState {
    /// Hashed scalar inputs.
    pub input_values: InputValues,
    /// Fingerprints of the declared input files.
    pub input_files: PropertyFingerprints,
    /// Fingerprints of whatever currently sits at the declared output locations.
    pub outputs_before_execution: PropertyFingerprints,
}

/// The durable record of a unit of work's last successful execution.
///
/// Written once per successful completion and replaced wholesale by the next
/// one; never modified in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfterPreviousExecutionState {
    input_values: InputValues,
    input_files: PropertyFingerprints,
    outputs: PropertyFingerprints,
    origin: OriginMetadata,
}

impl AfterPreviousExecutionState {
    /// Records the inputs a run started from together with the outputs it left.
    pub fn new(
        before: &BeforeExecutionState,
        outputs: PropertyFingerprints,
        origin: OriginMetadata,
    ) -> Self {
        Self {
            input_values: before.input_values.clone(),
            input_files: before.input_files.clone(),
            outputs,
            origin,
        }
    }

    /// Hashed scalar inputs of the previous run.
    pub fn input_values(&self) -> &InputValues {
        &self.input_values
    }

    /// Input file fingerprints of the previous run.
    pub fn input_files(&self) -> &PropertyFingerprints {
        &self.input_files
    }

    /// Output fingerprints left behind by the previous run.
    pub fn outputs(&self) -> &PropertyFingerprints {
        &self.outputs
    }

    /// Provenance of the previous run's outputs.
    pub fn origin(&self) -> &OriginMetadata {
        &self.origin
    }
}
