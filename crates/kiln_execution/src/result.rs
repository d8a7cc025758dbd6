//! Result values produced by the pipeline.

use kiln_history::{OriginMetadata, PropertyFingerprints};

use crate::outcome::ExecutionOutcome;

/// What the steps below the decision step report after running a unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResult {
    outcome: ExecutionOutcome,
    final_outputs: PropertyFingerprints,
    origin: OriginMetadata,
}

impl SnapshotResult {
    /// Creates a snapshot result.
    pub fn new(
        outcome: ExecutionOutcome,
        final_outputs: PropertyFingerprints,
        origin: OriginMetadata,
    ) -> Self {
        Self {
            outcome,
            final_outputs,
            origin,
        }
    }

    /// The outcome reported by the action.
    pub fn outcome(&self) -> ExecutionOutcome {
        self.outcome
    }

    /// Returns `true` if the outputs were restored rather than produced.
    pub fn is_reused(&self) -> bool {
        self.outcome.is_reused()
    }

    /// Output fingerprints captured after the action ran.
    pub fn final_outputs(&self) -> &PropertyFingerprints {
        &self.final_outputs
    }

    /// Provenance of the captured outputs.
    pub fn origin_metadata(&self) -> &OriginMetadata {
        &self.origin
    }
}

/// The result of one execution attempt.
///
/// Exactly one of the two paths is taken per attempt. A reused result
/// carries the previous run's outputs and origin verbatim. An executed result
/// carries the reasons that triggered execution and, unchanged, everything
/// the lower steps reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpToDateResult {
    /// Nothing changed; the previous outputs are current.
    Reused {
        /// Output fingerprints recorded by the previous run.
        outputs: PropertyFingerprints,
        /// Origin recorded by the previous run.
        origin: OriginMetadata,
    },
    /// The unit of work was executed.
    Executed {
        /// Why execution was necessary, in detection order.
        reasons: Vec<String>,
        /// What the lower steps produced.
        snapshot: SnapshotResult,
    },
}

impl UpToDateResult {
    /// The reasons that caused execution; empty when reused.
    pub fn execution_reasons(&self) -> &[String] {
        match self {
            UpToDateResult::Reused { .. } => &[],
            UpToDateResult::Executed { reasons, .. } => reasons,
        }
    }

    /// The output fingerprints now considered current.
    pub fn final_outputs(&self) -> &PropertyFingerprints {
        match self {
            UpToDateResult::Reused { outputs, .. } => outputs,
            UpToDateResult::Executed { snapshot, .. } => snapshot.final_outputs(),
        }
    }

    /// The origin of the outputs now considered current.
    pub fn origin_metadata(&self) -> &OriginMetadata {
        match self {
            UpToDateResult::Reused { origin, .. } => origin,
            UpToDateResult::Executed { snapshot, .. } => snapshot.origin_metadata(),
        }
    }

    /// How the attempt ended.
    pub fn outcome(&self) -> ExecutionOutcome {
        match self {
            UpToDateResult::Reused { .. } => ExecutionOutcome::UpToDate,
            UpToDateResult::Executed { snapshot, .. } => snapshot.outcome(),
        }
    }

    /// Returns `true` if the outputs were not produced by this attempt's action.
    pub fn is_reused(&self) -> bool {
        match self {
            UpToDateResult::Reused { .. } => true,
            UpToDateResult::Executed { snapshot, .. } => snapshot.is_reused(),
        }
    }
}
