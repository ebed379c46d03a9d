//! Execution outcomes, receipts and batch-fatal errors.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::{LogEntry, StateError, ValidationError};

/// The tagged outcome of one entry.
///
/// Entry failures are terminal for the entry but never for the delta: the executor records a
/// failure receipt and proceeds to the next entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The entry executed successfully.
    Success {
        /// The gas charged to the entry after refunds.
        gas_spent: u64,
        /// The bytes returned by the run.
        output: Bytes,
        /// The logs emitted by the run.
        logs: Vec<LogEntry>,
    },
    /// The virtual machine requested a revert or halted with an error; every mutation after the
    /// entry snapshot was undone.
    Reverted {
        /// The gas charged to the entry.
        gas_spent: u64,
        /// The revert payload returned by the run.
        output: Bytes,
    },
    /// A validation precondition failed before any execution; the entry's full declared gas
    /// limit was consumed.
    QuickFail {
        /// The failed precondition.
        reason: ValidationError,
    },
    /// The derived deployment address was already occupied; the entry's full declared gas limit
    /// was consumed and no code was installed.
    Collision {
        /// The occupied deployment address.
        address: Address,
    },
    /// A successful deployment run could not afford the code deposit under a spec that charges
    /// it; the run was undone and the entry's full declared gas limit was consumed.
    OutOfGas,
}

impl EntryOutcome {
    /// Whether the entry succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// The per-entry record produced for the receipt/tracer stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReceipt {
    /// Whether the entry succeeded.
    pub success: bool,
    /// The gas charged to the entry.
    pub gas_spent: u64,
    /// The delta's total gas consumption after this entry.
    pub cumulative_gas_used: u64,
    /// The bytes returned by the run; empty for quick-failed entries.
    pub output: Bytes,
    /// The logs emitted by the run; empty for failed entries.
    pub logs: Vec<LogEntry>,
    /// A human-readable failure reason, when the entry failed.
    pub failure: Option<String>,
}

/// The finalized result of executing one delta.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaOutcome {
    /// The total gas consumed by the batch.
    pub gas_used: u64,
    /// The state root produced by the batch.
    pub state_root: B256,
    /// One receipt per entry, in sequence order.
    pub receipts: Vec<EntryReceipt>,
}

/// A batch-fatal failure: the delta is aborted, nothing is persisted and the canonical chain
/// does not advance.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeltaExecutionError {
    /// The recomputed state root does not match the root claimed by the delta. This is a
    /// consensus mismatch: the batch must not be persisted.
    #[error("state root mismatch: claimed={claimed}, computed={computed}")]
    StateRootMismatch {
        /// The root claimed by the delta header.
        claimed: B256,
        /// The root computed after applying every entry.
        computed: B256,
    },
    /// The virtual machine reported more unspent gas than the run was given.
    #[error("virtual machine gas accounting violation: remaining={remaining} > entry_gas={entry_gas}")]
    GasAccounting {
        /// The unspent gas reported by the virtual machine.
        remaining: u64,
        /// The gas the run was given.
        entry_gas: u64,
    },
    /// The world state collaborator violated its contract.
    #[error("world state failure: {0}")]
    State(#[from] StateError),
}
