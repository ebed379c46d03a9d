use alloy_primitives::{Address, Bytes};

use crate::{LogEntry, Tracer};

/// A per-entry outcome recorded by [`RecordingTracer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    /// The entry failed.
    Failed {
        /// The recipient or deployment address of the entry.
        address: Address,
        /// The gas charged to the entry.
        gas_spent: u64,
        /// The bytes returned by the run, if any.
        output: Bytes,
        /// The failure reason.
        reason: String,
    },
    /// The entry succeeded.
    Success {
        /// The recipient or deployment address of the entry.
        address: Address,
        /// The gas charged to the entry.
        gas_spent: u64,
        /// The bytes returned by the run.
        output: Bytes,
        /// The logs emitted by the run.
        logs: Vec<LogEntry>,
    },
}

impl TraceEvent {
    /// Whether this event records a successful entry.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A tracer that records every outcome, one event per entry.
#[derive(Clone, Debug, Default)]
pub struct RecordingTracer {
    /// The recorded events, in entry order.
    pub events: Vec<TraceEvent>,
}

impl Tracer for RecordingTracer {
    fn mark_failed(&mut self, address: Address, gas_spent: u64, output: Bytes, reason: &str) {
        self.events.push(TraceEvent::Failed {
            address,
            gas_spent,
            output,
            reason: reason.to_string(),
        });
    }

    fn mark_success(&mut self, address: Address, gas_spent: u64, output: Bytes, logs: &[LogEntry]) {
        self.events.push(TraceEvent::Success {
            address,
            gas_spent,
            output,
            logs: logs.to_vec(),
        });
    }
}
