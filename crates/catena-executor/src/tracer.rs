//! The receipt/tracer boundary: the per-entry outcome stream.

use alloy_primitives::{Address, Bytes};
use auto_impl::auto_impl;

use crate::LogEntry;

/// The collaborator that records per-entry outcomes.
///
/// The executor calls exactly one of the two methods per entry, regardless of which path the
/// entry took.
#[auto_impl(&mut, Box)]
pub trait Tracer {
    /// Records a failed entry.
    fn mark_failed(&mut self, address: Address, gas_spent: u64, output: Bytes, reason: &str);

    /// Records a successful entry.
    fn mark_success(&mut self, address: Address, gas_spent: u64, output: Bytes, logs: &[LogEntry]);
}

/// A tracer that discards every outcome.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpTracer;

impl Tracer for NoOpTracer {
    fn mark_failed(&mut self, _address: Address, _gas_spent: u64, _output: Bytes, _reason: &str) {}

    fn mark_success(
        &mut self,
        _address: Address,
        _gas_spent: u64,
        _output: Bytes,
        _logs: &[LogEntry],
    ) {
    }
}
