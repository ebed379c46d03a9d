//! The virtual machine boundary and the per-entry execution environment.

use alloy_primitives::{Address, Bytes, B256, U256};
use auto_impl::auto_impl;

use crate::{CatenaSpecId, Delta, LogEntry, Tracer, WorldState};

/// The delta header fields exposed to opcodes that read batch context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeltaContext {
    /// The batch number.
    pub sequence_number: u64,
    /// The batch timestamp, in seconds.
    pub timestamp: u64,
    /// The total gas budget of the batch.
    pub gas_limit: u64,
    /// The address credited with the gas fees of the batch.
    pub gas_beneficiary: Address,
    /// The hash of the previous delta in the chain.
    pub previous_delta_hash: B256,
}

impl DeltaContext {
    /// Copies the header fields out of a [`Delta`].
    pub fn from_delta(delta: &Delta) -> Self {
        Self {
            sequence_number: delta.sequence_number,
            timestamp: delta.timestamp,
            gas_limit: delta.gas_limit,
            gas_beneficiary: delta.gas_beneficiary,
            previous_delta_hash: delta.previous_delta_hash,
        }
    }
}

/// The ephemeral execution environment handed to the virtual machine for one entry.
///
/// Constructed fresh per entry, owned by the executor for the duration of that entry's
/// execution, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    /// The resolved sender address.
    pub sender: Address,
    /// The resolved recipient: the receiver account, or the derived deployment address.
    pub recipient: Address,
    /// The value transferred with the entry.
    pub value: U256,
    /// The call input; empty for deployments.
    pub input_data: Bytes,
    /// The code to run: existing account code, or the init-code being deployed.
    pub code: Bytes,
    /// The enclosing delta's header fields.
    pub delta: DeltaContext,
}

/// The virtual machine's result for one call, consumed once by the executor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substate {
    /// The bytes returned by the run: deployed code for deployments, call output otherwise.
    pub output: Bytes,
    /// The run requested an explicit revert.
    pub should_revert: bool,
    /// The run halted with an execution error, consuming all gas.
    pub is_error: bool,
    /// The gas refund accrued by the run.
    pub refund_counter: u64,
    /// Addresses flagged for deletion by self-destruct operations.
    pub destroy_list: Vec<Address>,
    /// Logs emitted by the run.
    pub logs: Vec<LogEntry>,
    /// The gas left unspent by the run; never more than the gas the run was given.
    pub gas_remaining: u64,
}

impl Substate {
    /// A successful run that left `gas_remaining` unspent and produced no output.
    pub fn success(gas_remaining: u64) -> Self {
        Self { gas_remaining, ..Self::default() }
    }

    /// A run that requested an explicit revert, preserving `gas_remaining`.
    pub fn reverted(gas_remaining: u64) -> Self {
        Self { should_revert: true, gas_remaining, ..Self::default() }
    }

    /// A run that halted with an execution error, consuming all gas.
    pub fn error() -> Self {
        Self { is_error: true, ..Self::default() }
    }

    /// Whether the run failed, either by explicit revert or by execution error.
    pub fn is_failure(&self) -> bool {
        self.should_revert || self.is_error
    }
}

/// Code resolved for an account, as cached by the virtual machine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeInfo {
    /// The account code; empty for accounts without code.
    pub code: Bytes,
    /// The digest of the code.
    pub code_hash: B256,
}

impl CodeInfo {
    /// Builds a [`CodeInfo`] for the given code, computing its digest.
    pub fn new(code: Bytes) -> Self {
        let code_hash = B256::from(*blake3::hash(&code).as_bytes());
        Self { code, code_hash }
    }
}

/// The bytecode interpreter collaborator.
///
/// The virtual machine mutates the world state through the same [`WorldState`] interface the
/// executor uses, so a snapshot taken before the run covers every nested mutation.
#[auto_impl(&mut, Box)]
pub trait VirtualMachine {
    /// Executes a single call or create and returns its [`Substate`].
    ///
    /// `entry_gas` is the gas available to the run, i.e. the entry's declared limit minus its
    /// intrinsic cost.
    fn run(
        &mut self,
        entry_gas: u64,
        env: &ExecutionEnvironment,
        state: &mut dyn WorldState,
        tracer: &mut dyn Tracer,
    ) -> Substate;

    /// Resolves the (possibly cached) code of an account.
    fn get_cached_code(
        &mut self,
        state: &mut dyn WorldState,
        address: Address,
        spec: CatenaSpecId,
    ) -> CodeInfo;
}
