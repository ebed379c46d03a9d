//! The delta executor: orchestrates validation, environment construction, virtual machine
//! invocation, commit/rollback, refunds and beneficiary payment for every entry of a delta.

use alloy_primitives::{Address, Bytes, U256};
use tracing::{debug, error, trace};

use crate::{
    code_deposit_gas, entry_refund, intrinsic_gas, validate_entry, CatenaSpecId, Delta,
    DeltaContext, DeltaExecutionError, DeltaOutcome, EntryOutcome, EntryReceipt,
    ExecutionEnvironment, LogEntry, PublicEntry, SnapshotId, Substate, Tracer, VirtualMachine,
    WorldState,
};

/// Selects how a delta's results are finalized after all entries are processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Replay a received delta: verify the claimed state root and persist the resulting tree.
    /// A root mismatch aborts the batch without persisting anything.
    Commit,
    /// Produce a candidate delta: write the computed root back into the delta header, then
    /// discard every state change so that candidate construction has no side effects.
    Candidate,
}

/// The delta executor.
///
/// Owns exclusively-injected handles to the world state, the virtual machine and the tracer;
/// there is no ambient global state. Execution of a single delta is single-threaded and
/// strictly sequential: later entries observe the nonce and balance effects of earlier ones.
#[derive(Debug)]
pub struct DeltaExecutor<S, V, T> {
    state: S,
    vm: V,
    tracer: T,
    spec: CatenaSpecId,
}

impl<S, V, T> DeltaExecutor<S, V, T> {
    /// Creates a new executor over the given collaborators and rule set.
    pub const fn new(state: S, vm: V, tracer: T, spec: CatenaSpecId) -> Self {
        Self { state, vm, tracer, spec }
    }

    /// The active rule set.
    pub const fn spec(&self) -> CatenaSpecId {
        self.spec
    }

    /// A shared reference to the world state handle.
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Consumes the executor, returning its collaborators.
    pub fn into_parts(self) -> (S, V, T) {
        (self.state, self.vm, self.tracer)
    }
}

impl<S, V, T> DeltaExecutor<S, V, T>
where
    S: WorldState,
    V: VirtualMachine,
    T: Tracer,
{
    /// Applies every entry of the delta in sequence order and finalizes the batch.
    ///
    /// Per-entry failures are recorded in the receipt stream and never abort the batch. The
    /// returned error is batch-fatal: nothing was persisted and the canonical chain must not
    /// advance.
    pub fn execute_delta(
        &mut self,
        delta: &mut Delta,
        mode: ExecutionMode,
    ) -> Result<DeltaOutcome, DeltaExecutionError> {
        let mut receipts = Vec::with_capacity(delta.entries.len());

        for index in 0..delta.entries.len() {
            // Entries are immutable once included in a delta; work on a copy so the delta
            // header can be mutated alongside.
            let entry = delta.entries[index].clone();
            let gas_used_before = delta.gas_used;
            let outcome = self.execute_entry(delta, &entry)?;
            let gas_spent = delta.gas_used - gas_used_before;
            trace!(index, gas_spent, success = outcome.is_success(), "entry finalized");
            receipts.push(receipt_for(outcome, gas_spent, delta.gas_used));
        }

        let computed = self.state.recalculate_state_root();
        match mode {
            ExecutionMode::Commit => {
                if computed != delta.state_root {
                    error!(
                        claimed = %delta.state_root,
                        %computed,
                        sequence_number = delta.sequence_number,
                        "state root mismatch, aborting batch"
                    );
                    return Err(DeltaExecutionError::StateRootMismatch {
                        claimed: delta.state_root,
                        computed,
                    });
                }
                self.state.commit_tree(delta.sequence_number);
            }
            ExecutionMode::Candidate => {
                delta.state_root = computed;
                self.state.reset();
            }
        }

        debug!(
            sequence_number = delta.sequence_number,
            gas_used = delta.gas_used,
            state_root = %computed,
            ?mode,
            "delta finalized"
        );
        Ok(DeltaOutcome { gas_used: delta.gas_used, state_root: computed, receipts })
    }

    /// Runs the per-entry state machine: validation, gas-payment prelude, snapshot, virtual
    /// machine run, commit or rollback, refund and beneficiary payment.
    fn execute_entry(
        &mut self,
        delta: &mut Delta,
        entry: &PublicEntry,
    ) -> Result<EntryOutcome, DeltaExecutionError> {
        let sender = entry.sender_address;
        let gas_price = U256::from(entry.gas_price);

        if let Err(reason) = validate_entry(&mut self.state, entry, delta, self.spec) {
            debug!(%sender, %reason, "entry quick-failed");
            self.finish_entry(
                delta,
                entry,
                entry.receiver_address,
                entry.gas_limit,
                Bytes::new(),
                &[],
                Some(&reason.to_string()),
                &[],
            )?;
            return Ok(EntryOutcome::QuickFail { reason });
        }

        let intrinsic = intrinsic_gas(entry, self.spec);
        let nonce_before = self.state.get_nonce(sender);

        // Gas-payment prelude. The fee for the full declared gas limit is owed even if
        // execution later fails, so it is charged before the entry snapshot is taken.
        self.state.increment_nonce(sender)?;
        self.state.subtract_balance(sender, U256::from(entry.gas_limit) * gas_price)?;

        let snapshot = self.state.take_snapshot();

        let recipient;
        let env_code;
        let env_input;
        if entry.is_deployment() {
            let deploy_address = sender.create(nonce_before);
            if self.is_deployment_collision(deploy_address) {
                debug!(%sender, address = %deploy_address, "contract collision");
                self.state.restore(snapshot)?;
                self.finish_entry(
                    delta,
                    entry,
                    deploy_address,
                    entry.gas_limit,
                    Bytes::new(),
                    &[],
                    Some(&format!("contract collision at {deploy_address}")),
                    &[],
                )?;
                return Ok(EntryOutcome::Collision { address: deploy_address });
            }
            self.transfer_value(sender, deploy_address, entry.amount)?;
            recipient = deploy_address;
            env_code = entry.data.clone();
            env_input = Bytes::new();
        } else {
            self.transfer_value(sender, entry.receiver_address, entry.amount)?;
            recipient = entry.receiver_address;
            env_code = self.vm.get_cached_code(&mut self.state, recipient, self.spec).code;
            env_input = entry.data.clone();
        }

        let env = ExecutionEnvironment {
            sender,
            recipient,
            value: entry.amount,
            input_data: env_input,
            code: env_code,
            delta: DeltaContext::from_delta(delta),
        };
        let entry_gas = entry.gas_limit - intrinsic;
        let substate = self.vm.run(entry_gas, &env, &mut self.state, &mut self.tracer);
        if substate.gas_remaining > entry_gas {
            return Err(DeltaExecutionError::GasAccounting {
                remaining: substate.gas_remaining,
                entry_gas,
            });
        }

        if substate.is_failure() {
            return self.revert_entry(delta, entry, recipient, snapshot, substate);
        }
        self.settle_entry(delta, entry, recipient, snapshot, substate)
    }

    /// Undoes the value transfer and every nested mutation of a failed run. The nonce
    /// increment and the gas payment of the prelude stand, and the unspent gas is returned.
    fn revert_entry(
        &mut self,
        delta: &mut Delta,
        entry: &PublicEntry,
        recipient: Address,
        snapshot: SnapshotId,
        substate: Substate,
    ) -> Result<EntryOutcome, DeltaExecutionError> {
        self.state.restore(snapshot)?;

        let unspent = substate.gas_remaining;
        let gas_spent = entry.gas_limit - unspent;
        let reason = if substate.is_error { "execution error" } else { "execution reverted" };
        debug!(sender = %entry.sender_address, %recipient, gas_spent, reason, "entry reverted");

        self.state
            .add_balance(entry.sender_address, U256::from(unspent) * U256::from(entry.gas_price))?;
        self.finish_entry(
            delta,
            entry,
            recipient,
            gas_spent,
            substate.output.clone(),
            &[],
            Some(reason),
            &[],
        )?;
        Ok(EntryOutcome::Reverted { gas_spent, output: substate.output })
    }

    /// Commits a successful run: code deposit for deployments, account destruction, refund
    /// arithmetic and the beneficiary payment.
    fn settle_entry(
        &mut self,
        delta: &mut Delta,
        entry: &PublicEntry,
        recipient: Address,
        snapshot: SnapshotId,
        substate: Substate,
    ) -> Result<EntryOutcome, DeltaExecutionError> {
        let mut unspent = substate.gas_remaining;

        if entry.is_deployment() {
            let deposit = code_deposit_gas(substate.output.len());
            if unspent < deposit {
                if self.spec.charges_code_deposit() {
                    debug!(%recipient, deposit, unspent, "code deposit out of gas");
                    self.state.restore(snapshot)?;
                    self.finish_entry(
                        delta,
                        entry,
                        recipient,
                        entry.gas_limit,
                        Bytes::new(),
                        &[],
                        Some("out of gas"),
                        &[],
                    )?;
                    return Ok(EntryOutcome::OutOfGas);
                }
                // Pre-Titan rule: the run's state changes stand, the code is simply not
                // installed.
            } else {
                unspent -= deposit;
                self.state.insert_code(recipient, substate.output.clone())?;
            }
        }

        for address in &substate.destroy_list {
            self.state.delete_account(*address);
        }

        let spent_before_refund = entry.gas_limit - unspent;
        let refund = entry_refund(
            spent_before_refund,
            substate.refund_counter,
            substate.destroy_list.len(),
        );
        self.state.add_balance(
            entry.sender_address,
            U256::from(unspent + refund) * U256::from(entry.gas_price),
        )?;
        let gas_spent = spent_before_refund - refund;

        self.finish_entry(
            delta,
            entry,
            recipient,
            gas_spent,
            substate.output.clone(),
            &substate.logs,
            None,
            &substate.destroy_list,
        )?;
        Ok(EntryOutcome::Success { gas_spent, output: substate.output, logs: substate.logs })
    }

    /// The shared tail of every entry path: beneficiary payment, delta gas accounting, the
    /// single tracer call and the journal flush.
    #[allow(clippy::too_many_arguments)]
    fn finish_entry(
        &mut self,
        delta: &mut Delta,
        entry: &PublicEntry,
        recipient: Address,
        gas_spent: u64,
        output: Bytes,
        logs: &[LogEntry],
        failure: Option<&str>,
        destroyed: &[Address],
    ) -> Result<(), DeltaExecutionError> {
        // A quick-failed entry consumes its full declared gas limit, which can exceed the
        // delta's remaining budget when the budget check itself was the failed precondition.
        // The charge is capped so that `gas_used` never exceeds `gas_limit`.
        let gas_spent = gas_spent.min(delta.gas_remaining());

        // The beneficiary keeps its fee unless this very entry destroyed it.
        if !destroyed.contains(&delta.gas_beneficiary) {
            let fee = U256::from(gas_spent) * U256::from(entry.gas_price);
            if self.state.account_exists(delta.gas_beneficiary) {
                self.state.add_balance(delta.gas_beneficiary, fee)?;
            } else {
                self.state.create_account(delta.gas_beneficiary, fee);
            }
        }

        delta.gas_used += gas_spent;

        match failure {
            Some(reason) => self.tracer.mark_failed(recipient, gas_spent, output, reason),
            None => self.tracer.mark_success(recipient, gas_spent, output, logs),
        }

        self.state.commit(self.spec);
        Ok(())
    }

    fn is_deployment_collision(&mut self, address: Address) -> bool {
        if !self.state.account_exists(address) {
            return false;
        }
        let has_code =
            !self.vm.get_cached_code(&mut self.state, address, self.spec).code.is_empty();
        has_code || self.state.get_nonce(address) != 0
    }

    fn transfer_value(
        &mut self,
        sender: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), DeltaExecutionError> {
        self.state.subtract_balance(sender, amount)?;
        if self.state.account_exists(recipient) {
            self.state.add_balance(recipient, amount)?;
        } else {
            self.state.create_account(recipient, amount);
        }
        Ok(())
    }
}

fn receipt_for(outcome: EntryOutcome, gas_spent: u64, cumulative_gas_used: u64) -> EntryReceipt {
    match outcome {
        EntryOutcome::Success { output, logs, .. } => EntryReceipt {
            success: true,
            gas_spent,
            cumulative_gas_used,
            output,
            logs,
            failure: None,
        },
        EntryOutcome::Reverted { output, .. } => EntryReceipt {
            success: false,
            gas_spent,
            cumulative_gas_used,
            output,
            logs: Vec::new(),
            failure: Some("execution reverted".to_string()),
        },
        EntryOutcome::QuickFail { reason } => EntryReceipt {
            success: false,
            gas_spent,
            cumulative_gas_used,
            output: Bytes::new(),
            logs: Vec::new(),
            failure: Some(reason.to_string()),
        },
        EntryOutcome::Collision { address } => EntryReceipt {
            success: false,
            gas_spent,
            cumulative_gas_used,
            output: Bytes::new(),
            logs: Vec::new(),
            failure: Some(format!("contract collision at {address}")),
        },
        EntryOutcome::OutOfGas => EntryReceipt {
            success: false,
            gas_spent,
            cumulative_gas_used,
            output: Bytes::new(),
            logs: Vec::new(),
            failure: Some("out of gas".to_string()),
        },
    }
}
