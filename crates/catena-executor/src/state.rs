//! The world state boundary: the account ledger the executor mutates.

use alloy_primitives::{Address, Bytes, B256, U256};
use auto_impl::auto_impl;

use crate::CatenaSpecId;

/// An opaque checkpoint handle returned by [`WorldState::take_snapshot`].
///
/// Passing the handle to [`WorldState::restore`] undoes every mutation performed after the
/// snapshot was taken. The executor takes exactly one snapshot per entry before mutating
/// balances, so at most one un-restored snapshot is meaningful at any time.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
)]
pub struct SnapshotId(pub usize);

/// Errors reported by a [`WorldState`] implementation.
///
/// These are collaborator contract violations, never entry-local conditions: the executor
/// surfaces them as batch-fatal failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A balance subtraction would underflow.
    #[error("insufficient balance for {address}: balance={balance}, required={required}")]
    InsufficientBalance {
        /// The debited account.
        address: Address,
        /// The balance held by the account.
        balance: U256,
        /// The amount the subtraction required.
        required: U256,
    },
    /// An operation targeted an account that does not exist.
    #[error("unknown account {0}")]
    UnknownAccount(Address),
    /// A snapshot handle was reused after a restore or invalidated by a commit.
    #[error("invalid snapshot handle {0}")]
    InvalidSnapshot(SnapshotId),
}

/// The account ledger collaborator: balances, nonces, code and the state tree.
///
/// A single mutable handle is active per logical execution context; the executor owns its
/// handle exclusively for the duration of a delta. All calls are synchronous and CPU-bound.
#[auto_impl(&mut, Box)]
pub trait WorldState {
    /// Whether an account exists at `address`.
    fn account_exists(&self, address: Address) -> bool;

    /// The balance of `address`, zero for absent accounts.
    fn get_balance(&self, address: Address) -> U256;

    /// The nonce of `address`, zero for absent accounts.
    fn get_nonce(&self, address: Address) -> u64;

    /// Creates an account at `address` holding `balance`.
    fn create_account(&mut self, address: Address, balance: U256);

    /// Subtracts `amount` from the balance of `address`.
    fn subtract_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError>;

    /// Adds `amount` to the balance of the existing account at `address`.
    fn add_balance(&mut self, address: Address, amount: U256) -> Result<(), StateError>;

    /// Increments the nonce of the existing account at `address`.
    fn increment_nonce(&mut self, address: Address) -> Result<(), StateError>;

    /// Installs `code` under the existing account at `address`.
    fn insert_code(&mut self, address: Address, code: Bytes) -> Result<(), StateError>;

    /// Deletes the account at `address`. Deleting an absent account is a no-op.
    fn delete_account(&mut self, address: Address);

    /// Takes a checkpoint of the current journal position.
    fn take_snapshot(&mut self) -> SnapshotId;

    /// Undoes every mutation performed after `snapshot` was taken.
    fn restore(&mut self, snapshot: SnapshotId) -> Result<(), StateError>;

    /// Flushes the journal: committed changes can no longer be undone by [`Self::restore`].
    fn commit(&mut self, spec: CatenaSpecId);

    /// Recomputes and caches the state root over the current account set.
    fn recalculate_state_root(&mut self) -> B256;

    /// The most recently computed state root.
    fn current_state_root(&self) -> B256;

    /// Persists the state tree for the given batch number.
    fn commit_tree(&mut self, sequence_number: u64);

    /// Discards everything since the last [`Self::commit_tree`], reloading the persisted tree.
    fn reset(&mut self);
}
