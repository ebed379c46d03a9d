//! Core data model of the Catena delta execution engine.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The unit of execution of the Catena network, i.e. the block-equivalent batch of entries
/// applied atomically to the world state.
///
/// Entries are applied strictly in sequence order; the ordering is part of the consensus
/// contract. `gas_used` is a running total mutated during execution and never exceeds
/// `gas_limit`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// The ordered sequence of entries to apply.
    pub entries: Vec<PublicEntry>,
    /// The total gas budget for the batch.
    pub gas_limit: u64,
    /// The running total of gas consumed by processed entries.
    pub gas_used: u64,
    /// The address credited with the gas fees of the batch.
    pub gas_beneficiary: Address,
    /// The claimed (commit mode) or produced (candidate mode) state root.
    pub state_root: B256,
    /// The hash of the previous delta in the chain.
    pub previous_delta_hash: B256,
    /// The batch timestamp, in seconds.
    pub timestamp: u64,
    /// The batch number, used when persisting the state tree.
    pub sequence_number: u64,
}

impl Delta {
    /// The gas budget still available for further entries.
    pub const fn gas_remaining(&self) -> u64 {
        self.gas_limit - self.gas_used
    }
}

/// A single signed state-mutating instruction inside a [`Delta`].
///
/// Entries are immutable once included in a delta; the executor only ever mutates the world
/// state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEntry {
    /// The already-resolved sender address.
    pub sender_address: Address,
    /// The receiver address; zero for contract-deployment entries.
    pub receiver_address: Address,
    /// The value transferred from sender to receiver.
    pub amount: U256,
    /// The gas budget declared by the entry.
    pub gas_limit: u64,
    /// The price per unit of gas, in the smallest currency unit.
    pub gas_price: u64,
    /// The sender nonce this entry spends.
    pub nonce: u64,
    /// Opaque payload: init-code for deployments, call input otherwise.
    pub data: Bytes,
}

impl PublicEntry {
    /// Whether this entry deploys a contract (no receiver specified).
    pub fn is_deployment(&self) -> bool {
        self.receiver_address == Address::ZERO
    }
}

/// A log record emitted by the virtual machine during a successful entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The address that emitted the log.
    pub address: Address,
    /// The indexed topics of the log.
    pub topics: Vec<B256>,
    /// The opaque log payload.
    pub data: Bytes,
}
