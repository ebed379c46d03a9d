//! The ordered entry validation chain.

use alloy_primitives::{Address, U256};

use crate::{intrinsic_gas, CatenaSpecId, Delta, PublicEntry, WorldState};

/// A validation failure: the entry quick-fails, consuming its full declared gas limit against
/// the delta without mutating any state beyond the beneficiary credit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The sender address does not resolve to a non-null address.
    #[error("sender not specified")]
    SenderNotSpecified,
    /// The entry's declared gas limit cannot cover its own intrinsic cost.
    #[error("gas limit below intrinsic gas: gas_limit={gas_limit} < intrinsic={intrinsic}")]
    GasLimitBelowIntrinsicGas {
        /// The gas limit declared by the entry.
        gas_limit: u64,
        /// The intrinsic cost of the entry.
        intrinsic: u64,
    },
    /// The entry's declared gas limit exceeds the delta's remaining budget.
    #[error("delta gas limit exceeded: entry_gas_limit={entry_gas_limit} > remaining={remaining}")]
    DeltaGasLimitExceeded {
        /// The gas limit declared by the entry.
        entry_gas_limit: u64,
        /// The gas budget still available in the delta.
        remaining: u64,
    },
    /// The sender cannot afford the intrinsic fee plus the transferred value.
    #[error("insufficient sender balance: balance={balance}, required={required}")]
    InsufficientSenderBalance {
        /// The balance held by the sender.
        balance: U256,
        /// The intrinsic fee plus the transferred value.
        required: U256,
    },
    /// The entry nonce does not match the sender's account nonce.
    #[error("wrong nonce: entry={entry_nonce}, account={account_nonce}")]
    WrongNonce {
        /// The nonce declared by the entry.
        entry_nonce: u64,
        /// The current nonce of the sender account.
        account_nonce: u64,
    },
}

/// Runs the ordered precondition checks for one entry, short-circuiting on the first failure.
///
/// A missing sender account is created with zero balance when the entry carries a zero gas
/// price, permitting zero-fee entries from fresh accounts; otherwise absence is left to fail
/// at the balance check.
pub fn validate_entry<S: WorldState>(
    state: &mut S,
    entry: &PublicEntry,
    delta: &Delta,
    spec: CatenaSpecId,
) -> Result<(), ValidationError> {
    if entry.sender_address == Address::ZERO {
        return Err(ValidationError::SenderNotSpecified);
    }

    let intrinsic = intrinsic_gas(entry, spec);
    if entry.gas_limit < intrinsic {
        return Err(ValidationError::GasLimitBelowIntrinsicGas {
            gas_limit: entry.gas_limit,
            intrinsic,
        });
    }

    let remaining = delta.gas_remaining();
    if entry.gas_limit > remaining {
        return Err(ValidationError::DeltaGasLimitExceeded {
            entry_gas_limit: entry.gas_limit,
            remaining,
        });
    }

    if !state.account_exists(entry.sender_address) && entry.gas_price == 0 {
        state.create_account(entry.sender_address, U256::ZERO);
    }

    let required = U256::from(intrinsic) * U256::from(entry.gas_price) + entry.amount;
    let balance = state.get_balance(entry.sender_address);
    if required > balance {
        return Err(ValidationError::InsufficientSenderBalance { balance, required });
    }

    let account_nonce = state.get_nonce(entry.sender_address);
    if entry.nonce != account_nonce {
        return Err(ValidationError::WrongNonce { entry_nonce: entry.nonce, account_nonce });
    }

    Ok(())
}
