//! Intrinsic gas and refund arithmetic.

use crate::{constants, CatenaSpecId, PublicEntry};

/// Computes the base gas cost of an entry before any virtual machine execution.
///
/// The cost is the fixed per-entry constant, plus a per-byte cost of the entry data (zero and
/// non-zero bytes are priced differently, and non-zero bytes are cheaper under data
/// compression), plus the contract-creation cost for deployment entries when the active spec
/// charges it. Pure; always terminates in `O(len(data))`.
pub fn intrinsic_gas(entry: &PublicEntry, spec: CatenaSpecId) -> u64 {
    let nonzero_gas = if spec.compresses_entry_data() {
        constants::nova::ENTRY_DATA_NONZERO_GAS
    } else {
        constants::genesis::ENTRY_DATA_NONZERO_GAS
    };

    let mut gas = constants::genesis::ENTRY_GAS;
    for byte in &entry.data {
        gas += if *byte == 0 { constants::genesis::ENTRY_DATA_ZERO_GAS } else { nonzero_gas };
    }

    if entry.is_deployment() && spec.charges_creation_gas() {
        gas += constants::titan::ENTRY_CREATE_GAS;
    }

    gas
}

/// Computes the gas refund paid back to the sender of a successful entry.
///
/// The accrued refund (the virtual machine's counter plus a fixed amount per destroyed
/// account) is capped at half of the gas spent so far.
pub fn entry_refund(spent: u64, refund_counter: u64, destroyed_accounts: usize) -> u64 {
    let accrued = refund_counter
        + destroyed_accounts as u64 * constants::genesis::SELF_DESTRUCT_REFUND_GAS;
    accrued.min(spent / constants::genesis::MAX_REFUND_QUOTIENT)
}

/// Computes the gas cost of persisting deployed code.
pub fn code_deposit_gas(code_len: usize) -> u64 {
    code_len as u64 * constants::genesis::CODE_DEPOSIT_GAS_PER_BYTE
}
