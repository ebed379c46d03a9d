//! Gas constants for the Catena delta execution engine.
//!
//! It groups the constants for different rule-set versions as sub-modules.

/// Constants for the `GENESIS` spec.
pub mod genesis {
    /// The fixed intrinsic cost charged for every entry before any execution.
    pub const ENTRY_GAS: u64 = 21_000;
    /// Intrinsic gas cost per zero-valued byte of entry data.
    pub const ENTRY_DATA_ZERO_GAS: u64 = 4;
    /// Intrinsic gas cost per non-zero byte of entry data.
    pub const ENTRY_DATA_NONZERO_GAS: u64 = 68;
    /// Gas cost per byte of contract code persisted on successful deployment.
    pub const CODE_DEPOSIT_GAS_PER_BYTE: u64 = 200;
    /// Gas refunded for every account destroyed by a successful entry.
    pub const SELF_DESTRUCT_REFUND_GAS: u64 = 24_000;
    /// The refund paid out to the sender is capped at `spent_gas / MAX_REFUND_QUOTIENT`.
    pub const MAX_REFUND_QUOTIENT: u64 = 2;
}

/// Constants for the `TITAN` spec.
pub mod titan {
    /// Additional intrinsic gas charged for contract-deployment entries.
    pub const ENTRY_CREATE_GAS: u64 = 32_000;
}

/// Constants for the `NOVA` spec.
pub mod nova {
    /// Reduced intrinsic gas cost per non-zero byte of entry data under data compression.
    pub const ENTRY_DATA_NONZERO_GAS: u64 = 16;
}
