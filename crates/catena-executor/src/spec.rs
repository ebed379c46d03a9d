//! Definitions of the Catena execution engine versions (`CatenaSpecId`).

use core::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Catena spec id, defining different versions of the Catena execution rules.
///
/// Each version inherits and customizes the behavior of the previous one:
/// - [`CatenaSpecId::GENESIS`] charges neither contract-creation gas nor the code deposit.
/// - [`CatenaSpecId::TITAN`] adds the per-deployment creation cost and makes the code deposit
///   mandatory (a deployment that cannot afford it runs out of gas).
/// - [`CatenaSpecId::NOVA`] reduces the per-byte cost of non-zero entry data (data compression).
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms, missing_docs)]
#[non_exhaustive]
pub enum CatenaSpecId {
    /// The initial rule set of the Catena network.
    GENESIS,
    /// The rule set for the *Titan* upgrade.
    TITAN,
    /// The rule set for the *Nova* upgrade.
    #[default]
    NOVA,
}

/// String identifiers for Catena execution engine versions.
#[allow(missing_docs)]
pub mod name {
    /// The string identifier for the *Genesis* rule set.
    pub const GENESIS: &str = "Genesis";
    /// The string identifier for the *Titan* rule set.
    pub const TITAN: &str = "Titan";
    /// The string identifier for the *Nova* rule set.
    pub const NOVA: &str = "Nova";
}

/// Error returned when parsing an unknown spec identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown Catena spec identifier")]
pub struct UnknownSpec;

impl CatenaSpecId {
    /// Checks if one given [`CatenaSpecId`] is enabled in the current [`CatenaSpecId`].
    ///
    /// Rule sets are backward compatible, so a higher version always enables a lower one.
    pub const fn is_enabled(self, other: Self) -> bool {
        other as u8 <= self as u8
    }

    /// Whether deployment entries are charged the contract-creation intrinsic cost.
    pub const fn charges_creation_gas(self) -> bool {
        self.is_enabled(Self::TITAN)
    }

    /// Whether a deployment that cannot afford the code deposit fails with out-of-gas instead of
    /// silently skipping the code installation.
    pub const fn charges_code_deposit(self) -> bool {
        self.is_enabled(Self::TITAN)
    }

    /// Whether non-zero entry data bytes are charged the reduced (compressed) cost.
    pub const fn compresses_entry_data(self) -> bool {
        self.is_enabled(Self::NOVA)
    }
}

impl From<CatenaSpecId> for &'static str {
    /// Converts the [`CatenaSpecId`] into its corresponding string identifier.
    fn from(spec_id: CatenaSpecId) -> Self {
        match spec_id {
            CatenaSpecId::GENESIS => name::GENESIS,
            CatenaSpecId::TITAN => name::TITAN,
            CatenaSpecId::NOVA => name::NOVA,
        }
    }
}

impl FromStr for CatenaSpecId {
    type Err = UnknownSpec;

    /// Converts the string identifier into its corresponding [`CatenaSpecId`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            name::GENESIS => Ok(Self::GENESIS),
            name::TITAN => Ok(Self::TITAN),
            name::NOVA => Ok(Self::NOVA),
            _ => Err(UnknownSpec),
        }
    }
}

impl Display for CatenaSpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_versions_are_backward_compatible() {
        assert!(CatenaSpecId::NOVA.is_enabled(CatenaSpecId::GENESIS));
        assert!(CatenaSpecId::NOVA.is_enabled(CatenaSpecId::TITAN));
        assert!(CatenaSpecId::TITAN.is_enabled(CatenaSpecId::GENESIS));
        assert!(!CatenaSpecId::GENESIS.is_enabled(CatenaSpecId::TITAN));
        assert!(!CatenaSpecId::TITAN.is_enabled(CatenaSpecId::NOVA));
    }

    #[test]
    fn spec_flags() {
        assert!(!CatenaSpecId::GENESIS.charges_creation_gas());
        assert!(!CatenaSpecId::GENESIS.charges_code_deposit());
        assert!(!CatenaSpecId::GENESIS.compresses_entry_data());
        assert!(CatenaSpecId::TITAN.charges_creation_gas());
        assert!(CatenaSpecId::TITAN.charges_code_deposit());
        assert!(!CatenaSpecId::TITAN.compresses_entry_data());
        assert!(CatenaSpecId::NOVA.compresses_entry_data());
    }

    #[test]
    fn spec_name_round_trip() {
        for spec in [CatenaSpecId::GENESIS, CatenaSpecId::TITAN, CatenaSpecId::NOVA] {
            assert_eq!(spec.to_string().parse::<CatenaSpecId>(), Ok(spec));
        }
        assert_eq!("Helios".parse::<CatenaSpecId>(), Err(UnknownSpec));
    }
}
