//! Fixed-address native routines reachable like any contract call.
//!
//! Precompiles are implemented natively for determinism and gas efficiency and are invoked by
//! the virtual machine; the executor only exposes the table.

use std::collections::BTreeMap;

use alloy_primitives::{address, Address, Bytes};
use once_cell::race::OnceBox;

/// The fixed address of the signature-verify precompile.
pub const SIGNATURE_VERIFY_ADDRESS: Address =
    address!("0000000000000000000000000000000000000001");
/// The fixed address of the hash precompile.
pub const HASH_ADDRESS: Address = address!("0000000000000000000000000000000000000002");

/// The successful result of a precompile run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// The gas consumed by the run.
    pub gas_used: u64,
    /// The bytes returned by the run.
    pub output: Bytes,
}

/// The only error a precompile can raise. Everything else (bad signatures, malformed input)
/// is reported through the output bytes so that gas accounting stays simple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PrecompileError {
    /// The gas given to the run does not cover the precompile's cost.
    #[error("precompile out of gas")]
    OutOfGas,
}

/// A native precompile routine: input bytes and a gas limit in, output and gas usage out.
pub type PrecompileFn = fn(&[u8], u64) -> Result<PrecompileOutput, PrecompileError>;

/// The table of fixed-address native routines.
#[derive(Debug, Default)]
pub struct Precompiles {
    inner: BTreeMap<Address, PrecompileFn>,
}

impl Precompiles {
    /// Whether `address` hosts a precompile.
    pub fn contains(&self, address: &Address) -> bool {
        self.inner.contains_key(address)
    }

    /// The routine hosted at `address`, if any.
    pub fn get(&self, address: &Address) -> Option<PrecompileFn> {
        self.inner.get(address).copied()
    }

    /// The addresses hosting precompiles, in address order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.inner.keys()
    }
}

/// The precompile table of the Catena network.
pub fn catena_precompiles() -> &'static Precompiles {
    static INSTANCE: OnceBox<Precompiles> = OnceBox::new();
    INSTANCE.get_or_init(|| {
        let mut inner: BTreeMap<Address, PrecompileFn> = BTreeMap::new();
        inner.insert(SIGNATURE_VERIFY_ADDRESS, signature_verify::run);
        inner.insert(HASH_ADDRESS, hash::run);
        Box::new(Precompiles { inner })
    })
}

/// The hash precompile: returns the blake3 digest of the input.
pub mod hash {
    use alloy_primitives::Bytes;

    use super::{PrecompileError, PrecompileOutput};

    /// Base gas cost of the hash precompile.
    pub const BASE_GAS: u64 = 60;
    /// Gas cost per 32-byte word of input.
    pub const WORD_GAS: u64 = 12;

    /// Digests the input, charging the base cost plus a per-word cost.
    pub fn run(input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, PrecompileError> {
        let gas_used = BASE_GAS + input.len().div_ceil(32) as u64 * WORD_GAS;
        if gas_limit < gas_used {
            return Err(PrecompileError::OutOfGas);
        }
        let digest = blake3::hash(input);
        Ok(PrecompileOutput { gas_used, output: Bytes::copy_from_slice(digest.as_bytes()) })
    }
}

/// The signature-verify precompile: Ed25519 verification over a fixed-length input.
///
/// Input layout: `message(32) ‖ signature(64) ‖ context(32) ‖ public key(32)`. The routine
/// returns the public key bytes when the signature over `message ‖ context` verifies, and an
/// all-zero word otherwise; malformed input also yields the all-zero word. It never raises any
/// error other than out-of-gas, so that gas accounting in the virtual machine stays simple.
pub mod signature_verify {
    use alloy_primitives::Bytes;
    use ed25519_dalek::{Signature, VerifyingKey};

    use super::{PrecompileError, PrecompileOutput};

    /// Fixed gas cost of the signature-verify precompile.
    pub const GAS_COST: u64 = 3_000;
    /// The exact input length the precompile accepts.
    pub const INPUT_LEN: usize = 160;

    /// Verifies the signature, returning the public key bytes or an all-zero word.
    pub fn run(input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, PrecompileError> {
        if gas_limit < GAS_COST {
            return Err(PrecompileError::OutOfGas);
        }
        let output = match verify(input) {
            Some(public_key) => Bytes::copy_from_slice(&public_key),
            None => Bytes::from_static(&[0u8; 32]),
        };
        Ok(PrecompileOutput { gas_used: GAS_COST, output })
    }

    fn verify(input: &[u8]) -> Option<[u8; 32]> {
        if input.len() != INPUT_LEN {
            return None;
        }
        let signature = Signature::from_slice(&input[32..96]).ok()?;
        let public_key: [u8; 32] = input[128..160].try_into().ok()?;
        let key = VerifyingKey::from_bytes(&public_key).ok()?;

        // The signed payload is the 32-byte message followed by the 32-byte context.
        let mut signed = [0u8; 64];
        signed[..32].copy_from_slice(&input[..32]);
        signed[32..].copy_from_slice(&input[96..128]);

        key.verify_strict(&signed, &signature).ok()?;
        Some(public_key)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;

    fn signed_input(message: [u8; 32], context: [u8; 32], key: &SigningKey) -> Vec<u8> {
        let mut payload = [0u8; 64];
        payload[..32].copy_from_slice(&message);
        payload[32..].copy_from_slice(&context);
        let signature = key.sign(&payload);

        let mut input = Vec::with_capacity(signature_verify::INPUT_LEN);
        input.extend_from_slice(&message);
        input.extend_from_slice(&signature.to_bytes());
        input.extend_from_slice(&context);
        input.extend_from_slice(key.verifying_key().as_bytes());
        input
    }

    #[test]
    fn table_hosts_the_fixed_addresses() {
        let precompiles = catena_precompiles();
        assert!(precompiles.contains(&SIGNATURE_VERIFY_ADDRESS));
        assert!(precompiles.contains(&HASH_ADDRESS));
        assert_eq!(precompiles.addresses().count(), 2);
    }

    #[test]
    fn hash_precompile_digests_input() {
        let input = b"catena delta";
        let result = hash::run(input, 1_000_000).unwrap();
        assert_eq!(result.gas_used, hash::BASE_GAS + hash::WORD_GAS);
        assert_eq!(result.output.as_ref(), blake3::hash(input).as_bytes());

        // 33 bytes round up to two words.
        let result = hash::run(&[7u8; 33], 1_000_000).unwrap();
        assert_eq!(result.gas_used, hash::BASE_GAS + 2 * hash::WORD_GAS);
    }

    #[test]
    fn hash_precompile_is_deterministic() {
        let a = hash::run(b"same input", 1_000).unwrap();
        let b = hash::run(b"same input", 1_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hash_precompile_out_of_gas() {
        assert_eq!(hash::run(b"x", hash::BASE_GAS), Err(PrecompileError::OutOfGas));
    }

    #[test]
    fn signature_verify_returns_public_key_on_success() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let input = signed_input([1u8; 32], [2u8; 32], &key);
        let result = signature_verify::run(&input, signature_verify::GAS_COST).unwrap();
        assert_eq!(result.gas_used, signature_verify::GAS_COST);
        assert_eq!(result.output.as_ref(), key.verifying_key().as_bytes());
    }

    #[test]
    fn signature_verify_returns_zeros_on_bad_signature() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let mut input = signed_input([1u8; 32], [2u8; 32], &key);
        // Tampering with the message invalidates the signature.
        input[0] ^= 0xff;
        let result = signature_verify::run(&input, signature_verify::GAS_COST).unwrap();
        assert_eq!(result.output.as_ref(), &[0u8; 32]);
    }

    #[test]
    fn signature_verify_returns_zeros_on_wrong_context() {
        let key = SigningKey::from_bytes(&[9u8; 32]);
        let mut input = signed_input([1u8; 32], [2u8; 32], &key);
        input[96] ^= 0xff;
        let result = signature_verify::run(&input, signature_verify::GAS_COST).unwrap();
        assert_eq!(result.output.as_ref(), &[0u8; 32]);
    }

    #[test]
    fn signature_verify_returns_zeros_on_malformed_length() {
        let result = signature_verify::run(&[0u8; 159], signature_verify::GAS_COST).unwrap();
        assert_eq!(result.output.as_ref(), &[0u8; 32]);
        let result = signature_verify::run(&[], signature_verify::GAS_COST).unwrap();
        assert_eq!(result.output.as_ref(), &[0u8; 32]);
    }

    #[test]
    fn signature_verify_out_of_gas() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let input = signed_input([1u8; 32], [2u8; 32], &key);
        assert_eq!(
            signature_verify::run(&input, signature_verify::GAS_COST - 1),
            Err(PrecompileError::OutOfGas)
        );
    }
}
