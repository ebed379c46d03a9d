//! The deterministic delta execution engine for the Catena node.
//!
//! A [`Delta`] is the network's unit of work: an ordered batch of signed entries applied
//! atomically to the account ledger. Every participating node must reach byte-identical
//! results given the same input, so the executor is single-threaded, strictly sequential and
//! free of ambient state: the world state, the virtual machine and the receipt tracer are
//! injected, exclusively-owned collaborators.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod executor;
pub use executor::*;

mod gas;
pub use gas::*;

mod precompiles;
pub use precompiles::*;

mod result;
pub use result::*;

mod spec;
pub use spec::*;

mod state;
pub use state::*;

mod tracer;
pub use tracer::*;

mod types;
pub use types::*;

mod validation;
pub use validation::*;

mod vm;
pub use vm::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
