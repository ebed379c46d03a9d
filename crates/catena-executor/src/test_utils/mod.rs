//! Test utilities: an in-memory world state with journal semantics, a scriptable virtual
//! machine and a recording tracer.

mod state;
pub use state::*;

mod vm;
pub use vm::*;

mod tracer;
pub use tracer::*;
